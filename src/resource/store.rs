//! Client-held copy of one collection for the current view.
//!
//! The store is patched in place after successful writes instead of being
//! re-fetched. Loads are stamped with a generation so that a list response
//! arriving after the view was remounted (or left) is dropped instead of
//! overwriting newer state.

use tracing::warn;

use crate::client::{ApiError, UNAUTHORIZED_MESSAGE};
use crate::monitoring;

use super::Resource;

/// Why the initial list could not be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    Unauthorized,
    Failed(String),
}

impl LoadError {
    pub fn from_api<R: Resource>(err: &ApiError) -> Self {
        if err.is_unauthorized() {
            LoadError::Unauthorized
        } else {
            LoadError::Failed(format!("Error al cargar {}.", R::NOUN.plural))
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LoadError::Unauthorized => UNAUTHORIZED_MESSAGE,
            LoadError::Failed(message) => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(LoadError),
}

/// Proof that a load was started at a given generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone)]
pub struct ResourceStore<R> {
    items: Vec<R>,
    state: LoadState,
    generation: u64,
}

impl<R> Default for ResourceStore<R> {
    fn default() -> Self {
        ResourceStore {
            items: Vec::new(),
            state: LoadState::Idle,
            generation: 0,
        }
    }
}

impl<R: Resource> ResourceStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with records, as if a load had completed
    pub fn with_items(items: Vec<R>) -> Self {
        ResourceStore {
            items,
            state: LoadState::Ready,
            generation: 0,
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Ready
    }

    pub fn find(&self, id: i64) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Start a load; any ticket handed out earlier becomes stale
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        LoadTicket(self.generation)
    }

    /// Forget any in-flight load, e.g. when the view is left
    pub fn invalidate(&mut self) {
        self.generation += 1;
        if self.state == LoadState::Loading {
            self.state = LoadState::Idle;
        }
    }

    /// The request behind `ticket` went away without an answer. Back to
    /// `Idle` so the next visit loads again; newer loads are left alone.
    pub fn abandon_load(&mut self, ticket: LoadTicket) -> bool {
        if ticket.0 != self.generation || self.state != LoadState::Loading {
            return false;
        }
        self.generation += 1;
        self.state = LoadState::Idle;
        true
    }

    /// Local copy can no longer be trusted; reload on next visit
    pub fn mark_stale(&mut self) {
        self.generation += 1;
        self.state = LoadState::Idle;
    }

    /// Apply a list response. Returns `false` when the ticket is stale and
    /// the response was discarded.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Vec<R>, ApiError>) -> bool {
        if ticket.0 != self.generation {
            monitoring::STALE_RESPONSES.inc();
            warn!(
                "Discarding stale {} list response (ticket {}, current {})",
                R::NOUN.plural,
                ticket.0,
                self.generation
            );
            return false;
        }

        match result {
            Ok(items) => {
                self.items = items;
                self.state = LoadState::Ready;
            }
            Err(err) => {
                self.state = LoadState::Failed(LoadError::from_api::<R>(&err));
            }
        }
        true
    }

    /// New records go to the front of the list
    pub fn apply_created(&mut self, entity: R) {
        self.items.insert(0, entity);
    }

    /// Replace the record with `id` in place. Returns `false` if it is no
    /// longer in the store, in which case nothing changes.
    pub fn apply_updated(&mut self, id: i64, entity: R) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(slot) => {
                *slot = entity;
                true
            }
            None => false,
        }
    }

    /// Remove the record with `id`, keeping the order of the rest
    pub fn apply_removed(&mut self, id: i64) -> Option<R> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Distinct categories present in the store, in first-seen order
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for category in self.items.iter().filter_map(Resource::category) {
            if !category.is_empty() && !seen.iter().any(|c| c == category) {
                seen.push(category.to_string());
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::helpers::curso;

    fn store() -> ResourceStore<crate::models::Curso> {
        ResourceStore::with_items(vec![
            curso(1, "Cejas y Pestañas", "Corto"),
            curso(2, "Colorimetría", "Técnico"),
            curso(3, "Peinados", "Corto"),
        ])
    }

    #[test]
    fn test_created_is_prepended() {
        let mut store = store();
        let before = store.len();

        store.apply_created(curso(101, "Maquillaje Profesional", "Técnico"));

        assert_eq!(store.len(), before + 1);
        assert_eq!(store.items()[0].id, 101);
        assert_eq!(store.items()[1].id, 1);
    }

    #[test]
    fn test_update_replaces_only_matching_id() {
        let mut store = store();
        let original = store.items().to_vec();
        let replacement = curso(2, "Colorimetría Avanzada", "Técnico");

        assert!(store.apply_updated(2, replacement.clone()));

        assert_eq!(store.find(2), Some(&replacement));
        assert_eq!(store.items()[0], original[0]);
        assert_eq!(store.items()[2], original[2]);
        assert_eq!(store.len(), original.len());
    }

    #[test]
    fn test_update_of_missing_record_changes_nothing() {
        let mut store = store();
        let original = store.items().to_vec();

        assert!(!store.apply_updated(99, curso(99, "Fantasma", "Corto")));
        assert_eq!(store.items(), original.as_slice());
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut store = store();

        let removed = store.apply_removed(2).unwrap();

        assert_eq!(removed.id, 2);
        let ids: Vec<i64> = store.items().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(store.apply_removed(2).is_none());
    }

    #[test]
    fn test_load_error_distinguishes_unauthorized() {
        let mut store: ResourceStore<crate::models::Curso> = ResourceStore::new();

        let ticket = store.begin_load();
        store.finish_load(ticket, Err(ApiError::Unauthorized { message: None }));
        assert_eq!(store.state(), &LoadState::Failed(LoadError::Unauthorized));

        let ticket = store.begin_load();
        store.finish_load(
            ticket,
            Err(ApiError::Status {
                status: 500,
                message: None,
            }),
        );
        assert_eq!(
            store.state(),
            &LoadState::Failed(LoadError::Failed("Error al cargar cursos.".to_string()))
        );
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut store: ResourceStore<crate::models::Curso> = ResourceStore::new();

        let first = store.begin_load();
        let second = store.begin_load();

        assert!(store.finish_load(second, Ok(vec![curso(2, "Nuevo", "Corto")])));
        assert!(!store.finish_load(first, Ok(vec![curso(1, "Viejo", "Corto")])));

        assert_eq!(store.len(), 1);
        assert_eq!(store.items()[0].id, 2);
    }

    #[test]
    fn test_invalidate_drops_in_flight_load() {
        let mut store: ResourceStore<crate::models::Curso> = ResourceStore::new();

        let ticket = store.begin_load();
        store.invalidate();

        assert!(!store.finish_load(ticket, Ok(vec![curso(1, "Tarde", "Corto")])));
        assert!(store.is_empty());
        assert_eq!(store.state(), &LoadState::Idle);
    }

    #[test]
    fn test_abandoned_load_can_be_retried() {
        let mut store: ResourceStore<crate::models::Curso> = ResourceStore::new();

        let first = store.begin_load();
        assert!(store.abandon_load(first));
        assert_eq!(store.state(), &LoadState::Idle);
        assert!(!store.finish_load(first, Ok(vec![curso(1, "Tarde", "Corto")])));

        let second = store.begin_load();
        // An older ticket cannot cancel the load that replaced it
        assert!(!store.abandon_load(first));
        assert!(store.finish_load(second, Ok(vec![curso(2, "Peinados", "Corto")])));
        assert!(!store.abandon_load(second));
        assert_eq!(store.len(), 1);
        assert!(store.is_loaded());
    }

    #[test]
    fn test_stale_store_reloads_but_keeps_items() {
        let mut store = store();
        store.mark_stale();

        assert_eq!(store.state(), &LoadState::Idle);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_categories_unique_in_order() {
        assert_eq!(store().categories(), vec!["Corto", "Técnico"]);
    }
}
