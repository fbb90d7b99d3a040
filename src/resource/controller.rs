//! One admin screen's worth of CRUD state: store, filter, editor and the
//! flash banner.
//!
//! Every network-facing operation is split in three: `prepare_*` mutates
//! local state and returns a pending request, the request is sent without
//! holding any borrow of the controller, and `finish_*` merges the
//! outcome. The async `mount`/`submit`/`delete` helpers chain the three
//! steps for callers that own the controller outright.

use tracing::{info, warn};

use crate::client::ApiError;

use super::{
    DeleteConfirmer, Editor, Filter, ListParams, LoadState, LoadTicket, Resource, ResourceApi,
    ResourceStore, SubmitError, WritePlan, WritePolicy,
};

pub const INTERRUPTED_MESSAGE: &str =
    "El envío se interrumpió antes de recibir respuesta. Revisa la lista e inténtalo de nuevo.";

/// One-shot banner shown above the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flash {
    Success(String),
    Error(String),
}

impl Flash {
    pub fn message(&self) -> &str {
        match self {
            Flash::Success(message) | Flash::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Flash::Error(_))
    }
}

/// Validated create/update waiting to be sent
#[derive(Debug)]
pub struct PendingWrite<R: Resource> {
    plan: WritePlan<R>,
    policy: WritePolicy,
}

impl<R: Resource> PendingWrite<R> {
    pub fn target(&self) -> Option<i64> {
        self.plan.target()
    }

    pub async fn send<A: ResourceApi<R>>(self, api: &A) -> WriteOutcome<R> {
        let target = self.plan.target();

        let written = match &self.plan {
            WritePlan::Create { payload } => api.create(payload).await,
            WritePlan::Update { id, payload } => api.update(*id, payload).await,
        };

        let result = match (self.policy, written) {
            (WritePolicy::ReadAfterWrite, Ok(entity)) => {
                match api.get_by_id(entity.id()).await {
                    Ok(fresh) => Ok(fresh),
                    Err(e) => {
                        warn!(
                            "Re-fetch of {} {} failed, keeping write response: {}",
                            R::NOUN.singular,
                            entity.id(),
                            e
                        );
                        Ok(entity)
                    }
                }
            }
            (_, written) => written,
        };

        WriteOutcome { target, result }
    }
}

#[derive(Debug)]
pub struct WriteOutcome<R> {
    target: Option<i64>,
    result: Result<R, ApiError>,
}

/// Confirmed delete waiting to be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDelete {
    id: i64,
}

impl PendingDelete {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub async fn send<R: Resource, A: ResourceApi<R>>(self, api: &A) -> DeleteOutcome {
        DeleteOutcome {
            id: self.id,
            result: api.remove(self.id).await,
        }
    }
}

#[derive(Debug)]
pub struct DeleteOutcome {
    id: i64,
    result: Result<(), ApiError>,
}

#[derive(Debug, Clone)]
pub struct ResourceController<R: Resource> {
    store: ResourceStore<R>,
    filter: Filter,
    editor: Editor<R>,
    flash: Option<Flash>,
    policy: WritePolicy,
}

impl<R: Resource> Default for ResourceController<R> {
    fn default() -> Self {
        Self::new(WritePolicy::default())
    }
}

impl<R: Resource> ResourceController<R> {
    pub fn new(policy: WritePolicy) -> Self {
        ResourceController {
            store: ResourceStore::new(),
            filter: Filter::default(),
            editor: Editor::new(),
            flash: None,
            policy,
        }
    }

    pub fn with_store(store: ResourceStore<R>, policy: WritePolicy) -> Self {
        ResourceController {
            store,
            ..Self::new(policy)
        }
    }

    pub fn store(&self) -> &ResourceStore<R> {
        &self.store
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn editor(&self) -> &Editor<R> {
        &self.editor
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    pub fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    /// Hand the banner to the renderer; it is shown once
    pub fn take_flash(&mut self) -> Option<Flash> {
        self.flash.take()
    }

    // Mount

    /// True until a list request has been issued for this view
    pub fn needs_mount(&self) -> bool {
        self.store.state() == &LoadState::Idle
    }

    pub fn begin_mount(&mut self) -> LoadTicket {
        self.store.begin_load()
    }

    pub fn finish_mount(&mut self, ticket: LoadTicket, result: Result<Vec<R>, ApiError>) -> bool {
        self.store.finish_load(ticket, result)
    }

    /// The list request was dropped before answering
    pub fn abandon_mount(&mut self, ticket: LoadTicket) -> bool {
        self.store.abandon_load(ticket)
    }

    /// View left: late list responses must not land
    pub fn unmount(&mut self) {
        self.store.invalidate();
    }

    pub async fn mount<A: ResourceApi<R>>(&mut self, api: &A) -> bool {
        let ticket = self.begin_mount();
        let result = api.list(&ListParams::new()).await;
        self.finish_mount(ticket, result)
    }

    // Filter

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Store records passing the current filter
    pub fn visible(&self) -> Vec<&R> {
        self.filter.apply(self.store.items())
    }

    pub fn categories(&self) -> Vec<String> {
        self.store.categories()
    }

    // Editor

    /// Open the edit modal for `id`. Ids missing from the store are ignored.
    pub fn begin_edit(&mut self, id: i64) -> bool {
        let Some(entity) = self.store.find(id) else {
            return false;
        };
        self.editor.begin_edit(entity)
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.editor.cancel()
    }

    /// Take the submitted form values and validate them
    pub fn prepare_submit(&mut self, draft: R::Draft) -> Result<PendingWrite<R>, SubmitError> {
        self.editor.set_draft(draft);
        let plan = self.editor.prepare_submit()?;
        self.flash = None;
        Ok(PendingWrite {
            plan,
            policy: self.policy,
        })
    }

    pub fn finish_submit(&mut self, outcome: WriteOutcome<R>) {
        match outcome.result {
            Ok(entity) => {
                let verb = match outcome.target {
                    None => {
                        info!("Created {} {}", R::NOUN.singular, entity.id());
                        self.store.apply_created(entity.clone());
                        "cread"
                    }
                    Some(id) => {
                        if !self.store.apply_updated(id, entity.clone()) {
                            warn!(
                                "Updated {} {} is no longer in the list",
                                R::NOUN.singular,
                                id
                            );
                        }
                        "actualizad"
                    }
                };
                self.editor.complete();
                self.flash = Some(Flash::Success(success_message(&entity, verb)));
            }
            Err(err) => {
                let fallback = format!("No se pudo guardar {}.", R::NOUN.with_article());
                let message = err.user_message(&fallback);
                self.editor.fail(message.clone());
                self.flash = Some(Flash::Error(message));
            }
        }
    }

    /// The write was dropped before its outcome arrived. The backend may or
    /// may not have applied it, so the form leaves `Submitting` with an
    /// error and the list is reloaded on the next visit.
    pub fn abandon_submit(&mut self) -> bool {
        if !self.editor.is_submitting() {
            return false;
        }
        warn!("{} write abandoned before completion", R::NOUN.capitalized());
        self.editor.fail(INTERRUPTED_MESSAGE.to_string());
        self.flash = Some(Flash::Error(INTERRUPTED_MESSAGE.to_string()));
        self.store.mark_stale();
        true
    }

    pub async fn submit<A: ResourceApi<R>>(
        &mut self,
        api: &A,
        draft: R::Draft,
    ) -> Result<(), SubmitError> {
        let pending = self.prepare_submit(draft)?;
        let outcome = pending.send(api).await;
        self.finish_submit(outcome);
        Ok(())
    }

    // Delete

    /// Check the record exists and the user confirmed. `None` means no
    /// request must be sent.
    pub fn prepare_delete<C>(&mut self, id: i64, confirmer: &C) -> Option<PendingDelete>
    where
        C: DeleteConfirmer<R> + ?Sized,
    {
        let entity = self.store.find(id)?;
        if !confirmer.confirm_delete(entity) {
            return None;
        }
        self.flash = None;
        Some(PendingDelete { id })
    }

    pub fn finish_delete(&mut self, outcome: DeleteOutcome) {
        match outcome.result {
            Ok(()) => {
                let removed = self.store.apply_removed(outcome.id);
                if self.editor.editing_id() == Some(outcome.id) {
                    self.editor.cancel();
                }
                info!("Deleted {} {}", R::NOUN.singular, outcome.id);
                self.flash = Some(Flash::Success(match removed {
                    Some(entity) => success_message(&entity, "eliminad"),
                    None => format!(
                        "{} {}.",
                        R::NOUN.capitalized(),
                        R::NOUN.participle("eliminad")
                    ),
                }));
            }
            Err(err) => {
                let fallback = format!("No se pudo eliminar {}.", R::NOUN.with_article());
                self.flash = Some(Flash::Error(err.user_message(&fallback)));
            }
        }
    }

    pub async fn delete<A, C>(&mut self, api: &A, id: i64, confirmer: &C) -> bool
    where
        A: ResourceApi<R>,
        C: DeleteConfirmer<R> + ?Sized,
    {
        let Some(pending) = self.prepare_delete(id, confirmer) else {
            return false;
        };
        let outcome = pending.send::<R, A>(api).await;
        self.finish_delete(outcome);
        true
    }
}

fn success_message<R: Resource>(entity: &R, stem: &str) -> String {
    format!(
        "{} \"{}\" {} correctamente.",
        R::NOUN.capitalized(),
        entity.title(),
        R::NOUN.participle(stem)
    )
}
