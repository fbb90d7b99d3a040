use serde::Deserialize;

use super::Resource;

/// Gate in front of every delete. Only an explicit `true` lets the
/// request through; there is no undo afterwards.
pub trait DeleteConfirmer<R> {
    fn confirm_delete(&self, entity: &R) -> bool;
}

impl<R, F> DeleteConfirmer<R> for F
where
    F: Fn(&R) -> bool,
{
    fn confirm_delete(&self, entity: &R) -> bool {
        self(entity)
    }
}

/// Question shown before deleting
pub fn prompt<R: Resource>(entity: &R) -> String {
    format!("¿Eliminar {} \"{}\"?", R::NOUN.with_article(), entity.title())
}

/// Answer posted back by the confirmation modal
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormConfirmation {
    #[serde(default)]
    pub confirmar: Option<String>,
}

impl FormConfirmation {
    pub fn yes() -> Self {
        FormConfirmation {
            confirmar: Some("si".to_string()),
        }
    }

    pub fn is_affirmative(&self) -> bool {
        matches!(
            self.confirmar
                .as_deref()
                .map(|v| v.trim().to_lowercase())
                .as_deref(),
            Some("si" | "sí" | "yes" | "true")
        )
    }
}

impl<R> DeleteConfirmer<R> for FormConfirmation {
    fn confirm_delete(&self, _entity: &R) -> bool {
        self.is_affirmative()
    }
}
