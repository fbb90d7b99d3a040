//! Create/edit form state machine.
//!
//! ```text
//! Idle/Create --edit--> Editing --cancel--> Idle/Create
//!      |                   |
//!      +-----submit--------+--> Submitting --ok--> Idle/Create
//!                                   |
//!                                   +--err--> Error (values kept)
//! ```
//!
//! The modal is open exactly when the mode is `Editing`, and that variant
//! owns the entity being edited, so an open modal without a target cannot
//! be represented.

use validator::Validate;

use crate::monitoring;

use super::{FieldErrors, Resource};

#[derive(Debug, Clone, PartialEq)]
pub enum EditorMode<R> {
    Create,
    Editing { entity: R },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorStatus {
    Idle,
    Submitting,
    Failed(String),
}

/// Flattened view of mode + status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Create,
    Editing,
    Submitting,
    Error,
}

/// Write to perform once validation has passed
#[derive(Debug)]
pub enum WritePlan<R: Resource> {
    Create { payload: R::Payload },
    Update { id: i64, payload: R::Payload },
}

impl<R: Resource> WritePlan<R> {
    pub fn target(&self) -> Option<i64> {
        match self {
            WritePlan::Create { .. } => None,
            WritePlan::Update { id, .. } => Some(*id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// A write is already in flight
    InFlight,
    /// Validation failed; nothing was sent
    Invalid(FieldErrors),
}

#[derive(Debug, Clone)]
pub struct Editor<R: Resource> {
    mode: EditorMode<R>,
    status: EditorStatus,
    draft: R::Draft,
    errors: FieldErrors,
}

impl<R: Resource> Default for Editor<R> {
    fn default() -> Self {
        Editor {
            mode: EditorMode::Create,
            status: EditorStatus::Idle,
            draft: R::Draft::default(),
            errors: FieldErrors::new(),
        }
    }
}

impl<R: Resource> Editor<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &EditorMode<R> {
        &self.mode
    }

    pub fn status(&self) -> &EditorStatus {
        &self.status
    }

    pub fn draft(&self) -> &R::Draft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn phase(&self) -> EditorPhase {
        match (&self.status, &self.mode) {
            (EditorStatus::Submitting, _) => EditorPhase::Submitting,
            (EditorStatus::Failed(_), _) => EditorPhase::Error,
            (EditorStatus::Idle, EditorMode::Editing { .. }) => EditorPhase::Editing,
            (EditorStatus::Idle, EditorMode::Create) => EditorPhase::Create,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.status == EditorStatus::Submitting
    }

    /// Entity shown in the edit modal, if it is open
    pub fn editing(&self) -> Option<&R> {
        match &self.mode {
            EditorMode::Editing { entity } => Some(entity),
            EditorMode::Create => None,
        }
    }

    pub fn editing_id(&self) -> Option<i64> {
        self.editing().map(Resource::id)
    }

    /// Copy `entity` into the form and open the modal. Refused while a
    /// write is in flight.
    pub fn begin_edit(&mut self, entity: &R) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.draft = entity.to_draft();
        self.mode = EditorMode::Editing {
            entity: entity.clone(),
        };
        self.status = EditorStatus::Idle;
        self.errors = FieldErrors::new();
        true
    }

    /// Back to an empty create form
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Cancel is ignored while submitting; the response still has to land
    pub fn cancel(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.reset();
        true
    }

    /// Replace form values with what the user typed
    pub fn set_draft(&mut self, draft: R::Draft) {
        if !self.is_submitting() {
            self.draft = draft;
        }
    }

    /// Validate the current draft and, if it passes, enter `Submitting`
    /// and return the write to perform.
    pub fn prepare_submit(&mut self) -> Result<WritePlan<R>, SubmitError> {
        if self.is_submitting() {
            return Err(SubmitError::InFlight);
        }

        let checked = self
            .draft
            .validate()
            .map_err(FieldErrors::from)
            .and_then(|_| R::to_payload(&self.draft));

        let payload = match checked {
            Ok(payload) => payload,
            Err(errors) => {
                monitoring::VALIDATION_REJECTIONS
                    .with_label_values(&[R::NOUN.plural])
                    .inc();
                self.errors = errors.clone();
                return Err(SubmitError::Invalid(errors));
            }
        };

        self.errors = FieldErrors::new();
        self.status = EditorStatus::Submitting;

        Ok(match &self.mode {
            EditorMode::Editing { entity } => WritePlan::Update {
                id: entity.id(),
                payload,
            },
            EditorMode::Create => WritePlan::Create { payload },
        })
    }

    /// Write succeeded: back to an empty create form
    pub fn complete(&mut self) {
        self.reset();
    }

    /// Write failed: keep mode and values so the user can correct them
    pub fn fail(&mut self, message: String) {
        self.status = EditorStatus::Failed(message);
    }
}
