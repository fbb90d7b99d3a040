//! Generic client-side CRUD pattern.
//!
//! One [`Resource`] impl per backend collection describes ids, field
//! schema and search fields; everything else (service, store, filter,
//! editor, delete confirmation) is written once here and instantiated per
//! entity type.

pub mod confirm;
pub mod controller;
pub mod filter;
pub mod form;
pub mod service;
pub mod store;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use validator::{Validate, ValidationErrors};

pub use confirm::{DeleteConfirmer, FormConfirmation};
pub use controller::{
    DeleteOutcome, Flash, PendingDelete, PendingWrite, ResourceController, WriteOutcome,
};
pub use filter::{CategoryFilter, Filter};
pub use form::{Editor, EditorMode, EditorPhase, EditorStatus, SubmitError, WritePlan};
pub use service::{ListParams, ResourceApi, ResourceService};
pub use store::{LoadError, LoadState, LoadTicket, ResourceStore};

/// A backend collection managed through the CRUD console
pub trait Resource:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Raw form values as typed by the user, before parsing
    type Draft: Validate + Default + Clone + Debug + Serialize + DeserializeOwned + Send + Sync;

    /// Body sent on create/update
    type Payload: Serialize + Debug + Send + Sync;

    /// Noun used in user-facing messages
    const NOUN: Noun;

    /// Default REST collection path
    const PATH: &'static str;

    /// Form fields in display order
    const FIELDS: &'static [FieldSpec];

    fn id(&self) -> i64;

    /// Short human label, used in confirmation prompts and flash messages
    fn title(&self) -> String;

    /// Values the free-text search looks at
    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    /// Value matched by the category select, if this resource has one
    fn category(&self) -> Option<&str> {
        None
    }

    /// Copy a record into form state for editing
    fn to_draft(&self) -> Self::Draft;

    /// Parse an already validated draft into the wire payload
    fn to_payload(draft: &Self::Draft) -> Result<Self::Payload, FieldErrors>;
}

/// Spanish noun with grammatical gender, for "creado"/"creada" and friends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Noun {
    pub singular: &'static str,
    pub plural: &'static str,
    pub feminine: bool,
}

impl Noun {
    /// Singular with a capital initial: "Curso", "Oferta"
    pub fn capitalized(&self) -> String {
        let mut chars = self.singular.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Article-qualified singular: "el curso", "la oferta"
    pub fn with_article(&self) -> String {
        let article = if self.feminine { "la" } else { "el" };
        format!("{} {}", article, self.singular)
    }

    /// Past participle agreeing with the noun: ("cread", ...) -> "creado"/"creada"
    pub fn participle(&self, stem: &str) -> String {
        format!("{}{}", stem, if self.feminine { "a" } else { "o" })
    }
}

/// Widget used to render a field in the editor form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    TextArea,
    Number,
    Date,
    /// Free text with suggestions
    Suggest(&'static [&'static str]),
}

/// One entry of a resource's field schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Form field name, matching the draft field it fills
    pub name: &'static str,
    pub label: &'static str,
    pub input: InputKind,
    pub required: bool,
    pub placeholder: &'static str,
}

/// Field-scoped validation messages, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// First message for a field, which is what the form displays
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(|m| m.first()).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, list) in errors.field_errors() {
            for error in list.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                out.insert(&field.to_string(), message);
            }
        }
        out
    }
}

/// How the store is patched after a successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Merge the write response into the store without asking the backend again
    #[default]
    Optimistic,
    /// Re-fetch the affected record by id and merge that instead
    ReadAfterWrite,
}

impl WritePolicy {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "read-after-write" | "read_after_write" | "refetch" => WritePolicy::ReadAfterWrite,
            _ => WritePolicy::Optimistic,
        }
    }
}
