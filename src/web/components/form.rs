use maud::{html, Markup};
use serde::Serialize;
use serde_json::Value;

use crate::resource::{EditorPhase, FieldErrors, FieldSpec, InputKind};

const INPUT_CLASSES: &str = "mt-1 block w-full px-3 py-2 border border-gray-300 rounded-md shadow-sm focus:outline-none focus:ring-primary focus:border-primary sm:text-sm";

/// Current value of `name` in any serializable draft. Missing and
/// non-string values render as empty.
pub fn value_of<T: Serialize>(draft: &T, name: &str) -> String {
    match serde_json::to_value(draft) {
        Ok(Value::Object(map)) => match map.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        },
        _ => String::new(),
    }
}

pub fn field_error(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            p class="mt-1 text-sm text-red-600" { (message) }
        }
    }
}

/// Label, widget and error line for one schema field. `form_id` keeps
/// element ids unique when several forms share a page.
pub fn field_input(form_id: &str, spec: &FieldSpec, value: &str, error: Option<&str>) -> Markup {
    let classes = if error.is_some() {
        format!("{} border-red-500", INPUT_CLASSES)
    } else {
        INPUT_CLASSES.to_string()
    };
    let id = format!("{}-{}", form_id, spec.name);
    let list_id = format!("{}-opciones", id);

    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-medium text-gray-700" {
                (spec.label)
                @if spec.required { span class="text-red-500" { " *" } }
            }
            @match spec.input {
                InputKind::TextArea => {
                    textarea id=(id) name=(spec.name) rows="4"
                        placeholder=(spec.placeholder) class=(classes) { (value) }
                }
                InputKind::Number => {
                    input id=(id) name=(spec.name) type="number" min="1" step="1"
                        value=(value) placeholder=(spec.placeholder) class=(classes);
                }
                InputKind::Date => {
                    input id=(id) name=(spec.name) type="date"
                        value=(value) class=(classes);
                }
                InputKind::Suggest(options) => {
                    input id=(id) name=(spec.name) type="text" list=(list_id)
                        value=(value) placeholder=(spec.placeholder) class=(classes);
                    datalist id=(list_id) {
                        @for option in options {
                            option value=(option) {}
                        }
                    }
                }
                InputKind::Text => {
                    input id=(id) name=(spec.name) type="text"
                        value=(value) placeholder=(spec.placeholder) class=(classes);
                }
            }
            (field_error(error))
        }
    }
}

/// Create/edit form built from a field schema
pub fn resource_form<T: Serialize>(
    form_id: &str,
    action: &str,
    fields: &[FieldSpec],
    draft: &T,
    errors: &FieldErrors,
    phase: EditorPhase,
    submit_label: &str,
) -> Markup {
    let submitting = phase == EditorPhase::Submitting;

    html! {
        form id=(form_id) action=(action) method="post" novalidate {
            @for spec in fields {
                (field_input(form_id, spec, &value_of(draft, spec.name), errors.first(spec.name)))
            }
            button type="submit" disabled[submitting]
                class="w-full inline-flex justify-center py-2 px-4 border border-transparent shadow-sm text-sm font-medium rounded-md text-white bg-primary hover:bg-pink-700 disabled:opacity-50" {
                @if submitting { "Guardando..." } @else { (submit_label) }
            }
        }
    }
}
