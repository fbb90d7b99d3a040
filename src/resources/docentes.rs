use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{date, date_input, optional_date, parse_date, parse_positive, positive_integer, required};
use crate::models::Docente;
use crate::resource::{FieldErrors, FieldSpec, InputKind, Noun, Resource};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DocenteDraft {
    #[validate(custom(
        function = "positive_integer",
        message = "El ID de persona debe ser un número entero positivo"
    ))]
    pub id_persona: String,
    #[validate(custom(function = "required", message = "La especialidad es requerida"))]
    pub especialidad: String,
    #[validate(custom(function = "date", message = "Ingresa una fecha de contratación válida"))]
    pub fecha_contratacion: String,
    #[validate(custom(
        function = "optional_date",
        message = "Ingresa una fecha de terminación válida"
    ))]
    pub fecha_terminacion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocentePayload {
    pub id_persona: i64,
    pub especialidad: String,
    pub fecha_contratacion: String,
    pub fecha_terminacion: Option<String>,
}

impl Resource for Docente {
    type Draft = DocenteDraft;
    type Payload = DocentePayload;

    const NOUN: Noun = Noun {
        singular: "docente",
        plural: "docentes",
        feminine: false,
    };

    const PATH: &'static str = "/api/docente";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec {
            name: "id_persona",
            label: "ID de persona",
            input: InputKind::Number,
            required: true,
            placeholder: "12",
        },
        FieldSpec {
            name: "especialidad",
            label: "Especialidad",
            input: InputKind::Text,
            required: true,
            placeholder: "Colorimetría",
        },
        FieldSpec {
            name: "fecha_contratacion",
            label: "Fecha de contratación",
            input: InputKind::Date,
            required: true,
            placeholder: "",
        },
        FieldSpec {
            name: "fecha_terminacion",
            label: "Fecha de terminación",
            input: InputKind::Date,
            required: false,
            placeholder: "",
        },
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> String {
        self.especialidad.clone()
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.especialidad.as_str()),
            Cow::Owned(self.id_persona.to_string()),
        ]
    }

    fn to_draft(&self) -> DocenteDraft {
        DocenteDraft {
            id_persona: self.id_persona.to_string(),
            especialidad: self.especialidad.clone(),
            fecha_contratacion: date_input(&self.fecha_contratacion),
            fecha_terminacion: self
                .fecha_terminacion
                .as_deref()
                .map(date_input)
                .unwrap_or_default(),
        }
    }

    fn to_payload(draft: &DocenteDraft) -> Result<DocentePayload, FieldErrors> {
        let mut errors = FieldErrors::new();

        let id_persona = parse_positive(&draft.id_persona);
        if id_persona.is_none() {
            errors.insert(
                "id_persona",
                "El ID de persona debe ser un número entero positivo",
            );
        }

        let hired = parse_date(&draft.fecha_contratacion);
        if hired.is_none() {
            errors.insert(
                "fecha_contratacion",
                "Ingresa una fecha de contratación válida",
            );
        }

        let terminated = match draft.fecha_terminacion.trim() {
            "" => None,
            value => match parse_date(value) {
                Some(day) => Some(day),
                None => {
                    errors.insert(
                        "fecha_terminacion",
                        "Ingresa una fecha de terminación válida",
                    );
                    None
                }
            },
        };

        if let (Some(hired), Some(terminated)) = (hired, terminated) {
            if terminated < hired {
                errors.insert(
                    "fecha_terminacion",
                    "La fecha de terminación no puede ser anterior a la de contratación",
                );
            }
        }

        errors.into_result()?;

        Ok(DocentePayload {
            id_persona: id_persona.unwrap_or_default(),
            especialidad: draft.especialidad.trim().to_string(),
            fecha_contratacion: draft.fecha_contratacion.trim().to_string(),
            fecha_terminacion: terminated.map(|_| draft.fecha_terminacion.trim().to_string()),
        })
    }
}
