use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{date, date_input, parse_date, parse_positive, positive_integer, required};
use crate::models::OfertaCurso;
use crate::resource::{FieldErrors, FieldSpec, InputKind, Noun, Resource};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct OfertaDraft {
    #[validate(custom(function = "required", message = "El código del curso es requerido"))]
    pub codigo_curso: String,
    #[validate(custom(
        function = "positive_integer",
        message = "El ID del curso debe ser un número entero positivo"
    ))]
    pub id_curso: String,
    #[validate(custom(
        function = "positive_integer",
        message = "El ID del docente debe ser un número entero positivo"
    ))]
    pub id_docente: String,
    #[validate(custom(function = "date", message = "Ingresa una fecha de inicio válida"))]
    pub fecha_inicio_curso: String,
    #[validate(custom(function = "date", message = "Ingresa una fecha de fin válida"))]
    pub fecha_fin_curso: String,
    #[validate(custom(function = "required", message = "El horario es requerido"))]
    pub horario: String,
    #[validate(custom(
        function = "positive_integer",
        message = "Los cupos deben ser un número entero positivo"
    ))]
    pub cupos: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfertaPayload {
    pub codigo_curso: String,
    pub id_curso: i64,
    pub id_docente: i64,
    pub fecha_inicio_curso: String,
    pub fecha_fin_curso: String,
    pub horario: String,
    pub cupos: i64,
}

impl Resource for OfertaCurso {
    type Draft = OfertaDraft;
    type Payload = OfertaPayload;

    const NOUN: Noun = Noun {
        singular: "oferta",
        plural: "ofertas",
        feminine: true,
    };

    const PATH: &'static str = "/api/ofertaCursos";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec {
            name: "codigo_curso",
            label: "Código",
            input: InputKind::Text,
            required: true,
            placeholder: "MAQ-01",
        },
        FieldSpec {
            name: "id_curso",
            label: "ID del curso",
            input: InputKind::Number,
            required: true,
            placeholder: "1",
        },
        FieldSpec {
            name: "id_docente",
            label: "ID del docente",
            input: InputKind::Number,
            required: true,
            placeholder: "12",
        },
        FieldSpec {
            name: "fecha_inicio_curso",
            label: "Fecha de inicio",
            input: InputKind::Date,
            required: true,
            placeholder: "",
        },
        FieldSpec {
            name: "fecha_fin_curso",
            label: "Fecha de fin",
            input: InputKind::Date,
            required: true,
            placeholder: "",
        },
        FieldSpec {
            name: "horario",
            label: "Horario",
            input: InputKind::Text,
            required: true,
            placeholder: "Lunes y miércoles 8:00-12:00",
        },
        FieldSpec {
            name: "cupos",
            label: "Cupos",
            input: InputKind::Number,
            required: true,
            placeholder: "20",
        },
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> String {
        self.codigo_curso.clone()
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.codigo_curso.as_str()),
            Cow::Owned(self.id_curso.to_string()),
            Cow::Owned(self.id_docente.to_string()),
            Cow::Borrowed(self.horario.as_str()),
        ]
    }

    fn to_draft(&self) -> OfertaDraft {
        OfertaDraft {
            codigo_curso: self.codigo_curso.clone(),
            id_curso: self.id_curso.to_string(),
            id_docente: self.id_docente.to_string(),
            fecha_inicio_curso: date_input(&self.fecha_inicio_curso),
            fecha_fin_curso: date_input(&self.fecha_fin_curso),
            horario: self.horario.clone(),
            cupos: self.cupos.to_string(),
        }
    }

    fn to_payload(draft: &OfertaDraft) -> Result<OfertaPayload, FieldErrors> {
        let mut errors = FieldErrors::new();

        let mut positive = |field: &str, value: &str, message: &str| {
            let parsed = parse_positive(value);
            if parsed.is_none() {
                errors.insert(field, message);
            }
            parsed.unwrap_or_default()
        };
        let id_curso = positive(
            "id_curso",
            &draft.id_curso,
            "El ID del curso debe ser un número entero positivo",
        );
        let id_docente = positive(
            "id_docente",
            &draft.id_docente,
            "El ID del docente debe ser un número entero positivo",
        );
        let cupos = positive(
            "cupos",
            &draft.cupos,
            "Los cupos deben ser un número entero positivo",
        );

        match (
            parse_date(&draft.fecha_inicio_curso),
            parse_date(&draft.fecha_fin_curso),
        ) {
            (Some(start), Some(end)) if end < start => errors.insert(
                "fecha_fin_curso",
                "La fecha de fin no puede ser anterior a la de inicio",
            ),
            (None, _) => errors.insert("fecha_inicio_curso", "Ingresa una fecha de inicio válida"),
            (_, None) => errors.insert("fecha_fin_curso", "Ingresa una fecha de fin válida"),
            _ => {}
        }

        errors.into_result()?;

        Ok(OfertaPayload {
            codigo_curso: draft.codigo_curso.trim().to_string(),
            id_curso,
            id_docente,
            fecha_inicio_curso: draft.fecha_inicio_curso.trim().to_string(),
            fecha_fin_curso: draft.fecha_fin_curso.trim().to_string(),
            horario: draft.horario.trim().to_string(),
            cupos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> OfertaDraft {
        OfertaDraft {
            codigo_curso: "MAQ-01".to_string(),
            id_curso: "1".to_string(),
            id_docente: "12".to_string(),
            fecha_inicio_curso: "2025-03-01".to_string(),
            fecha_fin_curso: "2025-06-30".to_string(),
            horario: "Lunes 8-12".to_string(),
            cupos: "20".to_string(),
        }
    }

    #[test]
    fn test_valid_offering() {
        let draft = draft();
        assert!(draft.validate().is_ok());

        let payload = OfertaCurso::to_payload(&draft).unwrap();

        assert_eq!(payload.cupos, 20);
        assert_eq!(payload.id_docente, 12);
    }

    #[test]
    fn test_every_field_is_required() {
        let errors = FieldErrors::from(OfertaDraft::default().validate().unwrap_err());

        for spec in OfertaCurso::FIELDS {
            assert!(errors.contains(spec.name), "{}", spec.name);
        }
    }

    #[test]
    fn test_seats_must_be_positive() {
        let draft = OfertaDraft {
            cupos: "0".to_string(),
            ..draft()
        };

        let errors = FieldErrors::from(draft.validate().unwrap_err());

        assert_eq!(
            errors.first("cupos"),
            Some("Los cupos deben ser un número entero positivo")
        );
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let draft = OfertaDraft {
            fecha_fin_curso: "2025-02-01".to_string(),
            ..draft()
        };

        let errors = OfertaCurso::to_payload(&draft).unwrap_err();

        assert!(errors.contains("fecha_fin_curso"));
        assert!(!errors.contains("fecha_inicio_curso"));
    }
}
