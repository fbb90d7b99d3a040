use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{parse_positive, positive_integer, required};
use crate::models::Curso;
use crate::resource::{FieldErrors, FieldSpec, InputKind, Noun, Resource};

/// Accepted values of `tipoCurso`
pub const COURSE_TYPES: &[&str] = &["Técnico", "Corto", "Curso corto", "Diplomado", "Seminario"];

fn course_type(value: &str) -> Result<(), ValidationError> {
    if COURSE_TYPES.contains(&value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::new("course_type"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CursoDraft {
    #[validate(custom(function = "required", message = "El nombre del curso es requerido"))]
    pub nombre_curso: String,
    #[validate(custom(
        function = "positive_integer",
        message = "La duración debe ser un número entero positivo"
    ))]
    pub duracion: String,
    #[validate(custom(function = "required", message = "El temario es requerido"))]
    pub temario: String,
    #[validate(custom(function = "course_type", message = "Selecciona un tipo de curso válido"))]
    pub tipo_curso: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursoPayload {
    pub nombre_curso: String,
    pub duracion: i64,
    pub temario: String,
    pub tipo_curso: String,
}

impl Resource for Curso {
    type Draft = CursoDraft;
    type Payload = CursoPayload;

    const NOUN: Noun = Noun {
        singular: "curso",
        plural: "cursos",
        feminine: false,
    };

    const PATH: &'static str = "/cursos";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec {
            name: "nombre_curso",
            label: "Nombre del curso",
            input: InputKind::Text,
            required: true,
            placeholder: "Maquillaje Profesional",
        },
        FieldSpec {
            name: "duracion",
            label: "Duración (horas)",
            input: InputKind::Number,
            required: true,
            placeholder: "40",
        },
        FieldSpec {
            name: "tipo_curso",
            label: "Tipo de curso",
            input: InputKind::Suggest(COURSE_TYPES),
            required: true,
            placeholder: "Técnico",
        },
        FieldSpec {
            name: "temario",
            label: "Temario",
            input: InputKind::TextArea,
            required: true,
            placeholder: "Módulos separados por punto y coma",
        },
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> String {
        self.nombre_curso.clone()
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.nombre_curso.as_str()),
            Cow::Borrowed(self.temario.as_str()),
            Cow::Borrowed(self.tipo_curso.as_str()),
        ]
    }

    fn category(&self) -> Option<&str> {
        Some(&self.tipo_curso)
    }

    fn to_draft(&self) -> CursoDraft {
        CursoDraft {
            nombre_curso: self.nombre_curso.clone(),
            duracion: self.duracion.to_string(),
            temario: self.temario.clone(),
            tipo_curso: self.tipo_curso.clone(),
        }
    }

    fn to_payload(draft: &CursoDraft) -> Result<CursoPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let duracion = parse_positive(&draft.duracion);
        if duracion.is_none() {
            errors.insert("duracion", "La duración debe ser un número entero positivo");
        }
        errors.into_result()?;

        Ok(CursoPayload {
            nombre_curso: draft.nombre_curso.trim().to_string(),
            duracion: duracion.unwrap_or_default(),
            temario: draft.temario.trim().to_string(),
            tipo_curso: draft.tipo_curso.trim().to_string(),
        })
    }
}
