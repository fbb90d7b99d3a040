//! Backend records as exchanged over the REST API.
//!
//! Field names are camelCase on the wire. snake_case spellings of the same
//! fields are accepted when reading and never written.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curso {
    pub id: i64,
    #[serde(alias = "nombre_curso")]
    pub nombre_curso: String,
    /// Hours
    pub duracion: i64,
    #[serde(default)]
    pub temario: String,
    #[serde(alias = "tipo_curso", default)]
    pub tipo_curso: String,
}

/// Syllabus topics. The backend stores the temario as free text with
/// topics separated by commas, semicolons or line breaks.
pub fn syllabus_topics(temario: &str) -> Vec<&str> {
    temario
        .split([',', ';', '\n'])
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "DocenteWire")]
pub struct Docente {
    pub id: i64,
    pub id_persona: i64,
    pub especialidad: String,
    /// `YYYY-MM-DD`
    pub fecha_contratacion: String,
    pub fecha_terminacion: Option<String>,
}

/// Teacher records come keyed either by `id` or by `idDocente`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocenteWire {
    id: Option<i64>,
    #[serde(alias = "id_docente")]
    id_docente: Option<i64>,
    #[serde(alias = "id_persona")]
    id_persona: i64,
    #[serde(default)]
    especialidad: String,
    #[serde(alias = "fecha_contratacion", default)]
    fecha_contratacion: String,
    #[serde(alias = "fecha_terminacion", default)]
    fecha_terminacion: Option<String>,
}

impl TryFrom<DocenteWire> for Docente {
    type Error = String;

    fn try_from(wire: DocenteWire) -> Result<Self, Self::Error> {
        let id = wire
            .id
            .or(wire.id_docente)
            .ok_or_else(|| "docente record without id or idDocente".to_string())?;

        Ok(Docente {
            id,
            id_persona: wire.id_persona,
            especialidad: wire.especialidad,
            fecha_contratacion: wire.fecha_contratacion,
            fecha_terminacion: wire.fecha_terminacion.filter(|d| !d.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfertaCurso {
    #[serde(alias = "idOferta", alias = "id_oferta")]
    pub id: i64,
    #[serde(alias = "codigo_curso", deserialize_with = "string_or_number")]
    pub codigo_curso: String,
    #[serde(alias = "id_curso")]
    pub id_curso: i64,
    #[serde(alias = "id_docente")]
    pub id_docente: i64,
    #[serde(alias = "fecha_inicio_curso")]
    pub fecha_inicio_curso: String,
    #[serde(alias = "fecha_fin_curso")]
    pub fecha_fin_curso: String,
    #[serde(default)]
    pub horario: String,
    pub cupos: i64,
}

/// Identity record created at registration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    #[serde(alias = "idPersona", alias = "id_persona", default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub apellido: String,
    #[serde(alias = "tipo_identificacion", default)]
    pub tipo_identificacion: String,
    #[serde(alias = "numero_identificacion", default)]
    pub numero_identificacion: String,
    #[serde(alias = "fecha_nacimiento", default)]
    pub fecha_nacimiento: String,
    #[serde(default)]
    pub correo: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default)]
    pub rol: Option<String>,
}

impl Persona {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido).trim().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUser {
    pub persona: Persona,
}

/// `POST /auth/login` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

/// One course a student is enrolled in, as returned by `/api/cursosPersonas`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Enrollment {
    #[serde(alias = "id_matricula")]
    pub id_matricula: i64,
    pub nombre: String,
    pub temario: String,
    pub tipo: String,
    pub duracion: Option<i64>,
    pub horario: String,
    pub estado: String,
    pub resultado: Option<String>,
    pub notas: Vec<Grade>,
    pub asistencias: Vec<Attendance>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Grade {
    pub titulo: String,
    pub nota: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Attendance {
    pub fecha: String,
    pub estado: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentList {
    pub cursos: Vec<Enrollment>,
}

/// Course codes are strings in some backends and numbers in others
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_curso_accepts_both_spellings() {
        let camel: Curso = serde_json::from_value(json!({
            "id": 1, "nombreCurso": "Uñas", "duracion": 20,
            "temario": "Acrílico", "tipoCurso": "Corto"
        }))
        .unwrap();
        let snake: Curso = serde_json::from_value(json!({
            "id": 1, "nombre_curso": "Uñas", "duracion": 20,
            "temario": "Acrílico", "tipo_curso": "Corto"
        }))
        .unwrap();

        assert_eq!(camel, snake);
        let written = serde_json::to_value(&camel).unwrap();
        assert_eq!(written["nombreCurso"], "Uñas");
        assert!(written.get("nombre_curso").is_none());
    }

    #[test]
    fn test_syllabus_topics() {
        assert_eq!(
            syllabus_topics("Intro; Técnicas, Práctica final\nEvaluación"),
            vec!["Intro", "Técnicas", "Práctica final", "Evaluación"]
        );
        assert!(syllabus_topics(" ;, ").is_empty());
    }

    #[test]
    fn test_docente_id_normalization() {
        let by_alias: Docente = serde_json::from_value(json!({
            "idDocente": 12, "idPersona": 3, "especialidad": "Colorimetría",
            "fechaContratacion": "2024-02-01", "fechaTerminacion": ""
        }))
        .unwrap();
        assert_eq!(by_alias.id, 12);
        assert_eq!(by_alias.fecha_terminacion, None);

        let missing = serde_json::from_value::<Docente>(json!({
            "idPersona": 3, "especialidad": "Colorimetría", "fechaContratacion": "2024-02-01"
        }));
        assert!(missing.is_err());
    }

    #[test]
    fn test_oferta_numeric_course_code() {
        let oferta: OfertaCurso = serde_json::from_value(json!({
            "id": 4, "codigoCurso": 2031, "idCurso": 1, "idDocente": 12,
            "fechaInicioCurso": "2025-03-01", "fechaFinCurso": "2025-06-30",
            "horario": "Lunes 8-12", "cupos": 20
        }))
        .unwrap();

        assert_eq!(oferta.codigo_curso, "2031");
    }

    #[test]
    fn test_login_response_shape() {
        let login: LoginResponse = serde_json::from_value(json!({
            "token": "abc",
            "user": { "persona": { "idPersona": 5, "nombre": "Ana", "apellido": "Gómez", "rol": "Estudiante" } }
        }))
        .unwrap();

        assert_eq!(login.user.persona.id, Some(5));
        assert_eq!(login.user.persona.full_name(), "Ana Gómez");
    }

    #[test]
    fn test_enrollment_tolerates_missing_fields() {
        let list: EnrollmentList = serde_json::from_value(json!({
            "cursos": [{ "idMatricula": 1, "nombre": "Uñas", "estado": "Activo" }]
        }))
        .unwrap();

        assert_eq!(list.cursos[0].resultado, None);
        assert!(list.cursos[0].notas.is_empty());
    }
}
