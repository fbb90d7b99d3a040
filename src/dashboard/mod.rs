//! Student dashboard figures derived from `/api/cursosPersonas/:idPersona`.

use crate::client::{ApiClient, ApiError};
use crate::models::{Enrollment, EnrollmentList};

pub const APPROVED: &str = "Aprobado";
pub const ACTIVE: &str = "Activo";
pub const PRESENT: &str = "Presente";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// Percentage of courses completed, rounded
    pub average_progress: u32,
}

impl DashboardStats {
    pub fn from_enrollments(cursos: &[Enrollment]) -> Self {
        let total = cursos.len();
        let completed = cursos.iter().filter(|c| is_approved(c)).count();
        let in_progress = cursos.iter().filter(|c| c.estado == ACTIVE).count();

        let average_progress = if total == 0 {
            0
        } else {
            (completed as f64 / total as f64 * 100.0).round() as u32
        };

        DashboardStats {
            total,
            completed,
            in_progress,
            average_progress,
        }
    }
}

fn is_approved(enrollment: &Enrollment) -> bool {
    enrollment.resultado.as_deref() == Some(APPROVED)
}

/// Progress bar value for one course card
pub fn progress(enrollment: &Enrollment) -> u32 {
    if is_approved(enrollment) {
        100
    } else if enrollment.estado == ACTIVE {
        60
    } else {
        0
    }
}

/// Badge text for one course card
pub fn status_label(enrollment: &Enrollment) -> &str {
    if is_approved(enrollment) {
        "Completado"
    } else {
        &enrollment.estado
    }
}

pub fn grade_label(nota: Option<f64>) -> &'static str {
    match nota {
        None => "Pendiente",
        Some(n) if n >= 90.0 => "Excelente",
        Some(n) if n >= 80.0 => "Bueno",
        Some(n) if n >= 70.0 => "Aceptable",
        Some(_) => "Insuficiente",
    }
}

/// Share of attendance records marked present, as a rounded percentage.
/// `None` when nothing has been recorded yet.
pub fn attendance_rate(enrollment: &Enrollment) -> Option<u32> {
    let total = enrollment.asistencias.len();
    if total == 0 {
        return None;
    }
    let present = enrollment
        .asistencias
        .iter()
        .filter(|a| a.estado == PRESENT)
        .count();
    Some((present as f64 / total as f64 * 100.0).round() as u32)
}

/// Mean of the grades recorded so far, to one decimal
pub fn average_grade(enrollment: &Enrollment) -> Option<f64> {
    let graded: Vec<f64> = enrollment.notas.iter().filter_map(|g| g.nota).collect();
    if graded.is_empty() {
        return None;
    }
    let mean = graded.iter().sum::<f64>() / graded.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

/// Grades recorded out of grades expected
pub fn graded_count(enrollment: &Enrollment) -> (usize, usize) {
    let graded = enrollment.notas.iter().filter(|g| g.nota.is_some()).count();
    (graded, enrollment.notas.len())
}

pub fn find_enrollment(cursos: &[Enrollment], id_matricula: i64) -> Option<&Enrollment> {
    cursos.iter().find(|c| c.id_matricula == id_matricula)
}

pub async fn fetch_enrollments(
    client: &ApiClient,
    id_persona: i64,
    token: Option<&str>,
) -> Result<Vec<Enrollment>, ApiError> {
    let list: EnrollmentList = client
        .get(&format!("/api/cursosPersonas/{}", id_persona), &[], token)
        .await?;
    Ok(list.cursos)
}
