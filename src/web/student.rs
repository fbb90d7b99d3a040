use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{html, Markup};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::session::SessionCookie;
use crate::dashboard::{self, DashboardStats, PRESENT};
use crate::models::{syllabus_topics, Enrollment};

use super::components::layout;
use super::AppState;

fn enrollment_card(enrollment: &Enrollment) -> Markup {
    let progress = dashboard::progress(enrollment);

    html! {
        div class="bg-white rounded-lg shadow p-6" {
            div class="flex items-start justify-between mb-2" {
                h3 class="text-lg font-semibold text-gray-900" {
                    a href=(format!("/estudiante/cursos/{}", enrollment.id_matricula)) class="hover:text-primary" {
                        (enrollment.nombre)
                    }
                }
                span class="px-2 py-1 text-xs font-medium rounded-full bg-pink-100 text-primary" {
                    (dashboard::status_label(enrollment))
                }
            }
            p class="text-sm text-gray-500 mb-1" { (enrollment.tipo) }
            @if let Some(horas) = enrollment.duracion {
                p class="text-sm text-gray-500 mb-1" { (horas) " horas" }
            }
            @if !enrollment.horario.is_empty() {
                p class="text-sm text-gray-500 mb-3" { "Horario: " (enrollment.horario) }
            }

            div class="w-full bg-gray-200 rounded-full h-2 mb-4" {
                div class="bg-primary h-2 rounded-full" style=(format!("width: {}%", progress)) {}
            }

            @if !enrollment.notas.is_empty() {
                h4 class="text-sm font-medium text-gray-900 mb-2" { "Calificaciones" }
                ul class="text-sm text-gray-700 mb-4 space-y-1" {
                    @for grade in &enrollment.notas {
                        li class="flex justify-between" {
                            span { (grade.titulo) }
                            span {
                                @if let Some(nota) = grade.nota { (nota) " · " }
                                (dashboard::grade_label(grade.nota))
                            }
                        }
                    }
                }
            }

            @match dashboard::attendance_rate(enrollment) {
                Some(rate) => {
                    p class="text-sm text-gray-700" { "Asistencia: " (rate) "%" }
                }
                None => {
                    p class="text-sm text-gray-400" { "Sin registros de asistencia" }
                }
            }
        }
    }
}

async fn load_enrollments(state: &AppState, session: &SessionCookie) -> Result<Vec<Enrollment>, String> {
    let Some(id) = session.session().persona().and_then(|p| p.id) else {
        return Err("Tu cuenta no tiene una persona asociada.".to_string());
    };

    dashboard::fetch_enrollments(&state.client, id, session.session().token())
        .await
        .map_err(|e| {
            warn!("Enrollments for persona {} failed: {}", id, e);
            e.user_message("No se pudieron cargar tus cursos.")
        })
}

/// `GET /estudiante`
pub async fn show(State(state): State<AppState>, session: SessionCookie) -> Markup {
    let is_admin = session.session().has_role(&state.settings.admin_roles);
    let loaded = load_enrollments(&state, &session).await;

    let body = match loaded {
        Err(message) => html! { (layout::alert(&message, "error")) },
        Ok(cursos) => {
            let stats = DashboardStats::from_enrollments(&cursos);
            html! {
                div class="grid grid-cols-2 gap-4 md:grid-cols-4 mb-8" {
                    (layout::stat("Cursos inscritos", &stats.total.to_string()))
                    (layout::stat("Completados", &stats.completed.to_string()))
                    (layout::stat("En progreso", &stats.in_progress.to_string()))
                    (layout::stat("Progreso promedio", &format!("{}%", stats.average_progress)))
                }
                @if cursos.is_empty() {
                    p class="text-gray-500" {
                        "Aún no estás inscrito en ningún curso. "
                        a href="/cursos" class="text-primary underline" { "Ver cursos disponibles" }
                    }
                } @else {
                    div class="grid grid-cols-1 gap-6 md:grid-cols-2" {
                        @for enrollment in &cursos {
                            (enrollment_card(enrollment))
                        }
                    }
                }
            }
        }
    };

    layout::base(
        "Mi panel",
        html! {
            (layout::navbar(Some(&session), is_admin))
            (layout::container(html! {
                h1 class="text-3xl font-bold text-gray-900 mb-2" { "Hola, " (session.display_name()) }
                p class="text-gray-600 mb-6" { "Este es el resumen de tus cursos." }
                (body)
            }))
        },
    )
}

/// Tabs of the course detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CourseSection {
    #[default]
    Temario,
    Calificaciones,
    Asistencia,
}

impl CourseSection {
    pub const ALL: [CourseSection; 3] = [
        CourseSection::Temario,
        CourseSection::Calificaciones,
        CourseSection::Asistencia,
    ];

    /// Unknown values fall back to the syllabus
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "calificaciones" => CourseSection::Calificaciones,
            "asistencia" => CourseSection::Asistencia,
            _ => CourseSection::Temario,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            CourseSection::Temario => "temario",
            CourseSection::Calificaciones => "calificaciones",
            CourseSection::Asistencia => "asistencia",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CourseSection::Temario => "Temario",
            CourseSection::Calificaciones => "Calificaciones",
            CourseSection::Asistencia => "Asistencia",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SectionQuery {
    #[serde(default)]
    pub seccion: String,
}

fn section_tabs(id: i64, active: CourseSection) -> Markup {
    html! {
        nav class="flex gap-6 border-b mb-4" {
            @for section in CourseSection::ALL {
                @let classes = if section == active {
                    "pb-2 -mb-px border-b-2 border-primary font-semibold text-gray-900"
                } else {
                    "pb-2 -mb-px text-gray-500 hover:text-gray-700"
                };
                a href=(format!("/estudiante/cursos/{}?seccion={}", id, section.slug())) class=(classes) {
                    (section.label())
                }
            }
        }
    }
}

fn section_body(enrollment: &Enrollment, section: CourseSection) -> Markup {
    match section {
        CourseSection::Temario => {
            let topics = syllabus_topics(&enrollment.temario);
            html! {
                @if topics.is_empty() {
                    p class="text-sm text-gray-500" { "Temario próximamente disponible." }
                } @else {
                    ol class="space-y-2" {
                        @for (index, topic) in topics.iter().enumerate() {
                            li class="flex items-center p-4 bg-white rounded-lg shadow" {
                                span class="w-6 h-6 mr-3 flex items-center justify-center rounded-full text-sm bg-primary text-white" {
                                    (index + 1)
                                }
                                span class="text-gray-700" { (topic) }
                            }
                        }
                    }
                }
            }
        }
        CourseSection::Calificaciones => html! {
            @if enrollment.notas.is_empty() {
                p class="text-sm text-gray-500" { "Aún no hay calificaciones registradas." }
            } @else {
                div class="space-y-3" {
                    @for grade in &enrollment.notas {
                        div class="flex items-center justify-between p-4 bg-white rounded-lg shadow" {
                            p class="font-semibold" { (grade.titulo) }
                            div class="text-right" {
                                p class="text-xl font-bold text-primary" {
                                    @match grade.nota {
                                        Some(nota) => { (nota) "/100" }
                                        None => { "-" }
                                    }
                                }
                                p class="text-sm text-gray-500" { (dashboard::grade_label(grade.nota)) }
                            }
                        }
                    }
                }
            }
        },
        CourseSection::Asistencia => html! {
            @if enrollment.asistencias.is_empty() {
                p class="text-sm text-gray-500" { "Sin registros de asistencia" }
            } @else {
                div class="grid grid-cols-2 gap-3 md:grid-cols-4" {
                    @for record in &enrollment.asistencias {
                        @let classes = if record.estado == PRESENT {
                            "p-3 rounded-lg border bg-green-50 border-green-200 text-green-700"
                        } else {
                            "p-3 rounded-lg border bg-red-50 border-red-200 text-red-600"
                        };
                        div class=(classes) {
                            p class="text-sm font-medium" { (record.fecha) }
                            p class="text-xs" { (record.estado) }
                        }
                    }
                }
            }
        },
    }
}

/// `GET /estudiante/cursos/:id`: one enrolled course, by enrollment id
pub async fn course(
    State(state): State<AppState>,
    session: SessionCookie,
    Path(id): Path<i64>,
    Query(query): Query<SectionQuery>,
) -> Response {
    let is_admin = session.session().has_role(&state.settings.admin_roles);
    let section = CourseSection::parse(&query.seccion);

    let cursos = match load_enrollments(&state, &session).await {
        Ok(cursos) => cursos,
        Err(message) => {
            return (StatusCode::BAD_GATEWAY, layout::error_page("502", &message)).into_response();
        }
    };

    let Some(enrollment) = dashboard::find_enrollment(&cursos, id) else {
        info!("Enrollment {} not found for session {}", id, session.sid());
        return (
            StatusCode::NOT_FOUND,
            layout::error_page("404", "Curso no encontrado."),
        )
            .into_response();
    };

    let progress = dashboard::progress(enrollment);
    let (graded, expected) = dashboard::graded_count(enrollment);
    let average = dashboard::average_grade(enrollment)
        .map(|avg| format!("{:.1}", avg))
        .unwrap_or_else(|| "-".to_string());
    let attendance = dashboard::attendance_rate(enrollment)
        .map(|rate| format!("{}%", rate))
        .unwrap_or_else(|| "-".to_string());

    layout::base(
        &enrollment.nombre,
        html! {
            (layout::navbar(Some(&session), is_admin))
            (layout::container(html! {
                a href="/estudiante" class="text-sm text-gray-500 hover:text-gray-700" { "Volver" }
                h1 class="text-3xl font-bold text-gray-900 mt-2" { (enrollment.nombre) }
                p class="text-gray-600 mb-6" {
                    (enrollment.tipo)
                    @if let Some(horas) = enrollment.duracion { " · " (horas) " horas" }
                    @if !enrollment.horario.is_empty() { " · " (enrollment.horario) }
                }

                div class="grid grid-cols-2 gap-4 md:grid-cols-4 mb-8" {
                    (layout::stat("Promedio", &average))
                    (layout::stat("Asistencia", &attendance))
                    (layout::stat("Calificaciones", &format!("{}/{}", graded, expected)))
                    (layout::stat("Estado", dashboard::status_label(enrollment)))
                }

                div class="bg-white p-4 rounded-lg shadow mb-8" {
                    p class="text-gray-600 mb-2" { "Progreso general" }
                    div class="w-full bg-gray-200 rounded-full h-3" {
                        div class="bg-primary h-3 rounded-full" style=(format!("width: {}%", progress)) {}
                    }
                    @if progress == 100 {
                        p class="text-sm text-green-700 mt-2" {
                            "Curso aprobado. Tu certificado estará disponible una vez validemos los requisitos."
                        }
                    }
                }

                (section_tabs(enrollment.id_matricula, section))
                (section_body(enrollment, section))
            }))
        },
    )
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grade;

    #[test]
    fn test_section_parse_falls_back_to_syllabus() {
        assert_eq!(CourseSection::parse("asistencia"), CourseSection::Asistencia);
        assert_eq!(CourseSection::parse(" calificaciones "), CourseSection::Calificaciones);
        assert_eq!(CourseSection::parse(""), CourseSection::Temario);
        assert_eq!(CourseSection::parse("recursos"), CourseSection::Temario);
        for section in CourseSection::ALL {
            assert_eq!(CourseSection::parse(section.slug()), section);
        }
    }

    #[test]
    fn test_grades_tab_marks_pending_modules() {
        let enrollment = Enrollment {
            notas: vec![
                Grade { titulo: "Módulo 1".to_string(), nota: Some(92.0) },
                Grade { titulo: "Proyecto final".to_string(), nota: None },
            ],
            ..Default::default()
        };

        let html = section_body(&enrollment, CourseSection::Calificaciones).into_string();

        assert!(html.contains("92/100"));
        assert!(html.contains("Excelente"));
        assert!(html.contains("Pendiente"));
    }
}
