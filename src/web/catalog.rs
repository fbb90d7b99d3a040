use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{html, Markup};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::session::SessionCookie;
use crate::client::ApiError;
use crate::models::{syllabus_topics, Curso, OfertaCurso};
use crate::resource::filter::ALL_CATEGORIES;
use crate::resource::{
    CategoryFilter, Filter, ListParams, Resource, ResourceApi, ResourceService, ResourceStore,
};

use super::components::layout;
use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub tipo: String,
}

fn course_card(curso: &Curso) -> Markup {
    html! {
        div class="bg-white rounded-lg shadow p-6 flex flex-col" {
            span class="self-start mb-3 px-2 py-1 text-xs font-medium rounded-full bg-pink-100 text-primary" {
                (curso.tipo_curso)
            }
            h3 class="text-lg font-semibold text-gray-900 mb-2" {
                a href=(format!("/cursos/{}", curso.id)) class="hover:text-primary" { (curso.nombre_curso) }
            }
            p class="text-sm text-gray-600 flex-1" { (curso.temario) }
            p class="mt-4 text-sm text-gray-500" { (curso.duracion) " horas" }
        }
    }
}

fn service<R: Resource>(
    state: &AppState,
    session: Option<&SessionCookie>,
    path: String,
) -> ResourceService<R> {
    ResourceService::new(
        state.client.clone(),
        path,
        session
            .and_then(|s| s.session().token())
            .map(str::to_string),
    )
}

/// `GET /cursos`: public course catalog with search and type filter
pub async fn list(
    State(state): State<AppState>,
    session: Option<SessionCookie>,
    Query(query): Query<CatalogQuery>,
) -> Markup {
    let is_admin = session
        .as_ref()
        .is_some_and(|s| s.session().has_role(&state.settings.admin_roles));

    let service: ResourceService<Curso> =
        service(&state, session.as_ref(), state.settings.courses_path.clone());

    let loaded = service.list(&ListParams::new()).await;
    let filter = Filter::new(&query.q, &query.tipo);

    let body = match loaded {
        Err(e) => {
            warn!("Catalog load failed: {}", e);
            html! { (layout::alert(&e.user_message("Error al cargar cursos."), "error")) }
        }
        Ok(items) => {
            let store = ResourceStore::with_items(items);
            let categories = store.categories();
            let visible = filter.apply(store.items());

            html! {
                form action="/cursos" method="get" class="flex flex-wrap gap-3 mb-6" {
                    input type="search" name="q" value=(filter.search) placeholder="Buscar cursos..."
                        class="flex-1 px-3 py-2 border border-gray-300 rounded-md sm:text-sm";
                    select name="tipo" aria-label="Tipo de curso"
                        class="px-3 py-2 border border-gray-300 rounded-md sm:text-sm" {
                        option value=(ALL_CATEGORIES) selected[filter.category == CategoryFilter::All] { "Todos los tipos" }
                        @for tipo in &categories {
                            option value=(tipo) selected[filter.category.as_str() == tipo.as_str()] { (tipo) }
                        }
                    }
                    button type="submit" class="px-4 py-2 text-sm rounded-md bg-gray-100 hover:bg-gray-200" { "Filtrar" }
                }
                @if store.is_empty() {
                    p class="text-gray-500" { "Aún no hay cursos publicados." }
                } @else if visible.is_empty() {
                    p class="text-gray-500" { "No se encontraron cursos con los filtros aplicados." }
                } @else {
                    div class="grid grid-cols-1 gap-6 sm:grid-cols-2 lg:grid-cols-3" {
                        @for curso in visible {
                            (course_card(curso))
                        }
                    }
                }
            }
        }
    };

    layout::base(
        "Cursos",
        html! {
            (layout::navbar(session.as_ref(), is_admin))
            (layout::container(html! {
                h1 class="text-3xl font-bold text-gray-900 mb-6" { "Nuestros cursos" }
                (body)
            }))
        },
    )
}

/// Course by id. When the single-record lookup fails for a reason other
/// than 404, the course is looked up in the full list instead.
async fn find_course(
    cursos: &ResourceService<Curso>,
    id: i64,
) -> Result<Option<Curso>, ApiError> {
    match cursos.get_by_id(id).await {
        Ok(curso) => Ok(Some(curso)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => {
            warn!("Lookup of curso {} failed, searching the list: {}", id, e);
            let items = cursos.list(&ListParams::new()).await?;
            Ok(items.into_iter().find(|c| c.id == id))
        }
    }
}

fn offering_row(oferta: &OfertaCurso) -> Markup {
    html! {
        tr {
            td class="px-4 py-2 text-sm text-gray-900" { (oferta.codigo_curso) }
            td class="px-4 py-2 text-sm text-gray-700" { (oferta.fecha_inicio_curso) }
            td class="px-4 py-2 text-sm text-gray-700" { (oferta.fecha_fin_curso) }
            td class="px-4 py-2 text-sm text-gray-700" { (oferta.horario) }
            td class="px-4 py-2 text-sm text-gray-700 text-right" { (oferta.cupos) }
        }
    }
}

fn detail_page(
    curso: &Curso,
    ofertas: &[OfertaCurso],
    session: Option<&SessionCookie>,
    is_admin: bool,
) -> Markup {
    let topics = syllabus_topics(&curso.temario);
    let enroll_href = match session {
        Some(_) => "/estudiante".to_string(),
        None => format!("/login?next={}", urlencoding::encode(&format!("/cursos/{}", curso.id))),
    };

    layout::base(
        &curso.nombre_curso,
        html! {
            (layout::navbar(session, is_admin))
            (layout::container(html! {
                nav class="mb-6 text-sm text-gray-600" {
                    a href="/" class="hover:text-primary" { "Inicio" }
                    " / "
                    a href="/cursos" class="hover:text-primary" { "Cursos" }
                    " / "
                    span class="text-gray-900 font-medium" { (curso.nombre_curso) }
                }

                div class="grid grid-cols-1 gap-8 lg:grid-cols-3" {
                    div class="lg:col-span-2 bg-white rounded-lg shadow p-6" {
                        span class="inline-block mb-3 px-2 py-1 text-xs font-medium rounded-full bg-pink-100 text-primary" {
                            (curso.tipo_curso)
                        }
                        h1 class="text-3xl font-bold text-gray-900 mb-4" { (curso.nombre_curso) }

                        h2 class="text-xl font-semibold text-gray-900 mb-3" { "Temario" }
                        @if topics.is_empty() {
                            p class="text-sm text-gray-500" { "Temario próximamente disponible." }
                        } @else {
                            ol class="list-decimal list-inside space-y-1 text-gray-700" {
                                @for topic in &topics {
                                    li { (topic) }
                                }
                            }
                        }

                        h2 class="text-xl font-semibold text-gray-900 mt-8 mb-3" { "Próximas ofertas" }
                        @if ofertas.is_empty() {
                            p class="text-sm text-gray-500" { "No hay ofertas abiertas para este curso." }
                        } @else {
                            table class="min-w-full divide-y divide-gray-200" {
                                thead class="bg-gray-50" {
                                    tr {
                                        @for column in ["Código", "Inicio", "Fin", "Horario", "Cupos"] {
                                            th class="px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase" { (column) }
                                        }
                                    }
                                }
                                tbody class="bg-white divide-y divide-gray-200" {
                                    @for oferta in ofertas {
                                        (offering_row(oferta))
                                    }
                                }
                            }
                        }
                    }

                    div class="bg-white rounded-lg shadow p-6 self-start" {
                        dl class="space-y-3 text-sm mb-6" {
                            div class="flex justify-between" {
                                dt class="text-gray-600" { "Duración" }
                                dd class="font-medium" { (curso.duracion) " horas" }
                            }
                            div class="flex justify-between" {
                                dt class="text-gray-600" { "Tipo" }
                                dd class="font-medium" { (curso.tipo_curso) }
                            }
                            div class="flex justify-between" {
                                dt class="text-gray-600" { "Modalidad" }
                                dd class="font-medium" { "Presencial" }
                            }
                        }
                        p class="mb-6 p-3 bg-pink-50 rounded-lg text-sm text-pink-800" {
                            "Certificado " (curso.nombre_curso) " FUNED"
                        }
                        a href=(enroll_href)
                            class="block w-full text-center py-2 px-4 rounded-md text-white bg-primary hover:bg-pink-700 mb-3" {
                            "Inscribirse"
                        }
                        a href="/cursos"
                            class="block w-full text-center py-2 px-4 rounded-md border border-gray-300 text-gray-700 hover:bg-gray-50" {
                            "Volver a cursos"
                        }
                    }
                }
            }))
        },
    )
}

/// `GET /cursos/:id`: one course with its open offerings
pub async fn show(
    State(state): State<AppState>,
    session: Option<SessionCookie>,
    Path(id): Path<i64>,
) -> Response {
    let is_admin = session
        .as_ref()
        .is_some_and(|s| s.session().has_role(&state.settings.admin_roles));

    let cursos: ResourceService<Curso> =
        service(&state, session.as_ref(), state.settings.courses_path.clone());

    let curso = match find_course(&cursos, id).await {
        Ok(Some(curso)) => curso,
        Ok(None) => {
            info!("Curso {} not found", id);
            return (
                StatusCode::NOT_FOUND,
                layout::error_page("404", "Curso no encontrado."),
            )
                .into_response();
        }
        Err(e) => {
            warn!("Curso {} could not be loaded: {}", id, e);
            return (
                StatusCode::BAD_GATEWAY,
                layout::error_page("502", &e.user_message("No se pudo cargar el curso.")),
            )
                .into_response();
        }
    };

    let offerings: ResourceService<OfertaCurso> =
        service(&state, session.as_ref(), OfertaCurso::PATH.to_string());
    let ofertas: Vec<OfertaCurso> = match offerings.list(&ListParams::new()).await {
        Ok(items) => items.into_iter().filter(|o| o.id_curso == id).collect(),
        Err(e) => {
            warn!("Offerings for curso {} unavailable: {}", id, e);
            Vec::new()
        }
    };

    detail_page(&curso, &ofertas, session.as_ref(), is_admin).into_response()
}
