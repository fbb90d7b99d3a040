//! Admin CRUD screens, written once over [`AdminResource`] and mounted for
//! cursos, docentes and ofertas.

use std::marker::PhantomData;
use std::sync::Arc;

use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use maud::{html, Markup};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::session::SessionCookie;
use crate::config::Settings;
use crate::models::{Curso, Docente, OfertaCurso};
use crate::resource::{
    confirm, EditorPhase, EditorStatus, Filter, FormConfirmation, ListParams, LoadError,
    LoadState, PendingWrite, Resource, ResourceApi, ResourceController, ResourceService,
    SubmitError,
};

use super::components::{form, layout};
use super::workspace::Workspace;
use super::AppState;

/// A resource with an admin screen
pub trait AdminResource: Resource {
    /// URL segment under `/admin`
    const SLUG: &'static str;

    /// Label of the category select, for resources that have categories
    const CATEGORY_LABEL: &'static str = "Categoría";

    fn controller(workspace: &Workspace) -> &Mutex<ResourceController<Self>>;

    /// Backend collection path
    fn path(_settings: &Settings) -> String {
        Self::PATH.to_string()
    }

    fn columns() -> &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

impl AdminResource for Curso {
    const SLUG: &'static str = "cursos";
    const CATEGORY_LABEL: &'static str = "Tipo de curso";

    fn controller(workspace: &Workspace) -> &Mutex<ResourceController<Self>> {
        &workspace.cursos
    }

    fn path(settings: &Settings) -> String {
        settings.courses_path.clone()
    }

    fn columns() -> &'static [&'static str] {
        &["Nombre", "Tipo", "Duración", "Temario"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.nombre_curso.clone(),
            self.tipo_curso.clone(),
            format!("{} h", self.duracion),
            truncate(&self.temario, 60),
        ]
    }
}

impl AdminResource for Docente {
    const SLUG: &'static str = "docentes";

    fn controller(workspace: &Workspace) -> &Mutex<ResourceController<Self>> {
        &workspace.docentes
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Persona", "Especialidad", "Contratación", "Terminación"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.id_persona.to_string(),
            self.especialidad.clone(),
            self.fecha_contratacion.clone(),
            self.fecha_terminacion
                .clone()
                .unwrap_or_else(|| "Vigente".to_string()),
        ]
    }
}

impl AdminResource for OfertaCurso {
    const SLUG: &'static str = "ofertas";

    fn controller(workspace: &Workspace) -> &Mutex<ResourceController<Self>> {
        &workspace.ofertas
    }

    fn columns() -> &'static [&'static str] {
        &["Código", "Curso", "Docente", "Inicio", "Fin", "Horario", "Cupos"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.codigo_curso.clone(),
            self.id_curso.to_string(),
            self.id_docente.to_string(),
            self.fecha_inicio_curso.clone(),
            self.fecha_fin_curso.clone(),
            self.horario.clone(),
            self.cupos.to_string(),
        ]
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let cut: String = value.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Routes for one resource, nested under `/admin/<slug>`
pub fn routes<R: AdminResource>() -> Router<AppState> {
    let base = format!("/admin/{}", R::SLUG);
    Router::new()
        .route(&base, get(index::<R>).post(create::<R>))
        .route(&format!("{}/cancelar", base), post(cancel::<R>))
        .route(&format!("{}/:id", base), post(update::<R>))
        .route(&format!("{}/:id/editar", base), get(edit::<R>))
        .route(
            &format!("{}/:id/eliminar", base),
            get(confirm_delete::<R>).post(delete::<R>),
        )
}

/// Runs `on_drop` against the resource's controller if the handler is
/// dropped while a backend request is outstanding (client gone). Disarmed
/// once the response is in hand.
struct InFlight<'a, R, F>
where
    R: AdminResource,
    F: FnOnce(&mut ResourceController<R>),
{
    workspace: &'a Workspace,
    on_drop: Option<F>,
    _resource: PhantomData<fn() -> R>,
}

impl<'a, R, F> InFlight<'a, R, F>
where
    R: AdminResource,
    F: FnOnce(&mut ResourceController<R>),
{
    fn new(workspace: &'a Workspace, on_drop: F) -> Self {
        InFlight {
            workspace,
            on_drop: Some(on_drop),
            _resource: PhantomData,
        }
    }

    fn disarm(mut self) {
        self.on_drop = None;
    }
}

impl<R, F> Drop for InFlight<'_, R, F>
where
    R: AdminResource,
    F: FnOnce(&mut ResourceController<R>),
{
    fn drop(&mut self) {
        if let Some(on_drop) = self.on_drop.take() {
            let mut controller = R::controller(self.workspace).lock();
            on_drop(&mut *controller);
        }
    }
}

fn base_url<R: AdminResource>() -> String {
    format!("/admin/{}", R::SLUG)
}

fn back_to_list<R: AdminResource>() -> Response {
    Redirect::to(&base_url::<R>()).into_response()
}

fn service<R: AdminResource>(state: &AppState, session: &SessionCookie) -> ResourceService<R> {
    ResourceService::new(
        state.client.clone(),
        R::path(&state.settings),
        session.session().token().map(str::to_string),
    )
}

/// Admin role check. Anonymous visitors never get here: the session
/// extractor already redirected them to the login page.
fn require_admin(state: &AppState, session: &SessionCookie) -> Result<Arc<Workspace>, Response> {
    if !session.session().has_role(&state.settings.admin_roles) {
        warn!(
            "Session {} with role {:?} denied admin access",
            session.sid(),
            session.session().role()
        );
        return Err((
            StatusCode::FORBIDDEN,
            layout::error_page("403", "No tienes permisos para acceder a esta sección."),
        )
            .into_response());
    }
    Ok(state
        .workspaces
        .get_or_create(session.sid(), session.expires_at()))
}

/// `GET /admin`
pub async fn dashboard(
    State(state): State<AppState>,
    session: SessionCookie,
) -> Result<Markup, Response> {
    let workspace = require_admin(&state, &session)?;

    // Leaving the resource screens: loads still in flight must not land
    workspace.cursos.lock().unmount();
    workspace.docentes.lock().unmount();
    workspace.ofertas.lock().unmount();

    let sections = [
        ("/admin/cursos", "Cursos", "Catálogo de cursos, duración, temario y tipo."),
        ("/admin/docentes", "Docentes", "Docentes, especialidad y fechas de contratación."),
        ("/admin/ofertas", "Ofertas", "Ofertas abiertas: fechas, horario y cupos."),
    ];

    Ok(layout::base(
        "Administración",
        html! {
            (layout::navbar(Some(&session), true))
            (layout::container(html! {
                h1 class="text-3xl font-bold text-gray-900 mb-6" { "Administración" }
                div class="grid grid-cols-1 gap-6 md:grid-cols-3" {
                    @for (href, title, description) in sections {
                        a href=(href) class="block bg-white shadow rounded-lg p-6 hover:shadow-md" {
                            h2 class="text-xl font-semibold text-primary mb-2" { (title) }
                            p class="text-sm text-gray-600" { (description) }
                        }
                    }
                }
            }))
        },
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub categoria: String,
}

/// `GET /admin/<slug>`: mounts the list on first visit (or after a failed
/// load) and renders the current state.
pub async fn index<R: AdminResource>(
    State(state): State<AppState>,
    session: SessionCookie,
    Query(query): Query<ListQuery>,
) -> Result<Markup, Response> {
    let workspace = require_admin(&state, &session)?;

    let ticket = {
        let mut controller = R::controller(&workspace).lock();
        controller.set_filter(Filter::new(&query.q, &query.categoria));
        let retry = matches!(controller.store().state(), LoadState::Failed(_));
        (controller.needs_mount() || retry).then(|| controller.begin_mount())
    };

    if let Some(ticket) = ticket {
        let guard = InFlight::<R, _>::new(&workspace, move |controller| {
            if controller.abandon_mount(ticket) {
                info!("{} list request dropped, will reload", R::NOUN.capitalized());
            }
        });
        let result = service::<R>(&state, &session)
            .list(&ListParams::new())
            .await;
        guard.disarm();
        if !R::controller(&workspace).lock().finish_mount(ticket, result) {
            info!("Discarded superseded {} list", R::NOUN.plural);
        }
    }

    let mut controller = R::controller(&workspace).lock();
    Ok(render_page(&mut controller, &session, None))
}

/// `POST /admin/<slug>`
pub async fn create<R: AdminResource>(
    State(state): State<AppState>,
    session: SessionCookie,
    Form(draft): Form<R::Draft>,
) -> Result<Response, Response> {
    let workspace = require_admin(&state, &session)?;

    let prepared = {
        let mut controller = R::controller(&workspace).lock();
        if controller.editor().editing().is_some() {
            controller.cancel_edit();
        }
        controller.prepare_submit(draft)
    };

    send_write(&state, &session, &workspace, prepared).await
}

/// `POST /admin/<slug>/:id`
pub async fn update<R: AdminResource>(
    State(state): State<AppState>,
    session: SessionCookie,
    Path(id): Path<i64>,
    Form(draft): Form<R::Draft>,
) -> Result<Response, Response> {
    let workspace = require_admin(&state, &session)?;

    let prepared = {
        let mut controller = R::controller(&workspace).lock();
        if controller.editor().editing_id() != Some(id) && !controller.begin_edit(id) {
            return Ok(back_to_list::<R>());
        }
        controller.prepare_submit(draft)
    };

    send_write(&state, &session, &workspace, prepared).await
}

async fn send_write<R: AdminResource>(
    state: &AppState,
    session: &SessionCookie,
    workspace: &Workspace,
    prepared: Result<PendingWrite<R>, SubmitError>,
) -> Result<Response, Response> {
    match prepared {
        Ok(pending) => {
            let guard = InFlight::<R, _>::new(workspace, |controller| {
                controller.abandon_submit();
            });
            let outcome = pending.send(&service::<R>(state, session)).await;
            guard.disarm();
            R::controller(workspace).lock().finish_submit(outcome);
            Ok(back_to_list::<R>())
        }
        Err(SubmitError::Invalid(errors)) => {
            info!(
                "Rejected {} form: {} invalid field(s)",
                R::NOUN.singular,
                errors.len()
            );
            let mut controller = R::controller(workspace).lock();
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                render_page(&mut controller, session, None),
            )
                .into_response())
        }
        Err(SubmitError::InFlight) => {
            let mut controller = R::controller(workspace).lock();
            Err((
                StatusCode::CONFLICT,
                render_page(&mut controller, session, None),
            )
                .into_response())
        }
    }
}

/// `GET /admin/<slug>/:id/editar`
pub async fn edit<R: AdminResource>(
    State(state): State<AppState>,
    session: SessionCookie,
    Path(id): Path<i64>,
) -> Result<Response, Response> {
    let workspace = require_admin(&state, &session)?;
    if !R::controller(&workspace).lock().begin_edit(id) {
        info!("Ignored edit of unknown {} {}", R::NOUN.singular, id);
    }
    Ok(back_to_list::<R>())
}

/// `POST /admin/<slug>/cancelar`
pub async fn cancel<R: AdminResource>(
    State(state): State<AppState>,
    session: SessionCookie,
) -> Result<Response, Response> {
    let workspace = require_admin(&state, &session)?;
    R::controller(&workspace).lock().cancel_edit();
    Ok(back_to_list::<R>())
}

/// `GET /admin/<slug>/:id/eliminar`: list with the confirmation modal open
pub async fn confirm_delete<R: AdminResource>(
    State(state): State<AppState>,
    session: SessionCookie,
    Path(id): Path<i64>,
) -> Result<Response, Response> {
    let workspace = require_admin(&state, &session)?;
    let mut controller = R::controller(&workspace).lock();

    let Some(target) = controller.store().find(id).cloned() else {
        return Ok(back_to_list::<R>());
    };

    Ok(render_page(&mut controller, &session, Some(&target)).into_response())
}

/// `POST /admin/<slug>/:id/eliminar`
pub async fn delete<R: AdminResource>(
    State(state): State<AppState>,
    session: SessionCookie,
    Path(id): Path<i64>,
    Form(confirmation): Form<FormConfirmation>,
) -> Result<Response, Response> {
    let workspace = require_admin(&state, &session)?;

    let pending = R::controller(&workspace)
        .lock()
        .prepare_delete(id, &confirmation);

    if let Some(pending) = pending {
        let outcome = pending.send::<R, _>(&service::<R>(&state, &session)).await;
        R::controller(&workspace).lock().finish_delete(outcome);
    }

    Ok(back_to_list::<R>())
}

fn empty_message<R: Resource>() -> String {
    format!(
        "No hay {} {}s todavía.",
        R::NOUN.plural,
        R::NOUN.participle("registrad")
    )
}

fn render_list<R: AdminResource>(controller: &ResourceController<R>) -> Markup {
    let store = controller.store();
    let base = base_url::<R>();

    html! {
        @match store.state() {
            LoadState::Idle | LoadState::Loading => {
                p class="text-sm text-gray-500" { "Cargando " (R::NOUN.plural) "..." }
            }
            LoadState::Failed(LoadError::Unauthorized) => {
                (layout::alert(LoadError::Unauthorized.message(), "warning"))
                a href="/login" class="text-sm text-primary underline" { "Iniciar sesión" }
            }
            LoadState::Failed(err) => {
                (layout::alert(err.message(), "error"))
                a href=(base) class="text-sm text-primary underline" { "Reintentar" }
            }
            LoadState::Ready if store.is_empty() => {
                p class="text-sm text-gray-500" { (empty_message::<R>()) }
            }
            LoadState::Ready => {
                @let visible = controller.visible();
                @if visible.is_empty() {
                    p class="text-sm text-gray-500" {
                        "No se encontraron " (R::NOUN.plural) " con los filtros aplicados."
                    }
                } @else {
                    table class="min-w-full divide-y divide-gray-200" {
                        thead class="bg-gray-50" {
                            tr {
                                @for column in R::columns() {
                                    th class="px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase" { (column) }
                                }
                                th class="px-4 py-2" {}
                            }
                        }
                        tbody class="bg-white divide-y divide-gray-200" {
                            @for item in visible {
                                tr {
                                    @for cell in item.cells() {
                                        td class="px-4 py-2 text-sm text-gray-900" { (cell) }
                                    }
                                    td class="px-4 py-2 text-sm text-right whitespace-nowrap" {
                                        a href=(format!("{}/{}/editar", base, item.id()))
                                            class="text-primary hover:underline mr-3" { "Editar" }
                                        a href=(format!("{}/{}/eliminar", base, item.id()))
                                            class="text-red-600 hover:underline" { "Eliminar" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_filter<R: AdminResource>(controller: &ResourceController<R>) -> Markup {
    let filter = controller.filter();
    let categories = controller.categories();

    html! {
        form action=(base_url::<R>()) method="get" class="flex flex-wrap gap-3 mb-4" {
            input type="search" name="q" value=(filter.search)
                placeholder=(format!("Buscar {}...", R::NOUN.plural))
                class="flex-1 px-3 py-2 border border-gray-300 rounded-md sm:text-sm";
            @if !categories.is_empty() {
                select name="categoria" aria-label=(R::CATEGORY_LABEL)
                    class="px-3 py-2 border border-gray-300 rounded-md sm:text-sm" {
                    option value="todos" selected[filter.category.as_str() == "todos"] { "Todos" }
                    @for category in &categories {
                        option value=(category) selected[filter.category.as_str() == category.as_str()] { (category) }
                    }
                }
            }
            button type="submit" class="px-4 py-2 text-sm rounded-md bg-gray-100 hover:bg-gray-200" { "Filtrar" }
        }
    }
}

/// Full admin page for one resource. Takes the flash, so it renders once.
fn render_page<R: AdminResource>(
    controller: &mut ResourceController<R>,
    session: &SessionCookie,
    deleting: Option<&R>,
) -> Markup {
    let flash = controller.take_flash();
    let controller = &*controller;
    let editor = controller.editor();
    let base = base_url::<R>();
    let title = format!("Gestión de {}", R::NOUN.plural);
    let blank = R::Draft::default();
    let no_errors = Default::default();

    // The create form only shows editor state while no edit modal is open
    let (create_draft, create_errors, create_phase) = match editor.editing() {
        None => (editor.draft(), editor.errors(), editor.phase()),
        Some(_) => (&blank, &no_errors, EditorPhase::Create),
    };
    let flash_kind = match &flash {
        Some(flash) if flash.is_error() => "error",
        _ => "success",
    };

    layout::base(
        &title,
        html! {
            (layout::navbar(Some(session), true))
            (layout::container(html! {
                div class="flex items-center justify-between mb-6" {
                    h1 class="text-3xl font-bold text-gray-900" { (title) }
                    a href="/admin" class="text-sm text-gray-500 hover:text-gray-700" { "Volver" }
                }

                @if let Some(flash) = &flash {
                    (layout::alert(flash.message(), flash_kind))
                }

                div class="grid grid-cols-1 gap-6 lg:grid-cols-3" {
                    div {
                        (layout::card(&format!("Nuevo {}", R::NOUN.singular), html! {
                            (form::resource_form(
                                "nuevo",
                                &base,
                                R::FIELDS,
                                create_draft,
                                create_errors,
                                create_phase,
                                &format!("Crear {}", R::NOUN.singular),
                            ))
                        }))
                    }
                    div class="lg:col-span-2" {
                        (layout::card(&R::NOUN.capitalized(), html! {
                            (render_filter(controller))
                            (render_list(controller))
                        }))
                    }
                }
            }))

            @if let Some(entity) = editor.editing() {
                (layout::modal(&format!("Editar {}", R::NOUN.singular), html! {
                    @if let EditorStatus::Failed(message) = editor.status() {
                        (layout::alert(message, "error"))
                    }
                    (form::resource_form(
                        "editar",
                        &format!("{}/{}", base, entity.id()),
                        R::FIELDS,
                        editor.draft(),
                        editor.errors(),
                        editor.phase(),
                        "Guardar cambios",
                    ))
                    form action=(format!("{}/cancelar", base)) method="post" class="mt-3" {
                        (layout::button("Cancelar", "secondary", editor.is_submitting()))
                    }
                }))
            }

            @if let Some(entity) = deleting {
                (layout::modal("Confirmar eliminación", html! {
                    p class="text-sm text-gray-700 mb-6" { (confirm::prompt(entity)) }
                    div class="flex justify-end gap-3" {
                        a href=(base) class="py-2 px-4 text-sm text-gray-700 border border-gray-300 rounded-md" { "Cancelar" }
                        form action=(format!("{}/{}/eliminar", base, entity.id())) method="post" {
                            input type="hidden" name="confirmar" value="si";
                            (layout::button("Eliminar", "danger", false))
                        }
                    }
                }))
            }
        },
    )
}
