pub mod admin;
pub mod auth;
pub mod catalog;
pub mod components;
pub mod student;
pub mod workspace;

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use maud::{html, Markup};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, Level};

use crate::auth::session::{SessionCookie, SessionKeys};
use crate::client::ApiClient;
use crate::config::Settings;
use crate::models::{Curso, Docente, OfertaCurso};

use components::layout;
use workspace::Workspaces;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub client: ApiClient,
    pub keys: SessionKeys,
    pub workspaces: Workspaces,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let client = ApiClient::from_settings(&settings)?;
        Ok(AppState {
            keys: SessionKeys::from_settings(&settings),
            workspaces: Workspaces::new(settings.write_policy),
            settings: Arc::new(settings),
            client,
        })
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/cursos", get(catalog::list))
        .route("/cursos/:id", get(catalog::show))
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route(
            "/registro",
            get(auth::register_page).post(auth::register_submit),
        )
        .route("/logout", post(auth::logout_submit))
        .route("/estudiante", get(student::show))
        .route("/estudiante/cursos/:id", get(student::course))
        .route("/admin", get(admin::dashboard))
        .merge(admin::routes::<Curso>())
        .merge(admin::routes::<Docente>())
        .merge(admin::routes::<OfertaCurso>())
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Home page
pub async fn home(State(state): State<AppState>, session: Option<SessionCookie>) -> Markup {
    let is_admin = session
        .as_ref()
        .is_some_and(|s| s.session().has_role(&state.settings.admin_roles));

    layout::base(
        &state.settings.app_name,
        html! {
            (layout::navbar(session.as_ref(), is_admin))
            div class="bg-gradient-to-br from-pink-50 to-purple-100" {
                div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 pt-20 pb-16 text-center" {
                    h1 class="text-5xl font-extrabold text-gray-900 sm:text-6xl mb-8" {
                        "Academia de belleza FUNED"
                    }
                    p class="text-xl text-gray-600 max-w-3xl mx-auto mb-12" {
                        "Formación técnica en maquillaje, peluquería, uñas y estética. "
                        "Explora nuestros cursos e inscríbete."
                    }
                    div class="flex justify-center gap-4" {
                        a href="/cursos"
                            class="inline-flex items-center px-8 py-3 border border-transparent text-base font-medium rounded-md shadow-sm text-white bg-primary hover:bg-pink-700" {
                            "Ver cursos"
                        }
                        @if session.is_none() {
                            a href="/registro"
                                class="inline-flex items-center px-8 py-3 border border-gray-300 text-base font-medium rounded-md text-gray-700 bg-white hover:bg-gray-50" {
                                "Registrarse"
                            }
                        }
                    }
                }
            }
        },
    )
}

pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        layout::error_page("404", "La página que buscas no existe."),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub git_hash: String,
    pub git_date: String,
    pub build_timestamp: String,
    pub rust_version: String,
    pub profile: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub build: BuildInfo,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let profile = if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.settings.version.clone(),
        backend: state.settings.api_url.clone(),
        build: BuildInfo {
            git_hash: env!("GIT_HASH").to_string(),
            git_date: env!("GIT_DATE").to_string(),
            build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
            rust_version: env!("RUST_VERSION").to_string(),
            profile: profile.to_string(),
        },
    })
}

pub async fn metrics_handler() -> Result<String, StatusCode> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer).map_err(|e| {
        error!("Failed to encode metrics: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    String::from_utf8(buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
