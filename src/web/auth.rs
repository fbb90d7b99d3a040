use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Local;
use maud::{html, Markup};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::auth::registration::{RegistrationForm, ID_TYPES, MINIMUM_AGE};
use crate::auth::session::{
    clear_session_cookie, create_session_cookie, create_session_token, Session, SessionCookie,
};
use crate::auth::AuthService;
use crate::monitoring;
use crate::resource::{FieldErrors, FieldSpec, InputKind};

use super::components::{form, layout};
use super::AppState;

pub const BAD_CREDENTIALS: &str = "Correo o contraseña incorrectos.";

/// Only same-site relative paths are followed after login
fn validate_redirect_url(url: &str) -> Option<String> {
    if url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\") {
        Some(url.to_string())
    } else {
        None
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
    /// Set after a successful sign-up
    pub registrado: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub correo: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

fn auth_shell(title: &str, heading: &str, content: Markup) -> Markup {
    layout::base(
        title,
        html! {
            div class="min-h-screen flex items-center justify-center bg-gray-50 py-12 px-4 sm:px-6 lg:px-8" {
                div class="max-w-md w-full space-y-8" {
                    div class="text-center" {
                        (layout::logo())
                        h2 class="mt-6 text-3xl font-extrabold text-gray-900" { (heading) }
                    }
                    (content)
                }
            }
        },
    )
}

fn login_view(correo: &str, next: Option<&str>, message: Option<(&str, &str)>) -> Markup {
    auth_shell(
        "Iniciar sesión",
        "Inicia sesión en FUNED",
        html! {
            @if let Some((text, kind)) = message {
                (layout::alert(text, kind))
            }
            form class="mt-8 space-y-6" action="/login" method="post" {
                @if let Some(next) = next {
                    input type="hidden" name="next" value=(next);
                }
                div class="rounded-md shadow-sm space-y-3" {
                    div {
                        label for="correo" class="sr-only" { "Correo electrónico" }
                        input id="correo" name="correo" type="email" autocomplete="email" required
                            value=(correo)
                            class="appearance-none relative block w-full px-3 py-2 border border-gray-300 rounded-md focus:outline-none focus:ring-primary focus:border-primary sm:text-sm"
                            placeholder="Correo electrónico";
                    }
                    div {
                        label for="password" class="sr-only" { "Contraseña" }
                        input id="password" name="password" type="password" autocomplete="current-password" required
                            class="appearance-none relative block w-full px-3 py-2 border border-gray-300 rounded-md focus:outline-none focus:ring-primary focus:border-primary sm:text-sm"
                            placeholder="Contraseña";
                    }
                }
                (layout::button("Ingresar", "primary", false))
            }
            p class="text-center text-sm text-gray-600" {
                "¿No tienes cuenta? "
                a href="/registro" class="font-medium text-primary hover:text-pink-700" { "Regístrate" }
            }
        },
    )
}

/// `GET /login`
pub async fn login_page(Query(query): Query<LoginQuery>) -> Markup {
    let next = query.next.as_deref().and_then(validate_redirect_url);
    let message = query
        .registrado
        .is_some()
        .then_some(("Registro exitoso. Ya puedes iniciar sesión.", "success"));
    login_view("", next.as_deref(), message)
}

/// `POST /login`
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, Response> {
    let next = form.next.as_deref().and_then(validate_redirect_url);

    if form.correo.trim().is_empty() || form.password.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            login_view(
                &form.correo,
                next.as_deref(),
                Some(("Ingresa tu correo y contraseña.", "error")),
            ),
        )
            .into_response());
    }

    let login = AuthService::new(state.client.clone())
        .login(&form.correo, &form.password)
        .await
        .map_err(|e| {
            warn!("Login failed: {}", e);
            let (status, message) = if e.is_unauthorized() {
                (StatusCode::UNAUTHORIZED, BAD_CREDENTIALS.to_string())
            } else {
                (
                    StatusCode::BAD_GATEWAY,
                    e.user_message("No se pudo iniciar sesión. Intenta de nuevo."),
                )
            };
            (
                status,
                login_view(&form.correo, next.as_deref(), Some((message.as_str(), "error"))),
            )
                .into_response()
        })?;

    let token = create_session_token(&state.keys, &login.token, &login.user.persona).map_err(|e| {
        error!("Failed to sign session: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Error al crear la sesión").into_response()
    })?;

    let mut session = Session::anonymous();
    session.login(login.token, login.user.persona);

    let destination = next.unwrap_or_else(|| {
        if session.has_role(&state.settings.admin_roles) {
            "/admin".to_string()
        } else {
            "/estudiante".to_string()
        }
    });

    info!("Session opened with role {:?}", session.role());

    let jar = jar.add(create_session_cookie(&state.keys, token));
    Ok((jar, Redirect::to(&destination)).into_response())
}

/// `POST /logout`: drops the session's admin state and the cookie
pub async fn logout_submit(
    State(state): State<AppState>,
    session: Option<SessionCookie>,
    jar: CookieJar,
) -> Response {
    if let Some(session) = session {
        state.workspaces.remove(session.sid());
        info!("Session {} closed", session.sid());
    }
    (jar.add(clear_session_cookie()), Redirect::to("/login")).into_response()
}

const REGISTRATION_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "nombre",
        label: "Nombre",
        input: InputKind::Text,
        required: true,
        placeholder: "",
    },
    FieldSpec {
        name: "apellido",
        label: "Apellido",
        input: InputKind::Text,
        required: true,
        placeholder: "",
    },
    FieldSpec {
        name: "tipo_identificacion",
        label: "Tipo de identificación",
        input: InputKind::Suggest(ID_TYPES),
        required: true,
        placeholder: "Cédula de ciudadanía",
    },
    FieldSpec {
        name: "numero_identificacion",
        label: "Número de identificación",
        input: InputKind::Text,
        required: true,
        placeholder: "",
    },
    FieldSpec {
        name: "fecha_nacimiento",
        label: "Fecha de nacimiento",
        input: InputKind::Date,
        required: true,
        placeholder: "",
    },
    FieldSpec {
        name: "correo",
        label: "Correo electrónico",
        input: InputKind::Text,
        required: true,
        placeholder: "nombre@correo.com",
    },
    FieldSpec {
        name: "telefono",
        label: "Teléfono",
        input: InputKind::Text,
        required: true,
        placeholder: "",
    },
];

fn password_input(name: &str, label: &str, error: Option<&str>) -> Markup {
    let id = format!("registro-{}", name);
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-medium text-gray-700" {
                (label) span class="text-red-500" { " *" }
            }
            input id=(id) name=(name) type="password" autocomplete="new-password"
                class="mt-1 block w-full px-3 py-2 border border-gray-300 rounded-md shadow-sm sm:text-sm";
            (form::field_error(error))
        }
    }
}

fn register_view(values: &RegistrationForm, errors: &FieldErrors, message: Option<&str>) -> Markup {
    auth_shell(
        "Registro",
        "Crea tu cuenta",
        html! {
            @if let Some(message) = message {
                (layout::alert(message, "error"))
            }
            form class="mt-8 bg-white shadow rounded-lg p-6" action="/registro" method="post" novalidate {
                @for spec in REGISTRATION_FIELDS {
                    (form::field_input("registro", spec, &form::value_of(values, spec.name), errors.first(spec.name)))
                }
                (password_input("password", "Contraseña", errors.first("password")))
                (password_input("confirmar_password", "Confirmar contraseña", errors.first("confirmar_password")))
                div class="mb-4" {
                    label class="inline-flex items-center text-sm text-gray-700" {
                        input type="checkbox" name="acepta_terminos" checked[values.accepted_terms()] class="mr-2";
                        "Acepto los términos y condiciones"
                    }
                    (form::field_error(errors.first("acepta_terminos")))
                }
                p class="text-xs text-gray-500 mb-4" {
                    "Debes tener al menos " (MINIMUM_AGE) " años para registrarte."
                }
                (layout::button("Registrarme", "primary", false))
            }
            p class="text-center text-sm text-gray-600" {
                "¿Ya tienes cuenta? "
                a href="/login" class="font-medium text-primary hover:text-pink-700" { "Inicia sesión" }
            }
        },
    )
}

/// `GET /registro`
pub async fn register_page() -> Markup {
    register_view(&RegistrationForm::default(), &FieldErrors::new(), None)
}

/// `POST /registro`
pub async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, Response> {
    let today = Local::now().date_naive();

    if let Err(errors) = form.check(today) {
        monitoring::VALIDATION_REJECTIONS
            .with_label_values(&["registro"])
            .inc();
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            register_view(&form.without_secrets(), &errors, None),
        )
            .into_response());
    }

    match AuthService::new(state.client.clone()).register(&form).await {
        Ok(persona) => {
            info!("New registration, persona {:?}", persona.id);
            Ok(Redirect::to("/login?registrado=1").into_response())
        }
        Err(e) => {
            warn!("Registration failed: {}", e);
            let message = e.user_message("No se pudo completar el registro.");
            Err((
                StatusCode::BAD_GATEWAY,
                register_view(&form.without_secrets(), &FieldErrors::new(), Some(message.as_str())),
            )
                .into_response())
        }
    }
}
