pub mod registration;
pub mod session;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::client::{ApiClient, ApiError};
use crate::models::{LoginResponse, Persona};

use registration::{NewPersona, RegistrationForm};

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewAccount<'a> {
    id_persona: i64,
    email: &'a str,
    password: &'a str,
}

/// Login and sign-up calls against the backend's `/auth` endpoints
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        AuthService { client }
    }

    /// `POST /auth/login` -> `{ token, user: { persona } }`
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response: LoginResponse = self
            .client
            .post(
                "/auth/login",
                &Credentials {
                    email: email.trim(),
                    password,
                },
                None,
            )
            .await?;

        info!("Login succeeded for persona {:?}", response.user.persona.id);
        Ok(response)
    }

    pub async fn create_persona(&self, persona: &NewPersona) -> Result<Persona, ApiError> {
        self.client.post("/api/personas", persona, None).await
    }

    /// Create the persona, then the account bound to it. Returns the
    /// created persona; the account response is not interpreted.
    pub async fn register(&self, form: &RegistrationForm) -> Result<Persona, ApiError> {
        let persona = self.create_persona(&form.to_persona()).await?;

        let id_persona = persona
            .id
            .ok_or_else(|| ApiError::Decode("persona response without id".to_string()))?;

        let _: Value = self
            .client
            .post(
                "/auth/register",
                &NewAccount {
                    id_persona,
                    email: form.correo.trim(),
                    password: &form.password,
                },
                None,
            )
            .await?;

        info!("Registered persona {}", id_persona);
        Ok(persona)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::helpers::spawn_backend;
    use serde_json::json;
    use std::time::Duration;

    fn service(base_url: &str) -> AuthService {
        AuthService::new(ApiClient::new(base_url, Duration::from_secs(5)).unwrap())
    }

    fn form() -> RegistrationForm {
        RegistrationForm {
            nombre: "Ana".to_string(),
            apellido: "Gómez".to_string(),
            tipo_identificacion: "Pasaporte".to_string(),
            numero_identificacion: "X123".to_string(),
            fecha_nacimiento: "2000-01-31".to_string(),
            correo: "ana@example.com".to_string(),
            telefono: "3001234567".to_string(),
            password: "secreto".to_string(),
            confirmar_password: "secreto".to_string(),
            acepta_terminos: Some("on".to_string()),
        }
    }

    #[tokio::test]
    async fn test_login_parses_persona() {
        let backend = spawn_backend().await;
        backend.respond(
            "POST",
            "/auth/login",
            200,
            json!({
                "token": "jwt-abc",
                "user": { "persona": { "idPersona": 5, "nombre": "Ana", "rol": "Estudiante" } }
            }),
        );

        let login = service(&backend.base_url)
            .login(" ana@example.com ", "secreto")
            .await
            .unwrap();

        assert_eq!(login.token, "jwt-abc");
        assert_eq!(login.user.persona.id, Some(5));
        let body = backend.requests()[0].body.clone().unwrap();
        assert_eq!(body, json!({"email": "ana@example.com", "password": "secreto"}));
    }

    #[tokio::test]
    async fn test_bad_credentials_surface_backend_message() {
        let backend = spawn_backend().await;
        backend.fail_next(400, "Credenciales inválidas");

        let err = service(&backend.base_url)
            .login("ana@example.com", "mal")
            .await
            .unwrap_err();

        assert_eq!(err.user_message("fallback"), "Credenciales inválidas");
    }

    #[tokio::test]
    async fn test_register_creates_persona_then_account() {
        let backend = spawn_backend().await;
        backend.respond("POST", "/auth/register", 201, json!({"ok": true}));

        let persona = service(&backend.base_url).register(&form()).await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].path, "/api/personas");
        assert_eq!(requests[1].path, "/auth/register");

        let account = requests[1].body.clone().unwrap();
        assert_eq!(account["idPersona"], json!(persona.id.unwrap()));
        assert_eq!(account["email"], "ana@example.com");
    }

    #[tokio::test]
    async fn test_register_stops_when_persona_fails() {
        let backend = spawn_backend().await;
        backend.fail_next(409, "La persona ya existe");

        let err = service(&backend.base_url).register(&form()).await.unwrap_err();

        assert_eq!(err.status(), Some(409));
        assert_eq!(backend.requests().len(), 1);
    }
}
