use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Settings;
use crate::models::Persona;

pub const SESSION_COOKIE: &str = "funed_session";

/// Who is using the app, passed explicitly to whatever needs it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    persona: Option<Persona>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn login(&mut self, token: String, persona: Persona) {
        self.token = Some(token).filter(|t| !t.is_empty());
        self.persona = Some(persona);
    }

    pub fn logout(&mut self) {
        self.token = None;
        self.persona = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Backend bearer token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn persona(&self) -> Option<&Persona> {
        self.persona.as_ref()
    }

    pub fn role(&self) -> Option<&str> {
        self.persona.as_ref().and_then(|p| p.rol.as_deref())
    }

    /// Role check ignoring case and accents
    pub fn has_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        let Some(role) = self.role().map(fold) else {
            return false;
        };
        !role.is_empty() && roles.iter().any(|r| fold(r.as_ref()) == role)
    }
}

/// Lowercase and strip Spanish diacritics
fn fold(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// JWT session claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Session id, keys per-session server state
    pub sid: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Backend bearer token
    pub token: String,
    pub persona: Persona,
}

/// Signing material for session cookies
#[derive(Clone)]
pub struct SessionKeys {
    secret: Arc<str>,
    ttl_hours: i64,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        SessionKeys {
            secret: Arc::from(secret),
            ttl_hours,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.session_secret, settings.session_ttl_hours)
    }

    pub fn ttl_hours(&self) -> i64 {
        self.ttl_hours
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl_hours", &self.ttl_hours)
            .finish_non_exhaustive()
    }
}

/// Sign a new session for a logged-in persona
pub fn create_session_token(keys: &SessionKeys, token: &str, persona: &Persona) -> Result<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(keys.ttl_hours);

    let claims = SessionClaims {
        sid: Uuid::now_v7().simple().to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
        token: token.to_string(),
        persona: persona.clone(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(keys.secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a session token
pub fn verify_session_token(keys: &SessionKeys, token: &str) -> Result<SessionClaims> {
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(keys.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| anyhow!("Invalid session token: {}", e))?;

    Ok(token_data.claims)
}

pub fn create_session_cookie(keys: &SessionKeys, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(keys.ttl_hours))
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .build()
}

/// Authenticated session decoded from the cookie. Requests without a valid
/// cookie are redirected to the login page; use `Option<SessionCookie>`
/// where anonymous access is fine.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    sid: String,
    expires_at: i64,
    session: Session,
}

impl SessionCookie {
    pub fn from_claims(claims: SessionClaims) -> Self {
        let mut session = Session::anonymous();
        session.login(claims.token, claims.persona);
        SessionCookie {
            sid: claims.sid,
            expires_at: claims.exp,
            session,
        }
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Unix timestamp after which the cookie is no longer accepted
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn display_name(&self) -> String {
        self.session
            .persona()
            .map(Persona::full_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Usuario".to_string())
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionCookie
where
    SessionKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let login = || {
            let next = urlencoding::encode(parts.uri.path()).into_owned();
            Redirect::to(&format!("/login?next={}", next)).into_response()
        };

        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Err(login());
        };

        match verify_session_token(&keys, cookie.value()) {
            Ok(claims) => Ok(SessionCookie::from_claims(claims)),
            Err(e) => {
                tracing::debug!("Rejected session cookie: {}", e);
                Err(login())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(rol: &str) -> Persona {
        Persona {
            id: Some(5),
            nombre: "Ana".to_string(),
            apellido: "Gómez".to_string(),
            rol: Some(rol.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_login_logout() {
        let mut session = Session::anonymous();
        assert!(!session.is_authenticated());

        session.login("tok".to_string(), persona("Estudiante"));
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("tok"));

        session.logout();
        assert!(!session.is_authenticated());
        assert!(session.persona().is_none());
    }

    #[test]
    fn test_role_check_ignores_case_and_accents() {
        let mut session = Session::anonymous();
        session.login("tok".to_string(), persona("Administradór"));

        assert!(session.has_role(&["admin", "administrador"]));
        assert!(!session.has_role(&["estudiante"]));
        assert!(!Session::anonymous().has_role(&["admin"]));
    }

    #[test]
    fn test_token_round_trip() {
        let keys = SessionKeys::new("secret", 1);
        let token = create_session_token(&keys, "backend-token", &persona("admin")).unwrap();

        let claims = verify_session_token(&keys, &token).unwrap();

        assert_eq!(claims.token, "backend-token");
        assert_eq!(claims.persona.id, Some(5));
        assert_eq!(claims.sid.len(), 32);

        let cookie = SessionCookie::from_claims(claims.clone());
        assert_eq!(cookie.sid(), claims.sid);
        assert_eq!(cookie.expires_at(), claims.exp);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token =
            create_session_token(&SessionKeys::new("one", 1), "t", &persona("admin")).unwrap();

        assert!(verify_session_token(&SessionKeys::new("two", 1), &token).is_err());
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = create_session_cookie(&SessionKeys::new("s", 2), "value".to_string());

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(2)));
        assert_eq!(clear_session_cookie().max_age(), Some(time::Duration::ZERO));
    }
}
