use once_cell::sync::Lazy;
use std::env;

use crate::resource::WritePolicy;

#[derive(Debug, Clone)]
pub struct Settings {
    // App Settings
    pub app_name: String,
    pub version: String,
    /// `text` or `json`
    pub log_format: String,

    // Server Settings
    pub host: String,
    pub port: u16,

    // Backend Settings
    pub api_url: String,
    pub api_timeout_ms: u64,
    pub courses_path: String,
    pub write_policy: WritePolicy,

    // Session Settings
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub admin_roles: Vec<String>,
}

impl Settings {
    pub fn new() -> Self {
        Settings {
            app_name: get_env("APP_NAME", "FUNED Academia"),
            version: get_env("VERSION", "0.1.0"),
            log_format: get_env("LOG_FORMAT", "text"),

            host: get_env("HOST", "0.0.0.0"),
            port: get_env_int("PORT", 8080) as u16,

            api_url: normalize_base_url(&get_env("API_URL", "http://localhost:3000")),
            api_timeout_ms: get_env_int("API_TIMEOUT_MS", 15000) as u64,
            courses_path: get_env("COURSES_PATH", "/cursos"),
            write_policy: WritePolicy::parse(&get_env("WRITE_POLICY", "optimistic")),

            session_secret: get_env(
                "SESSION_SECRET",
                "change-this-to-a-secure-random-key-in-production",
            ),
            session_ttl_hours: get_env_int("SESSION_TTL_HOURS", 168) as i64,
            admin_roles: get_env("ADMIN_ROLES", "admin,administrador")
                .split(',')
                .map(|role| role.trim().to_string())
                .filter(|role| !role.is_empty())
                .collect(),
        }
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.trim().eq_ignore_ascii_case("json")
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

pub static SETTINGS: Lazy<Settings> = Lazy::new(Settings::new);

pub fn get_settings() -> &'static Settings {
    &SETTINGS
}

/// Strip trailing slashes so paths can be appended with a leading `/`
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_int(key: &str, default: i32) -> i32 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
