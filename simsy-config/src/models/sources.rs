use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::util::{non_blank, parse_bool, parse_csv};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub media: FileMediaConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileMediaConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_pepper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_lifetime_hours: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_user_is_staff: Option<bool>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_url_file: Option<PathBuf>,
    pub database_host: Option<String>,
    pub database_port: Option<u16>,
    pub database_user: Option<String>,
    pub database_name: Option<String>,
    pub database_password: Option<String>,
    pub database_password_file: Option<PathBuf>,
    pub database_max_connections: Option<u32>,
    pub media_root: Option<PathBuf>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub cors_allowed_methods: Option<Vec<String>>,
    pub cors_allowed_headers: Option<Vec<String>>,
    pub cors_allow_credentials: Option<bool>,
    pub dev_mode: Option<bool>,
    pub auth_password_pepper: Option<String>,
    pub auth_token_key: Option<String>,
    pub auth_session_lifetime_hours: Option<i64>,
    pub auth_first_user_is_staff: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| non_blank(lookup(name));
        let path = |name: &str| var(name).map(PathBuf::from);
        let flag = |name: &str| var(name).and_then(|raw| parse_bool(&raw));
        let csv = |name: &str| var(name).map(|raw| parse_csv(&raw));

        Self {
            config_path: path("SIMSY_CONFIG"),
            server_host: var("SIMSY_HOST"),
            server_port: var("SIMSY_PORT").and_then(|s| s.parse().ok()),
            database_url: var("DATABASE_URL"),
            database_url_file: path("DATABASE_URL_FILE"),
            database_host: var("DATABASE_HOST"),
            database_port: var("DATABASE_PORT").and_then(|s| s.parse().ok()),
            database_user: var("DATABASE_USER"),
            database_name: var("DATABASE_NAME"),
            database_password: var("DATABASE_PASSWORD"),
            database_password_file: path("DATABASE_PASSWORD_FILE"),
            database_max_connections: var("DATABASE_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok()),
            media_root: path("SIMSY_MEDIA_ROOT"),

            cors_allowed_origins: csv("CORS_ALLOWED_ORIGINS"),
            cors_allowed_methods: csv("CORS_ALLOWED_METHODS"),
            cors_allowed_headers: csv("CORS_ALLOWED_HEADERS"),
            cors_allow_credentials: flag("CORS_ALLOW_CREDENTIALS"),

            dev_mode: flag("SIMSY_DEV_MODE"),

            auth_password_pepper: var("AUTH_PASSWORD_PEPPER"),
            auth_token_key: var("AUTH_TOKEN_KEY"),
            auth_session_lifetime_hours: var("AUTH_SESSION_LIFETIME_HOURS")
                .and_then(|s| s.parse().ok()),
            auth_first_user_is_staff: flag("AUTH_FIRST_USER_IS_STAFF"),
        }
    }
}
