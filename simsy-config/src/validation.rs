use axum::http::{Method, header::HeaderName};
use thiserror::Error;

use crate::constants::MIN_SECRET_LENGTH;
use crate::models::{AuthConfig, Config, CorsConfig};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("authentication secret {field} {reason}")]
    WeakSecret { field: &'static str, reason: String },
    #[error("CORS wildcard origins are not allowed when SIMSY_DEV_MODE is false")]
    DangerousCorsWildcard,
    #[error("invalid CORS configuration: {reason}")]
    InvalidCorsConfig { reason: String },
    #[error("session lifetime must be positive, got {hours} hours")]
    InvalidSessionLifetime { hours: i64 },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(&mut self, message: S, hint: H) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    /// Emit every warning through `tracing`.
    pub fn log(&self) {
        for warning in &self.items {
            match &warning.hint {
                Some(hint) => tracing::warn!(hint = %hint, "{}", warning.message),
                None => tracing::warn!("{}", warning.message),
            }
        }
    }
}

pub fn apply_guard_rails(config: &Config) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.auth.session_lifetime_hours <= 0 {
        return Err(ConfigGuardRailError::InvalidSessionLifetime {
            hours: config.auth.session_lifetime_hours,
        });
    }

    if config.dev_mode {
        if config.auth.is_default_pepper() || config.auth.is_default_token_key() {
            warnings.push_with_hint(
                "Using placeholder authentication secrets",
                "Set AUTH_PASSWORD_PEPPER and AUTH_TOKEN_KEY before leaving dev mode",
            );
        }
    } else {
        enforce_secrets(&config.auth)?;
        if config.cors.is_wildcard_included() {
            return Err(ConfigGuardRailError::DangerousCorsWildcard);
        }
    }

    validate_cors(&config.cors)?;

    if config.database.primary_url.is_none() {
        warnings.push_with_hint(
            "No database configured",
            "Set DATABASE_URL, or run the server with --in-memory for a throwaway catalog",
        );
    }

    if config.cors.allow_credentials && config.cors.is_wildcard_included() {
        warnings.push(
            "CORS credentials allowed alongside wildcard origin; browsers will reject such configuration",
        );
    }

    Ok(warnings)
}

fn enforce_secrets(auth: &AuthConfig) -> Result<(), ConfigGuardRailError> {
    let secrets = [
        ("AUTH_PASSWORD_PEPPER", &auth.password_pepper, auth.is_default_pepper()),
        ("AUTH_TOKEN_KEY", &auth.token_key, auth.is_default_token_key()),
    ];
    for (field, value, is_default) in secrets {
        if is_default {
            return Err(ConfigGuardRailError::WeakSecret {
                field,
                reason: "uses the default placeholder value".into(),
            });
        }
        if value.len() < MIN_SECRET_LENGTH {
            return Err(ConfigGuardRailError::WeakSecret {
                field,
                reason: format!("must be at least {MIN_SECRET_LENGTH} characters"),
            });
        }
    }
    Ok(())
}

fn validate_cors(cors: &CorsConfig) -> Result<(), ConfigGuardRailError> {
    if cors.allowed_methods.is_empty() {
        return Err(ConfigGuardRailError::InvalidCorsConfig {
            reason: "CORS_ALLOWED_METHODS must include at least one HTTP method".into(),
        });
    }

    for method in &cors.allowed_methods {
        Method::from_bytes(method.as_bytes()).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!("invalid HTTP method `{method}` in CORS_ALLOWED_METHODS"),
            }
        })?;
    }

    for header in &cors.allowed_headers {
        HeaderName::from_bytes(header.as_bytes()).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!("invalid header name `{header}` in CORS_ALLOWED_HEADERS"),
            }
        })?;
    }

    Ok(())
}
