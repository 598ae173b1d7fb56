use std::collections::HashMap;
use std::fs;

use simsy_config::{
    ConfigGuardRailError, ConfigLoadError, ConfigLoader,
    models::sources::EnvConfig,
};
use tempfile::TempDir;

const STRONG_PEPPER: &str = "pepper-pepper-pepper-pepper-pepper";
const STRONG_KEY: &str = "token-key-token-key-token-key-token";

fn env(vars: &[(&str, &str)]) -> EnvConfig {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EnvConfig::from_lookup(|name| map.get(name).cloned())
}

fn media_var(dir: &TempDir) -> String {
    dir.path().join("media").display().to_string()
}

#[test]
fn dev_mode_accepts_defaults_with_warnings() {
    let dir = TempDir::new().unwrap();
    let media = media_var(&dir);
    let load = ConfigLoader::new()
        .load_with_env(
            env(&[("SIMSY_DEV_MODE", "true"), ("SIMSY_MEDIA_ROOT", &media)]),
            false,
        )
        .unwrap();

    assert!(load.config.dev_mode);
    assert_eq!(load.config.server.port, 8000);
    assert!(load.config.database.primary_url.is_none());
    assert!(dir.path().join("media").is_dir());
    assert!(
        load.warnings
            .items
            .iter()
            .any(|w| w.message.contains("placeholder"))
    );
}

#[test]
fn production_rejects_placeholder_secrets() {
    let dir = TempDir::new().unwrap();
    let media = media_var(&dir);
    let err = ConfigLoader::new()
        .load_with_env(env(&[("SIMSY_MEDIA_ROOT", &media)]), false)
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::WeakSecret {
            field: "AUTH_PASSWORD_PEPPER",
            ..
        })
    ));
}

#[test]
fn production_rejects_short_token_key() {
    let dir = TempDir::new().unwrap();
    let media = media_var(&dir);
    let err = ConfigLoader::new()
        .load_with_env(
            env(&[
                ("SIMSY_MEDIA_ROOT", &media),
                ("AUTH_PASSWORD_PEPPER", STRONG_PEPPER),
                ("AUTH_TOKEN_KEY", "short"),
            ]),
            false,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::WeakSecret {
            field: "AUTH_TOKEN_KEY",
            ..
        })
    ));
}

#[test]
fn production_rejects_wildcard_cors() {
    let dir = TempDir::new().unwrap();
    let media = media_var(&dir);
    let err = ConfigLoader::new()
        .load_with_env(
            env(&[
                ("SIMSY_MEDIA_ROOT", &media),
                ("AUTH_PASSWORD_PEPPER", STRONG_PEPPER),
                ("AUTH_TOKEN_KEY", STRONG_KEY),
                ("CORS_ALLOWED_ORIGINS", "https://simsy.example, *"),
            ]),
            false,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::DangerousCorsWildcard)
    ));
}

#[test]
fn environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let media = media_var(&dir);
    let path = dir.path().join("simsy.toml");
    fs::write(
        &path,
        format!(
            r#"
dev_mode = true

[server]
host = "127.0.0.1"
port = 9000

[database]
url = "postgresql://simsy@localhost/simsy"
max_connections = 4

[auth]
password_pepper = "{STRONG_PEPPER}"
token_key = "{STRONG_KEY}"
session_lifetime_hours = 12
"#
        ),
    )
    .unwrap();

    let load = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(
            env(&[
                ("SIMSY_PORT", "9100"),
                ("SIMSY_MEDIA_ROOT", &media),
                ("DATABASE_PASSWORD", "pw"),
            ]),
            false,
        )
        .unwrap();

    let config = load.config;
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.bind_address(), "127.0.0.1:9100");
    assert_eq!(
        config.database.primary_url.as_deref(),
        Some("postgresql://simsy:pw@localhost/simsy")
    );
    assert_eq!(config.database.max_connections, 4);
    assert_eq!(config.auth.session_lifetime_hours, 12);
    assert_eq!(config.metadata.config_path.as_deref(), Some(path.as_path()));
}

#[test]
fn missing_explicit_config_is_an_error() {
    let err = ConfigLoader::new()
        .with_config_path("/nonexistent/simsy.toml")
        .load_with_env(EnvConfig::default(), false)
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
}

#[test]
fn malformed_toml_reports_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("simsy.toml");
    fs::write(&path, "[server\nport = ").unwrap();
    let err = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(EnvConfig::default(), false)
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::Parse { .. }));
}
