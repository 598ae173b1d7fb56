#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::{Value, json};
use simsy_config::{ConfigLoader, models::sources::EnvConfig};
use simsy_core::api::routes::v1;
use simsy_core::application::AppUnitOfWork;
use simsy_core::auth::AuthCrypto;
use simsy_server::{AppState, create_app};
use tempfile::TempDir;

pub const PASSWORD: &str = "password123";

/// A router over the in-memory adapters with a throwaway media root.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    _media: TempDir,
}

pub fn state() -> (AppState, TempDir) {
    let media = TempDir::new().expect("media tempdir");
    let root = media.path().join("media").display().to_string();
    let vars: HashMap<String, String> = [
        ("SIMSY_DEV_MODE", "true"),
        ("SIMSY_MEDIA_ROOT", root.as_str()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let load = ConfigLoader::new()
        .load_with_env(EnvConfig::from_lookup(|name| vars.get(name).cloned()), false)
        .expect("dev config");
    let crypto = AuthCrypto::insecure_fast(
        &load.config.auth.password_pepper,
        &load.config.auth.token_key,
    )
    .expect("crypto");

    let state = AppState::new(
        Arc::new(load.config),
        AppUnitOfWork::in_memory(),
        None,
        crypto,
    );
    (state, media)
}

pub fn router() -> (Router, AppState, TempDir) {
    let (state, media) = state();
    (create_app(state.clone()), state, media)
}

impl TestApp {
    pub fn new() -> Self {
        let (app, state, media) = router();
        Self {
            server: TestServer::new(app).expect("test server"),
            state,
            _media: media,
        }
    }

    pub async fn register(&self, username: &str) -> Value {
        let response = self
            .server
            .post(v1::auth::REGISTER)
            .json(&json!({
                "username": username,
                "password": PASSWORD,
                "email": format!("{username}@example.com"),
            }))
            .await;
        response.json::<Value>()["data"].clone()
    }

    pub async fn login(&self, username: &str) -> String {
        let response = self
            .server
            .post(v1::auth::LOGIN)
            .json(&json!({ "username": username, "password": PASSWORD }))
            .await;
        response.json::<Value>()["data"]["token"]
            .as_str()
            .expect("session token")
            .to_string()
    }

    /// Register and log in. The first account of an app is staff.
    pub async fn sign_up(&self, username: &str) -> String {
        self.register(username).await;
        self.login(username).await
    }

    pub async fn create_show(&self, staff: &str, body: Value) -> i64 {
        let response = self
            .server
            .post(v1::shows::COLLECTION)
            .authorization_bearer(staff)
            .json(&body)
            .await;
        response.json::<Value>()["data"]["id"]
            .as_i64()
            .expect("show id")
    }
}
