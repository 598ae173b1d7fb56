pub mod auth;
pub mod catalog;
pub mod health;
pub mod home;
pub mod images;
pub mod search;
pub mod shows;
pub mod users;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::infra::errors::{AppError, AppResult};

/// Parse an optional JSON body. An empty body yields `T::default()`.
pub(crate) fn json_or_default<T>(body: &Bytes) -> AppResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| AppError::bad_request(format!("Invalid JSON body: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use simsy_core::application::ProgressUpdate;

    #[test]
    fn empty_body_is_default() {
        let parsed: ProgressUpdate = json_or_default(&Bytes::new()).unwrap();
        assert_eq!(parsed, ProgressUpdate::default());
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let err = json_or_default::<ProgressUpdate>(&Bytes::from_static(b"{")).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
