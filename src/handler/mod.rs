pub mod health;
pub mod ingest;
pub mod stream;

use crate::auth::CredentialRegistry;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use tracing::info;

/// Resolve the identity behind the `Authorization` header.
///
/// The header value is looked up verbatim as a credential digest.
pub(crate) fn authorize(
    headers: &HeaderMap,
    registry: &CredentialRegistry,
) -> Result<String, (StatusCode, &'static str)> {
    let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|token| !token.is_empty())
    else {
        info!("No auth header received");
        return Err((StatusCode::UNAUTHORIZED, "Unauthorized"));
    };

    match registry.authenticate(token) {
        Some(identity) => Ok(identity.to_string()),
        None => {
            info!("Unknown credentials");
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}
