//! API key check for the `/v1` endpoints.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// Key clients must present as `Authorization: Bearer <key>`.
#[derive(Clone)]
pub struct ApiKey(pub Arc<String>);

/// Middleware that requires the configured API key.
///
/// Browsers cannot set headers on WebSocket upgrades, so a `token` query
/// parameter is accepted as well.
pub async fn require_api_key(
    State(api_key): State<ApiKey>,
    request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let provided = match auth_header {
        Some(auth) => match auth.strip_prefix("Bearer ") {
            Some(token) => Some(token.trim().to_string()),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": "Invalid Authorization header format",
                        "expected": "Bearer <token>"
                    })),
                )
                    .into_response()
            }
        },
        None => query_token(request.uri().query()),
    };

    match provided {
        Some(token) if token == api_key.0.as_str() => next.run(request).await,
        Some(_) => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({
                "error": "Invalid API key",
                "hint": "Check TREK_API_KEY environment variable"
            })),
        )
            .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "Authorization required",
                "hint": "Add header: Authorization: Bearer <api_key>"
            })),
        )
            .into_response(),
    }
}

fn query_token(query: Option<&str>) -> Option<String> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "token")
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_token() {
        assert_eq!(query_token(Some("token=abc")), Some("abc".to_string()));
        assert_eq!(query_token(Some("x=1&token=abc")), Some("abc".to_string()));
        assert_eq!(query_token(Some("token=")), None);
        assert_eq!(query_token(Some("x=1")), None);
        assert_eq!(query_token(None), None);
    }
}
