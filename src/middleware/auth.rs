use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::Principal;
use crate::config;
use crate::error::ApiError;
use crate::state::AppState;

/// Session authentication middleware: resolves the session cookie to a
/// `Principal` and injects it into the request. Runs before any route
/// logic; a missing or unknown session is a uniform 401. Role checks are
/// left to the mutating handlers.
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token_from_headers(request.headers())
        .ok_or_else(|| ApiError::unauthorized("User not logged in"))?;

    let principal = state
        .sessions
        .principal_for(&token)
        .await
        .map_err(|err| {
            tracing::error!("Session lookup failed: {}", err);
            ApiError::internal("An error occurred while processing your request")
        })?
        .ok_or_else(|| ApiError::unauthorized("User not logged in"))?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Extract the session token from the configured cookie.
fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookie_name = config::config().session.cookie_name.as_str();
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    raw.split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; beacon-session=tok-123; lang=en"),
        );
        assert_eq!(
            session_token_from_headers(&headers),
            Some("tok-123".to_string())
        );
    }

    #[test]
    fn missing_cookie_header_yields_none() {
        assert_eq!(session_token_from_headers(&HeaderMap::new()), None);
    }
}
