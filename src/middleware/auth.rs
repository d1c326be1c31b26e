use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mongodb::bson::oid::ObjectId;

use crate::{
    error::ApiError,
    models::CurrentUser,
    services::{auth_service, user_service},
    AppState,
};

fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    for part in raw.split(';') {
        let part = part.trim();
        let mut it = part.splitn(2, '=');
        let k = it.next()?.trim();
        let v = it.next()?.trim();
        if k == name {
            return Some(v.to_string());
        }
    }
    None
}

/// Bearer token first, auth cookie second.
pub fn request_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    bearer.or_else(|| get_cookie(headers, cookie_name))
}

/// Resolves the request token to a `CurrentUser` in the request extensions.
///
/// The user is re-read from the database, so deleted accounts lose access
/// even while their token is still valid.
pub async fn inject_current_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = request_token(req.headers(), &state.settings.jwt_cookie_name) {
        if let Some(claims) = auth_service::decode_jwt(&state.settings, &token) {
            if let Ok(user_id) = ObjectId::parse_str(&claims.sub) {
                match user_service::find_user(&state, user_id).await {
                    Ok(Some(user)) => {
                        req.extensions_mut().insert(CurrentUser::from(user));
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!(error = %e, "could not load token user"),
                }
            }
        }
    }

    next.run(req).await
}

pub fn is_public_path(path: &str) -> bool {
    path == "/"
        || path == "/health"
        || path == "/health/db"
        || path == "/favicon.ico"
        || path == "/api/auth/login"
        || path == "/api/auth/register"
}

pub async fn require_auth(req: Request, next: Next) -> Response {
    if is_public_path(req.uri().path()) {
        return next.run(req).await;
    }

    // no matched route: let the fallback answer 404
    if req.extensions().get::<MatchedPath>().is_none() {
        return next.run(req).await;
    }

    // inject_current_user already put CurrentUser in extensions => authenticated
    if req.extensions().get::<CurrentUser>().is_some() {
        return next.run(req).await;
    }

    ApiError::Unauthorized("Access denied. No valid token provided.".to_string()).into_response()
}

pub async fn require_admin(req: Request, next: Next) -> Response {
    match req.extensions().get::<CurrentUser>() {
        Some(u) if u.is_admin() => next.run(req).await,
        Some(_) => ApiError::Forbidden("Access denied. Admins only.".to_string()).into_response(),
        None => ApiError::Unauthorized("Access denied. No valid token provided.".to_string()).into_response(),
    }
}
