use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{ApiError, ApiResult},
    models::{CurrentUser, UserView},
    services::{auth_service, user_service},
    AppState,
};

use super::{non_blank, respond};

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn is_valid_email(email: &str) -> bool {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

/// Normalized email, or a validation error.
pub fn validate_email(raw: Option<String>) -> ApiResult<String> {
    let email = non_blank(raw).ok_or_else(|| ApiError::validation("Email is required."))?;
    if !is_valid_email(&email) {
        return Err(ApiError::validation("Please enter a valid email."));
    }
    Ok(email.to_lowercase())
}

pub fn validate_password(raw: Option<String>) -> ApiResult<String> {
    let password = raw
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Password is required."))?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    Ok(password)
}

// ---------------- REGISTER ----------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
}

pub async fn post_register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = payload?;

    let name = non_blank(body.name).ok_or_else(|| ApiError::validation("Name is required."))?;
    let email = validate_email(body.email)?;
    let password = validate_password(body.password)?;

    let user = auth_service::register_user(&state, name, email, password, non_blank(body.profile_picture)).await?;

    Ok(respond(
        StatusCode::CREATED,
        "Account created successfully",
        "user",
        UserView::from(user),
    ))
}

// ---------------- LOGIN ----------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn post_login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = payload?;

    let email = validate_email(body.email)?;
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::validation("Password is required."))?;

    let user = auth_service::login_user(&state, &email, &password).await?;
    let token = auth_service::make_jwt(&state.settings, &user.id, user.role)?;

    let jar = jar.add(auth_service::auth_cookie(&state.settings, token.clone()));

    tracing::info!(user = %user.id.to_hex(), "login");

    let body = json!({
        "success": true,
        "message": "Logged in successfully",
        "token": token,
        "user": UserView::from(user),
    });

    Ok((StatusCode::OK, jar, Json(body)).into_response())
}

// ---------------- ME ----------------

pub async fn get_me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Response> {
    let user = user_service::get_user(&state, current.id).await?;
    Ok(respond(StatusCode::OK, "User fetched successfully", "user", UserView::from(user)))
}
