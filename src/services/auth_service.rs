use axum_extra::extract::cookie::{Cookie, SameSite};
use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{
    config::Settings,
    error::{ApiError, ApiResult},
    models::{Role, User, UserStatus},
    AppState,
};

use super::user_service::{self, NewUser};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    // user id as hex string
    pub sub: String,
    pub role: Role,
    // expiry (unix timestamp seconds)
    pub exp: usize,
}

pub fn make_jwt(settings: &Settings, user_id: &ObjectId, role: Role) -> ApiResult<String> {
    let exp = (Utc::now() + Duration::days(settings.jwt_expiry_days)).timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_hex(),
        role,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("Auth error: {e}")))
}

pub fn decode_jwt(settings: &Settings, token: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &validation,
    )
    .ok()
    .map(|data| data.claims)
}

pub fn auth_cookie(settings: &Settings, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(settings.jwt_cookie_name.clone(), token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if settings.cookie_secure {
        cookie.set_secure(true);
    }
    cookie
}

pub async fn login_user(state: &AppState, email: &str, password: &str) -> ApiResult<User> {
    let invalid = || ApiError::Unauthorized("Invalid email or password.".to_string());

    let user = user_service::find_by_email(state, email).await?.ok_or_else(invalid)?;

    if !verify(password, &user.password).unwrap_or(false) {
        tracing::info!(email, "failed login");
        return Err(invalid());
    }

    Ok(user)
}

pub async fn register_user(
    state: &AppState,
    name: String,
    email: String,
    password: String,
    profile_picture: Option<String>,
) -> ApiResult<User> {
    user_service::create_user(
        state,
        NewUser {
            name,
            email,
            password,
            profile_picture,
            role: Role::Employee,
            status: UserStatus::Active,
        },
    )
    .await
}
