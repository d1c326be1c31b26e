use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    models::{CurrentUser, Role, UserStatus, UserView},
    services::user_service::{self, NewUser, UserChanges},
    AppState,
};

use super::{
    auth_controller::{validate_email, validate_password},
    non_blank, path_id, respond,
};

const NOT_FOUND: &str = "User not found";

pub async fn get_users(State(state): State<AppState>) -> ApiResult<Response> {
    let users: Vec<UserView> = user_service::list_users(&state)
        .await?
        .into_iter()
        .map(UserView::from)
        .collect();

    Ok(respond(StatusCode::OK, "Users fetched successfully", "users", users))
}

pub async fn get_user_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let id = path_id(&id, NOT_FOUND)?;
    let user = user_service::get_user(&state, id).await?;
    Ok(respond(StatusCode::OK, "User fetched successfully", "user", UserView::from(user)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl CreateUserRequest {
    pub fn validate(self) -> ApiResult<NewUser> {
        Ok(NewUser {
            name: non_blank(self.name).ok_or_else(|| ApiError::validation("Name is required."))?,
            email: validate_email(self.email)?,
            password: validate_password(self.password)?,
            profile_picture: non_blank(self.profile_picture),
            role: self.role.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
        })
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = payload?;
    let input = body.validate()?;

    let user = user_service::create_user(&state, input).await?;
    Ok(respond(StatusCode::CREATED, "User created successfully", "user", UserView::from(user)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl UpdateUserRequest {
    pub fn validate(self) -> ApiResult<UserChanges> {
        let email = match self.email {
            Some(e) => Some(validate_email(Some(e))?),
            None => None,
        };
        let password = match self.password {
            Some(p) => Some(validate_password(Some(p))?),
            None => None,
        };

        Ok(UserChanges {
            name: non_blank(self.name),
            email,
            password,
            profile_picture: non_blank(self.profile_picture),
            role: self.role,
            status: self.status,
        })
    }
}

/// Users may edit themselves; admins may edit anyone and are the only ones
/// allowed to change role or status.
pub fn check_update_allowed(caller: &CurrentUser, target: &mongodb::bson::oid::ObjectId, changes: &UserChanges) -> ApiResult<()> {
    if caller.is_admin() {
        return Ok(());
    }
    if caller.id != *target {
        return Err(ApiError::Forbidden("You can only update your own profile.".to_string()));
    }
    if changes.touches_access() {
        return Err(ApiError::Forbidden("Only admins can change role or status.".to_string()));
    }
    Ok(())
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let id = path_id(&id, NOT_FOUND)?;
    let Json(body) = payload?;
    let changes = body.validate()?;

    check_update_allowed(&caller, &id, &changes)?;

    let user = user_service::update_user(&state, id, changes).await?;
    Ok(respond(StatusCode::OK, "User updated successfully", "user", UserView::from(user)))
}

pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let id = path_id(&id, NOT_FOUND)?;
    let user = user_service::delete_user(&state, id).await?;

    tracing::info!(id = %user.id.to_hex(), "user deleted");

    Ok(respond(StatusCode::OK, "User deleted successfully", "user", UserView::from(user)))
}
