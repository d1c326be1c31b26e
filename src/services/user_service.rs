use std::collections::HashMap;

use bcrypt::{hash, DEFAULT_COST};
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};

use crate::{
    error::{is_duplicate_key, ApiError, ApiResult},
    models::{user, Role, User, UserStatus, UserView},
    AppState,
};

fn not_found() -> ApiError {
    ApiError::not_found("User not found")
}

fn email_taken() -> ApiError {
    ApiError::Conflict("Email has already been taken!".to_string())
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub profile_picture: Option<String>,
    pub role: Role,
    pub status: UserStatus,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl UserChanges {
    pub fn touches_access(&self) -> bool {
        self.role.is_some() || self.status.is_some()
    }
}

pub fn hash_password(password: &str) -> ApiResult<String> {
    hash(password, DEFAULT_COST).map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))
}

pub async fn find_user(state: &AppState, id: ObjectId) -> ApiResult<Option<User>> {
    Ok(state
        .db
        .collection::<User>(user::COLLECTION)
        .find_one(doc! { "_id": id }, None)
        .await?)
}

pub async fn find_by_email(state: &AppState, email: &str) -> ApiResult<Option<User>> {
    Ok(state
        .db
        .collection::<User>(user::COLLECTION)
        .find_one(doc! { "email": email }, None)
        .await?)
}

pub async fn get_user(state: &AppState, id: ObjectId) -> ApiResult<User> {
    find_user(state, id).await?.ok_or_else(not_found)
}

pub async fn list_users(state: &AppState) -> ApiResult<Vec<User>> {
    let users = state.db.collection::<User>(user::COLLECTION);
    let find_opts = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();

    let mut cursor = users.find(doc! {}, find_opts).await?;

    let mut out: Vec<User> = vec![];
    while let Some(res) = cursor.next().await {
        out.push(res?);
    }
    Ok(out)
}

/// Public profiles for the given ids. Ids without a user are simply absent.
pub async fn views_by_ids(state: &AppState, ids: &[ObjectId]) -> ApiResult<HashMap<ObjectId, UserView>> {
    let mut unique: Vec<ObjectId> = ids.to_vec();
    unique.sort();
    unique.dedup();

    if unique.is_empty() {
        return Ok(HashMap::new());
    }

    let users = state.db.collection::<User>(user::COLLECTION);
    let mut cursor = users.find(doc! { "_id": { "$in": unique } }, None).await?;

    let mut out = HashMap::new();
    while let Some(res) = cursor.next().await {
        let u = res?;
        out.insert(u.id, UserView::from(u));
    }
    Ok(out)
}

pub async fn create_user(state: &AppState, input: NewUser) -> ApiResult<User> {
    if find_by_email(state, &input.email).await?.is_some() {
        return Err(email_taken());
    }

    let u = User {
        id: ObjectId::new(),
        name: input.name,
        email: input.email,
        password: hash_password(&input.password)?,
        profile_picture: input.profile_picture,
        role: input.role,
        status: input.status,
        created_at: Some(DateTime::now()),
    };

    state
        .db
        .collection::<User>(user::COLLECTION)
        .insert_one(&u, None)
        .await
        .map_err(|e| if is_duplicate_key(&e) { email_taken() } else { ApiError::Database(e) })?;

    tracing::info!(id = %u.id.to_hex(), role = u.role.as_str(), "user created");

    Ok(u)
}

pub async fn update_user(state: &AppState, id: ObjectId, changes: UserChanges) -> ApiResult<User> {
    let mut set = Document::new();

    if let Some(name) = changes.name {
        set.insert("name", name);
    }
    if let Some(email) = changes.email {
        set.insert("email", email);
    }
    if let Some(password) = changes.password {
        set.insert("password", hash_password(&password)?);
    }
    if let Some(pic) = changes.profile_picture {
        set.insert("profilePicture", pic);
    }
    if let Some(role) = changes.role {
        set.insert("role", role.as_str());
    }
    if let Some(status) = changes.status {
        set.insert("status", status.as_str());
    }

    if set.is_empty() {
        return get_user(state, id).await;
    }

    let opts = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    state
        .db
        .collection::<User>(user::COLLECTION)
        .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, opts)
        .await
        .map_err(|e| if is_duplicate_key(&e) { email_taken() } else { ApiError::Database(e) })?
        .ok_or_else(not_found)
}

pub async fn delete_user(state: &AppState, id: ObjectId) -> ApiResult<User> {
    state
        .db
        .collection::<User>(user::COLLECTION)
        .find_one_and_delete(doc! { "_id": id }, None)
        .await?
        .ok_or_else(not_found)
}
