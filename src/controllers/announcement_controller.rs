use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    models::{AnnouncementStatus, CurrentUser},
    services::announcement_service,
    AppState,
};

use super::{body_id, non_blank, path_id, respond};

const NOT_FOUND: &str = "Announcement not found";

pub async fn get_announcements(State(state): State<AppState>) -> ApiResult<Response> {
    let items = announcement_service::list_announcements(&state).await?;
    let views = announcement_service::to_views(&state, items).await?;
    Ok(respond(StatusCode::OK, "Announcements fetched successfully", "announcements", views))
}

pub async fn get_active_announcements(State(state): State<AppState>) -> ApiResult<Response> {
    let items = announcement_service::list_active(&state).await?;
    let views = announcement_service::to_views(&state, items).await?;
    Ok(respond(
        StatusCode::OK,
        "Active announcements fetched successfully",
        "announcements",
        views,
    ))
}

pub async fn get_announcement_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let id = path_id(&id, NOT_FOUND)?;
    let item = announcement_service::get_announcement(&state, id).await?;
    let view = announcement_service::to_view(&state, item).await?;
    Ok(respond(StatusCode::OK, "Announcement fetched successfully", "announcement", view))
}

#[derive(Debug, Deserialize)]
pub struct CreateAnnouncementRequest {
    pub announcement: Option<String>,
    // defaults to the calling admin
    pub admin: Option<String>,
}

pub async fn create_announcement(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    payload: Result<Json<CreateAnnouncementRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = payload?;

    let text = non_blank(body.announcement).ok_or_else(|| ApiError::validation("Missing required fields"))?;
    let admin = match non_blank(body.admin) {
        Some(raw) => body_id("admin", &raw)?,
        None => caller.id,
    };

    let item = announcement_service::create_announcement(&state, text, admin).await?;
    let view = announcement_service::to_view(&state, item).await?;
    Ok(respond(StatusCode::CREATED, "Announcement created successfully", "announcement", view))
}

#[derive(Debug, Deserialize)]
pub struct UpdateAnnouncementRequest {
    pub announcement: Option<String>,
    pub status: Option<AnnouncementStatus>,
}

pub async fn update_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateAnnouncementRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let id = path_id(&id, NOT_FOUND)?;
    let Json(body) = payload?;

    let item = announcement_service::update_announcement(&state, id, non_blank(body.announcement), body.status).await?;
    let view = announcement_service::to_view(&state, item).await?;
    Ok(respond(StatusCode::OK, "Announcement updated successfully", "announcement", view))
}

pub async fn delete_announcement(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let id = path_id(&id, NOT_FOUND)?;
    let item = announcement_service::delete_announcement(&state, id).await?;
    Ok(respond(
        StatusCode::OK,
        "Announcement deleted successfully",
        "announcement",
        announcement_service::to_view(&state, item).await?,
    ))
}
