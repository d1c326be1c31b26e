use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

use crate::{
    error::{ApiError, ApiResult},
    models::{announcement, Announcement, AnnouncementStatus, AnnouncementView},
    AppState,
};

use super::user_service;

fn not_found() -> ApiError {
    ApiError::not_found("Announcement not found")
}

async fn find_many(state: &AppState, filter: Document) -> ApiResult<Vec<Announcement>> {
    let mut cursor = state
        .db
        .collection::<Announcement>(announcement::COLLECTION)
        .find(filter, None)
        .await?;

    let mut out: Vec<Announcement> = vec![];
    while let Some(res) = cursor.next().await {
        out.push(res?);
    }
    Ok(out)
}

pub async fn to_views(state: &AppState, items: Vec<Announcement>) -> ApiResult<Vec<AnnouncementView>> {
    let ids: Vec<ObjectId> = items.iter().map(|a| a.admin).collect();
    let admins = user_service::views_by_ids(state, &ids).await?;

    Ok(items
        .into_iter()
        .map(|a| {
            let profile = admins.get(&a.admin).cloned();
            AnnouncementView::new(a, profile)
        })
        .collect())
}

pub async fn to_view(state: &AppState, item: Announcement) -> ApiResult<AnnouncementView> {
    let profile = user_service::find_user(state, item.admin).await?.map(Into::into);
    Ok(AnnouncementView::new(item, profile))
}

pub async fn list_announcements(state: &AppState) -> ApiResult<Vec<Announcement>> {
    find_many(state, doc! {}).await
}

pub async fn list_active(state: &AppState) -> ApiResult<Vec<Announcement>> {
    find_many(state, doc! { "status": AnnouncementStatus::Active.as_str() }).await
}

pub async fn get_announcement(state: &AppState, id: ObjectId) -> ApiResult<Announcement> {
    state
        .db
        .collection::<Announcement>(announcement::COLLECTION)
        .find_one(doc! { "_id": id }, None)
        .await?
        .ok_or_else(not_found)
}

pub async fn create_announcement(state: &AppState, text: String, admin: ObjectId) -> ApiResult<Announcement> {
    let a = Announcement {
        id: ObjectId::new(),
        announcement: text,
        status: AnnouncementStatus::Active,
        admin,
    };

    state
        .db
        .collection::<Announcement>(announcement::COLLECTION)
        .insert_one(&a, None)
        .await?;

    Ok(a)
}

pub async fn update_announcement(
    state: &AppState,
    id: ObjectId,
    text: Option<String>,
    status: Option<AnnouncementStatus>,
) -> ApiResult<Announcement> {
    let mut set = Document::new();
    if let Some(text) = text {
        set.insert("announcement", text);
    }
    if let Some(status) = status {
        set.insert("status", status.as_str());
    }

    if set.is_empty() {
        return get_announcement(state, id).await;
    }

    let opts = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    state
        .db
        .collection::<Announcement>(announcement::COLLECTION)
        .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, opts)
        .await?
        .ok_or_else(not_found)
}

pub async fn delete_announcement(state: &AppState, id: ObjectId) -> ApiResult<Announcement> {
    state
        .db
        .collection::<Announcement>(announcement::COLLECTION)
        .find_one_and_delete(doc! { "_id": id }, None)
        .await?
        .ok_or_else(not_found)
}
