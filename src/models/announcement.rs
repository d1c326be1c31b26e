use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::UserView;

pub const COLLECTION: &str = "announcements";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementStatus {
    #[default]
    Active,
    Inactive,
}

impl AnnouncementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementStatus::Active => "active",
            AnnouncementStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub announcement: String,

    #[serde(default)]
    pub status: AnnouncementStatus,

    // owning admin
    pub admin: ObjectId,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementView {
    pub id: String,
    pub announcement: String,
    pub status: AnnouncementStatus,
    pub admin: String,
    // null when the admin account no longer exists
    #[serde(rename = "adminProfile")]
    pub admin_profile: Option<UserView>,
}

impl AnnouncementView {
    pub fn new(a: Announcement, admin_profile: Option<UserView>) -> Self {
        Self {
            id: a.id.to_hex(),
            announcement: a.announcement,
            status: a.status,
            admin: a.admin.to_hex(),
            admin_profile,
        }
    }
}
