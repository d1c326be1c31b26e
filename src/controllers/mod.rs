use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use serde_json::json;

use crate::error::ApiError;

pub mod home_controller;
pub mod auth_controller;
pub mod user_controller;
pub mod announcement_controller;
pub mod expense_controller;
pub mod tax_controller;
pub mod profit_controller;

/// Success envelope: `{ success: true, message, <field>: data }`.
pub fn respond<T: Serialize>(status: StatusCode, message: &str, field: &str, data: T) -> Response {
    let data = match serde_json::to_value(data) {
        Ok(v) => v,
        Err(e) => return ApiError::Internal(e.to_string()).into_response(),
    };

    let mut body = serde_json::Map::new();
    body.insert("success".into(), json!(true));
    body.insert("message".into(), json!(message));
    body.insert(field.into(), data);

    (status, Json(serde_json::Value::Object(body))).into_response()
}

pub fn message_only(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": true, "message": message }))).into_response()
}

/// Ids in the path. A malformed id can never match a record, so it is a 404.
pub fn path_id(raw: &str, not_found: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| ApiError::not_found(not_found))
}

/// Ids referenced from a request body.
pub fn body_id(field: &str, raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| ApiError::validation(format!("Invalid {field} id")))
}

/// Trimmed, non-empty text or `None`.
pub fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Accepts a JSON number or a numeric string; blank strings count as absent.
pub fn lenient_f64<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(d)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid number '{s}'"))),
    }
}
