use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    models::TaxView,
    services::{calendar, tax_service},
    AppState,
};

use super::{lenient_f64, message_only, non_blank, path_id, respond};

const NOT_FOUND: &str = "Tax record not found";

#[derive(Debug, Deserialize)]
pub struct TaxRequest {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub percentage: Option<f64>,
    pub date: Option<String>,
}

impl TaxRequest {
    /// Both create and update need a percentage in (0, 100] and a date.
    pub fn validate(self) -> ApiResult<(f64, NaiveDate)> {
        let (Some(percentage), Some(date)) = (self.percentage, non_blank(self.date)) else {
            return Err(ApiError::validation("Percentage and date are required"));
        };

        if !percentage.is_finite() || percentage <= 0.0 || percentage > 100.0 {
            return Err(ApiError::validation("Percentage must be greater than 0 and at most 100"));
        }

        let date = calendar::parse_date(&date).map_err(ApiError::Validation)?;
        Ok((percentage, date))
    }
}

pub async fn get_taxes(State(state): State<AppState>) -> ApiResult<Response> {
    let taxes: Vec<TaxView> = tax_service::list_taxes(&state)
        .await?
        .into_iter()
        .map(TaxView::from)
        .collect();

    Ok(respond(StatusCode::OK, "Taxes fetched successfully", "taxes", taxes))
}

pub async fn get_tax_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let id = path_id(&id, NOT_FOUND)?;
    let tax = tax_service::get_tax(&state, id).await?;
    Ok(respond(StatusCode::OK, "Tax fetched successfully", "tax", TaxView::from(tax)))
}

pub async fn create_tax(
    State(state): State<AppState>,
    payload: Result<Json<TaxRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = payload?;
    let (percentage, date) = body.validate()?;

    let tax = tax_service::create_tax(&state, percentage, date).await?;
    Ok(respond(StatusCode::CREATED, "Tax record created successfully", "tax", TaxView::from(tax)))
}

pub async fn update_tax(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TaxRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let id = path_id(&id, NOT_FOUND)?;
    let Json(body) = payload?;
    let (percentage, date) = body.validate()?;

    let tax = tax_service::update_tax(&state, id, percentage, date).await?;
    Ok(respond(StatusCode::OK, "Tax updated successfully", "tax", TaxView::from(tax)))
}

pub async fn delete_tax(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let id = path_id(&id, NOT_FOUND)?;
    tax_service::delete_tax(&state, id).await?;
    Ok(message_only(StatusCode::OK, "Tax record deleted successfully"))
}

pub async fn get_tax_summary(State(state): State<AppState>) -> ApiResult<Response> {
    let summary = tax_service::summary(&state).await?;
    Ok(respond(StatusCode::OK, "Tax summary fetched successfully", "data", summary))
}
