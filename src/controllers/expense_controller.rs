use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::{Datelike, NaiveDate};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    models::{CurrentUser, ExpenseView},
    services::{
        calendar,
        expense_service::{self, ExpenseChanges, NewExpense},
    },
    AppState,
};

use super::{body_id, lenient_f64, message_only, non_blank, path_id, respond};

const NOT_FOUND: &str = "Expense record not found";

fn parse_amount(v: f64) -> ApiResult<f64> {
    if !v.is_finite() || v <= 0.0 {
        return Err(ApiError::validation("Amount must be a number greater than zero"));
    }
    Ok(v)
}

fn parse_date(raw: &str) -> ApiResult<NaiveDate> {
    calendar::parse_date(raw).map_err(ApiError::Validation)
}

pub async fn get_all_expenses(State(state): State<AppState>) -> ApiResult<Response> {
    let items = expense_service::list_expenses(&state).await?;
    let views = expense_service::to_views(&state, items).await?;
    Ok(respond(StatusCode::OK, "Expenses fetched successfully", "expenses", views))
}

pub async fn get_total_expenses(State(state): State<AppState>) -> ApiResult<Response> {
    let total = expense_service::total_expenses(&state).await?;
    Ok(respond(
        StatusCode::OK,
        "Total Expense Amount calculated successfully",
        "totalExpense",
        total,
    ))
}

pub async fn get_expense_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let id = path_id(&id, NOT_FOUND)?;
    let item = expense_service::get_expense(&state, id).await?;
    let mut views = expense_service::to_views(&state, vec![item]).await?;
    let view: Option<ExpenseView> = views.pop();
    Ok(respond(StatusCode::OK, "Expense fetched successfully", "expense", view))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub month: Option<String>,
    pub year: Option<String>,
}

impl SearchQuery {
    pub fn year(&self) -> ApiResult<Option<i32>> {
        match self.year.as_deref().map(str::trim).filter(|y| !y.is_empty()) {
            Some(y) => y
                .parse::<i32>()
                .map(Some)
                .map_err(|_| ApiError::validation(format!("Invalid year '{y}'"))),
            None => Ok(None),
        }
    }
}

pub async fn search_expense(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> ApiResult<Response> {
    let year = q.year()?;
    let items = expense_service::search_expenses(&state, q.month.as_deref(), year).await?;
    let views = expense_service::to_views(&state, items).await?;
    Ok(respond(StatusCode::OK, "Expenses fetched successfully", "expenses", views))
}

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,
    pub date: Option<String>,
    pub category: Option<String>,
    // defaults to the calling admin
    pub admin: Option<String>,
}

impl CreateExpenseRequest {
    pub fn validate(self, caller: ObjectId) -> ApiResult<NewExpense> {
        let missing = || ApiError::validation("All fields are required");

        let title = non_blank(self.title).ok_or_else(missing)?;
        let amount = parse_amount(self.amount.ok_or_else(missing)?)?;
        let date = parse_date(&non_blank(self.date).ok_or_else(missing)?)?;
        let category = body_id("category", &non_blank(self.category).ok_or_else(missing)?)?;
        let admin = match non_blank(self.admin) {
            Some(raw) => body_id("admin", &raw)?,
            None => caller,
        };

        Ok(NewExpense {
            title,
            amount,
            date,
            category,
            admin,
        })
    }
}

pub async fn create_expense(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    payload: Result<Json<CreateExpenseRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = payload?;
    let input = body.validate(caller.id)?;

    let item = expense_service::create_expense(&state, input).await?;
    let view = expense_service::to_views(&state, vec![item]).await?.pop();
    Ok(respond(StatusCode::CREATED, "Expense record created successfully", "expense", view))
}

/// Month and year are never accepted from the client; they follow `date`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateExpenseRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,
    pub date: Option<String>,
    pub category: Option<String>,
}

impl UpdateExpenseRequest {
    pub fn validate(self) -> ApiResult<ExpenseChanges> {
        Ok(ExpenseChanges {
            title: non_blank(self.title),
            amount: self.amount.map(parse_amount).transpose()?,
            date: non_blank(self.date).map(|d| parse_date(&d)).transpose()?,
            category: non_blank(self.category)
                .map(|c| body_id("category", &c))
                .transpose()?,
        })
    }
}

pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateExpenseRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let id = path_id(&id, NOT_FOUND)?;
    let Json(body) = payload?;
    let changes = body.validate()?;

    let item = expense_service::update_expense(&state, id, &changes).await?;
    let view = expense_service::to_views(&state, vec![item]).await?.pop();
    Ok(respond(StatusCode::OK, "Expense record updated successfully", "expense", view))
}

pub async fn delete_expense(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let id = path_id(&id, NOT_FOUND)?;
    expense_service::delete_expense(&state, id).await?;
    Ok(message_only(StatusCode::OK, "Expense record deleted successfully"))
}

pub async fn get_monthly_expense_data(State(state): State<AppState>) -> ApiResult<Response> {
    let year = calendar::today().year();
    let data = expense_service::monthly_rollup(&state, year).await?;
    Ok(respond(StatusCode::OK, "Monthly expense data fetched successfully", "data", data))
}

pub async fn get_yearly_expense_data(State(state): State<AppState>) -> ApiResult<Response> {
    let data = expense_service::yearly_rollup(&state).await?;
    Ok(respond(StatusCode::OK, "Yearly expense data fetched successfully", "data", data))
}
