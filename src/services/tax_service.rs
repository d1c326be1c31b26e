use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument, UpdateOptions};
use serde::Serialize;

use crate::{
    error::{ensure_deleted, is_duplicate_key, ApiError, ApiResult},
    models::{tax, Tax},
    AppState,
};

use super::calendar::{self, Period};

fn not_found() -> ApiError {
    ApiError::not_found("Tax record not found")
}

fn already_exists(period: &Period) -> ApiError {
    ApiError::Conflict(format!("Tax for {} already exists.", period.label()))
}

pub async fn list_taxes(state: &AppState) -> ApiResult<Vec<Tax>> {
    let taxes = state.db.collection::<Tax>(tax::COLLECTION);
    let find_opts = FindOptions::builder().sort(doc! { "date": 1 }).build();

    let mut cursor = taxes.find(doc! {}, find_opts).await?;

    let mut out: Vec<Tax> = vec![];
    while let Some(res) = cursor.next().await {
        out.push(res?);
    }
    Ok(out)
}

pub async fn get_tax(state: &AppState, id: ObjectId) -> ApiResult<Tax> {
    state
        .db
        .collection::<Tax>(tax::COLLECTION)
        .find_one(doc! { "_id": id }, None)
        .await?
        .ok_or_else(not_found)
}

/// Inserts a tax record unless its (month, year) is already taken.
///
/// The upsert only writes on insert, so an existing period is left untouched
/// and a concurrent duplicate loses on the unique index instead of inserting.
pub async fn create_tax(state: &AppState, percentage: f64, date: NaiveDate) -> ApiResult<Tax> {
    let period = Period::of(date);
    let taxes = state.db.collection::<Tax>(tax::COLLECTION);

    let new_id = ObjectId::new();
    let bson_date = calendar::to_bson(date);

    let res = taxes
        .update_one(
            doc! { "month": period.month, "year": period.year },
            doc! {
                "$setOnInsert": {
                    "_id": new_id,
                    "percentage": percentage,
                    "date": bson_date,
                }
            },
            UpdateOptions::builder().upsert(true).build(),
        )
        .await
        .map_err(|e| {
            if is_duplicate_key(&e) {
                already_exists(&period)
            } else {
                ApiError::Database(e)
            }
        })?;

    creation_outcome(res.upserted_id.as_ref(), &period)?;

    Ok(Tax {
        id: new_id,
        percentage,
        date: Some(bson_date),
        month: Some(period.month.to_string()),
        year: Some(period.year),
    })
}

/// The insert-only upsert wrote nothing when the period was already taken.
pub fn creation_outcome(upserted: Option<&Bson>, period: &Period) -> ApiResult<()> {
    match upserted {
        Some(_) => Ok(()),
        None => {
            tracing::info!(period = %period.label(), "duplicate tax record rejected");
            Err(already_exists(period))
        }
    }
}

pub async fn update_tax(state: &AppState, id: ObjectId, percentage: f64, date: NaiveDate) -> ApiResult<Tax> {
    let period = Period::of(date);
    let taxes = state.db.collection::<Tax>(tax::COLLECTION);

    let opts = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    taxes
        .find_one_and_update(
            doc! { "_id": id },
            doc! {
                "$set": {
                    "percentage": percentage,
                    "date": calendar::to_bson(date),
                    "month": period.month,
                    "year": period.year,
                }
            },
            opts,
        )
        .await
        .map_err(|e| {
            if is_duplicate_key(&e) {
                already_exists(&period)
            } else {
                ApiError::Database(e)
            }
        })?
        .ok_or_else(not_found)
}

pub async fn delete_tax(state: &AppState, id: ObjectId) -> ApiResult<()> {
    let res = state
        .db
        .collection::<Document>(tax::COLLECTION)
        .delete_one(doc! { "_id": id }, None)
        .await?;

    ensure_deleted(res.deleted_count, not_found)
}

/// Mean of all stored percentages, history included. 0 when there are none.
pub async fn average_percentage(state: &AppState) -> ApiResult<f64> {
    let (total, count) = super::aggregate::sum_and_count(&state.db, tax::COLLECTION, "percentage").await?;
    Ok(average(total, count as usize))
}

pub async fn summary(state: &AppState) -> ApiResult<TaxSummary> {
    let taxes = list_taxes(state).await?;
    Ok(summarize(&taxes, calendar::today()))
}

// ---------------- Summary ----------------

/// `sum / count`, with an empty set averaging to 0.
pub fn average(sum: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

pub fn format_percent(v: f64) -> String {
    format!("{:.2}%", v)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSummary {
    pub current_month: CurrentMonthTax,
    pub current_year: CurrentYearTax,
    pub overall: OverallTax,
    pub yearly_average_tax: Vec<YearlyAverageTax>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMonthTax {
    pub month: &'static str,
    pub year: i32,
    pub total_percentage: String,
    pub total_percentage_value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTaxTotal {
    pub month: &'static str,
    pub total_percentage: String,
    pub total_percentage_value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentYearTax {
    pub year: i32,
    pub monthly_breakdown: Vec<MonthlyTaxTotal>,
    pub average_tax: String,
    pub average_tax_value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTaxTotal {
    pub label: String,
    pub month: &'static str,
    pub year: i32,
    pub total_percentage: String,
    pub total_percentage_value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallTax {
    pub records: Vec<PeriodTaxTotal>,
    pub average_tax: String,
    pub average_tax_value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyAverageTax {
    pub year: i32,
    pub average_tax: String,
    pub average_tax_value: f64,
}

/// Builds the tax report as of `today`.
///
/// Buckets are keyed on (year, month) so equal month names in different
/// years stay apart. Records without a resolvable period are skipped.
pub fn summarize(records: &[Tax], today: NaiveDate) -> TaxSummary {
    let current_year = today.year();
    let current_month = today.month();

    let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    let mut yearly: BTreeMap<i32, (f64, usize)> = BTreeMap::new();

    for t in records {
        let Some((year, month)) = t.period() else {
            continue;
        };

        *buckets.entry((year, month)).or_insert(0.0) += t.percentage;

        let y = yearly.entry(year).or_insert((0.0, 0));
        y.0 += t.percentage;
        y.1 += 1;
    }

    let month_label = |m: u32| calendar::month_name(m).unwrap_or("");

    let current_month_total = buckets
        .get(&(current_year, current_month))
        .copied()
        .unwrap_or(0.0);

    let monthly_breakdown: Vec<MonthlyTaxTotal> = buckets
        .range((current_year, 1)..=(current_year, 12))
        .map(|(&(_, m), &total)| MonthlyTaxTotal {
            month: month_label(m),
            total_percentage: format_percent(total),
            total_percentage_value: total,
        })
        .collect();

    let year_sum: f64 = monthly_breakdown.iter().map(|m| m.total_percentage_value).sum();
    let current_year_average = average(year_sum, monthly_breakdown.len());

    let records: Vec<PeriodTaxTotal> = buckets
        .iter()
        .map(|(&(y, m), &total)| {
            let month = month_label(m);
            PeriodTaxTotal {
                label: format!("{month} {y}"),
                month,
                year: y,
                total_percentage: format_percent(total),
                total_percentage_value: total,
            }
        })
        .collect();

    let overall_sum: f64 = records.iter().map(|r| r.total_percentage_value).sum();
    let overall_average = average(overall_sum, records.len());

    let yearly_average_tax = yearly
        .into_iter()
        .map(|(year, (sum, count))| {
            let avg = average(sum, count);
            YearlyAverageTax {
                year,
                average_tax: format_percent(avg),
                average_tax_value: avg,
            }
        })
        .collect();

    TaxSummary {
        current_month: CurrentMonthTax {
            month: month_label(current_month),
            year: current_year,
            total_percentage: format_percent(current_month_total),
            total_percentage_value: current_month_total,
        },
        current_year: CurrentYearTax {
            year: current_year,
            monthly_breakdown,
            average_tax: format_percent(current_year_average),
            average_tax_value: current_year_average,
        },
        overall: OverallTax {
            records,
            average_tax: format_percent(overall_average),
            average_tax_value: overall_average,
        },
        yearly_average_tax,
    }
}
