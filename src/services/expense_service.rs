use std::collections::BTreeMap;

use chrono::NaiveDate;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};

use crate::{
    error::{ensure_deleted, ApiError, ApiResult},
    models::{expense, Expense, ExpenseView, MonthlyExpense, YearlyExpense},
    AppState,
};

use super::{
    aggregate,
    calendar::{self, Period},
    user_service,
};

fn not_found() -> ApiError {
    ApiError::not_found("Expense record not found")
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub category: ObjectId,
    pub admin: ObjectId,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ExpenseChanges {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub category: Option<ObjectId>,
}

impl ExpenseChanges {
    /// `$set` document for the update. A new date always brings its month/year along.
    pub fn to_set_doc(&self) -> Document {
        let mut set = Document::new();

        if let Some(title) = &self.title {
            set.insert("title", title.clone());
        }
        if let Some(amount) = self.amount {
            set.insert("amount", amount);
        }
        if let Some(date) = self.date {
            let period = Period::of(date);
            set.insert("date", calendar::to_bson(date));
            set.insert("month", period.month);
            set.insert("year", period.year);
        }
        if let Some(category) = self.category {
            set.insert("category", category);
        }

        set
    }
}

async fn find_many(state: &AppState, filter: Document) -> ApiResult<Vec<Expense>> {
    let expenses = state.db.collection::<Expense>(expense::COLLECTION);
    let find_opts = FindOptions::builder().sort(doc! { "date": -1 }).build();

    let mut cursor = expenses.find(filter, find_opts).await?;

    let mut out: Vec<Expense> = vec![];
    while let Some(res) = cursor.next().await {
        out.push(res?);
    }
    Ok(out)
}

/// Attaches the owning admin's public profile to each expense.
pub async fn to_views(state: &AppState, items: Vec<Expense>) -> ApiResult<Vec<ExpenseView>> {
    let ids: Vec<ObjectId> = items.iter().map(|e| e.admin).collect();
    let admins = user_service::views_by_ids(state, &ids).await?;

    Ok(items
        .into_iter()
        .map(|e| {
            let profile = admins.get(&e.admin).cloned();
            ExpenseView::new(e, profile)
        })
        .collect())
}

pub async fn list_expenses(state: &AppState) -> ApiResult<Vec<Expense>> {
    find_many(state, doc! {}).await
}

pub async fn get_expense(state: &AppState, id: ObjectId) -> ApiResult<Expense> {
    state
        .db
        .collection::<Expense>(expense::COLLECTION)
        .find_one(doc! { "_id": id }, None)
        .await?
        .ok_or_else(not_found)
}

/// Filter for the month/year search. The month is matched exactly, ignoring case;
/// the year matches either stored form.
pub fn search_filter(month: Option<&str>, year: Option<i32>) -> Document {
    let mut filter = Document::new();

    if let Some(m) = month.map(str::trim).filter(|m| !m.is_empty()) {
        filter.insert(
            "month",
            doc! { "$regex": format!("^{}$", regex::escape(m)), "$options": "i" },
        );
    }
    // older records store the year as a string
    if let Some(y) = year {
        filter.insert("year", doc! { "$in": [y, y.to_string()] });
    }

    filter
}

pub async fn search_expenses(state: &AppState, month: Option<&str>, year: Option<i32>) -> ApiResult<Vec<Expense>> {
    find_many(state, search_filter(month, year)).await
}

pub async fn create_expense(state: &AppState, input: NewExpense) -> ApiResult<Expense> {
    if user_service::find_user(state, input.admin).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let period = Period::of(input.date);
    let exp = Expense {
        id: ObjectId::new(),
        title: input.title,
        amount: input.amount,
        date: calendar::to_bson(input.date),
        month: period.month.to_string(),
        year: period.year,
        category: input.category,
        admin: input.admin,
    };

    state
        .db
        .collection::<Expense>(expense::COLLECTION)
        .insert_one(&exp, None)
        .await?;

    tracing::info!(id = %exp.id.to_hex(), amount = exp.amount, "expense created");

    Ok(exp)
}

pub async fn update_expense(state: &AppState, id: ObjectId, changes: &ExpenseChanges) -> ApiResult<Expense> {
    let set = changes.to_set_doc();
    if set.is_empty() {
        return get_expense(state, id).await;
    }

    let opts = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    state
        .db
        .collection::<Expense>(expense::COLLECTION)
        .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, opts)
        .await?
        .ok_or_else(not_found)
}

pub async fn delete_expense(state: &AppState, id: ObjectId) -> ApiResult<()> {
    let res = state
        .db
        .collection::<Document>(expense::COLLECTION)
        .delete_one(doc! { "_id": id }, None)
        .await?;

    ensure_deleted(res.deleted_count, not_found)
}

pub async fn total_expenses(state: &AppState) -> ApiResult<f64> {
    let (total, _) = aggregate::sum_and_count(&state.db, expense::COLLECTION, "amount").await?;
    Ok(total)
}

// ---------------- Rollups ----------------

/// Twelve entries, January first. Months missing from `buckets` report 0/0.
///
/// `buckets` holds (1-based month, total, count) for `year`.
pub fn fill_months(year: i32, buckets: &[(u32, f64, i64)]) -> Vec<MonthlyExpense> {
    calendar::MONTH_NAMES
        .iter()
        .enumerate()
        .map(|(i, &name)| {
            let month = i as u32 + 1;
            let (total, count) = buckets
                .iter()
                .filter(|(m, _, _)| *m == month)
                .fold((0.0, 0), |(t, c), (_, bt, bc)| (t + bt, c + bc));

            MonthlyExpense {
                month: name,
                year,
                total_expenses: total,
                count,
            }
        })
        .collect()
}

/// Ascending by year, one entry per year present.
pub fn order_years(rows: &[(i32, f64, i64)]) -> Vec<YearlyExpense> {
    let mut by_year: BTreeMap<i32, (f64, i64)> = BTreeMap::new();
    for &(year, total, count) in rows {
        let e = by_year.entry(year).or_insert((0.0, 0));
        e.0 += total;
        e.1 += count;
    }

    by_year
        .into_iter()
        .map(|(year, (total_expenses, count))| YearlyExpense {
            year,
            total_expenses,
            count,
        })
        .collect()
}

pub async fn monthly_rollup(state: &AppState, year: i32) -> ApiResult<Vec<MonthlyExpense>> {
    let pipeline = vec![
        doc! {
            "$match": {
                "date": { "$gte": calendar::year_start(year), "$lt": calendar::year_start(year + 1) }
            }
        },
        doc! {
            "$group": {
                "_id": { "$month": "$date" },
                "total": { "$sum": "$amount" },
                "count": { "$sum": 1 },
            }
        },
    ];

    let rows = aggregate::collect(&state.db, expense::COLLECTION, pipeline).await?;

    let buckets: Vec<(u32, f64, i64)> = rows
        .iter()
        .map(|row| {
            (
                aggregate::integer(row, "_id") as u32,
                aggregate::number(row, "total"),
                aggregate::integer(row, "count"),
            )
        })
        .collect();

    Ok(fill_months(year, &buckets))
}

pub async fn yearly_rollup(state: &AppState) -> ApiResult<Vec<YearlyExpense>> {
    let pipeline = vec![
        doc! {
            "$group": {
                "_id": { "$year": "$date" },
                "total": { "$sum": "$amount" },
                "count": { "$sum": 1 },
            }
        },
        doc! { "$sort": { "_id": 1 } },
    ];

    let rows = aggregate::collect(&state.db, expense::COLLECTION, pipeline).await?;

    let rows: Vec<(i32, f64, i64)> = rows
        .iter()
        .map(|row| {
            (
                aggregate::integer(row, "_id") as i32,
                aggregate::number(row, "total"),
                aggregate::integer(row, "count"),
            )
        })
        .collect();

    Ok(order_years(&rows))
}
