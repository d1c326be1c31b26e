use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::UserView;
use crate::services::calendar;

pub const COLLECTION: &str = "expances";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub title: String,

    // PKR
    pub amount: f64,
    pub date: DateTime,

    // derived from `date` on every write; older records hold the year as a string
    pub month: String,
    #[serde(deserialize_with = "lenient_year")]
    pub year: i32,

    pub category: ObjectId,
    pub admin: ObjectId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseView {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub date: String,
    pub month: String,
    pub year: i32,
    pub category: String,
    pub admin: String,
    pub admin_profile: Option<UserView>,
}

impl ExpenseView {
    pub fn new(e: Expense, admin_profile: Option<UserView>) -> Self {
        Self {
            id: e.id.to_hex(),
            title: e.title,
            amount: e.amount,
            date: calendar::format_date(e.date),
            month: e.month,
            year: e.year,
            category: e.category.to_hex(),
            admin: e.admin.to_hex(),
            admin_profile,
        }
    }
}

/// Reads a stored year written either as a number or as a numeric string.
pub fn lenient_year<'de, D>(d: D) -> Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let year = match Raw::deserialize(d)? {
        Raw::Int(n) => i32::try_from(n).ok(),
        Raw::Float(f) if f.fract() == 0.0 => i32::try_from(f as i64).ok(),
        Raw::Float(_) => None,
        Raw::Text(s) => s.trim().parse::<i32>().ok(),
    };

    year.ok_or_else(|| serde::de::Error::custom("year is not a whole number"))
}

/// One month of the current-year rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyExpense {
    pub month: &'static str,
    pub year: i32,
    pub total_expenses: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyExpense {
    pub year: i32,
    pub total_expenses: f64,
    pub count: i64,
}
