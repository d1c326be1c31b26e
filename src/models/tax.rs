use chrono::Datelike;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::services::calendar;

pub const COLLECTION: &str = "taxes";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tax {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub percentage: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl Tax {
    /// (year, 1-based month) this record counts towards.
    ///
    /// The stored date wins; records written without one fall back to their
    /// month/year fields.
    pub fn period(&self) -> Option<(i32, u32)> {
        if let Some(d) = self.date.and_then(calendar::from_bson) {
            return Some((d.year(), d.month()));
        }

        let month = calendar::month_number(self.month.as_deref()?)?;
        Some((self.year?, month))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxView {
    pub id: String,
    pub percentage: f64,
    pub date: Option<String>,
    pub month: Option<String>,
    pub year: Option<i32>,
}

impl From<Tax> for TaxView {
    fn from(t: Tax) -> Self {
        Self {
            id: t.id.to_hex(),
            percentage: t.percentage,
            date: t.date.map(calendar::format_date),
            month: t.month,
            year: t.year,
        }
    }
}
