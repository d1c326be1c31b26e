use chrono::{DateTime, Datelike, NaiveDate, Utc};
use mongodb::bson;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Month name for a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// 1-based month number for a month name, ignoring case.
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.trim();
    MONTH_NAMES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

/// The denormalized month/year pair stored alongside a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub month: &'static str,
    pub year: i32,
}

impl Period {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            // month() is always 1..=12
            month: MONTH_NAMES[date.month0() as usize],
            year: date.year(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; the calendar date is taken in UTC.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Date is required".to_string());
    }

    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(d);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| format!("Invalid date '{raw}', expected YYYY-MM-DD"))
}

/// Midnight UTC of the given day.
pub fn to_bson(date: NaiveDate) -> bson::DateTime {
    let millis = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default();
    bson::DateTime::from_millis(millis)
}

pub fn from_bson(dt: bson::DateTime) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis()).map(|d| d.date_naive())
}

/// First instant of `year` as a BSON datetime, for range filters.
pub fn year_start(year: i32) -> bson::DateTime {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .map(to_bson)
        .unwrap_or_else(|| bson::DateTime::from_millis(0))
}

pub fn format_date(dt: bson::DateTime) -> String {
    from_bson(dt)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn format_timestamp(dt: bson::DateTime) -> String {
    DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
        .map(|d| d.to_rfc3339())
        .unwrap_or_default()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
