use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::errors::DomainError;
use super::order::OrderDetail;

// ── Report shapes ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub customer_count: i64,
    pub product_count: i64,
    pub order_count: i64,
    pub order_item_count: i64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    pub day: NaiveDate,
    pub order_count: i64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TodayReport {
    pub date: NaiveDate,
    pub orders: Vec<OrderDetail>,
}

// ── Snapshot rows read from the store ────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub customers: i64,
    pub products: i64,
    pub orders: i64,
    pub order_items: i64,
}

/// One order item with the current price of its product, `None` when the
/// product cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevenueLine {
    pub quantity: i32,
    pub unit_price: Option<f64>,
}

impl RevenueLine {
    pub fn amount(&self) -> f64 {
        match self.unit_price {
            Some(price) => f64::from(self.quantity) * price,
            None => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummarySnapshot {
    pub counts: EntityCounts,
    pub lines: Vec<RevenueLine>,
}

/// One row of `orders LEFT JOIN order_items LEFT JOIN products`. An order
/// without items yields a single row with `line == None`.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedOrderLine {
    pub order_id: i32,
    pub order_date: DateTime<Utc>,
    pub line: Option<RevenueLine>,
}

// ── Report parameters ────────────────────────────────────────────────────────

/// A validated calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: i32) -> Result<Self, DomainError> {
        if !(1..=9999).contains(&year) {
            return Err(DomainError::validation(format!(
                "year must be between 1 and 9999, got {year}"
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self {
            year,
            month: month.unsigned_abs(),
        })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Half-open UTC range `[first instant of the month, first instant of the next)`.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (start_of_day(self.first_day()), start_of_day(self.next().first_day()))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = DomainError;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DomainError::validation(format!("'{s}' is not a YYYY-MM month"));
        let (year, month) = s.trim().split_once('-').ok_or_else(malformed)?;
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || !all_digits(year) || month.len() > 2 || !all_digits(month) {
            return Err(malformed());
        }
        let year = year.parse().map_err(|_| malformed())?;
        let month = month.parse().map_err(|_| malformed())?;
        Self::new(year, month)
    }
}

/// Parses a `YYYY-MM-DD` report date in years 1 to 9999.
pub fn parse_report_date(s: &str) -> Result<NaiveDate, DomainError> {
    let malformed = || DomainError::validation(format!("'{s}' is not a YYYY-MM-DD date"));
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| malformed())?;
    if !(1..=9999).contains(&date.year()) {
        return Err(malformed());
    }
    Ok(date)
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Half-open UTC range covering one calendar day.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = date.succ_opt().map_or(DateTime::<Utc>::MAX_UTC, start_of_day);
    (start_of_day(date), end)
}
