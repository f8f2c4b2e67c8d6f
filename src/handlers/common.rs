//! Shared helpers for the handler modules.

use chrono::{DateTime, Months, NaiveDate, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::db::DbPool;
use crate::entities::stock;
use crate::errors::ServiceError;

/// "YYYY-MM-DD", the date format the frontend exchanges everywhere.
pub fn fmt_date(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

pub fn fmt_naive_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Human month label used by the report series, e.g. "Aug 2026".
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

/// Parses a "YYYY-MM-DD" (or full RFC 3339) string into a UTC instant.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, ServiceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_naive_date(value)?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ServiceError::BadRequest(format!("Invalid date: {}", value)))
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ServiceError::BadRequest(format!("Invalid date: {}", value)))
}

/// First day of the month `offset` months before today.
pub fn month_start_ago(offset: u32) -> NaiveDate {
    use chrono::Datelike;
    let today = Utc::now().date_naive();
    let current = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
    current.checked_sub_months(Months::new(offset)).unwrap_or(current)
}

/// UTC window [start, next-month-start) for the month beginning at `first`.
pub fn month_window(first: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = first
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);
    let next = first
        .checked_add_months(Months::new(1))
        .unwrap_or(first)
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(start);
    (start, next)
}

/// Sums a product's on-hand quantity across all warehouses.
pub async fn total_stock(db: &DbPool, product_id: i32) -> Result<i64, ServiceError> {
    let levels = stock::Entity::find()
        .filter(stock::Column::ProductId.eq(product_id))
        .all(db)
        .await?;
    Ok(levels.iter().map(|s| s.quantity as i64).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_rfc3339_dates() {
        assert_eq!(
            parse_date("2026-08-01").unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc()
        );
        assert!(parse_date("2026-08-01T12:30:00Z").is_ok());
        assert!(parse_date("not-a-date").is_err());
    }

    #[test]
    fn month_label_is_short_form() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        assert_eq!(month_label(d), "Aug 2026");
    }
}
