// Derived columns: month bucket, payment timeliness, elapsed days.
use crate::types::PaymentStatus;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// `YYYY-MM` bucket of a date.
pub fn month_bucket(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| format!("{:04}-{:02}", d.year(), d.month()))
}

/// ISO week bucket, `YYYY-Www`, using the ISO week-numbering year.
pub fn iso_week_bucket(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{:04}-W{:02}", week.year(), week.week())
}

/// On time when paid on or before the due date, late when after,
/// `SemDados` when either side is missing.
pub fn classify_payment(payment: Option<NaiveDate>, due: Option<NaiveDate>) -> PaymentStatus {
    match (payment, due) {
        (Some(paid), Some(due)) => match paid.partial_cmp(&due) {
            Some(std::cmp::Ordering::Greater) => PaymentStatus::Atrasado,
            Some(_) => PaymentStatus::EmDia,
            None => PaymentStatus::Erro,
        },
        _ => PaymentStatus::SemDados,
    }
}

/// Whole days from `start` to `end`, both floored to midnight first so the
/// time of day never shifts the count.
pub fn elapsed_days(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Option<i64> {
    let (start, end) = (start?, end?);
    Some((end.date() - start.date()).num_days())
}

/// What to do with an elapsed-day count below zero (end before start).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeDayPolicy {
    /// Keep the negative value as is.
    Keep,
    /// Remove the whole row from the dataset.
    Drop,
    /// Keep the row, null the count, log a warning.
    #[default]
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOutcome {
    Value(Option<i64>),
    DropRow,
}

impl NegativeDayPolicy {
    pub fn apply(&self, days: Option<i64>) -> DayOutcome {
        match days {
            Some(d) if d < 0 => match self {
                NegativeDayPolicy::Keep => DayOutcome::Value(Some(d)),
                NegativeDayPolicy::Drop => DayOutcome::DropRow,
                NegativeDayPolicy::Null => {
                    warn!(days = d, "end date precedes start date, count set to null");
                    DayOutcome::Value(None)
                }
            },
            other => DayOutcome::Value(other),
        }
    }
}
