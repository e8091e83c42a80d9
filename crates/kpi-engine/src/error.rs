use chrono::NaiveDate;

/// Computation-layer failures. None of these are retried: recomputing from
/// the same inputs fails identically.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// `start_date` must not be after `end_date`.
    #[error("invalid period: start_date {start} is after end_date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// A held fund has no product metadata (data-integrity problem).
    #[error("no product info for fund '{fund}' (held by account '{account}' on {date})")]
    MissingProductInfo {
        fund: String,
        account: String,
        date: NaiveDate,
    },

    /// Calendar arithmetic ran past the representable date range.
    #[error("date arithmetic overflow after {0}")]
    DateOverflow(NaiveDate),
}

/// Boundary failures raised while shaping a snapshot into an external view.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewError {
    #[error("fund statistics malformed for '{fund}': {reason}")]
    MalformedStatistics { fund: String, reason: String },
}
