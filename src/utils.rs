use chrono::{DateTime, Utc};

/// Engine version reported to embedders
pub const ENGINE_VERSION: &str = "0.4.0";

/// Get the current timestamp
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Ledger window key for monthly counters, e.g. `"2025-01"`
#[must_use]
pub fn month_window_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// Whether two timestamps fall on the same calendar day (UTC)
#[must_use]
pub fn same_calendar_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}
