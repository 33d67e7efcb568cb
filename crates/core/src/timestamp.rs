use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Render a timestamp as RFC 3339 UTC with millisecond precision, e.g.
/// `2024-01-01T00:00:00.000Z`.
pub fn format_iso8601(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts full RFC 3339 (any offset), a naive `YYYY-MM-DDTHH:MM:SS[.fff]`
/// or a bare `YYYY-MM-DD`. Values without an offset are taken as UTC.
pub fn parse_iso8601(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
