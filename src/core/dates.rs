use chrono::NaiveDate;

/// Parse a `YYYY-MM-DD` string, including calendar validity.
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Inclusive day count for the trip: a same-day trip is 1 day.
/// Absent when either date fails to parse or the end precedes the start.
pub fn trip_days(start: &str, end: &str) -> Option<i64> {
    let start = parse_iso_date(start.trim())?;
    let end = parse_iso_date(end.trim())?;
    if end < start {
        return None;
    }
    Some((end - start).num_days() + 1)
}

/// Accommodation nights: `days - 1`, the last day assumed to be return
/// travel. Absent (never zero) for a one-day trip.
pub fn nights_from_days(days: u32) -> Option<u32> {
    if days >= 2 {
        Some(days - 1)
    } else {
        None
    }
}
