use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::debug;
use once_cell::sync::Lazy;

/// All display and day-boundary math is pinned to Indian Standard Time.
pub static IST: Lazy<FixedOffset> = Lazy::new(|| {
    FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("IST offset is in range")
});

pub fn now_ist() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&*IST)
}

/// Parse a backend timestamp into an IST instant. Accepts RFC 3339 with any
/// offset (`Z` included) and naive ISO timestamps, which the backend emits
/// without saying they are UTC. Returns `None` for anything else.
pub fn try_normalize(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&*IST));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive).with_timezone(&*IST));
        }
    }
    None
}

/// Like [`try_normalize`], but substitutes the current time when parsing
/// fails. Lossy: the caller gets *an* instant, not the recorded one, so a
/// malformed timestamp can land in today's bucket.
pub fn normalize(raw: &str) -> DateTime<FixedOffset> {
    match try_normalize(raw) {
        Some(ts) => ts,
        None => {
            debug!("unparseable timestamp {raw:?}, substituting current time");
            now_ist()
        }
    }
}

pub fn day_label(ts: DateTime<FixedOffset>, today: NaiveDate) -> String {
    let date = ts.date_naive();
    if date == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(date) {
        "Yesterday".to_string()
    } else {
        date.format("%d %b %Y").to_string()
    }
}

pub fn clock(ts: DateTime<FixedOffset>) -> String {
    ts.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_instant_across_offsets() {
        let utc = try_normalize("2024-01-01T10:00:00Z").unwrap();
        let ist = try_normalize("2024-01-01T15:30:00+05:30").unwrap();
        assert_eq!(utc, ist);
    }

    #[test]
    fn naive_timestamp_is_assumed_utc() {
        let naive = try_normalize("2024-01-01T10:00:00").unwrap();
        let explicit = try_normalize("2024-01-01T10:00:00Z").unwrap();
        assert_eq!(naive, explicit);
    }

    #[test]
    fn output_is_in_ist() {
        let ts = try_normalize("2024-01-01T10:00:00Z").unwrap();
        assert_eq!(ts.offset(), &*IST);
        assert_eq!(clock(ts), "15:30");
    }

    #[test]
    fn fractional_seconds_and_space_separator_parse() {
        assert!(try_normalize("2024-06-05T09:15:00.123456").is_some());
        assert!(try_normalize("2024-06-05 09:15:00").is_some());
    }

    #[test]
    fn malformed_input_is_a_distinguishable_fallback() {
        assert!(try_normalize("not a timestamp").is_none());
        assert!(try_normalize("").is_none());
        // normalize never fails, it falls back to roughly-now
        let before = now_ist();
        let ts = normalize("not a timestamp");
        let after = now_ist();
        assert!(ts >= before && ts <= after);
    }

    #[test]
    fn day_labels() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let at = |s: &str| try_normalize(s).unwrap();
        // 2024-03-10 06:00 IST
        assert_eq!(day_label(at("2024-03-10T00:30:00Z"), today), "Today");
        assert_eq!(day_label(at("2024-03-09T10:00:00Z"), today), "Yesterday");
        assert_eq!(day_label(at("2024-03-01T10:00:00Z"), today), "01 Mar 2024");
    }

    #[test]
    fn day_boundary_is_computed_in_ist() {
        // 19:00 UTC is already the next day in IST (+05:30)
        let ts = try_normalize("2024-03-09T19:00:00Z").unwrap();
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }
}
