use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use serde_json::Value;

pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// Browser's current UTC offset. `getTimezoneOffset` is minutes *behind* UTC.
pub(crate) fn local_offset() -> FixedOffset {
    let minutes = js_sys::Date::new_0().get_timezone_offset() as i32;
    FixedOffset::west_opt(minutes * 60).unwrap_or_else(|| Utc.fix())
}

/// Asia/Kolkata has no DST.
pub(crate) const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

pub(crate) fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Accepts RFC 3339 strings (Firestore timestamps), `YYYY-MM-DD HH:MM:SS` (read as UTC),
/// and epoch numbers (milliseconds, or seconds when small).
pub(crate) fn parse_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(naive.and_utc());
            }
            s.parse::<i64>().ok().and_then(from_epoch)
        }
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(from_epoch),
        Value::Object(map) => {
            // `{ seconds, nanoseconds }` as exported by the JS SDK.
            let secs = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))?
                .as_i64()?;
            Utc.timestamp_opt(secs, 0).single()
        }
        _ => None,
    }
}

fn from_epoch(n: i64) -> Option<DateTime<Utc>> {
    if n.unsigned_abs() < 100_000_000_000 {
        Utc.timestamp_opt(n, 0).single()
    } else {
        Utc.timestamp_millis_opt(n).single()
    }
}

/// `2 Jan 2025, 3:04 pm`
pub(crate) fn format_ist(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&ist())
        .format("%-d %b %Y, %-I:%M %P")
        .to_string()
}

pub(crate) fn format_ist_value(v: Option<&Value>) -> String {
    v.and_then(parse_timestamp)
        .map(|dt| format_ist(&dt))
        .unwrap_or_else(|| "N/A".to_string())
}

/// First `max` characters plus `...` when longer.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max).collect();
    format!("{head}...")
}

pub(crate) fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Plain text for a JSON value: strings unquoted, everything else as compact JSON.
pub(crate) fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
