// ── Display formatters ──
//
// Pure string helpers shared by every consumer of the dashboard data.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Human label for a security event type. Unknown types fall back to
/// [`format_status`].
pub fn format_event_type(event_type: &str) -> String {
    match event_type {
        "invalid_signature" => "Invalid Signature".into(),
        "rate_limit_exceeded" => "Rate Limit Exceeded".into(),
        "timestamp_too_old" => "Timestamp Too Old".into(),
        "timestamp_in_future" => "Timestamp in Future".into(),
        "replay_attempt" => "Replay Attempt".into(),
        other => format_status(other),
    }
}

/// `snake_case` to space-separated words with a capitalised first letter.
pub fn format_status(status: &str) -> String {
    status
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace the last octet of an IPv4 address with `xxx` when `mask` is set.
/// Anything that is not dotted-quad is returned unchanged.
pub fn format_ip_address(ip: &str, mask: bool) -> String {
    if !mask {
        return ip.to_owned();
    }
    let parts: Vec<&str> = ip.split('.').collect();
    match parts.as_slice() {
        [a, b, c, _] => format!("{a}.{b}.{c}.xxx"),
        _ => ip.to_owned(),
    }
}

/// Cut to `len` characters and append `...` when longer.
pub fn truncate(s: &str, len: usize) -> String {
    match s.char_indices().nth(len) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_owned(),
    }
}

pub fn format_duration_ms(ms: f64) -> String {
    if ms < 1_000.0 {
        format!("{ms}ms")
    } else if ms < 60_000.0 {
        format!("{:.2}s", ms / 1_000.0)
    } else if ms < 3_600_000.0 {
        format!("{:.2}m", ms / 60_000.0)
    } else {
        format!("{:.2}h", ms / 3_600_000.0)
    }
}

/// `ratio` is a fraction: `0.125` renders as `12.5%` with one decimal.
pub fn format_percentage(ratio: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, ratio * 100.0)
}

/// Thousands separators: `1234567` → `1,234,567`.
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 1024-based size with trailing zeros trimmed: `1536` → `1.5 KB`.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".into();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{value:.decimals$}");
    let trimmed = if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.')
    } else {
        rendered.as_str()
    };
    format!("{trimmed} {}", UNITS[unit])
}

pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%b %d, %Y").to_string()
}

pub fn format_time(at: &DateTime<Utc>) -> String {
    at.format("%H:%M:%S").to_string()
}

pub fn format_datetime(at: &DateTime<Utc>) -> String {
    at.format("%b %d, %Y %H:%M:%S").to_string()
}

/// Approximate distance from `now`, e.g. `5 minutes ago` or `in about 2 hours`.
pub fn format_relative_time(at: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let delta = *now - *at;
    let future = delta.num_seconds() < 0;
    let secs = delta.num_seconds().unsigned_abs();

    let minutes = (secs + 30) / 60;
    let hours = (secs + 1_800) / 3_600;
    let days = (secs + 43_200) / 86_400;

    let distance = match secs {
        0..45 => "less than a minute".to_owned(),
        45..90 => "1 minute".to_owned(),
        90..2_700 => format!("{minutes} minutes"),
        2_700..5_400 => "about 1 hour".to_owned(),
        5_400..86_400 => format!("about {hours} hours"),
        86_400..151_200 => "1 day".to_owned(),
        151_200..2_592_000 => format!("{days} days"),
        2_592_000..3_888_000 => "about 1 month".to_owned(),
        3_888_000..31_536_000 => format!("{} months", (days + 15) / 30),
        _ => {
            let years = days / 365;
            if years <= 1 {
                "about 1 year".to_owned()
            } else {
                format!("about {years} years")
            }
        }
    };

    if future {
        format!("in {distance}")
    } else {
        format!("{distance} ago")
    }
}

/// Pretty-printed JSON with two-space indent.
pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "Invalid JSON".into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    use super::*;

    #[test]
    fn known_event_types_use_fixed_labels() {
        assert_eq!(format_event_type("invalid_signature"), "Invalid Signature");
        assert_eq!(format_event_type("timestamp_in_future"), "Timestamp in Future");
        assert_eq!(format_event_type("replay_attempt"), "Replay Attempt");
    }

    #[test]
    fn unknown_event_types_are_title_cased() {
        assert_eq!(format_event_type("custom_thing"), "Custom Thing");
        assert_eq!(format_status("pending"), "Pending");
        assert_eq!(format_status(""), "");
    }

    #[test]
    fn ip_masking() {
        assert_eq!(format_ip_address("203.0.113.9", true), "203.0.113.xxx");
        assert_eq!(format_ip_address("203.0.113.9", false), "203.0.113.9");
        assert_eq!(format_ip_address("::1", true), "::1");
    }

    #[test]
    fn truncation_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[test]
    fn numbers_and_sizes() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_234_567), "1,234,567");
        assert_eq!(format_bytes(0, 2), "0 Bytes");
        assert_eq!(format_bytes(512, 2), "512 Bytes");
        assert_eq!(format_bytes(1536, 2), "1.5 KB");
        assert_eq!(format_bytes(1024 * 1024, 2), "1 MB");
        assert_eq!(format_percentage(0.125, 1), "12.5%");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration_ms(42.0), "42ms");
        assert_eq!(format_duration_ms(1_500.0), "1.50s");
        assert_eq!(format_duration_ms(90_000.0), "1.50m");
        assert_eq!(format_duration_ms(5_400_000.0), "1.50h");
    }

    #[test]
    fn relative_times() {
        let now = Utc.with_ymd_and_hms(2025, 2, 22, 12, 0, 0).unwrap();
        assert_eq!(format_relative_time(&now, &now), "less than a minute ago");
        assert_eq!(
            format_relative_time(&(now - Duration::minutes(5)), &now),
            "5 minutes ago"
        );
        assert_eq!(
            format_relative_time(&(now - Duration::hours(3)), &now),
            "about 3 hours ago"
        );
        assert_eq!(
            format_relative_time(&(now + Duration::hours(2)), &now),
            "in about 2 hours"
        );
        assert_eq!(format_relative_time(&(now - Duration::days(3)), &now), "3 days ago");
    }

    #[test]
    fn dates_and_json() {
        let at = Utc.with_ymd_and_hms(2025, 2, 22, 10, 30, 5).unwrap();
        assert_eq!(format_datetime(&at), "Feb 22, 2025 10:30:05");
        assert_eq!(format_date(&at), "Feb 22, 2025");
        assert_eq!(format_time(&at), "10:30:05");
        assert_eq!(format_json(&json!({ "a": 1 })), "{\n  \"a\": 1\n}");
    }
}
