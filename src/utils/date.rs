// Due date parsing

use chrono::{Duration, NaiveDate, Utc};
use anyhow::Result;

/// Current calendar day, truncated from UTC "now".
///
/// Reminder matching and the `today`/`tomorrow` keywords both use this so a
/// task added with `--due today` is reminded about in the same session.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a due date expression relative to `today`.
///
/// Accepts `YYYY-MM-DD`, `today`, `tomorrow`, and `+Nd` (N days ahead).
pub fn parse_due_date(expr: &str, today: NaiveDate) -> Result<NaiveDate> {
    let expr = expr.trim();
    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(date);
    }

    match expr.to_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => Ok(today + Duration::days(1)),
        other => {
            let ahead = other
                .strip_prefix('+')
                .and_then(|s| s.strip_suffix('d'))
                .and_then(|days| days.parse::<i64>().ok())
                .and_then(Duration::try_days)
                .and_then(|delta| today.checked_add_signed(delta));
            if let Some(date) = ahead {
                return Ok(date);
            }
            anyhow::bail!(
                "Invalid due date: '{}'. Use YYYY-MM-DD, today, tomorrow, or +Nd.",
                expr
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_absolute_date() {
        assert_eq!(parse_due_date("2026-01-10", day(2026, 10, 19)).unwrap(), day(2026, 1, 10));
    }

    #[test]
    fn test_relative_dates() {
        let today = day(2026, 12, 31);
        assert_eq!(parse_due_date("today", today).unwrap(), today);
        assert_eq!(parse_due_date("Tomorrow", today).unwrap(), day(2027, 1, 1));
        assert_eq!(parse_due_date("+3d", today).unwrap(), day(2027, 1, 3));
    }

    #[test]
    fn test_invalid_date() {
        let err = parse_due_date("next week", day(2026, 10, 19)).unwrap_err();
        assert!(err.to_string().contains("Invalid due date"));
        assert!(parse_due_date("2026-02-30", day(2026, 10, 19)).is_err());
    }

    #[test]
    fn test_out_of_range_offset() {
        let today = day(2026, 10, 19);
        for expr in ["+9999999999999d", "+99999999d", "+9223372036854775807d"] {
            let err = parse_due_date(expr, today).unwrap_err();
            assert!(err.to_string().contains("Invalid due date"), "{}", expr);
        }
    }
}
