//! ISO-8601 timestamps to SQL datetime literals.

use chrono::NaiveDateTime;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Input layout accepted by [`to_sql_datetime`].
pub const ISO8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Output layout produced by [`to_sql_datetime`].
pub const SQL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static ISO8601_UTC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}Z$")
        .expect("ISO-8601 pattern is valid")
});

/// Rewrite `YYYY-MM-DDTHH:MM:SSZ` as `YYYY-MM-DD HH:MM:SS`.
///
/// Only that exact shape is converted. Fractional seconds, offsets other
/// than `Z`, date-only values and anything else come back borrowed and
/// unchanged. A string with the right shape but an impossible date
/// (`2024-13-01T00:00:00Z`) is also left alone.
pub fn to_sql_datetime(value: &str) -> Cow<'_, str> {
    if !ISO8601_UTC.is_match(value) {
        return Cow::Borrowed(value);
    }

    match NaiveDateTime::parse_from_str(value, ISO8601_FORMAT) {
        Ok(dt) => Cow::Owned(dt.format(SQL_DATETIME_FORMAT).to_string()),
        Err(e) => {
            tracing::debug!("Leaving '{}' as-is: {}", value, e);
            Cow::Borrowed(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_exact_utc_timestamp() {
        assert_eq!(to_sql_datetime("2024-03-15T08:30:05Z"), "2024-03-15 08:30:05");
        assert_eq!(to_sql_datetime("1999-12-31T23:59:59Z"), "1999-12-31 23:59:59");
    }

    #[test]
    fn test_leap_day() {
        assert_eq!(to_sql_datetime("2024-02-29T00:00:00Z"), "2024-02-29 00:00:00");
        assert_eq!(to_sql_datetime("2023-02-29T00:00:00Z"), "2023-02-29T00:00:00Z");
    }

    #[test]
    fn test_near_misses_pass_through() {
        let inputs = [
            "2024-03-15T08:30:05",
            "2024-03-15T08:30:05.123Z",
            "2024-03-15T08:30:05+02:00",
            "2024-03-15",
            "2024-3-15T08:30:05Z",
            " 2024-03-15T08:30:05Z",
            "2024-03-15T08:30:05Z\n",
            "2024-13-01T00:00:00Z",
            "Alice",
            "",
        ];
        for input in inputs {
            assert_eq!(to_sql_datetime(input), input, "input: {:?}", input);
        }
    }

    #[test]
    fn test_unchanged_values_are_borrowed() {
        assert!(matches!(to_sql_datetime("hello"), Cow::Borrowed(_)));
        assert!(matches!(to_sql_datetime("2024-03-15T08:30:05Z"), Cow::Owned(_)));
    }

    #[test]
    fn test_idempotent() {
        for input in ["2024-03-15T08:30:05Z", "2024-03-15 08:30:05", "nope"] {
            let once = to_sql_datetime(input).into_owned();
            let twice = to_sql_datetime(&once).into_owned();
            assert_eq!(once, twice);
        }
    }
}
