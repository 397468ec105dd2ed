//! ISO-8601 timestamp checks for `Wait.Timestamp` and `Timestamp*`
//! comparison values.

use chrono::DateTime;

/// Check that a string is an ISO-8601 date-time as ASL requires: a date
/// and a time separated by `T`, with an explicit offset or `Z`.
pub fn check_timestamp(value: &str) -> Result<(), String> {
    if value.len() < 11 {
        return Err("a date and a time are both required".to_string());
    }
    if value.as_bytes()[10] != b'T' {
        return Err("date and time must be separated by 'T'".to_string());
    }
    DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_timestamps() {
        assert!(check_timestamp("2021-01-01T00:00:00Z").is_ok());
        assert!(check_timestamp("2021-01-01T12:30:45+02:00").is_ok());
        assert!(check_timestamp("2021-01-01T12:30:45.123Z").is_ok());
    }

    #[test]
    fn test_date_only_rejected() {
        assert!(check_timestamp("2021-01-01").is_err());
    }

    #[test]
    fn test_missing_t_separator() {
        assert!(check_timestamp("2021-01-01 00:00:00Z").is_err());
    }

    #[test]
    fn test_naive_timestamp_rejected() {
        assert!(check_timestamp("2021-01-01T00:00:00").is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(check_timestamp("not a timestamp").is_err());
        assert!(check_timestamp("").is_err());
    }
}
