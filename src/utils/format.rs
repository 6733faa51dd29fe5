use chrono::DateTime;

/// Format a unix-milliseconds timestamp as a readable date, e.g.
/// "Nov 14, 2023". Zero and unparseable values render as a dash.
pub fn format_millis(millis: i64) -> String {
    if millis <= 0 {
        return "-".to_string();
    }
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.format("%b %d, %Y").to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0), "-");
        assert_eq!(format_millis(-5), "-");
        // 2023-11-14T22:13:20Z
        assert_eq!(format_millis(1_700_000_000_000), "Nov 14, 2023");
    }

    #[test]
    fn test_format_millis_far_future_is_safe() {
        // Out-of-range values must not panic
        assert_eq!(format_millis(i64::MAX), "-");
    }
}
