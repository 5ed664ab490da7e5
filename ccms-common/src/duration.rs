//! Duration arithmetic and display formatting
//!
//! Provides the seconds-to-minutes conversion used by the aggregation engine
//! and the duration display format used across the product.

/// Convert a video length in seconds to whole minutes, rounding half up.
///
/// This is the only place lesson video time crosses from seconds to the
/// minute domain; every derived total downstream works in whole minutes.
///
/// # Examples
///
/// ```
/// use ccms_common::duration::video_minutes;
///
/// assert_eq!(video_minutes(0), 0);
/// assert_eq!(video_minutes(29), 0);
/// assert_eq!(video_minutes(30), 1);
/// assert_eq!(video_minutes(630), 11);
/// ```
pub fn video_minutes(video_seconds: i64) -> i64 {
    debug_assert!(video_seconds >= 0, "video_seconds must be non-negative");
    (video_seconds + 30) / 60
}

/// Format a duration in minutes for display.
///
/// Presentation only; derived totals are always stored as raw minutes.
///
/// - `0` → `"0 min"`
/// - `< 60` → `"{m} min"`
/// - exact hour multiples → `"{h}h"`
/// - otherwise → `"{h}h {m}min"`
///
/// # Examples
///
/// ```
/// use ccms_common::duration::format_minutes;
///
/// assert_eq!(format_minutes(0), "0 min");
/// assert_eq!(format_minutes(45), "45 min");
/// assert_eq!(format_minutes(120), "2h");
/// assert_eq!(format_minutes(61), "1h 1min");
/// ```
pub fn format_minutes(minutes: i64) -> String {
    if minutes <= 0 {
        return "0 min".to_string();
    }

    let hours = minutes / 60;
    let rem = minutes % 60;

    if hours == 0 {
        format!("{} min", minutes)
    } else if rem == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}min", hours, rem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_minutes_rounds_half_up() {
        assert_eq!(video_minutes(0), 0);
        assert_eq!(video_minutes(1), 0);
        assert_eq!(video_minutes(29), 0);
        assert_eq!(video_minutes(30), 1);
        assert_eq!(video_minutes(59), 1);
        assert_eq!(video_minutes(60), 1);
        assert_eq!(video_minutes(89), 1);
        assert_eq!(video_minutes(90), 2);
        assert_eq!(video_minutes(630), 11);
        assert_eq!(video_minutes(3600), 60);
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(format_minutes(0), "0 min");
    }

    #[test]
    fn test_format_under_an_hour() {
        assert_eq!(format_minutes(1), "1 min");
        assert_eq!(format_minutes(45), "45 min");
        assert_eq!(format_minutes(59), "59 min");
    }

    #[test]
    fn test_format_exact_hours() {
        assert_eq!(format_minutes(60), "1h");
        assert_eq!(format_minutes(120), "2h");
        assert_eq!(format_minutes(600), "10h");
    }

    #[test]
    fn test_format_hours_and_minutes() {
        assert_eq!(format_minutes(61), "1h 1min");
        assert_eq!(format_minutes(91), "1h 31min");
        assert_eq!(format_minutes(150), "2h 30min");
    }

    #[test]
    fn test_format_negative_clamps_to_zero() {
        // Derived totals are never negative; display defends anyway
        assert_eq!(format_minutes(-5), "0 min");
    }
}
