//! Last-known-value annotation for metric series
//!
//! The monitoring API reports zero for days it has no data for. The first
//! zero after the initial period marks where data stops, so the day before
//! it is shown as the last known value. This is a heuristic.

use chrono::{Duration, TimeZone};
use std::fmt::Display;

use crate::models::DailyMetricPoint;

/// Display format of the last known value timestamp
pub const LAST_KNOWN_VALUE_FORMAT: &str = "%d %b %Y, %H:%M%P (%z)";

/// First sample past the initial period whose value is the number zero.
/// A string `"0"` does not count.
pub fn first_zero_sample<'a>(
    points: &'a [DailyMetricPoint],
    attribute: &str,
) -> Option<&'a DailyMetricPoint> {
    points
        .iter()
        .find(|point| point.loop_id > 0 && point.number(attribute) == Some(0.0))
}

/// Formatted timestamp of the last known value, rendered in `tz`
pub fn last_known_value<Tz>(points: &[DailyMetricPoint], attribute: &str, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let zero = first_zero_sample(points, attribute)?;
    let last_known = zero.period_start - Duration::days(1);
    Some(
        last_known
            .with_timezone(tz)
            .format(LAST_KNOWN_VALUE_FORMAT)
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    const ATTR: &str = "max_cpu_usage";

    fn point(day: u32, loop_id: u32, value: f64) -> DailyMetricPoint {
        let start = Utc.with_ymd_and_hms(2023, 5, day, 0, 0, 0).unwrap();
        DailyMetricPoint::new(start, loop_id).with_value(ATTR, value)
    }

    #[test]
    fn test_zero_after_first_period_reports_previous_day() {
        let points = vec![point(9, 0, 5.0), point(10, 1, 0.0)];
        assert_eq!(
            last_known_value(&points, ATTR, &Utc).as_deref(),
            Some("09 May 2023, 00:00am (+0000)")
        );
    }

    #[test]
    fn test_zero_in_first_period_is_ignored() {
        let points = vec![point(9, 0, 0.0), point(10, 1, 3.0), point(11, 2, 4.0)];
        assert!(last_known_value(&points, ATTR, &Utc).is_none());
    }

    #[test]
    fn test_first_zero_wins() {
        let points = vec![
            point(9, 0, 5.0),
            point(10, 1, 7.0),
            point(11, 2, 0.0),
            point(12, 3, 0.0),
        ];
        assert_eq!(first_zero_sample(&points, ATTR).unwrap().loop_id, 2);
    }

    #[test]
    fn test_missing_attribute_is_not_zero() {
        let start = Utc.with_ymd_and_hms(2023, 5, 10, 0, 0, 0).unwrap();
        let points = vec![DailyMetricPoint::new(start, 1)];
        assert!(last_known_value(&points, ATTR, &Utc).is_none());
    }

    #[test]
    fn test_zero_string_is_not_zero() {
        let start = Utc.with_ymd_and_hms(2023, 5, 10, 0, 0, 0).unwrap();
        let mut zero_string = DailyMetricPoint::new(start, 1);
        zero_string
            .values
            .insert(ATTR.to_string(), serde_json::Value::from("0"));
        let points = vec![point(9, 0, 5.0), zero_string];

        assert!(last_known_value(&points, ATTR, &Utc).is_none());
    }

    #[test]
    fn test_rendered_in_given_offset() {
        let points = vec![point(9, 0, 5.0), point(10, 1, 0.0)];
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            last_known_value(&points, ATTR, &offset).as_deref(),
            Some("09 May 2023, 02:00am (+0200)")
        );
    }
}
