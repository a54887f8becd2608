/*!
 Contains date parsing functions for Core Data timestamps.

 Apple stores `NSDate` values as the number of seconds since `2001-01-01 00:00:00 UTC`,
 with sub-second precision held in the fractional part.
*/

use chrono::{DateTime, TimeZone, Utc};

use crate::error::archive::ArchiveError;

/// Seconds between the Unix epoch and the Core Data epoch
pub const CORE_DATA_EPOCH_OFFSET: i64 = 978_307_200;
/// Sub-second precision kept from an `NSDate`
const MILLIS_PER_SECOND: f64 = 1_000.;

/// Get the offset from the Unix epoch to the Core Data epoch, in seconds
///
/// # Example:
///
/// ```
/// use nskeyedarchiver::util::dates::{get_offset, CORE_DATA_EPOCH_OFFSET};
///
/// assert_eq!(get_offset(), CORE_DATA_EPOCH_OFFSET);
/// ```
pub fn get_offset() -> i64 {
    Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0)
        .single()
        .map(|epoch| epoch.timestamp())
        .unwrap_or(CORE_DATA_EPOCH_OFFSET)
}

/// Convert a Core Data timestamp into a [`DateTime`], keeping millisecond precision
///
/// The fractional part is rounded to the nearest millisecond, so `1.0006` becomes
/// `1.001` seconds after the epoch.
///
/// # Example:
///
/// ```
/// use nskeyedarchiver::util::dates::from_core_data;
///
/// let date = from_core_data(0.5).unwrap();
/// assert_eq!(date.to_rfc3339(), "2001-01-01T00:00:00.500+00:00");
/// ```
pub fn from_core_data(timestamp: f64) -> Result<DateTime<Utc>, ArchiveError> {
    if !timestamp.is_finite() {
        return Err(ArchiveError::InvalidTimestamp(timestamp));
    }
    let millis = (timestamp * MILLIS_PER_SECOND).round();
    if millis.abs() >= i64::MAX as f64 {
        return Err(ArchiveError::InvalidTimestamp(timestamp));
    }
    (millis as i64)
        .checked_add(get_offset() * 1_000)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .ok_or(ArchiveError::InvalidTimestamp(timestamp))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike, Utc};

    use crate::{
        error::archive::ArchiveError,
        util::dates::{from_core_data, get_offset, CORE_DATA_EPOCH_OFFSET},
    };

    #[test]
    fn can_get_offset() {
        assert_eq!(get_offset(), CORE_DATA_EPOCH_OFFSET);
    }

    #[test]
    fn can_convert_epoch() {
        let expected = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(from_core_data(0.).unwrap(), expected);
    }

    #[test]
    fn can_convert_fractional_seconds() {
        let date = from_core_data(600000000.25).unwrap();
        assert_eq!(
            date,
            Utc.with_ymd_and_hms(2020, 1, 6, 10, 40, 0).unwrap()
                + chrono::Duration::milliseconds(250)
        );
        assert_eq!(date.nanosecond(), 250_000_000);
    }

    #[test]
    fn can_convert_before_epoch() {
        let date = from_core_data(-1.5).unwrap();
        assert_eq!(
            date,
            Utc.with_ymd_and_hms(2000, 12, 31, 23, 59, 58).unwrap()
                + chrono::Duration::milliseconds(500)
        );
    }

    #[test]
    fn rounds_to_milliseconds() {
        let date = from_core_data(1.0004).unwrap();
        assert_eq!(date.nanosecond(), 0);
    }

    #[test]
    fn rounds_up_to_nearest_millisecond() {
        let date = from_core_data(1.0006).unwrap();
        assert_eq!(date.second(), 1);
        assert_eq!(date.nanosecond(), 1_000_000);
    }

    #[test]
    fn cant_convert_invalid() {
        assert!(matches!(
            from_core_data(f64::NAN),
            Err(ArchiveError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            from_core_data(f64::INFINITY),
            Err(ArchiveError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            from_core_data(1e300),
            Err(ArchiveError::InvalidTimestamp(_))
        ));
    }
}
