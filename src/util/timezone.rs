use chrono::{DateTime, Days, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use time::{Date, OffsetDateTime, UtcOffset};

/// Offset of `tz` from UTC at the given instant.
pub fn local_offset(time: OffsetDateTime, tz: Tz) -> UtcOffset {
    let seconds = time.unix_timestamp();
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|utc| tz.offset_from_utc_datetime(&utc.naive_utc()).fix().local_minus_utc())
        .and_then(|offset| UtcOffset::from_whole_seconds(offset).ok())
        .unwrap_or(UtcOffset::UTC)
}

pub fn localized_datetime(time: OffsetDateTime, tz: Tz) -> OffsetDateTime {
    time.to_offset(local_offset(time, tz))
}

pub fn localized_date(time: OffsetDateTime, tz: Tz) -> Date {
    localized_datetime(time, tz).date()
}

/// The first instant of the next local calendar day.
///
/// Returns `None` when local midnight does not exist on that day (a DST gap
/// at 00:00) or falls outside the representable range.
pub fn next_local_midnight(time: OffsetDateTime, tz: Tz) -> Option<OffsetDateTime> {
    let utc = DateTime::<Utc>::from_timestamp(time.unix_timestamp(), time.nanosecond())?;
    let tomorrow = tz
        .from_utc_datetime(&utc.naive_utc())
        .date_naive()
        .checked_add_days(Days::new(1))?;
    let midnight = tz
        .from_local_datetime(&tomorrow.and_time(NaiveTime::MIN))
        .earliest()?;
    OffsetDateTime::from_unix_timestamp(midnight.timestamp()).ok()
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;

    #[test]
    fn localized_date_follows_the_site_timezone() {
        let instant = datetime!(2024-10-18 23:30 UTC);
        assert_eq!(localized_date(instant, Tz::UTC), date!(2024 - 10 - 18));
        assert_eq!(localized_date(instant, Tz::Europe__Paris), date!(2024 - 10 - 19));
        assert_eq!(
            localized_date(datetime!(2024-10-18 3:00 UTC), Tz::America__New_York),
            date!(2024 - 10 - 17)
        );
    }

    #[test]
    fn next_midnight_in_utc() {
        let next = next_local_midnight(datetime!(2024-10-18 18:00 UTC), Tz::UTC).expect("midnight");
        assert_eq!(next, datetime!(2024-10-19 0:00 UTC));
    }

    #[test]
    fn next_midnight_from_midnight_is_a_day_later() {
        let next = next_local_midnight(datetime!(2024-10-18 0:00 UTC), Tz::UTC).expect("midnight");
        assert_eq!(next, datetime!(2024-10-19 0:00 UTC));
    }

    #[test]
    fn next_midnight_honours_offsets() {
        // Paris is on UTC+2 until the end of October.
        let next = next_local_midnight(datetime!(2024-10-18 21:00 UTC), Tz::Europe__Paris)
            .expect("midnight");
        assert_eq!(next, datetime!(2024-10-18 22:00 UTC));
    }
}
