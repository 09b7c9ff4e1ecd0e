//! Day-aligned cache lifetimes.

use std::time::Duration;

use chrono_tz::Tz;
use time::OffsetDateTime;

use crate::util::timezone::next_local_midnight;

pub const DAY: Duration = Duration::from_secs(86_400);

/// Time left until `local_midnight`, falling back to a full day.
///
/// The fallback covers clock skew (`now` at or past midnight) and anything
/// longer than a day, so the result is always in `(0, 86400]` seconds.
pub fn ttl(now: OffsetDateTime, local_midnight: OffsetDateTime) -> Duration {
    let remaining = (local_midnight - now).whole_seconds();
    if remaining <= 0 || remaining > DAY.as_secs() as i64 {
        return DAY;
    }
    Duration::from_secs(remaining.unsigned_abs())
}

/// Time left in the local day of `tz` at `now`.
pub fn seconds_left_in_day(now: OffsetDateTime, tz: Tz) -> Duration {
    match next_local_midnight(now, tz) {
        Some(midnight) => ttl(now, midnight),
        None => DAY,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn counts_down_to_midnight() {
        let now = datetime!(2024-10-18 23:00 UTC);
        let midnight = datetime!(2024-10-19 0:00 UTC);
        assert_eq!(ttl(now, midnight), Duration::from_secs(3_600));
    }

    #[test]
    fn skewed_inputs_fall_back_to_a_day() {
        let midnight = datetime!(2024-10-19 0:00 UTC);
        assert_eq!(ttl(midnight, midnight), DAY);
        assert_eq!(ttl(datetime!(2024-10-19 0:00:01 UTC), midnight), DAY);
        assert_eq!(ttl(datetime!(2024-10-17 12:00 UTC), midnight), DAY);
    }

    #[test]
    fn always_within_one_day() {
        let midnight = datetime!(2024-10-19 0:00 UTC);
        let mut now = datetime!(2024-10-17 0:00 UTC);
        while now < datetime!(2024-10-20 0:00 UTC) {
            let value = ttl(now, midnight).as_secs();
            assert!(value > 0 && value <= 86_400, "ttl {value} at {now}");
            now += time::Duration::minutes(37);
        }
    }

    #[test]
    fn at_local_midnight_a_full_day_remains() {
        assert_eq!(
            seconds_left_in_day(datetime!(2024-10-18 0:00 UTC), Tz::UTC),
            DAY
        );
        assert_eq!(
            seconds_left_in_day(datetime!(2024-10-18 21:30 UTC), Tz::Europe__Paris),
            Duration::from_secs(30 * 60)
        );
    }
}
