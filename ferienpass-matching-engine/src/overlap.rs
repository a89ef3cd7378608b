use chrono::{Days, Duration, NaiveDateTime, NaiveTime};
use ferienpass_matching_config::Alignment;

use crate::booking::{Booking, TimeRange};

/// Decides whether two bookings of the same attendee exclude each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapRules {
    pub minutes_between: u32,
    pub alignment: Option<Alignment>,
}

impl OverlapRules {
    #[must_use]
    pub const fn new(minutes_between: u32, alignment: Option<Alignment>) -> Self {
        Self {
            minutes_between,
            alignment,
        }
    }

    /// True if `booking` and `other` cannot both be accepted.
    ///
    /// A shared anti-affinity group always blocks, even if one of the bookings is
    /// excluded from the overlap check.
    #[must_use]
    pub fn blocks(&self, booking: &Booking, other: &Booking) -> bool {
        if booking.id == other.id {
            return true;
        }

        if booking.anti_affinity_group.is_some()
            && booking.anti_affinity_group == other.anti_affinity_group
        {
            return true;
        }

        if booking.exclude_from_overlap_check || other.exclude_from_overlap_check {
            return false;
        }

        dates_overlap(
            &booking.dates,
            &other.dates,
            self.minutes_between,
            self.alignment,
        )
    }
}

/// True if any range in `a` overlaps any range in `b`.
///
/// Ranges are half-open, so `10:00-11:00` and `11:00-12:00` do not overlap unless
/// there are minutes between them.
#[must_use]
pub fn dates_overlap(
    a: &[TimeRange],
    b: &[TimeRange],
    minutes_between: u32,
    alignment: Option<Alignment>,
) -> bool {
    let offset = Duration::minutes(i64::from(minutes_between));
    let prepare = |range: &TimeRange| {
        let range = match alignment {
            Some(Alignment::Day) => align_to_day(*range),
            None => *range,
        };
        let end = range
            .end
            .checked_add_signed(offset)
            .unwrap_or(NaiveDateTime::MAX);
        (range.start, end)
    };

    a.iter().map(prepare).any(|(start, end)| {
        b.iter()
            .map(prepare)
            .any(|(other_start, other_end)| start < other_end && other_start < end)
    })
}

fn midnight(value: NaiveDateTime) -> NaiveDateTime {
    value.date().and_time(NaiveTime::MIN)
}

/// Stretches the range to cover every day it touches.
fn align_to_day(range: TimeRange) -> TimeRange {
    let start = midnight(range.start);
    let end = if range.end > range.start && range.end == midnight(range.end) {
        range.end
    } else {
        midnight(range.end)
            .checked_add_days(Days::new(1))
            .unwrap_or(range.end)
    };

    TimeRange::new(start, end)
}
