// these come from the database, the matching only ever reads them

use core::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookingId(pub u64);

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttendeeId(pub String);

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccasionId(pub String);

/// How much the attendee wants a booking, higher is better.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Priority(pub i32);

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AttendeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for OccasionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttendeeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<&str> for OccasionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingState {
    Open,
    Accepted,
    Blocked,
}

/// A half-open `[start, end)` range in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    #[must_use]
    pub const fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }
}

/// The wish of one attendee to attend one occasion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub attendee_id: AttendeeId,
    pub occasion_id: OccasionId,
    pub priority: Priority,
    /// Used by occasions to rank competing bookings. Computed before matching.
    pub score: Decimal,
    /// Usually a single range, occasions spanning several dates have more.
    pub dates: Vec<TimeRange>,
    /// Bookings of occasions in the same group are never accepted together.
    pub anti_affinity_group: Option<String>,
    pub exclude_from_overlap_check: bool,
    /// The persisted state, ignored by the matching.
    pub state: BookingState,
}

impl Booking {
    #[must_use]
    pub fn new(
        id: BookingId,
        attendee_id: AttendeeId,
        occasion_id: OccasionId,
        priority: Priority,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            attendee_id,
            occasion_id,
            priority,
            score: Decimal::ZERO,
            dates: vec![TimeRange::new(start, end)],
            anti_affinity_group: None,
            exclude_from_overlap_check: false,
            state: BookingState::Open,
        }
    }

    #[must_use]
    pub fn with_score(mut self, score: impl Into<Decimal>) -> Self {
        self.score = score.into();
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: BookingState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn with_dates(mut self, dates: Vec<TimeRange>) -> Self {
        self.dates = dates;
        self
    }

    #[must_use]
    pub fn with_anti_affinity_group(mut self, group: impl Into<String>) -> Self {
        self.anti_affinity_group = Some(group.into());
        self
    }

    #[must_use]
    pub const fn excluded_from_overlap_check(mut self) -> Self {
        self.exclude_from_overlap_check = true;
        self
    }

    /// Start of the first date.
    #[must_use]
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.dates.iter().map(|range| range.start).min()
    }

    /// End of the last date.
    #[must_use]
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.dates.iter().map(|range| range.end).max()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occasion {
    pub id: OccasionId,
    pub max_spots: usize,
}

impl Occasion {
    #[must_use]
    pub fn new(id: impl Into<OccasionId>, max_spots: usize) -> Self {
        Self {
            id: id.into(),
            max_spots,
        }
    }
}
