// shared fixtures, not every test binary uses all of them
#![allow(dead_code)]

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate, NaiveDateTime};
use ferienpass_matching_engine::{
    AttendeeId, Booking, BookingId, BookingState, MatchingConfig, Occasion, OccasionId, Priority,
    TimeRange,
};

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
}

/// Midnight `n` days after the start of the holidays.
pub fn day(n: u64) -> NaiveDateTime {
    start_date()
        .checked_add_days(Days::new(n))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap()
}

/// Whole days from `first` up to and including `last`.
pub fn days(first: u64, last: u64) -> TimeRange {
    TimeRange::new(day(first), day(last + 1))
}

pub fn at(year: i32, month: u32, date: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, date)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .unwrap()
}

pub fn hours(year: i32, month: u32, date: u32, from: u32, to: u32) -> TimeRange {
    TimeRange::new(at(year, month, date, from), at(year, month, date, to))
}

/// An occasion together with what its bookings inherit from it.
#[derive(Debug, Clone)]
pub struct TestOccasion {
    pub occasion: Occasion,
    pub dates: Vec<TimeRange>,
    pub anti_affinity_group: Option<String>,
    pub exclude_from_overlap_check: bool,
}

impl TestOccasion {
    pub fn new(name: &str, dates: Vec<TimeRange>) -> Self {
        Self {
            occasion: Occasion::new(name, 10),
            dates,
            anti_affinity_group: None,
            exclude_from_overlap_check: false,
        }
    }

    pub fn with_spots(mut self, max_spots: usize) -> Self {
        self.occasion.max_spots = max_spots;
        self
    }

    pub fn id(&self) -> OccasionId {
        self.occasion.id.clone()
    }
}

/// Hands out booking ids in creation order, scoring bookings by their priority.
#[derive(Debug, Default)]
pub struct Bookings {
    next_id: u64,
    pub bookings: Vec<Booking>,
}

impl Bookings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book(&mut self, occasion: &TestOccasion, attendee: &str, priority: i32) -> BookingId {
        self.book_scored(occasion, attendee, priority, i64::from(priority))
    }

    pub fn book_scored(
        &mut self,
        occasion: &TestOccasion,
        attendee: &str,
        priority: i32,
        score: i64,
    ) -> BookingId {
        self.next_id += 1;
        let id = BookingId(self.next_id);

        let mut booking = Booking::new(
            id,
            AttendeeId::from(attendee),
            occasion.id(),
            Priority(priority),
            occasion.dates[0].start,
            occasion.dates[0].end,
        )
        .with_dates(occasion.dates.clone())
        .with_score(score);
        booking.anti_affinity_group = occasion.anti_affinity_group.clone();
        booking.exclude_from_overlap_check = occasion.exclude_from_overlap_check;

        self.bookings.push(booking);
        id
    }

    pub fn with_state(&mut self, id: BookingId, state: BookingState) {
        if let Some(booking) = self.bookings.iter_mut().find(|booking| booking.id == id) {
            booking.state = state;
        }
    }
}

pub fn occasions(occasions: &[&TestOccasion]) -> Vec<Occasion> {
    occasions
        .iter()
        .map(|occasion| occasion.occasion.clone())
        .collect()
}

pub fn ids(ids: &[BookingId]) -> BTreeSet<BookingId> {
    ids.iter().copied().collect()
}

/// Verifies validity and stability and fails on a used up budget.
pub fn strict() -> MatchingConfig {
    MatchingConfig {
        validity_check: true,
        stability_check: true,
        hard_budget: true,
        ..MatchingConfig::default()
    }
}
