//! Matches attendees to occasions according to their wishes, using deferred
//! acceptance.
//!
//! Attendees propose their most wanted bookings, occasions accept them as long as
//! there are spots and afterwards only in exchange for a booking with a lower score.

pub mod attendee;
pub mod booking;
pub mod budget;
pub mod error;
pub mod matching;
pub mod occasion;
pub mod overlap;
pub mod period;
pub mod scoring;
pub mod stability;

pub use attendee::AttendeeAgent;
pub use booking::{
    AttendeeId, Booking, BookingId, BookingState, Occasion, OccasionId, Priority, TimeRange,
};
pub use budget::LoopBudget;
pub use error::MatchingError;
pub use ferienpass_matching_config::{Alignment, MatchingConfig, ScoringSettings};
pub use matching::{deferred_acceptance, MatchResult, Matcher};
pub use occasion::OccasionAgent;
pub use period::{match_period, PeriodSettings, PeriodStore};
pub use scoring::{BookingFacts, Scoring};
pub use stability::is_stable;
