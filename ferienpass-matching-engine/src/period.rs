use std::collections::BTreeMap;

use ferienpass_matching_config::{Alignment, MatchingConfig, ScoringSettings};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::booking::{AttendeeId, Booking, BookingId, BookingState, Occasion};
use crate::error::MatchingError;
use crate::matching::{MatchResult, Matcher};
use crate::scoring::{BookingFacts, Scoring};

/// Matching related settings of a booking period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSettings {
    /// Applies to every attendee, replaces the per-attendee limits if set.
    pub max_bookings_per_attendee: Option<usize>,
    pub minutes_between: u32,
    pub alignment: Option<Alignment>,
    /// Criteria the bookings are scored with before matching.
    pub scoring: ScoringSettings,
}

/// Where the bookings and occasions of a period are loaded from and the matched
/// states written to.
pub trait PeriodStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn settings(&self) -> Result<PeriodSettings, Self::Error>;

    /// All bookings of the period that were not cancelled.
    fn bookings(&self) -> Result<Vec<Booking>, Self::Error>;

    fn occasions(&self) -> Result<Vec<Occasion>, Self::Error>;

    fn attendee_limits(&self) -> Result<BTreeMap<AttendeeId, usize>, Self::Error>;

    fn write_state(&mut self, booking: BookingId, state: BookingState) -> Result<(), Self::Error>;
}

fn store_error<E: std::error::Error + Send + Sync + 'static>(error: E) -> MatchingError {
    MatchingError::Store(Box::new(error))
}

/// Scores the bookings of a period with its scoring settings, matches them and
/// writes back the states that changed.
#[instrument(skip_all)]
pub fn match_period<S: PeriodStore, F: BookingFacts>(
    store: &mut S,
    facts: &F,
    config: &MatchingConfig,
) -> Result<MatchResult, MatchingError> {
    let settings = store.settings().map_err(store_error)?;
    let mut bookings = store.bookings().map_err(store_error)?;
    let occasions = store.occasions().map_err(store_error)?;

    let scoring = Scoring::from_settings(&settings.scoring, facts);
    scoring.apply(&mut bookings);
    debug!(?scoring, "bookings scored");

    let config = MatchingConfig {
        default_limit: settings.max_bookings_per_attendee,
        minutes_between: settings.minutes_between,
        alignment: settings.alignment,
        ..config.clone()
    };

    let mut matcher = Matcher::new(&config);
    if settings.max_bookings_per_attendee.is_none() {
        matcher = matcher.with_attendee_limits(store.attendee_limits().map_err(store_error)?);
    }

    let result = matcher.run(&bookings, &occasions)?;

    let mut changed = 0_usize;
    for (booking, state) in result.changes(&bookings) {
        store.write_state(booking.id, state).map_err(store_error)?;
        changed += 1;
    }

    info!(changed, "period bookings updated");

    Ok(result)
}
