use std::collections::{BTreeMap, BTreeSet};

use ferienpass_matching_config::MatchingConfig;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::attendee::AttendeeAgent;
use crate::booking::{AttendeeId, Booking, BookingId, BookingState, Occasion, OccasionId};
use crate::budget::LoopBudget;
use crate::error::MatchingError;
use crate::occasion::{Attendees, OccasionAgent};
use crate::overlap::OverlapRules;
use crate::stability::is_stable;

/// Every booking of a run in exactly one of the three states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub open: BTreeSet<BookingId>,
    pub accepted: BTreeSet<BookingId>,
    pub blocked: BTreeSet<BookingId>,
}

impl MatchResult {
    #[must_use]
    pub fn state_of(&self, booking: BookingId) -> Option<BookingState> {
        if self.accepted.contains(&booking) {
            Some(BookingState::Accepted)
        } else if self.blocked.contains(&booking) {
            Some(BookingState::Blocked)
        } else if self.open.contains(&booking) {
            Some(BookingState::Open)
        } else {
            None
        }
    }

    /// The bookings whose persisted state differs from the matched one.
    pub fn changes<'b>(
        &'b self,
        bookings: &'b [Booking],
    ) -> impl Iterator<Item = (&'b Booking, BookingState)> + 'b {
        bookings.iter().filter_map(|booking| {
            self.state_of(booking.id)
                .filter(|state| *state != booking.state)
                .map(|state| (booking, state))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.open.len() + self.accepted.len() + self.blocked.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Matches bookings with occasions using deferred acceptance.
#[derive(Debug, Clone)]
pub struct Matcher<'c> {
    config: &'c MatchingConfig,
    attendee_limits: BTreeMap<AttendeeId, usize>,
}

impl<'c> Matcher<'c> {
    #[must_use]
    pub const fn new(config: &'c MatchingConfig) -> Self {
        Self {
            config,
            attendee_limits: BTreeMap::new(),
        }
    }

    /// Per-attendee booking limits, attendees without one fall back to the default limit.
    #[must_use]
    pub fn with_attendee_limits(mut self, limits: BTreeMap<AttendeeId, usize>) -> Self {
        self.attendee_limits = limits;
        self
    }

    fn limit(&self, attendee: &AttendeeId) -> Option<usize> {
        self.attendee_limits
            .get(attendee)
            .copied()
            .or(self.config.default_limit)
    }

    /// Runs the matching. The persisted state of the bookings is ignored, every run
    /// starts from scratch.
    #[instrument(skip_all, fields(bookings = bookings.len(), occasions = occasions.len()))]
    pub fn run(
        &self,
        bookings: &[Booking],
        occasions: &[Occasion],
    ) -> Result<MatchResult, MatchingError> {
        let mut occasion_agents: BTreeMap<OccasionId, OccasionAgent<'_>> = BTreeMap::new();
        for occasion in occasions {
            if occasion_agents
                .insert(occasion.id.clone(), OccasionAgent::new(occasion))
                .is_some()
            {
                return Err(MatchingError::DuplicateOccasion(occasion.id.clone()));
            }
        }

        let mut seen = BTreeSet::new();
        for booking in bookings {
            if !seen.insert(booking.id) {
                return Err(MatchingError::DuplicateBooking(booking.id));
            }
            if !occasion_agents.contains_key(&booking.occasion_id) {
                return Err(MatchingError::UnknownOccasion {
                    booking: booking.id,
                    occasion: booking.occasion_id.clone(),
                });
            }
        }

        let rules = OverlapRules::new(self.config.minutes_between, self.config.alignment);
        let mut attendees: Attendees<'_> = bookings
            .iter()
            .into_group_map_by(|booking| booking.attendee_id.clone())
            .into_iter()
            .map(|(attendee, wishes)| {
                let agent = AttendeeAgent::new(attendee.clone(), wishes, self.limit(&attendee), rules);
                (attendee, agent)
            })
            .collect();

        // termination of the loop below is not proven, the budget makes sure it stops
        let mut budget = LoopBudget::new(
            self.config
                .max_ticks
                .unwrap_or_else(|| bookings.len() * attendees.len()),
        );

        while attendees.values().any(AttendeeAgent::has_wishes) {
            if budget.limit_reached() {
                if self.config.hard_budget {
                    error!(max_ticks = budget.max_ticks(), "matching did not converge");
                    return Err(MatchingError::NotConverged {
                        max_ticks: budget.max_ticks(),
                    });
                }
                warn!(
                    max_ticks = budget.max_ticks(),
                    "loop budget used up, keeping the partial result"
                );
                break;
            }

            let mut candidates = attendees
                .values()
                .filter(|attendee| attendee.has_wishes())
                .map(|attendee| attendee.id().clone())
                .collect_vec();
            let mut matched = 0_usize;

            debug!(round = budget.ticks(), candidates = candidates.len(), "matching round");

            while let Some(candidate) = candidates.pop() {
                let wishes = attendees
                    .get(&candidate)
                    .ok_or_else(|| MatchingError::UnknownAttendee(candidate.clone()))?
                    .wishlist()
                    .collect_vec();

                for booking in wishes {
                    let occasion = occasion_agents.get_mut(&booking.occasion_id).ok_or_else(|| {
                        MatchingError::UnknownOccasion {
                            booking: booking.id,
                            occasion: booking.occasion_id.clone(),
                        }
                    })?;

                    // accepting changes the wishlist, so stop at the first match
                    if occasion.try_match(&mut attendees, &candidate, booking)? {
                        matched += 1;
                        break;
                    }
                }
            }

            // nobody got anything, the situation can't be improved
            if matched == 0 {
                break;
            }
        }

        if self.config.validity_check {
            if let Some(invalid) = attendees.values().find(|attendee| !attendee.is_valid()) {
                error!(attendee = %invalid.id(), "overlapping bookings were accepted");
                return Err(MatchingError::OverlappingBookings(invalid.id().clone()));
            }
        }

        if self.config.stability_check {
            let agents = occasion_agents.values().collect_vec();
            if !is_stable(attendees.values().flat_map(AttendeeAgent::accepted), &agents) {
                error!("matching result is not stable");
                return Err(MatchingError::Unstable);
            }
        }

        let result = MatchResult {
            open: attendees
                .values()
                .flat_map(AttendeeAgent::wishlist)
                .map(|booking| booking.id)
                .collect(),
            accepted: attendees
                .values()
                .flat_map(AttendeeAgent::accepted)
                .map(|booking| booking.id)
                .collect(),
            blocked: attendees
                .values()
                .flat_map(AttendeeAgent::blocked)
                .map(|booking| booking.id)
                .collect(),
        };

        info!(
            rounds = budget.ticks(),
            open = result.open.len(),
            accepted = result.accepted.len(),
            blocked = result.blocked.len(),
            "matching finished"
        );

        Ok(result)
    }
}

/// Matches bookings with occasions, see [`Matcher`].
pub fn deferred_acceptance(
    bookings: &[Booking],
    occasions: &[Occasion],
    config: &MatchingConfig,
) -> Result<MatchResult, MatchingError> {
    Matcher::new(config).run(bookings, occasions)
}
