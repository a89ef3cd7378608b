use core::fmt;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::trace;

use crate::attendee::AttendeeAgent;
use crate::booking::{AttendeeId, Booking, BookingId, Occasion, OccasionId};
use crate::error::MatchingError;

pub type Attendees<'a> = BTreeMap<AttendeeId, AttendeeAgent<'a>>;

type Scorer<'a> = Box<dyn Fn(&Booking) -> Decimal + 'a>;

/// The other side of the attendee/occasion pair, trying to fill its spots with the
/// best scored bookings.
pub struct OccasionAgent<'a> {
    id: OccasionId,
    max_spots: usize,
    /// In the order they were assigned.
    bookings: Vec<&'a Booking>,
    attendees: BTreeMap<BookingId, AttendeeId>,
    scorer: Option<Scorer<'a>>,
}

impl fmt::Debug for OccasionAgent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccasionAgent")
            .field("id", &self.id)
            .field("max_spots", &self.max_spots)
            .field("bookings", &self.bookings.iter().map(|b| b.id).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<'a> OccasionAgent<'a> {
    #[must_use]
    pub fn new(occasion: &Occasion) -> Self {
        Self {
            id: occasion.id.clone(),
            max_spots: occasion.max_spots,
            bookings: Vec::new(),
            attendees: BTreeMap::new(),
            scorer: None,
        }
    }

    /// Ranks bookings with `scorer` instead of their precomputed score.
    #[must_use]
    pub fn with_scorer(occasion: &Occasion, scorer: impl Fn(&Booking) -> Decimal + 'a) -> Self {
        Self {
            scorer: Some(Box::new(scorer)),
            ..Self::new(occasion)
        }
    }

    #[must_use]
    pub const fn id(&self) -> &OccasionId {
        &self.id
    }

    pub fn bookings(&self) -> impl Iterator<Item = &'a Booking> + '_ {
        self.bookings.iter().copied()
    }

    #[must_use]
    pub fn holds(&self, booking: &Booking) -> bool {
        self.attendees.contains_key(&booking.id)
    }

    fn score(&self, booking: &Booking) -> Decimal {
        self.scorer
            .as_ref()
            .map_or(booking.score, |scorer| scorer(booking))
    }

    #[must_use]
    pub fn full(&self) -> bool {
        self.bookings.len() >= self.max_spots
    }

    /// Returns the first assigned booking with a lower score than `booking`, which
    /// means `booking` is preferred over it.
    #[must_use]
    pub fn preferred(&self, booking: &Booking) -> Option<&'a Booking> {
        let score = self.score(booking);
        self.bookings
            .iter()
            .copied()
            .find(|assigned| self.score(assigned) < score)
    }

    /// Assigns a booking without telling the attendee, used to set up matchings by hand.
    #[cfg(test)]
    pub(crate) fn assign(&mut self, booking: &'a Booking) {
        self.attendees
            .insert(booking.id, booking.attendee_id.clone());
        self.bookings.push(booking);
    }

    fn accept(
        &mut self,
        attendees: &mut Attendees<'a>,
        attendee: &AttendeeId,
        booking: &'a Booking,
    ) -> Result<(), MatchingError> {
        attendees
            .get_mut(attendee)
            .ok_or_else(|| MatchingError::UnknownAttendee(attendee.clone()))?
            .accept(booking);
        self.attendees.insert(booking.id, attendee.clone());
        self.bookings.push(booking);
        Ok(())
    }

    fn deny(
        &mut self,
        attendees: &mut Attendees<'a>,
        booking: &'a Booking,
    ) -> Result<(), MatchingError> {
        let attendee = self
            .attendees
            .remove(&booking.id)
            .ok_or_else(|| MatchingError::NotAssigned {
                booking: booking.id,
                occasion: self.id.clone(),
            })?;
        attendees
            .get_mut(&attendee)
            .ok_or_else(|| MatchingError::UnknownAttendee(attendee.clone()))?
            .deny(booking);
        self.bookings.retain(|assigned| assigned.id != booking.id);
        Ok(())
    }

    /// Decides on a booking offered by `attendee`.
    ///
    /// Free spots are handed out right away. A full occasion only accepts the booking
    /// if it can throw out one with a lower score, whose attendee gets it back on the
    /// wishlist. Returns false, without changing anything, if the booking is rejected.
    pub fn try_match(
        &mut self,
        attendees: &mut Attendees<'a>,
        attendee: &AttendeeId,
        booking: &'a Booking,
    ) -> Result<bool, MatchingError> {
        if !self.full() {
            self.accept(attendees, attendee, booking)?;
            return Ok(true);
        }

        let Some(over) = self.preferred(booking) else {
            return Ok(false);
        };

        trace!(
            occasion = %self.id,
            evicted = %over.id,
            by = %booking.id,
            "booking displaced by a higher score"
        );
        self.deny(attendees, over)?;
        self.accept(attendees, attendee, booking)?;

        Ok(true)
    }
}
