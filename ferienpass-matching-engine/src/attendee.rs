use core::cmp::Reverse;
use std::collections::BTreeMap;

use itertools::Itertools;

use crate::booking::{AttendeeId, Booking, BookingId, Priority};
use crate::overlap::OverlapRules;

type WishKey = (Reverse<Priority>, BookingId);

fn wish_key(booking: &Booking) -> WishKey {
    (Reverse(booking.priority), booking.id)
}

/// Acts on behalf of an attendee, trying to get the most wanted bookings accepted.
///
/// Every booking of the attendee is in exactly one of `wishlist`, `accepted` and
/// `blocked`. The wishlist is ordered by descending priority, ties broken by the
/// lower booking id.
#[derive(Debug)]
pub struct AttendeeAgent<'a> {
    id: AttendeeId,
    limit: Option<usize>,
    rules: OverlapRules,
    wishlist: BTreeMap<WishKey, &'a Booking>,
    accepted: BTreeMap<BookingId, &'a Booking>,
    blocked: BTreeMap<BookingId, &'a Booking>,
}

impl<'a> AttendeeAgent<'a> {
    /// `limit` caps the number of accepted bookings, `None` and zero mean no limit.
    pub fn new<I>(id: AttendeeId, bookings: I, limit: Option<usize>, rules: OverlapRules) -> Self
    where
        I: IntoIterator<Item = &'a Booking>,
    {
        Self {
            id,
            limit: limit.filter(|limit| *limit > 0),
            rules,
            wishlist: bookings
                .into_iter()
                .map(|booking| (wish_key(booking), booking))
                .collect(),
            accepted: BTreeMap::new(),
            blocked: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> &AttendeeId {
        &self.id
    }

    #[must_use]
    pub fn has_wishes(&self) -> bool {
        !self.wishlist.is_empty()
    }

    /// Remaining wishes, most wanted first.
    pub fn wishlist(&self) -> impl Iterator<Item = &'a Booking> + '_ {
        self.wishlist.values().copied()
    }

    pub fn accepted(&self) -> impl Iterator<Item = &'a Booking> + '_ {
        self.accepted.values().copied()
    }

    pub fn blocked(&self) -> impl Iterator<Item = &'a Booking> + '_ {
        self.blocked.values().copied()
    }

    /// Moves a wished booking to the accepted ones and blocks every wish that can no
    /// longer be attended next to it.
    pub fn accept(&mut self, booking: &'a Booking) {
        let removed = self.wishlist.remove(&wish_key(booking));
        debug_assert!(removed.is_some(), "accepted booking {} was not wished", booking.id);

        self.accepted.insert(booking.id, booking);

        let limit_reached = self
            .limit
            .is_some_and(|limit| self.accepted.len() >= limit);
        let rules = self.rules;

        let newly_blocked = self
            .wishlist
            .iter()
            .filter(|(_, wish)| limit_reached || rules.blocks(booking, wish))
            .map(|(key, _)| *key)
            .collect_vec();

        for key in newly_blocked {
            if let Some(wish) = self.wishlist.remove(&key) {
                self.blocked.insert(wish.id, wish);
            }
        }
    }

    /// Takes back an accepted booking (another attendee got the spot) and unblocks
    /// everything that is not blocked by the remaining accepted bookings.
    pub fn deny(&mut self, booking: &'a Booking) {
        let removed = self.accepted.remove(&booking.id);
        debug_assert!(removed.is_some(), "denied booking {} was not accepted", booking.id);

        self.wishlist.insert(wish_key(booking), booking);

        let rules = self.rules;
        let unblockable = self
            .blocked
            .values()
            .filter(|blocked| {
                !self
                    .accepted
                    .values()
                    .any(|accepted| rules.blocks(accepted, blocked))
            })
            .map(|blocked| blocked.id)
            .collect_vec();

        for id in unblockable {
            if let Some(free) = self.blocked.remove(&id) {
                self.wishlist.insert(wish_key(free), free);
            }
        }
    }

    /// True if no two accepted bookings block each other.
    ///
    /// The matching never gets here with an invalid agent, this is an extra safety net.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.accepted
            .values()
            .tuple_combinations()
            .all(|(a, b)| !self.rules.blocks(a, b))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::booking::OccasionId;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 3, 8)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    fn booking(id: u64, priority: i32, start: u32, end: u32) -> Booking {
        Booking::new(
            BookingId(id),
            AttendeeId::from("Justin"),
            OccasionId(format!("occasion-{id}")),
            Priority(priority),
            at(start),
            at(end),
        )
    }

    fn ids<'a>(bookings: impl Iterator<Item = &'a Booking>) -> Vec<u64> {
        bookings.map(|booking| booking.id.0).collect()
    }

    fn agent(bookings: &[Booking], limit: Option<usize>) -> AttendeeAgent<'_> {
        AttendeeAgent::new(
            AttendeeId::from("Justin"),
            bookings,
            limit,
            OverlapRules::default(),
        )
    }

    #[test]
    fn wishlist_orders_by_priority_then_id() {
        let bookings = [
            booking(3, 0, 8, 9),
            booking(1, 0, 10, 11),
            booking(2, 1, 12, 13),
            booking(4, 1, 14, 15),
        ];
        let agent = agent(&bookings, None);

        assert_eq!(ids(agent.wishlist()), [2, 4, 1, 3]);
    }

    #[test]
    fn accept_blocks_overlapping_wishes() {
        let bookings = [
            booking(1, 0, 8, 10),
            booking(2, 0, 9, 11),
            booking(3, 0, 10, 12),
        ];
        let mut agent = agent(&bookings, None);

        agent.accept(&bookings[0]);

        assert_eq!(ids(agent.accepted()), [1]);
        assert_eq!(ids(agent.blocked()), [2]);
        assert_eq!(ids(agent.wishlist()), [3]);
        assert!(agent.is_valid());
    }

    #[test]
    fn deny_unblocks_freed_wishes() {
        let bookings = [
            booking(1, 0, 8, 10),
            booking(2, 0, 9, 11),
            booking(3, 0, 12, 13),
        ];
        let mut agent = agent(&bookings, None);

        agent.accept(&bookings[0]);
        agent.accept(&bookings[2]);
        agent.deny(&bookings[0]);

        assert_eq!(ids(agent.accepted()), [3]);
        assert_eq!(ids(agent.wishlist()), [1, 2]);
        assert_eq!(agent.blocked().count(), 0);
    }

    #[test]
    fn deny_keeps_wishes_blocked_by_other_accepted_bookings() {
        let bookings = [
            booking(1, 0, 7, 8),
            booking(2, 0, 8, 13),
            booking(3, 0, 7, 9),
        ];
        let mut agent = agent(&bookings, None);

        agent.accept(&bookings[0]);
        agent.accept(&bookings[1]);
        assert_eq!(ids(agent.blocked()), [3]);

        agent.deny(&bookings[0]);

        assert_eq!(ids(agent.blocked()), [3]);
        assert_eq!(ids(agent.wishlist()), [1]);
    }

    #[test]
    fn limit_blocks_the_rest_of_the_wishlist() {
        let bookings = [
            booking(1, 0, 8, 9),
            booking(2, 0, 10, 11),
            booking(3, 0, 12, 13),
        ];
        let mut agent = agent(&bookings, Some(2));

        agent.accept(&bookings[0]);
        assert_eq!(ids(agent.wishlist()), [2, 3]);

        agent.accept(&bookings[1]);
        assert_eq!(ids(agent.blocked()), [3]);
        assert!(!agent.has_wishes());

        agent.deny(&bookings[1]);
        assert_eq!(ids(agent.wishlist()), [2, 3]);
        assert_eq!(agent.blocked().count(), 0);
    }

    #[test]
    fn zero_limit_is_unlimited() {
        let bookings = [booking(1, 0, 8, 9), booking(2, 0, 10, 11)];
        let mut agent = agent(&bookings, Some(0));

        agent.accept(&bookings[0]);

        assert_eq!(ids(agent.wishlist()), [2]);
    }

    #[test]
    fn overlapping_accepted_bookings_are_invalid() {
        let bookings = [booking(1, 0, 8, 10), booking(2, 0, 9, 11)];
        let mut agent = agent(&bookings, None);
        assert!(agent.is_valid());

        // bypasses accept, which would have blocked the second booking
        for booking in &bookings {
            agent.wishlist.remove(&wish_key(booking));
            agent.accepted.insert(booking.id, booking);
        }

        assert!(!agent.is_valid());
    }
}
