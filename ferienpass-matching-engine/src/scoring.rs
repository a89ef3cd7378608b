use core::fmt;
use core::ops::RangeInclusive;

use ferienpass_matching_config::ScoringSettings;
use rust_decimal::Decimal;

use crate::booking::Booking;

/// What the scoring needs to know about a booking beyond the booking itself.
pub trait BookingFacts {
    /// Age range of the booked occasion.
    fn age_range(&self, booking: &Booking) -> RangeInclusive<u8>;
    /// Age of the attendee when the occasion takes place.
    fn attendee_age(&self, booking: &Booking) -> u8;
    /// Number of bookings in the group of this booking, one if it is not in a group.
    fn group_size(&self, booking: &Booking) -> usize;
    fn is_organiser_child(&self, booking: &Booking) -> bool;
    fn is_association_child(&self, booking: &Booking) -> bool;
}

pub trait Criterion {
    /// The setting which enables this criterion, `None` if it is always used.
    fn setting(&self) -> Option<&'static str> {
        None
    }

    fn score(&self, booking: &Booking) -> Decimal;
}

/// Scores a booking by the priority the attendee gave it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferMotivated;

impl Criterion for PreferMotivated {
    fn score(&self, booking: &Booking) -> Decimal {
        Decimal::from(booking.priority.0)
    }
}

/// Keeps groups together by boosting group bookings, smaller groups more.
pub struct PreferGroups<'f> {
    group_size: Box<dyn Fn(&Booking) -> usize + 'f>,
}

impl<'f> PreferGroups<'f> {
    pub fn new(group_size: impl Fn(&Booking) -> usize + 'f) -> Self {
        Self {
            group_size: Box::new(group_size),
        }
    }
}

impl Criterion for PreferGroups<'_> {
    fn score(&self, booking: &Booking) -> Decimal {
        match (self.group_size)(booking) {
            0 | 1 => Decimal::ZERO,
            2 => Decimal::ONE,
            3 => Decimal::new(8, 1),
            4 => Decimal::new(6, 1),
            _ => Decimal::new(5, 1),
        }
    }
}

/// Prefers attendees inside the age range of the occasion, losing a tenth per year
/// outside of it.
pub struct PreferInAgeBracket<'f> {
    age_range: Box<dyn Fn(&Booking) -> RangeInclusive<u8> + 'f>,
    attendee_age: Box<dyn Fn(&Booking) -> u8 + 'f>,
}

impl<'f> PreferInAgeBracket<'f> {
    pub fn new(
        age_range: impl Fn(&Booking) -> RangeInclusive<u8> + 'f,
        attendee_age: impl Fn(&Booking) -> u8 + 'f,
    ) -> Self {
        Self {
            age_range: Box::new(age_range),
            attendee_age: Box::new(attendee_age),
        }
    }
}

impl Criterion for PreferInAgeBracket<'_> {
    fn setting(&self) -> Option<&'static str> {
        Some("prefer_in_age_bracket")
    }

    fn score(&self, booking: &Booking) -> Decimal {
        let range = (self.age_range)(booking);
        let age = (self.attendee_age)(booking);

        let distance = if age < *range.start() {
            range.start() - age
        } else if age > *range.end() {
            age - range.end()
        } else {
            0
        };

        (Decimal::ONE - Decimal::new(i64::from(distance), 1)).max(Decimal::ZERO)
    }
}

/// Prefers the children of the organiser of the occasion.
pub struct PreferOrganiserChildren<'f> {
    is_organiser_child: Box<dyn Fn(&Booking) -> bool + 'f>,
}

impl<'f> PreferOrganiserChildren<'f> {
    pub fn new(is_organiser_child: impl Fn(&Booking) -> bool + 'f) -> Self {
        Self {
            is_organiser_child: Box::new(is_organiser_child),
        }
    }
}

impl Criterion for PreferOrganiserChildren<'_> {
    fn setting(&self) -> Option<&'static str> {
        Some("prefer_organiser")
    }

    fn score(&self, booking: &Booking) -> Decimal {
        if (self.is_organiser_child)(booking) {
            Decimal::new(15, 1)
        } else {
            Decimal::ZERO
        }
    }
}

/// Prefers the children of association admins.
pub struct PreferAdminChildren<'f> {
    is_association_child: Box<dyn Fn(&Booking) -> bool + 'f>,
}

impl<'f> PreferAdminChildren<'f> {
    pub fn new(is_association_child: impl Fn(&Booking) -> bool + 'f) -> Self {
        Self {
            is_association_child: Box::new(is_association_child),
        }
    }
}

impl Criterion for PreferAdminChildren<'_> {
    fn setting(&self) -> Option<&'static str> {
        Some("prefer_admins")
    }

    fn score(&self, booking: &Booking) -> Decimal {
        if (self.is_association_child)(booking) {
            Decimal::new(15, 1)
        } else {
            Decimal::ZERO
        }
    }
}

/// Sums up the scores of all criteria.
pub struct Scoring<'f> {
    pub criteria: Vec<Box<dyn Criterion + 'f>>,
}

impl fmt::Debug for Scoring<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scoring")
            .field("criteria", &self.criteria.len())
            .field("settings", &self.settings())
            .finish()
    }
}

impl<'f> Default for Scoring<'f> {
    fn default() -> Self {
        let motivated: Box<dyn Criterion + 'f> = Box::new(PreferMotivated);
        Self {
            criteria: vec![motivated],
        }
    }
}

impl<'f> Scoring<'f> {
    /// Builds the scoring configured for a period.
    pub fn from_settings<F: BookingFacts>(settings: &ScoringSettings, facts: &'f F) -> Self {
        let mut criteria: Vec<Box<dyn Criterion + 'f>> = Vec::new();
        criteria.push(Box::new(PreferMotivated));
        criteria.push(Box::new(PreferGroups::new(move |booking| {
            facts.group_size(booking)
        })));

        if settings.prefer_in_age_bracket {
            criteria.push(Box::new(PreferInAgeBracket::new(
                move |booking| facts.age_range(booking),
                move |booking| facts.attendee_age(booking),
            )));
        }

        if settings.prefer_organiser {
            criteria.push(Box::new(PreferOrganiserChildren::new(move |booking| {
                facts.is_organiser_child(booking)
            })));
        }

        if settings.prefer_admins {
            criteria.push(Box::new(PreferAdminChildren::new(move |booking| {
                facts.is_association_child(booking)
            })));
        }

        Self { criteria }
    }

    #[must_use]
    pub fn settings(&self) -> ScoringSettings {
        let enabled = |name| {
            self.criteria
                .iter()
                .any(|criterion| criterion.setting() == Some(name))
        };

        ScoringSettings {
            prefer_in_age_bracket: enabled("prefer_in_age_bracket"),
            prefer_organiser: enabled("prefer_organiser"),
            prefer_admins: enabled("prefer_admins"),
        }
    }

    #[must_use]
    pub fn score(&self, booking: &Booking) -> Decimal {
        self.criteria
            .iter()
            .map(|criterion| criterion.score(booking))
            .sum()
    }

    /// Stores the score of every booking, the matching only reads it from there.
    pub fn apply(&self, bookings: &mut [Booking]) {
        for booking in bookings {
            booking.score = self.score(booking);
        }
    }
}
