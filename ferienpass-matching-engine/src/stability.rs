use crate::booking::Booking;
use crate::occasion::OccasionAgent;

/// Returns true if the matching between the accepted bookings and the occasions
/// is stable.
///
/// For every accepted booking and every occasion not holding it: if that occasion
/// would throw out one of its bookings for it, and another occasion would in turn
/// take the thrown out booking over one of its own which the first occasion also
/// prefers, the matching is unstable.
///
/// Runs in O(n^4), a testing tool, not something to run in production.
pub fn is_stable<'a>(
    accepted: impl IntoIterator<Item = &'a Booking>,
    occasions: &[&OccasionAgent<'a>],
) -> bool {
    for booking in accepted {
        for occasion in occasions {
            if occasion.holds(booking) {
                continue;
            }

            let Some(over) = occasion.preferred(booking) else {
                continue;
            };

            for other in occasions {
                if other.id() == occasion.id() {
                    continue;
                }

                if other
                    .preferred(over)
                    .is_some_and(|switch| occasion.preferred(switch).is_some())
                {
                    return false;
                }
            }
        }
    }

    true
}
