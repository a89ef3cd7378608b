use crate::booking::{AttendeeId, BookingId, OccasionId};

#[derive(thiserror::Error, Debug)]
pub enum MatchingError {
    #[error("matching did not converge within {max_ticks} iterations")]
    NotConverged { max_ticks: usize },
    #[error("booking {booking} references unknown occasion {occasion}")]
    UnknownOccasion {
        booking: BookingId,
        occasion: OccasionId,
    },
    #[error("no agent acts for attendee {0}")]
    UnknownAttendee(AttendeeId),
    #[error("booking {0} was passed more than once")]
    DuplicateBooking(BookingId),
    #[error("occasion {0} was passed more than once")]
    DuplicateOccasion(OccasionId),
    #[error("booking {booking} is not assigned to occasion {occasion}, this is a bug in the matching")]
    NotAssigned {
        booking: BookingId,
        occasion: OccasionId,
    },
    #[error("attendee {0} ended up with overlapping bookings, this is a bug in the matching")]
    OverlappingBookings(AttendeeId),
    #[error("the matching is not stable, this is a bug in the matching")]
    Unstable,
    #[error("booking store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}
