use uuid::Uuid;

use yatra_domain::booking::Booking;

/// Seats from `requested` already held by a non-cancelled booking on the
/// same trip.
///
/// The whole requested set is intersected at once: a request for
/// `{A2, A3}` against a booking holding `{A1, A2}` is rejected even
/// though `A3` is free. `exclude` skips the booking being updated.
pub fn conflicting_seats(
    existing: &[Booking],
    requested: &[String],
    exclude: Option<Uuid>,
) -> Vec<String> {
    requested
        .iter()
        .filter(|seat| {
            existing.iter().any(|booking| {
                booking.holds_seats()
                    && exclude != Some(booking.id)
                    && booking.seat_numbers.contains(seat)
            })
        })
        .cloned()
        .collect()
}
