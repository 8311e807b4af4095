/// Total fare for a booking: seats times the configured per-seat price.
///
/// The price is injected configuration rather than engine logic; a
/// per-route fare service can replace it without touching the booking
/// flow.
pub fn quote(seat_count: u32, price_per_seat: i64) -> i64 {
    i64::from(seat_count) * price_per_seat
}

#[cfg(test)]
mod tests {
    use super::quote;

    #[test]
    fn amount_scales_with_seat_count() {
        assert_eq!(quote(1, 1500), 1500);
        assert_eq!(quote(4, 1500), 6000);
    }
}
