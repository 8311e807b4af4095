use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use yatra_core::admission::KeyedLocks;
use yatra_core::notify::NotificationSink;
use yatra_core::payment::{CheckoutSession, PaymentGateway};
use yatra_core::repository::{BookingRepository, StoreError};
use yatra_domain::booking::{
    Booking, BookingStatus, CreateBookingRequest, PaymentStatus, UpdateBookingRequest,
};
use yatra_domain::{validate, DomainError};

use crate::{allocation, pricing};

#[derive(Debug, Clone)]
pub struct Fares {
    pub price_per_seat: i64,
    pub currency: String,
}

/// Orchestrates the booking lifecycle: create, update, pay, confirm,
/// cancel, delete.
///
/// Seat admission runs under the per-trip lock, so concurrent requests
/// for one trip are checked one at a time. Refunds gate cancellation;
/// notifications never gate anything.
pub struct BookingLifecycleManager {
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentGateway>,
    notifications: Arc<dyn NotificationSink>,
    locks: KeyedLocks,
    fares: Fares,
}

impl BookingLifecycleManager {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        payments: Arc<dyn PaymentGateway>,
        notifications: Arc<dyn NotificationSink>,
        fares: Fares,
    ) -> Self {
        Self {
            bookings,
            payments,
            notifications,
            locks: KeyedLocks::new(),
            fares,
        }
    }

    pub async fn create(
        &self,
        passenger_id: &str,
        req: CreateBookingRequest,
    ) -> Result<Booking, DomainError> {
        validate::validate_create(&req)?;

        let _guard = self.locks.acquire(&trip_key(&req.trip_id)).await;

        let existing = self
            .bookings
            .holding_for_trip(&req.trip_id)
            .await
            .map_err(store_err)?;
        let clash = allocation::conflicting_seats(&existing, &req.seat_numbers, None);
        if !clash.is_empty() {
            return Err(seats_taken(&clash));
        }

        let seat_count = req.seat_numbers.len() as u32;
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            passenger_id: passenger_id.to_string(),
            phone_number: req.phone_number,
            transport_type: req.transport_type,
            trip_id: req.trip_id,
            seat_numbers: req.seat_numbers,
            seat_count,
            coach_number: req.coach_number,
            from_location: req.from_location,
            to_location: req.to_location,
            departure_time: req.departure_time,
            amount: pricing::quote(seat_count, self.fares.price_per_seat),
            booking_status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_session_id: None,
            payment_intent_id: None,
            created_at: now,
            updated_at: now,
        };
        self.bookings
            .insert(&booking)
            .await
            .map_err(duplicate_is_conflict)?;

        info!(booking = %booking.id, trip = %booking.trip_id, seats = booking.seat_count, "booking created");
        Ok(booking)
    }

    /// Permitted only while PENDING and only by the owner. A new seat set
    /// re-runs the conflict check (excluding this booking) and reprices;
    /// a new departure time overwrites directly, since scheduling and
    /// booking are decoupled layers.
    pub async fn update(
        &self,
        id: Uuid,
        passenger_id: &str,
        req: UpdateBookingRequest,
    ) -> Result<Booking, DomainError> {
        let mut booking = self.owned(id, passenger_id).await?;
        if booking.booking_status != BookingStatus::Pending {
            return Err(DomainError::InvalidState(
                "Only pending bookings can be updated".to_string(),
            ));
        }

        if let Some(phone) = &req.phone_number {
            validate::validate_phone(phone)?;
            booking.phone_number = phone.clone();
        }
        if let Some(coach) = &req.coach_number {
            validate::validate_coach(booking.transport_type, Some(coach.as_str()))?;
            booking.coach_number = Some(coach.clone());
        }
        if let Some(from) = &req.from_location {
            booking.from_location = from.clone();
        }
        if let Some(to) = &req.to_location {
            booking.to_location = to.clone();
        }
        if let Some(departure) = req.departure_time {
            booking.departure_time = departure;
        }

        let _seat_guard = if let Some(seats) = &req.seat_numbers {
            validate::validate_seat_set(seats)?;
            let guard = self.locks.acquire(&trip_key(&booking.trip_id)).await;

            let existing = self
                .bookings
                .holding_for_trip(&booking.trip_id)
                .await
                .map_err(store_err)?;
            let clash = allocation::conflicting_seats(&existing, seats, Some(booking.id));
            if !clash.is_empty() {
                return Err(seats_taken(&clash));
            }

            booking.seat_numbers = seats.clone();
            booking.seat_count = seats.len() as u32;
            booking.amount = pricing::quote(booking.seat_count, self.fares.price_per_seat);
            Some(guard)
        } else {
            None
        };

        booking.updated_at = Utc::now();
        self.bookings
            .update(&booking)
            .await
            .map_err(duplicate_is_conflict)?;

        info!(booking = %booking.id, "booking updated");
        Ok(booking)
    }

    /// Open a checkout session for the booking's amount and record the
    /// session/intent ids for the later confirm or refund.
    pub async fn pay(&self, id: Uuid, passenger_id: &str) -> Result<CheckoutSession, DomainError> {
        let mut booking = self.owned(id, passenger_id).await?;
        if booking.booking_status == BookingStatus::Cancelled {
            return Err(DomainError::InvalidState(
                "Cancelled bookings cannot be paid".to_string(),
            ));
        }
        if booking.payment_status == PaymentStatus::Paid {
            return Err(DomainError::InvalidState("Booking already paid".to_string()));
        }

        let description = format!("{} Trip Booking", booking.transport_type);
        let session = self
            .payments
            .create_session(booking.id, booking.amount, &self.fares.currency, &description)
            .await
            .map_err(|err| DomainError::Payment(err.to_string()))?;

        booking.payment_session_id = Some(session.session_id.clone());
        if session.payment_intent_id.is_some() {
            booking.payment_intent_id = session.payment_intent_id.clone();
        }
        booking.updated_at = Utc::now();
        self.bookings.update(&booking).await.map_err(store_err)?;

        info!(booking = %booking.id, session = %session.session_id, "checkout session created");
        Ok(session)
    }

    /// Refund-then-cancel as one logical step: a failed refund leaves the
    /// booking untouched so the caller can retry. Cancelling an already
    /// cancelled booking changes nothing and succeeds.
    pub async fn cancel(&self, id: Uuid, passenger_id: &str) -> Result<Booking, DomainError> {
        let mut booking = self.owned(id, passenger_id).await?;
        if booking.booking_status == BookingStatus::Cancelled {
            return Ok(booking);
        }

        if booking.payment_status == PaymentStatus::Paid {
            let intent = booking.payment_intent_id.as_deref().ok_or_else(|| {
                DomainError::Payment("No payment intent recorded for refund".to_string())
            })?;
            let refund = self
                .payments
                .refund(intent)
                .await
                .map_err(|err| DomainError::Payment(err.to_string()))?;
            info!(booking = %booking.id, refund = %refund.refund_id, "refund issued");
            booking.payment_status = PaymentStatus::Refunded;
        }

        booking.booking_status = BookingStatus::Cancelled;
        booking.updated_at = Utc::now();
        self.bookings.update(&booking).await.map_err(store_err)?;

        info!(booking = %booking.id, "booking cancelled");
        Ok(booking)
    }

    /// Marks the booking CONFIRMED/PAID and fires the best-effort SMS.
    /// When no intent id is passed, the recorded checkout session is
    /// consulted so a later refund has something to reference.
    pub async fn confirm(
        &self,
        id: Uuid,
        payment_intent_id: Option<String>,
    ) -> Result<Booking, DomainError> {
        let mut booking = self.require(id).await?;
        if booking.booking_status == BookingStatus::Cancelled {
            return Err(DomainError::InvalidState(
                "Cancelled bookings cannot be confirmed".to_string(),
            ));
        }
        if booking.booking_status == BookingStatus::Confirmed {
            return Ok(booking);
        }

        if let Some(intent) = payment_intent_id {
            booking.payment_intent_id = Some(intent);
        } else if booking.payment_intent_id.is_none() {
            if let Some(session_id) = booking.payment_session_id.clone() {
                match self.payments.retrieve_session(&session_id).await {
                    Ok(session) => booking.payment_intent_id = session.payment_intent_id,
                    Err(err) => {
                        warn!(booking = %booking.id, error = %err, "could not resolve payment intent from session")
                    }
                }
            }
        }

        booking.booking_status = BookingStatus::Confirmed;
        booking.payment_status = PaymentStatus::Paid;
        booking.updated_at = Utc::now();
        self.bookings.update(&booking).await.map_err(store_err)?;

        let message = format!(
            "Your {} booking on {} is CONFIRMED!",
            booking.transport_type, booking.departure_time
        );
        if let Err(err) = self.notifications.send(&booking.phone_number, &message).await {
            warn!(booking = %booking.id, error = %err, "confirmation SMS failed");
        }

        info!(booking = %booking.id, "booking confirmed");
        Ok(booking)
    }

    /// Hard delete, only once cancelled.
    pub async fn delete(&self, id: Uuid, passenger_id: &str) -> Result<(), DomainError> {
        let booking = self.owned(id, passenger_id).await?;
        if booking.booking_status != BookingStatus::Cancelled {
            return Err(DomainError::InvalidState(
                "Booking must be cancelled before deletion".to_string(),
            ));
        }
        self.bookings.delete(id).await.map_err(store_err)?;
        info!(booking = %id, "booking deleted");
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Booking, DomainError> {
        self.require(id).await
    }

    pub async fn for_passenger(&self, passenger_id: &str) -> Result<Vec<Booking>, DomainError> {
        self.bookings.for_passenger(passenger_id).await.map_err(store_err)
    }

    pub async fn list_all(&self) -> Result<Vec<Booking>, DomainError> {
        self.bookings.list_all().await.map_err(store_err)
    }

    async fn require(&self, id: Uuid) -> Result<Booking, DomainError> {
        self.bookings
            .get(id)
            .await
            .map_err(store_err)?
            .ok_or_else(|| DomainError::NotFound("Booking not found".to_string()))
    }

    async fn owned(&self, id: Uuid, passenger_id: &str) -> Result<Booking, DomainError> {
        let booking = self.require(id).await?;
        if booking.passenger_id != passenger_id {
            return Err(DomainError::Forbidden(
                "Booking belongs to another passenger".to_string(),
            ));
        }
        Ok(booking)
    }
}

fn trip_key(trip_id: &str) -> String {
    format!("trip:{trip_id}")
}

fn seats_taken(clash: &[String]) -> DomainError {
    DomainError::Conflict(format!("Seats already booked: {}", clash.join(", ")))
}

fn store_err(err: StoreError) -> DomainError {
    match err {
        StoreError::Missing(what) => DomainError::NotFound(what),
        other => DomainError::Store(other.to_string()),
    }
}

/// A `Duplicate` from storage is the seat-uniqueness backstop catching a
/// racing write; report it exactly like a detected conflict.
fn duplicate_is_conflict(err: StoreError) -> DomainError {
    match err {
        StoreError::Duplicate(msg) => DomainError::Conflict(format!("Seats already booked: {msg}")),
        other => store_err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use yatra_core::notify::NotifyError;
    use yatra_core::payment::{GatewayError, Refund};
    use yatra_domain::booking::TransportType;
    use yatra_store::MemoryStore;

    #[derive(Default)]
    struct RecordingGateway {
        sessions: AtomicUsize,
        refunds: AtomicUsize,
        fail_refunds: AtomicBool,
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn create_session(
            &self,
            booking_id: Uuid,
            _amount: i64,
            _currency: &str,
            _description: &str,
        ) -> Result<CheckoutSession, GatewayError> {
            let n = self.sessions.fetch_add(1, Ordering::SeqCst);
            Ok(CheckoutSession {
                session_id: format!("sess_{booking_id}_{n}"),
                payment_intent_id: Some(format!("pi_{booking_id}_{n}")),
                checkout_url: None,
            })
        }

        async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError> {
            Ok(CheckoutSession {
                session_id: session_id.to_string(),
                payment_intent_id: Some(format!("pi_from_{session_id}")),
                checkout_url: None,
            })
        }

        async fn refund(&self, _payment_intent_id: &str) -> Result<Refund, GatewayError> {
            if self.fail_refunds.load(Ordering::SeqCst) {
                return Err(GatewayError::Unreachable("refund endpoint down".to_string()));
            }
            let n = self.refunds.fetch_add(1, Ordering::SeqCst);
            Ok(Refund {
                refund_id: format!("re_{n}"),
            })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(String, String)>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn send(&self, phone_number: &str, message: &str) -> Result<(), NotifyError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(NotifyError("SMS provider down".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((phone_number.to_string(), message.to_string()));
            Ok(())
        }
    }

    struct Harness {
        manager: Arc<BookingLifecycleManager>,
        gateway: Arc<RecordingGateway>,
        sink: Arc<RecordingSink>,
    }

    fn harness() -> Harness {
        let gateway = Arc::new(RecordingGateway::default());
        let sink = Arc::new(RecordingSink::default());
        let manager = BookingLifecycleManager::new(
            Arc::new(MemoryStore::new()),
            gateway.clone(),
            sink.clone(),
            Fares {
                price_per_seat: 1500,
                currency: "LKR".to_string(),
            },
        );
        Harness {
            manager: Arc::new(manager),
            gateway,
            sink,
        }
    }

    fn request(trip_id: &str, seats: &[&str]) -> CreateBookingRequest {
        CreateBookingRequest {
            transport_type: TransportType::Bus,
            trip_id: trip_id.to_string(),
            seat_numbers: seats.iter().map(|s| s.to_string()).collect(),
            coach_number: None,
            phone_number: "+94771234567".to_string(),
            from_location: "Colombo".to_string(),
            to_location: "Matara".to_string(),
            departure_time: Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn create_round_trips_seats_count_and_amount() {
        let h = harness();
        let booking = h.manager.create("pax-1", request("trip-1", &["A1", "A2"])).await.unwrap();

        let fetched = h.manager.get(booking.id).await.unwrap();
        assert_eq!(fetched.seat_numbers, vec!["A1", "A2"]);
        assert_eq!(fetched.seat_count, 2);
        assert_eq!(fetched.amount, 3000);
        assert_eq!(fetched.booking_status, BookingStatus::Pending);
        assert_eq!(fetched.payment_status, PaymentStatus::Unpaid);
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected_without_side_effects() {
        let h = harness();

        let mut bad_phone = request("trip-1", &["A1"]);
        bad_phone.phone_number = "0771234567".to_string();
        assert!(matches!(
            h.manager.create("pax-1", bad_phone).await,
            Err(DomainError::Validation(_))
        ));

        let mut train_without_coach = request("trip-1", &["A1"]);
        train_without_coach.transport_type = TransportType::Train;
        assert!(matches!(
            h.manager.create("pax-1", train_without_coach).await,
            Err(DomainError::Validation(_))
        ));

        assert!(h.manager.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn partial_seat_overlap_is_rejected() {
        let h = harness();
        h.manager.create("pax-1", request("trip-1", &["A1", "A2"])).await.unwrap();

        let err = h
            .manager
            .create("pax-2", request("trip-1", &["A2", "A3"]))
            .await
            .unwrap_err();
        assert!(matches!(&err, DomainError::Conflict(msg) if msg.contains("A2")), "got {err:?}");

        // Disjoint seats on the same trip and the same seats elsewhere
        // both go through.
        h.manager.create("pax-2", request("trip-1", &["A3", "A4"])).await.unwrap();
        h.manager.create("pax-3", request("trip-2", &["A1", "A2"])).await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_overlapping_bookings_admit_exactly_one() {
        let h = harness();
        let a = h.manager.create("pax-1", request("trip-1", &["B1", "B2"]));
        let b = h.manager.create("pax-2", request("trip-1", &["B2", "B3"]));
        let (ra, rb) = tokio::join!(a, b);

        let successes = [&ra, &rb].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one writer may win: {ra:?} / {rb:?}");
        let failure = if ra.is_err() { ra } else { rb };
        assert!(matches!(failure.unwrap_err(), DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn confirm_marks_paid_and_sends_sms() {
        let h = harness();
        let booking = h.manager.create("pax-1", request("trip-1", &["A1"])).await.unwrap();

        let confirmed = h.manager.confirm(booking.id, Some("pi_test".to_string())).await.unwrap();
        assert_eq!(confirmed.booking_status, BookingStatus::Confirmed);
        assert_eq!(confirmed.payment_status, PaymentStatus::Paid);
        assert_eq!(confirmed.payment_intent_id.as_deref(), Some("pi_test"));

        let sent = h.sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+94771234567");
        assert!(sent[0].1.contains("BUS"));
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_confirmation() {
        let h = harness();
        h.sink.fail.store(true, Ordering::SeqCst);
        let booking = h.manager.create("pax-1", request("trip-1", &["A1"])).await.unwrap();

        let confirmed = h.manager.confirm(booking.id, None).await.unwrap();
        assert_eq!(confirmed.booking_status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn confirm_resolves_intent_from_recorded_session() {
        let h = harness();
        let booking = h.manager.create("pax-1", request("trip-1", &["A1"])).await.unwrap();
        let session = h.manager.pay(booking.id, "pax-1").await.unwrap();
        assert!(session.session_id.starts_with("sess_"));

        let confirmed = h.manager.confirm(booking.id, None).await.unwrap();
        assert!(confirmed.payment_intent_id.is_some());
    }

    #[tokio::test]
    async fn cancel_after_confirm_refunds_exactly_once() {
        let h = harness();
        let booking = h.manager.create("pax-1", request("trip-1", &["A1"])).await.unwrap();
        h.manager.confirm(booking.id, Some("pi_1".to_string())).await.unwrap();

        let cancelled = h.manager.cancel(booking.id, "pax-1").await.unwrap();
        assert_eq!(cancelled.booking_status, BookingStatus::Cancelled);
        assert_eq!(cancelled.payment_status, PaymentStatus::Refunded);
        assert_eq!(h.gateway.refunds.load(Ordering::SeqCst), 1);

        // Second cancel is a no-op, not a second refund.
        let again = h.manager.cancel(booking.id, "pax-1").await.unwrap();
        assert_eq!(again.payment_status, PaymentStatus::Refunded);
        assert_eq!(h.gateway.refunds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unpaid_cancel_skips_the_gateway() {
        let h = harness();
        let booking = h.manager.create("pax-1", request("trip-1", &["A1"])).await.unwrap();

        let cancelled = h.manager.cancel(booking.id, "pax-1").await.unwrap();
        assert_eq!(cancelled.booking_status, BookingStatus::Cancelled);
        assert_eq!(cancelled.payment_status, PaymentStatus::Unpaid);
        assert_eq!(h.gateway.refunds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refund_failure_aborts_the_cancellation() {
        let h = harness();
        let booking = h.manager.create("pax-1", request("trip-1", &["A1"])).await.unwrap();
        h.manager.confirm(booking.id, Some("pi_1".to_string())).await.unwrap();

        h.gateway.fail_refunds.store(true, Ordering::SeqCst);
        let err = h.manager.cancel(booking.id, "pax-1").await.unwrap_err();
        assert!(matches!(err, DomainError::Payment(_)));

        // Nothing was applied partially; a retry succeeds.
        let unchanged = h.manager.get(booking.id).await.unwrap();
        assert_eq!(unchanged.booking_status, BookingStatus::Confirmed);
        assert_eq!(unchanged.payment_status, PaymentStatus::Paid);

        h.gateway.fail_refunds.store(false, Ordering::SeqCst);
        let cancelled = h.manager.cancel(booking.id, "pax-1").await.unwrap();
        assert_eq!(cancelled.payment_status, PaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn cancelled_seats_become_available_again() {
        let h = harness();
        let booking = h.manager.create("pax-1", request("trip-1", &["A1"])).await.unwrap();
        h.manager.cancel(booking.id, "pax-1").await.unwrap();

        h.manager.create("pax-2", request("trip-1", &["A1"])).await.unwrap();
    }

    #[tokio::test]
    async fn ownership_is_enforced() {
        let h = harness();
        let booking = h.manager.create("pax-1", request("trip-1", &["A1"])).await.unwrap();

        assert!(matches!(
            h.manager.cancel(booking.id, "pax-2").await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            h.manager
                .update(booking.id, "pax-2", UpdateBookingRequest::default())
                .await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            h.manager.delete(booking.id, "pax-2").await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn update_reprices_and_rechecks_seats() {
        let h = harness();
        h.manager.create("pax-1", request("trip-1", &["C1"])).await.unwrap();
        let booking = h.manager.create("pax-2", request("trip-1", &["A1"])).await.unwrap();

        // Growing the booking onto a taken seat is rejected.
        let err = h
            .manager
            .update(
                booking.id,
                "pax-2",
                UpdateBookingRequest {
                    seat_numbers: Some(vec!["A1".to_string(), "C1".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // Keeping its own seat while growing onto a free one reprices.
        let updated = h
            .manager
            .update(
                booking.id,
                "pax-2",
                UpdateBookingRequest {
                    seat_numbers: Some(vec!["A1".to_string(), "A2".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.seat_count, 2);
        assert_eq!(updated.amount, 3000);
    }

    #[tokio::test]
    async fn update_is_rejected_once_confirmed() {
        let h = harness();
        let booking = h.manager.create("pax-1", request("trip-1", &["A1"])).await.unwrap();
        h.manager.confirm(booking.id, None).await.unwrap();

        let err = h
            .manager
            .update(
                booking.id,
                "pax-1",
                UpdateBookingRequest {
                    from_location: Some("Kandy".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[tokio::test]
    async fn delete_requires_prior_cancellation() {
        let h = harness();
        let booking = h.manager.create("pax-1", request("trip-1", &["A1"])).await.unwrap();

        let err = h.manager.delete(booking.id, "pax-1").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));

        h.manager.cancel(booking.id, "pax-1").await.unwrap();
        h.manager.delete(booking.id, "pax-1").await.unwrap();
        assert!(matches!(
            h.manager.get(booking.id).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn confirm_after_cancel_is_invalid() {
        let h = harness();
        let booking = h.manager.create("pax-1", request("trip-1", &["A1"])).await.unwrap();
        h.manager.cancel(booking.id, "pax-1").await.unwrap();

        let err = h.manager.confirm(booking.id, None).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[tokio::test]
    async fn my_bookings_lists_only_the_callers() {
        let h = harness();
        h.manager.create("pax-1", request("trip-1", &["A1"])).await.unwrap();
        h.manager.create("pax-1", request("trip-2", &["A1"])).await.unwrap();
        h.manager.create("pax-2", request("trip-3", &["A1"])).await.unwrap();

        assert_eq!(h.manager.for_passenger("pax-1").await.unwrap().len(), 2);
        assert_eq!(h.manager.for_passenger("pax-2").await.unwrap().len(), 1);
        assert_eq!(h.manager.list_all().await.unwrap().len(), 3);
    }
}
