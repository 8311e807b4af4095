use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use yatra_domain::booking::Booking;
use yatra_domain::schedule::TripSchedule;

/// Storage-layer failures.
///
/// `Duplicate` is the backstop constraint firing: the write would break
/// seat uniqueness or window non-overlap even though the application-level
/// check passed. Managers surface it as a conflict, never as an internal
/// error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("row not found: {0}")]
    Missing(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn insert(&self, schedule: &TripSchedule) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<TripSchedule>, StoreError>;

    async fn list_active(&self) -> Result<Vec<TripSchedule>, StoreError>;

    /// Active schedules for one vehicle, ordered by departure.
    async fn active_for_vehicle(&self, vehicle_id: Uuid) -> Result<Vec<TripSchedule>, StoreError>;

    async fn update(&self, schedule: &TripSchedule) -> Result<(), StoreError>;

    /// Soft delete. Returns the stored schedule, or `None` when absent.
    /// Deactivating an already-inactive schedule is a no-op.
    async fn deactivate(&self, id: Uuid) -> Result<Option<TripSchedule>, StoreError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    /// Non-cancelled bookings holding seats on the given trip.
    async fn holding_for_trip(&self, trip_id: &str) -> Result<Vec<Booking>, StoreError>;

    async fn for_passenger(&self, passenger_id: &str) -> Result<Vec<Booking>, StoreError>;

    async fn list_all(&self) -> Result<Vec<Booking>, StoreError>;

    async fn update(&self, booking: &Booking) -> Result<(), StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
