use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatra_core::repository::{BookingRepository, ScheduleRepository, StoreError};
use yatra_domain::booking::Booking;
use yatra_domain::schedule::TripSchedule;

/// In-memory backend for tests and zero-dependency runs.
///
/// Writes re-verify the same invariants the Postgres schema enforces with
/// constraints (seat uniqueness per trip, window non-overlap per vehicle),
/// so a racing writer is rejected with `Duplicate` even if an
/// application-level check was skipped.
#[derive(Default)]
pub struct MemoryStore {
    schedules: RwLock<HashMap<Uuid, TripSchedule>>,
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn window_backstop(
    schedules: &HashMap<Uuid, TripSchedule>,
    candidate: &TripSchedule,
) -> Result<(), StoreError> {
    if !candidate.occupies_vehicle() {
        return Ok(());
    }
    for other in schedules.values() {
        if other.id != candidate.id
            && other.vehicle_id == candidate.vehicle_id
            && other.occupies_vehicle()
            && other.window().overlaps(&candidate.window())
        {
            return Err(StoreError::Duplicate(format!(
                "vehicle {} window overlaps schedule {}",
                candidate.vehicle_id, other.id
            )));
        }
    }
    Ok(())
}

fn seat_backstop(bookings: &HashMap<Uuid, Booking>, candidate: &Booking) -> Result<(), StoreError> {
    if !candidate.holds_seats() {
        return Ok(());
    }
    for other in bookings.values() {
        if other.id == candidate.id || other.trip_id != candidate.trip_id || !other.holds_seats() {
            continue;
        }
        if let Some(seat) = candidate
            .seat_numbers
            .iter()
            .find(|seat| other.seat_numbers.contains(seat))
        {
            return Err(StoreError::Duplicate(format!(
                "seat {} already booked on trip {}",
                seat, candidate.trip_id
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl ScheduleRepository for MemoryStore {
    async fn insert(&self, schedule: &TripSchedule) -> Result<(), StoreError> {
        let mut map = self.schedules.write().await;
        window_backstop(&map, schedule)?;
        map.insert(schedule.id, schedule.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<TripSchedule>, StoreError> {
        Ok(self.schedules.read().await.get(&id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<TripSchedule>, StoreError> {
        let map = self.schedules.read().await;
        let mut rows: Vec<_> = map.values().filter(|s| s.active).cloned().collect();
        rows.sort_by_key(|s| s.departure_time);
        Ok(rows)
    }

    async fn active_for_vehicle(&self, vehicle_id: Uuid) -> Result<Vec<TripSchedule>, StoreError> {
        let map = self.schedules.read().await;
        let mut rows: Vec<_> = map
            .values()
            .filter(|s| s.active && s.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.departure_time);
        Ok(rows)
    }

    async fn update(&self, schedule: &TripSchedule) -> Result<(), StoreError> {
        let mut map = self.schedules.write().await;
        if !map.contains_key(&schedule.id) {
            return Err(StoreError::Missing(format!("schedule {}", schedule.id)));
        }
        window_backstop(&map, schedule)?;
        map.insert(schedule.id, schedule.clone());
        Ok(())
    }

    async fn deactivate(&self, id: Uuid) -> Result<Option<TripSchedule>, StoreError> {
        let mut map = self.schedules.write().await;
        match map.get_mut(&id) {
            Some(schedule) => {
                if schedule.active {
                    schedule.active = false;
                    schedule.updated_at = Utc::now();
                }
                Ok(Some(schedule.clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        let mut map = self.bookings.write().await;
        seat_backstop(&map, booking)?;
        map.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn holding_for_trip(&self, trip_id: &str) -> Result<Vec<Booking>, StoreError> {
        let map = self.bookings.read().await;
        Ok(map
            .values()
            .filter(|b| b.trip_id == trip_id && b.holds_seats())
            .cloned()
            .collect())
    }

    async fn for_passenger(&self, passenger_id: &str) -> Result<Vec<Booking>, StoreError> {
        let map = self.bookings.read().await;
        let mut rows: Vec<_> = map
            .values()
            .filter(|b| b.passenger_id == passenger_id)
            .cloned()
            .collect();
        rows.sort_by_key(|b| b.created_at);
        Ok(rows)
    }

    async fn list_all(&self) -> Result<Vec<Booking>, StoreError> {
        let map = self.bookings.read().await;
        let mut rows: Vec<_> = map.values().cloned().collect();
        rows.sort_by_key(|b| b.created_at);
        Ok(rows)
    }

    async fn update(&self, booking: &Booking) -> Result<(), StoreError> {
        let mut map = self.bookings.write().await;
        if !map.contains_key(&booking.id) {
            return Err(StoreError::Missing(format!("booking {}", booking.id)));
        }
        seat_backstop(&map, booking)?;
        map.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.bookings.write().await.remove(&id);
        Ok(())
    }
}
