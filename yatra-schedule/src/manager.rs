use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use yatra_core::admission::KeyedLocks;
use yatra_core::repository::{ScheduleRepository, StoreError};
use yatra_core::route::{RouteDurationProvider, RouteLookupError};
use yatra_domain::schedule::{
    CreateScheduleRequest, ScheduleStatus, TripSchedule, UpdateScheduleRequest, Window,
};
use yatra_domain::DomainError;

use crate::detector;

/// Orchestrates creation, update and deactivation of trip schedules.
///
/// Every check-then-persist sequence runs under the per-vehicle admission
/// lock, so two concurrent requests for one vehicle cannot both pass the
/// conflict check. Unrelated vehicles are never serialized against each
/// other.
pub struct ScheduleLifecycleManager {
    schedules: Arc<dyn ScheduleRepository>,
    routes: Arc<dyn RouteDurationProvider>,
    locks: KeyedLocks,
}

impl ScheduleLifecycleManager {
    pub fn new(schedules: Arc<dyn ScheduleRepository>, routes: Arc<dyn RouteDurationProvider>) -> Self {
        Self {
            schedules,
            routes,
            locks: KeyedLocks::new(),
        }
    }

    /// Resolve the window a departure would occupy on the given route:
    /// arrival is departure plus the route's estimated duration.
    pub async fn propose_window(
        &self,
        route_id: Uuid,
        departure: DateTime<Utc>,
    ) -> Result<Window, DomainError> {
        let duration = self.routes.duration(route_id).await.map_err(|err| match err {
            RouteLookupError::NotFound => DomainError::NotFound("Route not Found".to_string()),
            RouteLookupError::Unreachable(msg) => DomainError::Store(msg),
        })?;
        Ok(Window {
            start: departure,
            end: departure + Duration::minutes(duration.estimated_duration_minutes),
        })
    }

    pub async fn create(&self, req: CreateScheduleRequest) -> Result<TripSchedule, DomainError> {
        let window = self.propose_window(req.route_id, req.departure_time).await?;

        let _guard = self.locks.acquire(&vehicle_key(req.vehicle_id)).await;

        let existing = self
            .schedules
            .active_for_vehicle(req.vehicle_id)
            .await
            .map_err(store_err)?;
        if let Some(hit) = detector::find_conflict(&existing, window.start, window.end, None) {
            warn!(vehicle = %req.vehicle_id, conflicting = %hit.id, "schedule window overlaps committed trip");
            return Err(schedule_conflict());
        }
        if detector::check_sequencing(&existing, window.start, None).is_some() {
            return Err(DomainError::VehicleBusy);
        }

        let now = Utc::now();
        let schedule = TripSchedule {
            id: Uuid::new_v4(),
            route_id: req.route_id,
            vehicle_id: req.vehicle_id,
            departure_time: window.start,
            arrival_time: window.end,
            frequency: req.frequency,
            status: ScheduleStatus::Scheduled,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.schedules
            .insert(&schedule)
            .await
            .map_err(duplicate_is_conflict)?;

        info!(schedule = %schedule.id, vehicle = %schedule.vehicle_id, "schedule created");
        Ok(schedule)
    }

    /// Merge the supplied fields. Any change that moves the window
    /// (departure, vehicle or route) re-runs both checks, with the
    /// schedule excluded from its own conflict set.
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateScheduleRequest,
    ) -> Result<TripSchedule, DomainError> {
        let mut schedule = self.require(id).await?;

        let route_id = req.route_id.unwrap_or(schedule.route_id);
        let vehicle_id = req.vehicle_id.unwrap_or(schedule.vehicle_id);
        let departure = req.departure_time.unwrap_or(schedule.departure_time);
        let window_moved = route_id != schedule.route_id
            || vehicle_id != schedule.vehicle_id
            || departure != schedule.departure_time;

        let _guard = if window_moved {
            let window = self.propose_window(route_id, departure).await?;
            let guard = self.locks.acquire(&vehicle_key(vehicle_id)).await;

            let existing = self
                .schedules
                .active_for_vehicle(vehicle_id)
                .await
                .map_err(store_err)?;
            if detector::find_conflict(&existing, window.start, window.end, Some(id)).is_some() {
                return Err(schedule_conflict());
            }
            if detector::check_sequencing(&existing, window.start, Some(id)).is_some() {
                return Err(DomainError::VehicleBusy);
            }

            schedule.route_id = route_id;
            schedule.vehicle_id = vehicle_id;
            schedule.departure_time = window.start;
            schedule.arrival_time = window.end;
            Some(guard)
        } else {
            None
        };

        if let Some(frequency) = req.frequency {
            schedule.frequency = frequency;
        }
        if let Some(status) = req.status {
            schedule.status = status;
        }
        schedule.updated_at = Utc::now();

        self.schedules
            .update(&schedule)
            .await
            .map_err(duplicate_is_conflict)?;

        info!(schedule = %schedule.id, "schedule updated");
        Ok(schedule)
    }

    /// Soft delete. Idempotent: deactivating an inactive schedule changes
    /// nothing and succeeds. Bookings reference trips, not schedules, so
    /// no booking check happens here.
    pub async fn deactivate(&self, id: Uuid) -> Result<TripSchedule, DomainError> {
        match self.schedules.deactivate(id).await.map_err(store_err)? {
            Some(schedule) => {
                info!(schedule = %id, "schedule deactivated");
                Ok(schedule)
            }
            None => Err(not_found()),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<TripSchedule, DomainError> {
        self.require(id).await
    }

    pub async fn list_active(&self) -> Result<Vec<TripSchedule>, DomainError> {
        self.schedules.list_active().await.map_err(store_err)
    }

    async fn require(&self, id: Uuid) -> Result<TripSchedule, DomainError> {
        self.schedules
            .get(id)
            .await
            .map_err(store_err)?
            .ok_or_else(not_found)
    }
}

fn vehicle_key(vehicle_id: Uuid) -> String {
    format!("vehicle:{vehicle_id}")
}

fn schedule_conflict() -> DomainError {
    DomainError::Conflict("Schedule Conflict detected".to_string())
}

fn not_found() -> DomainError {
    DomainError::NotFound("Schedule not found".to_string())
}

fn store_err(err: StoreError) -> DomainError {
    match err {
        StoreError::Missing(what) => DomainError::NotFound(what),
        other => DomainError::Store(other.to_string()),
    }
}

/// A `Duplicate` from storage means the backstop constraint caught a
/// racing write; report it exactly like a detected conflict.
fn duplicate_is_conflict(err: StoreError) -> DomainError {
    match err {
        StoreError::Duplicate(_) => schedule_conflict(),
        other => store_err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use yatra_domain::schedule::Frequency;
    use yatra_store::stub::StaticRouteTable;
    use yatra_store::MemoryStore;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, min, 0).unwrap()
    }

    async fn manager_with_route(minutes: i64) -> (Arc<ScheduleLifecycleManager>, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let routes = Arc::new(StaticRouteTable::new());
        let route_id = Uuid::new_v4();
        routes.insert(route_id, minutes).await;
        let manager = ScheduleLifecycleManager::new(store, routes);
        (Arc::new(manager), route_id)
    }

    fn request(route_id: Uuid, vehicle_id: Uuid, departure: DateTime<Utc>) -> CreateScheduleRequest {
        CreateScheduleRequest {
            route_id,
            vehicle_id,
            departure_time: departure,
            frequency: Frequency::Daily,
        }
    }

    #[tokio::test]
    async fn create_derives_arrival_from_route_duration() {
        let (manager, route_id) = manager_with_route(60).await;
        let vehicle = Uuid::new_v4();

        let schedule = manager.create(request(route_id, vehicle, at(8, 0))).await.unwrap();
        assert_eq!(schedule.departure_time, at(8, 0));
        assert_eq!(schedule.arrival_time, at(9, 0));
        assert_eq!(schedule.status, ScheduleStatus::Scheduled);
        assert!(schedule.active);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (manager, _) = manager_with_route(60).await;
        let err = manager
            .create(request(Uuid::new_v4(), Uuid::new_v4(), at(8, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn overlapping_window_is_rejected_with_conflict() {
        let (manager, route_id) = manager_with_route(60).await;
        let vehicle = Uuid::new_v4();
        manager.create(request(route_id, vehicle, at(8, 0))).await.unwrap();

        let err = manager
            .create(request(route_id, vehicle, at(8, 30)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn back_to_back_trips_are_accepted() {
        let (manager, route_id) = manager_with_route(60).await;
        let vehicle = Uuid::new_v4();
        let first = manager.create(request(route_id, vehicle, at(8, 0))).await.unwrap();

        let second = manager
            .create(request(route_id, vehicle, first.arrival_time))
            .await
            .unwrap();
        assert_eq!(second.departure_time, first.arrival_time);
    }

    #[tokio::test]
    async fn same_window_on_other_vehicle_is_fine() {
        let (manager, route_id) = manager_with_route(60).await;
        manager
            .create(request(route_id, Uuid::new_v4(), at(8, 0)))
            .await
            .unwrap();
        manager
            .create(request(route_id, Uuid::new_v4(), at(8, 0)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn departure_before_previous_arrival_means_vehicle_busy() {
        let (manager, route_id) = manager_with_route(60).await;
        let vehicle = Uuid::new_v4();
        let first = manager.create(request(route_id, vehicle, at(8, 0))).await.unwrap();

        // A delayed trip stops claiming its window for overlap purposes,
        // but the vehicle has still not arrived back: sequencing rejects
        // a departure before its recorded arrival.
        manager
            .update(
                first.id,
                UpdateScheduleRequest {
                    status: Some(ScheduleStatus::Delayed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = manager
            .create(request(route_id, vehicle, at(8, 30)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::VehicleBusy), "got {err:?}");
    }

    #[tokio::test]
    async fn concurrent_creates_for_one_vehicle_admit_exactly_one() {
        let (manager, route_id) = manager_with_route(60).await;
        let vehicle = Uuid::new_v4();

        let a = manager.create(request(route_id, vehicle, at(10, 0)));
        let b = manager.create(request(route_id, vehicle, at(10, 30)));
        let (ra, rb) = tokio::join!(a, b);

        let successes = [&ra, &rb].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one writer may win: {ra:?} / {rb:?}");
        let failure = if ra.is_err() { ra } else { rb };
        assert!(matches!(
            failure.unwrap_err(),
            DomainError::Conflict(_) | DomainError::VehicleBusy
        ));
    }

    #[tokio::test]
    async fn update_excludes_itself_from_conflict_detection() {
        let (manager, route_id) = manager_with_route(60).await;
        let vehicle = Uuid::new_v4();
        let schedule = manager.create(request(route_id, vehicle, at(8, 0))).await.unwrap();

        // Nudging the departure inside the trip's own window must not
        // self-conflict.
        let updated = manager
            .update(
                schedule.id,
                UpdateScheduleRequest {
                    departure_time: Some(at(8, 15)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.departure_time, at(8, 15));
        assert_eq!(updated.arrival_time, at(9, 15));
    }

    #[tokio::test]
    async fn update_onto_another_trip_is_rejected() {
        let (manager, route_id) = manager_with_route(60).await;
        let vehicle = Uuid::new_v4();
        manager.create(request(route_id, vehicle, at(8, 0))).await.unwrap();
        let second = manager
            .create(request(route_id, vehicle, at(10, 0)))
            .await
            .unwrap();

        let err = manager
            .update(
                second.id,
                UpdateScheduleRequest {
                    departure_time: Some(at(8, 30)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_without_window_change_keeps_times() {
        let (manager, route_id) = manager_with_route(60).await;
        let vehicle = Uuid::new_v4();
        let schedule = manager.create(request(route_id, vehicle, at(8, 0))).await.unwrap();

        let updated = manager
            .update(
                schedule.id,
                UpdateScheduleRequest {
                    frequency: Some(Frequency::Weekend),
                    status: Some(ScheduleStatus::Delayed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.departure_time, schedule.departure_time);
        assert_eq!(updated.arrival_time, schedule.arrival_time);
        assert_eq!(updated.frequency, Frequency::Weekend);
        assert_eq!(updated.status, ScheduleStatus::Delayed);
    }

    #[tokio::test]
    async fn deactivate_is_idempotent_and_frees_the_window() {
        let (manager, route_id) = manager_with_route(60).await;
        let vehicle = Uuid::new_v4();
        let schedule = manager.create(request(route_id, vehicle, at(8, 0))).await.unwrap();

        let first = manager.deactivate(schedule.id).await.unwrap();
        assert!(!first.active);
        let second = manager.deactivate(schedule.id).await.unwrap();
        assert!(!second.active);

        // The vehicle's timeline no longer carries the window.
        manager.create(request(route_id, vehicle, at(8, 0))).await.unwrap();
    }

    #[tokio::test]
    async fn deactivate_missing_schedule_is_not_found() {
        let (manager, _) = manager_with_route(60).await;
        let err = manager.deactivate(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
