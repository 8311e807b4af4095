use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use yatra_core::repository::{BookingRepository, ScheduleRepository, StoreError};
use yatra_domain::booking::{Booking, BookingStatus, PaymentStatus, TransportType};
use yatra_domain::schedule::{Frequency, ScheduleStatus, TripSchedule};

/// Postgres backend.
///
/// The schema carries the backstop constraints: an exclusion constraint on
/// `(vehicle_id, window)` for live schedules and a primary key on
/// `(trip_id, seat_number)` for held seats. Constraint violations come
/// back as `StoreError::Duplicate`, which the managers report as a
/// conflict.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(8).connect(url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("connected to Postgres and applied migrations");
        Ok(Self { pool })
    }
}

// 23505 = unique_violation, 23P01 = exclusion_violation.
fn map_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if let Some(code) = db.code() {
            if code == "23505" || code == "23P01" {
                return StoreError::Duplicate(db.message().to_string());
            }
        }
    }
    StoreError::Unavailable(err.to_string())
}

fn column_err(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(format!("malformed row: {err}"))
}

fn parse_frequency(s: &str) -> Result<Frequency, StoreError> {
    match s {
        "DAILY" => Ok(Frequency::Daily),
        "WEEKEND" => Ok(Frequency::Weekend),
        "HOLIDAY" => Ok(Frequency::Holiday),
        other => Err(StoreError::Unavailable(format!("unknown frequency: {other}"))),
    }
}

fn parse_schedule_status(s: &str) -> Result<ScheduleStatus, StoreError> {
    match s {
        "SCHEDULED" => Ok(ScheduleStatus::Scheduled),
        "IN_PROGRESS" => Ok(ScheduleStatus::InProgress),
        "COMPLETED" => Ok(ScheduleStatus::Completed),
        "DELAYED" => Ok(ScheduleStatus::Delayed),
        other => Err(StoreError::Unavailable(format!("unknown schedule status: {other}"))),
    }
}

fn parse_transport(s: &str) -> Result<TransportType, StoreError> {
    match s {
        "BUS" => Ok(TransportType::Bus),
        "TRAIN" => Ok(TransportType::Train),
        other => Err(StoreError::Unavailable(format!("unknown transport type: {other}"))),
    }
}

fn parse_booking_status(s: &str) -> Result<BookingStatus, StoreError> {
    match s {
        "PENDING" => Ok(BookingStatus::Pending),
        "CONFIRMED" => Ok(BookingStatus::Confirmed),
        "CANCELLED" => Ok(BookingStatus::Cancelled),
        other => Err(StoreError::Unavailable(format!("unknown booking status: {other}"))),
    }
}

fn parse_payment_status(s: &str) -> Result<PaymentStatus, StoreError> {
    match s {
        "UNPAID" => Ok(PaymentStatus::Unpaid),
        "PAID" => Ok(PaymentStatus::Paid),
        "REFUNDED" => Ok(PaymentStatus::Refunded),
        "FAILED" => Ok(PaymentStatus::Failed),
        other => Err(StoreError::Unavailable(format!("unknown payment status: {other}"))),
    }
}

fn schedule_from_row(row: &PgRow) -> Result<TripSchedule, StoreError> {
    let frequency: String = row.try_get("frequency").map_err(column_err)?;
    let status: String = row.try_get("status").map_err(column_err)?;
    Ok(TripSchedule {
        id: row.try_get("id").map_err(column_err)?,
        route_id: row.try_get("route_id").map_err(column_err)?,
        vehicle_id: row.try_get("vehicle_id").map_err(column_err)?,
        departure_time: row.try_get("departure_time").map_err(column_err)?,
        arrival_time: row.try_get("arrival_time").map_err(column_err)?,
        frequency: parse_frequency(&frequency)?,
        status: parse_schedule_status(&status)?,
        active: row.try_get("active").map_err(column_err)?,
        created_at: row.try_get("created_at").map_err(column_err)?,
        updated_at: row.try_get("updated_at").map_err(column_err)?,
    })
}

fn booking_from_row(row: &PgRow) -> Result<Booking, StoreError> {
    let transport: String = row.try_get("transport_type").map_err(column_err)?;
    let booking_status: String = row.try_get("booking_status").map_err(column_err)?;
    let payment_status: String = row.try_get("payment_status").map_err(column_err)?;
    let seat_count: i32 = row.try_get("seat_count").map_err(column_err)?;
    Ok(Booking {
        id: row.try_get("id").map_err(column_err)?,
        passenger_id: row.try_get("passenger_id").map_err(column_err)?,
        phone_number: row.try_get("phone_number").map_err(column_err)?,
        transport_type: parse_transport(&transport)?,
        trip_id: row.try_get("trip_id").map_err(column_err)?,
        seat_numbers: row.try_get("seat_numbers").map_err(column_err)?,
        seat_count: seat_count as u32,
        coach_number: row.try_get("coach_number").map_err(column_err)?,
        from_location: row.try_get("from_location").map_err(column_err)?,
        to_location: row.try_get("to_location").map_err(column_err)?,
        departure_time: row.try_get("departure_time").map_err(column_err)?,
        amount: row.try_get("amount").map_err(column_err)?,
        booking_status: parse_booking_status(&booking_status)?,
        payment_status: parse_payment_status(&payment_status)?,
        payment_session_id: row.try_get("payment_session_id").map_err(column_err)?,
        payment_intent_id: row.try_get("payment_intent_id").map_err(column_err)?,
        created_at: row.try_get("created_at").map_err(column_err)?,
        updated_at: row.try_get("updated_at").map_err(column_err)?,
    })
}

#[async_trait]
impl ScheduleRepository for PgStore {
    async fn insert(&self, schedule: &TripSchedule) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trip_schedules
                (id, route_id, vehicle_id, departure_time, arrival_time,
                 frequency, status, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(schedule.id)
        .bind(schedule.route_id)
        .bind(schedule.vehicle_id)
        .bind(schedule.departure_time)
        .bind(schedule.arrival_time)
        .bind(schedule.frequency.as_str())
        .bind(schedule.status.as_str())
        .bind(schedule.active)
        .bind(schedule.created_at)
        .bind(schedule.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<TripSchedule>, StoreError> {
        let row = sqlx::query("SELECT * FROM trip_schedules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?;
        row.as_ref().map(schedule_from_row).transpose()
    }

    async fn list_active(&self) -> Result<Vec<TripSchedule>, StoreError> {
        let rows = sqlx::query("SELECT * FROM trip_schedules WHERE active ORDER BY departure_time")
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;
        rows.iter().map(schedule_from_row).collect()
    }

    async fn active_for_vehicle(&self, vehicle_id: Uuid) -> Result<Vec<TripSchedule>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM trip_schedules WHERE vehicle_id = $1 AND active ORDER BY departure_time",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)?;
        rows.iter().map(schedule_from_row).collect()
    }

    async fn update(&self, schedule: &TripSchedule) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE trip_schedules
            SET route_id = $2, vehicle_id = $3, departure_time = $4, arrival_time = $5,
                frequency = $6, status = $7, active = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(schedule.id)
        .bind(schedule.route_id)
        .bind(schedule.vehicle_id)
        .bind(schedule.departure_time)
        .bind(schedule.arrival_time)
        .bind(schedule.frequency.as_str())
        .bind(schedule.status.as_str())
        .bind(schedule.active)
        .bind(schedule.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(format!("schedule {}", schedule.id)));
        }
        Ok(())
    }

    async fn deactivate(&self, id: Uuid) -> Result<Option<TripSchedule>, StoreError> {
        let row = sqlx::query(
            "UPDATE trip_schedules SET active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;
        row.as_ref().map(schedule_from_row).transpose()
    }
}

#[async_trait]
impl BookingRepository for PgStore {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;

        sqlx::query(
            r#"
            INSERT INTO bookings
                (id, passenger_id, phone_number, transport_type, trip_id,
                 seat_numbers, seat_count, coach_number, from_location, to_location,
                 departure_time, amount, booking_status, payment_status,
                 payment_session_id, payment_intent_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(booking.id)
        .bind(booking.passenger_id.as_str())
        .bind(booking.phone_number.as_str())
        .bind(booking.transport_type.as_str())
        .bind(booking.trip_id.as_str())
        .bind(&booking.seat_numbers)
        .bind(booking.seat_count as i32)
        .bind(booking.coach_number.clone())
        .bind(booking.from_location.as_str())
        .bind(booking.to_location.as_str())
        .bind(booking.departure_time)
        .bind(booking.amount)
        .bind(booking.booking_status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.payment_session_id.clone())
        .bind(booking.payment_intent_id.clone())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_err)?;

        if booking.holds_seats() {
            for seat in &booking.seat_numbers {
                sqlx::query("INSERT INTO booking_seats (trip_id, seat_number, booking_id) VALUES ($1, $2, $3)")
                    .bind(booking.trip_id.as_str())
                    .bind(seat.as_str())
                    .bind(booking.id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_err)?;
            }
        }

        tx.commit().await.map_err(map_err)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?;
        row.as_ref().map(booking_from_row).transpose()
    }

    async fn holding_for_trip(&self, trip_id: &str) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query("SELECT * FROM bookings WHERE trip_id = $1 AND booking_status <> 'CANCELLED'")
            .bind(trip_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;
        rows.iter().map(booking_from_row).collect()
    }

    async fn for_passenger(&self, passenger_id: &str) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query("SELECT * FROM bookings WHERE passenger_id = $1 ORDER BY created_at")
            .bind(passenger_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;
        rows.iter().map(booking_from_row).collect()
    }

    async fn list_all(&self) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query("SELECT * FROM bookings ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;
        rows.iter().map(booking_from_row).collect()
    }

    async fn update(&self, booking: &Booking) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;

        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET phone_number = $2, seat_numbers = $3, seat_count = $4, coach_number = $5,
                from_location = $6, to_location = $7, departure_time = $8, amount = $9,
                booking_status = $10, payment_status = $11, payment_session_id = $12,
                payment_intent_id = $13, updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(booking.id)
        .bind(booking.phone_number.as_str())
        .bind(&booking.seat_numbers)
        .bind(booking.seat_count as i32)
        .bind(booking.coach_number.clone())
        .bind(booking.from_location.as_str())
        .bind(booking.to_location.as_str())
        .bind(booking.departure_time)
        .bind(booking.amount)
        .bind(booking.booking_status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.payment_session_id.clone())
        .bind(booking.payment_intent_id.clone())
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(format!("booking {}", booking.id)));
        }

        // Re-derive the held-seat rows so the uniqueness backstop tracks
        // the booking's current seat set and lifecycle state.
        sqlx::query("DELETE FROM booking_seats WHERE booking_id = $1")
            .bind(booking.id)
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;
        if booking.holds_seats() {
            for seat in &booking.seat_numbers {
                sqlx::query("INSERT INTO booking_seats (trip_id, seat_number, booking_id) VALUES ($1, $2, $3)")
                    .bind(booking.trip_id.as_str())
                    .bind(seat.as_str())
                    .bind(booking.id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_err)?;
            }
        }

        tx.commit().await.map_err(map_err)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(())
    }
}
