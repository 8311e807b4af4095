use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportType {
    Bus,
    Train,
}

impl TransportType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportType::Bus => "BUS",
            TransportType::Train => "TRAIN",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Refunded => "REFUNDED",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

/// One seat reservation on a trip. Supports both bus and train travel;
/// `transport_type` decides which extra fields apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    /// Subject of the caller's token; ownership checks compare against it.
    pub passenger_id: String,
    pub phone_number: String,
    pub transport_type: TransportType,
    /// Opaque key correlating bookings to one departure. Minted by the
    /// transport module, never interpreted here.
    pub trip_id: String,
    /// Seat labels, unique within the booking.
    pub seat_numbers: Vec<String>,
    pub seat_count: u32,
    /// Present iff `transport_type` is TRAIN.
    pub coach_number: Option<String>,
    pub from_location: String,
    pub to_location: String,
    pub departure_time: DateTime<Utc>,
    pub amount: i64,
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_session_id: Option<String>,
    /// Recorded at payment time; required to issue a refund.
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Cancelled bookings release their seats; everything else holds them.
    pub fn holds_seats(&self) -> bool {
        self.booking_status != BookingStatus::Cancelled
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub transport_type: TransportType,
    pub trip_id: String,
    pub seat_numbers: Vec<String>,
    pub coach_number: Option<String>,
    pub phone_number: String,
    pub from_location: String,
    pub to_location: String,
    pub departure_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    pub phone_number: Option<String>,
    pub seat_numbers: Option<Vec<String>>,
    pub coach_number: Option<String>,
    pub from_location: Option<String>,
    pub to_location: Option<String>,
    pub departure_time: Option<DateTime<Utc>>,
}
