use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Weekend,
    Holiday,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekend => "WEEKEND",
            Frequency::Holiday => "HOLIDAY",
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Daily
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Scheduled,
    InProgress,
    Completed,
    Delayed,
}

impl ScheduleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "SCHEDULED",
            ScheduleStatus::InProgress => "IN_PROGRESS",
            ScheduleStatus::Completed => "COMPLETED",
            ScheduleStatus::Delayed => "DELAYED",
        }
    }

    /// Whether a schedule in this status still claims its time window.
    pub fn occupies_vehicle(self) -> bool {
        matches!(self, ScheduleStatus::Scheduled | ScheduleStatus::InProgress)
    }
}

impl Default for ScheduleStatus {
    fn default() -> Self {
        ScheduleStatus::Scheduled
    }
}

/// Half-open time interval `[start, end)` occupied by a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Touching windows (`self.end == other.start`) do not overlap,
    /// so back-to-back trips are allowed.
    pub fn overlaps(&self, other: &Window) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSchedule {
    pub id: Uuid,
    pub route_id: Uuid,
    pub vehicle_id: Uuid,
    pub departure_time: DateTime<Utc>,
    /// Derived: departure plus the route's estimated duration.
    pub arrival_time: DateTime<Utc>,
    pub frequency: Frequency,
    pub status: ScheduleStatus,
    /// Soft-delete flag. Deactivated schedules are kept but no longer
    /// claim the vehicle's timeline.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TripSchedule {
    pub fn window(&self) -> Window {
        Window {
            start: self.departure_time,
            end: self.arrival_time,
        }
    }

    pub fn occupies_vehicle(&self) -> bool {
        self.active && self.status.occupies_vehicle()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    pub route_id: Uuid,
    pub vehicle_id: Uuid,
    pub departure_time: DateTime<Utc>,
    #[serde(default)]
    pub frequency: Frequency,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    pub route_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub departure_time: Option<DateTime<Utc>>,
    pub frequency: Option<Frequency>,
    pub status: Option<ScheduleStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, min, 0).unwrap()
    }

    #[test]
    fn touching_windows_do_not_overlap() {
        let a = Window { start: at(8, 0), end: at(9, 0) };
        let b = Window { start: at(9, 0), end: at(10, 0) };
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn contained_window_overlaps() {
        let outer = Window { start: at(8, 0), end: at(12, 0) };
        let inner = Window { start: at(9, 0), end: at(10, 0) };
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn enum_wire_format_is_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&ScheduleStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(serde_json::to_string(&Frequency::Weekend).unwrap(), "\"WEEKEND\"");
    }
}
