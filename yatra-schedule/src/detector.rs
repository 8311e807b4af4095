use chrono::{DateTime, Utc};
use uuid::Uuid;

use yatra_domain::schedule::TripSchedule;

/// Two half-open windows `[s1, e1)` and `[s2, e2)` overlap iff
/// `s1 < e2 && s2 < e1`. The single inequality pair covers all three
/// naive cases (starts-during, ends-during, contains) and treats touching
/// windows as back-to-back, not conflicting.
pub fn windows_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// First committed schedule whose window overlaps `[start, end)`.
///
/// Only schedules still claiming the vehicle count (active, SCHEDULED or
/// IN_PROGRESS); `exclude` skips the schedule being updated so it does
/// not conflict with itself.
pub fn find_conflict<'a>(
    existing: &'a [TripSchedule],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> Option<&'a TripSchedule> {
    existing.iter().find(|s| {
        s.occupies_vehicle()
            && exclude != Some(s.id)
            && windows_overlap(s.departure_time, s.arrival_time, start, end)
    })
}

/// The trip preceding `start` on this vehicle (latest active departure at
/// or before `start`) must already have arrived. Returns the blocking
/// trip when the vehicle is still out.
pub fn check_sequencing<'a>(
    existing: &'a [TripSchedule],
    start: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> Option<&'a TripSchedule> {
    existing
        .iter()
        .filter(|s| s.active && exclude != Some(s.id) && s.departure_time <= start)
        .max_by_key(|s| s.departure_time)
        .filter(|previous| previous.arrival_time > start)
}
