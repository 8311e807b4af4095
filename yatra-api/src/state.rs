use std::sync::Arc;

use yatra_booking::BookingLifecycleManager;
use yatra_schedule::ScheduleLifecycleManager;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub schedules: Arc<ScheduleLifecycleManager>,
    pub bookings: Arc<BookingLifecycleManager>,
    pub auth: AuthConfig,
}
