use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDuration {
    pub estimated_duration_minutes: i64,
}

#[derive(Debug, Error)]
pub enum RouteLookupError {
    #[error("Route not Found")]
    NotFound,

    #[error("route provider unreachable: {0}")]
    Unreachable(String),
}

/// Leaf dependency of schedule creation: maps a route to its estimated
/// travel time, from which the arrival side of a window is derived.
#[async_trait]
pub trait RouteDurationProvider: Send + Sync {
    async fn duration(&self, route_id: Uuid) -> Result<RouteDuration, RouteLookupError>;
}
