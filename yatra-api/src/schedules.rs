use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use yatra_domain::schedule::{CreateScheduleRequest, TripSchedule, UpdateScheduleRequest};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schedules", post(create_schedule).get(list_schedules))
        .route(
            "/schedules/{id}",
            get(get_schedule).put(update_schedule).delete(deactivate_schedule),
        )
}

async fn create_schedule(
    State(state): State<AppState>,
    Json(req): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<TripSchedule>), AppError> {
    let schedule = state.schedules.create(req).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

async fn list_schedules(State(state): State<AppState>) -> Result<Json<Vec<TripSchedule>>, AppError> {
    Ok(Json(state.schedules.list_active().await?))
}

async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripSchedule>, AppError> {
    Ok(Json(state.schedules.get(id).await?))
}

async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateScheduleRequest>,
) -> Result<Json<TripSchedule>, AppError> {
    Ok(Json(state.schedules.update(id, req).await?))
}

async fn deactivate_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripSchedule>, AppError> {
    Ok(Json(state.schedules.deactivate(id).await?))
}
