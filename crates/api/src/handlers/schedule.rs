use axum::{extract::State, Json};
use clinic_core::{
    errors::ClinicError,
    models::{
        account::Role,
        schedule::{AddScheduleRequest, AddScheduleResponse},
    },
};
use std::sync::Arc;

use crate::{
    middleware::{auth, error_handling::AppError},
    ApiState,
};

use super::ensure_not_past;

/// Publishes an availability window for the calling doctor.
///
/// Only doctors may publish windows; a patient token is rejected with 403.
#[axum::debug_handler]
pub async fn set_schedule(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<AddScheduleRequest>,
) -> Result<Json<AddScheduleResponse>, AppError> {
    let identity = auth::resolve_token(&payload.token)?;

    match identity.role {
        Role::Doctor => {}
        Role::Patient => {
            return Err(
                ClinicError::Forbidden("unauthorised to perform this action".to_string()).into(),
            );
        }
    }

    ensure_not_past(&state, "starttime", payload.starttime)?;
    ensure_not_past(&state, "endtime", payload.endtime)?;

    let window = state
        .service
        .add_schedule(identity.subject_id, payload.starttime, payload.endtime)
        .await?;

    Ok(Json(AddScheduleResponse {
        message: "Schedule created".to_string(),
        schedule_id: window.id,
    }))
}
