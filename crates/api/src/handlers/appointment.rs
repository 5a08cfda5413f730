use axum::{extract::State, Json};
use clinic_core::{
    errors::ClinicError,
    models::{
        account::Role,
        appointment::{BookRequest, BookResponse, CancelRequest, CancelResponse},
        slot::{ListScheduleRequest, ListScheduleResponse},
    },
};
use std::sync::Arc;

use crate::{
    middleware::{auth, error_handling::AppError},
    ApiState,
};

use super::ensure_not_past;

/// Books a slot for the calling patient.
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<BookRequest>,
) -> Result<Json<BookResponse>, AppError> {
    let identity = auth::resolve_token(&payload.token)?;

    match identity.role {
        Role::Patient => {}
        Role::Doctor => {
            return Err(
                ClinicError::Forbidden("unauthorised to perform this action".to_string()).into(),
            );
        }
    }

    ensure_not_past(&state, "starttime", payload.starttime)?;

    let appointment_id = state
        .service
        .book(&payload.doctorname, identity.subject_id, payload.starttime)
        .await?;

    Ok(Json(BookResponse {
        message: "Appointment booked".to_string(),
        appointment_id,
    }))
}

/// Lists today's slots of a doctor. No token required.
#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<ListScheduleRequest>,
) -> Result<Json<ListScheduleResponse>, AppError> {
    let schedule = state.service.list_schedule(&payload.doctorname).await?;

    Ok(Json(ListScheduleResponse {
        message: "Appointments Listed".to_string(),
        appointments: schedule.slots().collect(),
    }))
}

/// Cancels an appointment on behalf of its doctor or patient.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CancelRequest>,
) -> Result<Json<CancelResponse>, AppError> {
    let identity = auth::resolve_token(&payload.token)?;

    state
        .service
        .cancel(payload.appointmentid, identity.subject_id, identity.role)
        .await?;

    Ok(Json(CancelResponse {
        message: "Appointment cancelled".to_string(),
    }))
}
