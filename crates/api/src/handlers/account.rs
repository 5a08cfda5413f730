use axum::{extract::State, Json};
use clinic_core::{
    errors::ClinicError,
    models::account::{Role, SignupRequest, SignupResponse},
};
use std::sync::Arc;

use crate::{
    middleware::{auth, error_handling::AppError},
    ApiState,
};

/// Creates a doctor or patient account and returns its identity token.
#[axum::debug_handler]
pub async fn signup(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, AppError> {
    let role = payload
        .usertype
        .parse::<Role>()
        .map_err(|e| ClinicError::Validation(e.to_string()))?;

    if payload.name.trim().is_empty() {
        return Err(ClinicError::Validation("name must not be empty".to_string()).into());
    }

    let id = state.service.create_account(&payload.name, role).await?;

    Ok(Json(SignupResponse {
        id,
        token: auth::issue_token(id, role),
    }))
}
