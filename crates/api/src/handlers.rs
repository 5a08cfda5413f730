/// Account signup
pub mod account;
/// Booking, listing and cancelling appointments
pub mod appointment;
/// Doctor availability windows
pub mod schedule;

use chrono::{DateTime, Utc};
use clinic_core::{clock::ReferenceClock, errors::ClinicError};

use crate::{middleware::error_handling::AppError, ApiState};

/// Rejects timestamps earlier than the reference clock's "now".
pub(crate) fn ensure_not_past(
    state: &ApiState,
    field: &str,
    value: DateTime<Utc>,
) -> Result<(), AppError> {
    if value < state.clock.now() {
        return Err(ClinicError::Validation(format!("{} must not be in the past", field)).into());
    }
    Ok(())
}
