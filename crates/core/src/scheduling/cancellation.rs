use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    clock::ReferenceClock,
    errors::{ClinicError, ClinicResult},
    models::{account::Role, appointment::Appointment},
    storage::{LockScope, Storage},
};

/// Authorizes and commits the `Active -> Cancelled` transition.
#[derive(Clone)]
pub struct CancellationGuard {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn ReferenceClock>,
}

impl CancellationGuard {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn ReferenceClock>) -> Self {
        Self { storage, clock }
    }

    /// Checks run in order: existence, already cancelled, authorization.
    pub async fn cancel(&self, appointment_id: i64, subject_id: i64, role: Role) -> ClinicResult<()> {
        let mut scope = self
            .storage
            .lock(LockScope::Appointment(appointment_id))
            .await?;

        let appointment = scope
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| {
                ClinicError::NotFound(format!(
                    "appointment id {} does not exist in database",
                    appointment_id
                ))
            })?;

        if appointment.is_cancelled() {
            return Err(ClinicError::already_cancelled(appointment_id));
        }

        if !is_party(&appointment, subject_id, role) {
            warn!(
                "{} {} may not cancel appointment {}",
                role, subject_id, appointment_id
            );
            return Err(ClinicError::Forbidden(
                "unauthorised to perform this action".to_string(),
            ));
        }

        scope
            .cancel_appointment(appointment_id, self.clock.now())
            .await?;
        scope.commit().await?;

        info!("Appointment {} cancelled by {} {}", appointment_id, role, subject_id);
        Ok(())
    }
}

fn is_party(appointment: &Appointment, subject_id: i64, role: Role) -> bool {
    match role {
        Role::Doctor => appointment.doctor_id == subject_id,
        Role::Patient => appointment.patient_id == subject_id,
    }
}
