use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    clock::ReferenceClock,
    errors::{ClinicError, ClinicResult},
    models::{slot::is_slot_aligned, timestamp},
    storage::{LockScope, Storage},
};

/// Validates and commits single bookings.
#[derive(Clone)]
pub struct BookingEngine {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn ReferenceClock>,
}

impl BookingEngine {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn ReferenceClock>) -> Self {
        Self { storage, clock }
    }

    /// Books the slot starting at `start_time` with the named doctor.
    ///
    /// The availability check, schedule check and insert run while the
    /// slot's scope lock is held, so two callers racing for the same slot
    /// see one success and one "slot already taken".
    pub async fn book(
        &self,
        doctor_name: &str,
        patient_id: i64,
        start_time: DateTime<Utc>,
    ) -> ClinicResult<i64> {
        let doctor_id = super::resolve_doctor(self.storage.as_ref(), doctor_name).await?;

        if !is_slot_aligned(start_time) {
            return Err(ClinicError::Validation(
                "slot start must fall on a multiple of fifteen minutes".to_string(),
            ));
        }

        let mut scope = self
            .storage
            .lock(LockScope::Slot(doctor_id, start_time))
            .await?;

        if scope
            .find_active_appointment(doctor_id, start_time)
            .await?
            .is_some()
        {
            return Err(ClinicError::slot_taken());
        }

        let windows = scope
            .list_windows_for_day(doctor_id, self.clock.today())
            .await?;
        if !windows.iter().any(|w| w.contains(start_time)) {
            debug!(
                "Slot {} outside the schedule of doctor {}",
                timestamp::format(&start_time),
                doctor_id
            );
            return Err(ClinicError::Conflict("slot not within schedule".to_string()));
        }

        let appointment_id = scope
            .create_appointment(doctor_id, patient_id, start_time)
            .await?;
        scope.commit().await?;

        info!(
            "Appointment {} booked: doctor {}, patient {}, {}",
            appointment_id,
            doctor_id,
            patient_id,
            timestamp::format(&start_time)
        );
        Ok(appointment_id)
    }
}
