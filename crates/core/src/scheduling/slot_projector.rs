use std::sync::Arc;
use tracing::debug;

use crate::{
    clock::ReferenceClock,
    errors::ClinicResult,
    models::slot::DaySchedule,
    storage::Storage,
};

/// Derives today's slots for a doctor from stored windows and bookings.
#[derive(Clone)]
pub struct SlotProjector {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn ReferenceClock>,
}

impl SlotProjector {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn ReferenceClock>) -> Self {
        Self { storage, clock }
    }

    pub async fn list_schedule(&self, doctor_name: &str) -> ClinicResult<DaySchedule> {
        let doctor_id = super::resolve_doctor(self.storage.as_ref(), doctor_name).await?;
        self.project(doctor_id).await
    }

    /// Reads a fresh snapshot; nothing is reused from earlier calls.
    pub async fn project(&self, doctor_id: i64) -> ClinicResult<DaySchedule> {
        let today = self.clock.today();

        let appointments = self
            .storage
            .list_active_appointments_for_day(doctor_id, today)
            .await?;
        let windows = self.storage.list_windows_for_day(doctor_id, today).await?;

        debug!(
            "Projecting {} windows with {} bookings for doctor {}",
            windows.len(),
            appointments.len(),
            doctor_id
        );

        Ok(DaySchedule::new(doctor_id, windows, appointments))
    }
}
