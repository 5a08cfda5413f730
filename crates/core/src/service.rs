use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::{
    clock::ReferenceClock,
    errors::ClinicResult,
    models::{account::Role, schedule::ScheduleWindow, slot::DaySchedule},
    scheduling::{BookingEngine, CancellationGuard, SlotProjector, WindowManager},
    storage::Storage,
};

/// Operation surface consumed by the transport layer.
#[derive(Clone)]
pub struct AppointmentService {
    storage: Arc<dyn Storage>,
    windows: WindowManager,
    projector: SlotProjector,
    booking: BookingEngine,
    cancellation: CancellationGuard,
}

impl AppointmentService {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn ReferenceClock>) -> Self {
        Self {
            windows: WindowManager::new(storage.clone(), clock.clone()),
            projector: SlotProjector::new(storage.clone(), clock.clone()),
            booking: BookingEngine::new(storage.clone(), clock.clone()),
            cancellation: CancellationGuard::new(storage.clone(), clock),
            storage,
        }
    }

    pub async fn create_account(&self, name: &str, role: Role) -> ClinicResult<i64> {
        let id = match role {
            Role::Doctor => self.storage.create_doctor(name).await?,
            Role::Patient => self.storage.create_patient(name).await?,
        };
        info!("Created {} account {} ({})", role, id, name);
        Ok(id)
    }

    pub async fn add_schedule(
        &self,
        doctor_id: i64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> ClinicResult<ScheduleWindow> {
        self.windows.add_schedule(doctor_id, start_time, end_time).await
    }

    pub async fn book(
        &self,
        doctor_name: &str,
        patient_id: i64,
        start_time: DateTime<Utc>,
    ) -> ClinicResult<i64> {
        self.booking.book(doctor_name, patient_id, start_time).await
    }

    pub async fn list_schedule(&self, doctor_name: &str) -> ClinicResult<DaySchedule> {
        self.projector.list_schedule(doctor_name).await
    }

    pub async fn cancel(&self, appointment_id: i64, subject_id: i64, role: Role) -> ClinicResult<()> {
        self.cancellation.cancel(appointment_id, subject_id, role).await
    }
}
