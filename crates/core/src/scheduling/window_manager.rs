use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    clock::ReferenceClock,
    errors::{ClinicError, ClinicResult},
    models::{schedule::ScheduleWindow, slot::is_slot_aligned, timestamp},
    storage::{LockScope, Storage},
};

/// Validates and creates availability windows.
#[derive(Clone)]
pub struct WindowManager {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn ReferenceClock>,
}

impl WindowManager {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn ReferenceClock>) -> Self {
        Self { storage, clock }
    }

    /// Creates a window for `doctor_id` covering `[start_time, end_time)`.
    ///
    /// # Errors
    ///
    /// * `ClinicError::Validation` - unaligned bounds, empty range, or a
    ///   range outside today
    /// * `ClinicError::Conflict` - an identical or overlapping window exists
    /// * `ClinicError::Database` - storage failure
    pub async fn add_schedule(
        &self,
        doctor_id: i64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> ClinicResult<ScheduleWindow> {
        if !is_slot_aligned(start_time) || !is_slot_aligned(end_time) {
            return Err(ClinicError::Validation(
                "schedule bounds must fall on a multiple of fifteen minutes".to_string(),
            ));
        }
        if start_time >= end_time {
            return Err(ClinicError::Validation(
                "schedule end time must be after its start time".to_string(),
            ));
        }

        let today = self.clock.today();
        if start_time < today.start || end_time > today.last_second() {
            return Err(ClinicError::Validation(
                "schedule can be created for current day only".to_string(),
            ));
        }

        let mut scope = self.storage.lock(LockScope::DoctorWindows(doctor_id)).await?;

        if scope.window_exists(doctor_id, start_time, end_time).await? {
            debug!(
                "Duplicate schedule for doctor {}: {} - {}",
                doctor_id,
                timestamp::format(&start_time),
                timestamp::format(&end_time)
            );
            return Err(ClinicError::Conflict("schedule already exists".to_string()));
        }

        if scope
            .find_overlapping_window(doctor_id, start_time, end_time, today)
            .await?
        {
            debug!(
                "Overlapping schedule for doctor {}: {} - {}",
                doctor_id,
                timestamp::format(&start_time),
                timestamp::format(&end_time)
            );
            return Err(ClinicError::Conflict(
                "schedule overlaps with existing schedule".to_string(),
            ));
        }

        let window = scope.create_window(doctor_id, start_time, end_time).await?;
        scope.commit().await?;

        info!(
            "Schedule {} created for doctor {}: {} - {}",
            window.id,
            doctor_id,
            timestamp::format(&window.start_time),
            timestamp::format(&window.end_time)
        );
        Ok(window)
    }
}
