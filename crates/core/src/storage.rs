//! Persistence boundary of the scheduling engine.
//!
//! The engine never holds business state between calls; each operation
//! re-reads what it needs through the [`ScopedStorage`] unit that holds
//! the key it is about to mutate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use std::fmt;

use crate::{
    clock::DayBound,
    errors::ClinicResult,
    models::{appointment::Appointment, schedule::ScheduleWindow},
};

/// Key a validate-then-mutate block is serialized on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockScope {
    /// All window writes of one doctor.
    DoctorWindows(i64),
    /// One bookable slot of one doctor.
    Slot(i64, DateTime<Utc>),
    /// One appointment row.
    Appointment(i64),
}

impl LockScope {
    /// 64-bit key for backends that lock on integers (e.g. advisory locks).
    pub fn key(&self) -> i64 {
        // Namespace in the top byte so the three scopes never collide.
        match *self {
            LockScope::DoctorWindows(doctor_id) => (1 << 56) | (doctor_id & 0x00FF_FFFF_FFFF_FFFF),
            LockScope::Slot(doctor_id, start) => {
                let minutes = start.timestamp() / 60;
                let mixed = (doctor_id.wrapping_mul(0x9E37_79B9)) ^ minutes;
                (2 << 56) | (mixed & 0x00FF_FFFF_FFFF_FFFF)
            }
            LockScope::Appointment(appointment_id) => {
                (3 << 56) | (appointment_id & 0x00FF_FFFF_FFFF_FFFF)
            }
        }
    }
}

impl fmt::Display for LockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockScope::DoctorWindows(doctor_id) => write!(f, "windows of doctor {}", doctor_id),
            LockScope::Slot(doctor_id, start) => {
                write!(f, "slot {} of doctor {}", start.to_rfc3339(), doctor_id)
            }
            LockScope::Appointment(id) => write!(f, "appointment {}", id),
        }
    }
}

/// A validate-then-mutate block holding one [`LockScope`].
///
/// Every read and write of the block goes through the unit, so a backend
/// can run them on the same connection that holds the lock. Writes become
/// durable on [`ScopedStorage::commit`]; dropping the unit without
/// committing discards them where the backend supports it and always
/// releases the scope.
#[automock]
#[async_trait]
pub trait ScopedStorage: Send {
    async fn window_exists(
        &mut self,
        doctor_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ClinicResult<bool>;

    /// Whether any of the doctor's windows inside `day` overlaps `[start, end)`.
    async fn find_overlapping_window(
        &mut self,
        doctor_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        day: DayBound,
    ) -> ClinicResult<bool>;

    async fn create_window(
        &mut self,
        doctor_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ClinicResult<ScheduleWindow>;

    /// Windows lying entirely inside `day`, ordered by start.
    async fn list_windows_for_day(
        &mut self,
        doctor_id: i64,
        day: DayBound,
    ) -> ClinicResult<Vec<ScheduleWindow>>;

    async fn find_active_appointment(
        &mut self,
        doctor_id: i64,
        start: DateTime<Utc>,
    ) -> ClinicResult<Option<Appointment>>;

    /// Fails with the "slot already taken" conflict when an active
    /// appointment already holds `(doctor_id, start)`.
    async fn create_appointment(
        &mut self,
        doctor_id: i64,
        patient_id: i64,
        start: DateTime<Utc>,
    ) -> ClinicResult<i64>;

    async fn get_appointment(&mut self, appointment_id: i64) -> ClinicResult<Option<Appointment>>;

    /// Deactivates an active appointment. An appointment that is no longer
    /// active is reported as already cancelled.
    async fn cancel_appointment(
        &mut self,
        appointment_id: i64,
        cancelled_at: DateTime<Utc>,
    ) -> ClinicResult<()>;

    /// Makes the block's writes durable and releases the scope.
    async fn commit(&mut self) -> ClinicResult<()>;
}

/// Held for the duration of a validate-then-mutate block; dropping it
/// releases the scope.
pub type ScopeGuard = Box<dyn ScopedStorage>;

#[automock]
#[async_trait]
pub trait Storage: Send + Sync {
    /// Waits for `scope` and returns the unit that holds it.
    async fn lock(&self, scope: LockScope) -> ClinicResult<ScopeGuard>;

    async fn create_doctor(&self, name: &str) -> ClinicResult<i64>;

    async fn create_patient(&self, name: &str) -> ClinicResult<i64>;

    /// Exact, case-sensitive name match.
    async fn find_doctor_id(&self, name: &str) -> ClinicResult<Option<i64>>;

    /// Windows lying entirely inside `day`, ordered by start.
    async fn list_windows_for_day(
        &self,
        doctor_id: i64,
        day: DayBound,
    ) -> ClinicResult<Vec<ScheduleWindow>>;

    async fn list_active_appointments_for_day(
        &self,
        doctor_id: i64,
        day: DayBound,
    ) -> ClinicResult<Vec<Appointment>>;
}
