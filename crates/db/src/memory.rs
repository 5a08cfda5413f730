//! In-process [`Storage`] for tests and for running the service without a
//! database. Every scope gets its own async mutex, created on first use and
//! dropped once nobody holds or awaits it. Data lives behind a single mutex
//! that is never held across an await on another lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clinic_core::{
    clock::DayBound,
    errors::{ClinicError, ClinicResult},
    models::{appointment::Appointment, schedule::ScheduleWindow},
    storage::{LockScope, ScopeGuard, ScopedStorage, Storage},
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex as SyncMutex, PoisonError},
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

type ScopeTable = Arc<SyncMutex<HashMap<LockScope, Arc<Mutex<()>>>>>;

#[derive(Debug, Default)]
struct Tables {
    doctors: HashMap<String, i64>,
    patients: HashMap<String, i64>,
    windows: Vec<ScheduleWindow>,
    appointments: Vec<Appointment>,
    next_account_id: i64,
}

impl Tables {
    fn windows_for_day(&self, doctor_id: i64, day: &DayBound) -> Vec<ScheduleWindow> {
        let mut windows: Vec<_> = self
            .windows
            .iter()
            .filter(|w| w.doctor_id == doctor_id && day.covers(w.start_time, w.end_time))
            .cloned()
            .collect();
        windows.sort_by_key(|w| w.start_time);
        windows
    }

    fn active_appointment(&self, doctor_id: i64, start: DateTime<Utc>) -> Option<&Appointment> {
        self.appointments
            .iter()
            .find(|a| a.active && a.doctor_id == doctor_id && a.start_time == start)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    tables: Arc<Mutex<Tables>>,
    scopes: ScopeTable,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored appointment, active or not.
    pub async fn appointments(&self) -> Vec<Appointment> {
        self.tables.lock().await.appointments.clone()
    }

    pub async fn windows(&self) -> Vec<ScheduleWindow> {
        self.tables.lock().await.windows.clone()
    }

    /// Number of scopes currently held or awaited.
    pub fn live_scopes(&self) -> usize {
        self.scopes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn insert_account(
    accounts: &mut HashMap<String, i64>,
    next_id: &mut i64,
    name: &str,
) -> ClinicResult<i64> {
    if accounts.contains_key(name) {
        return Err(ClinicError::Conflict("account already exists".to_string()));
    }
    *next_id += 1;
    accounts.insert(name.to_string(), *next_id);
    Ok(*next_id)
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn lock(&self, scope: LockScope) -> ClinicResult<ScopeGuard> {
        let scope_lock = self
            .scopes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(scope)
            .or_default()
            .clone();
        let held = scope_lock.lock_owned().await;
        debug!("Locked {}", scope);

        Ok(Box::new(MemoryScope {
            scope,
            tables: self.tables.clone(),
            scopes: self.scopes.clone(),
            held: Some(held),
        }))
    }

    async fn create_doctor(&self, name: &str) -> ClinicResult<i64> {
        let mut tables = self.tables.lock().await;
        let Tables {
            doctors,
            next_account_id,
            ..
        } = &mut *tables;
        insert_account(doctors, next_account_id, name)
    }

    async fn create_patient(&self, name: &str) -> ClinicResult<i64> {
        let mut tables = self.tables.lock().await;
        let Tables {
            patients,
            next_account_id,
            ..
        } = &mut *tables;
        insert_account(patients, next_account_id, name)
    }

    async fn find_doctor_id(&self, name: &str) -> ClinicResult<Option<i64>> {
        Ok(self.tables.lock().await.doctors.get(name).copied())
    }

    async fn list_windows_for_day(
        &self,
        doctor_id: i64,
        day: DayBound,
    ) -> ClinicResult<Vec<ScheduleWindow>> {
        Ok(self.tables.lock().await.windows_for_day(doctor_id, &day))
    }

    async fn list_active_appointments_for_day(
        &self,
        doctor_id: i64,
        day: DayBound,
    ) -> ClinicResult<Vec<Appointment>> {
        let tables = self.tables.lock().await;
        let mut appointments: Vec<_> = tables
            .appointments
            .iter()
            .filter(|a| a.active && a.doctor_id == doctor_id && day.contains(a.start_time))
            .cloned()
            .collect();
        appointments.sort_by_key(|a| a.start_time);
        Ok(appointments)
    }
}

/// Locked block over [`MemoryStorage`]. Writes apply immediately; the scope
/// is released when the unit is dropped.
pub struct MemoryScope {
    scope: LockScope,
    tables: Arc<Mutex<Tables>>,
    scopes: ScopeTable,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for MemoryScope {
    fn drop(&mut self) {
        drop(self.held.take());

        // Entries are cloned only under this lock, so a count of one means
        // no other task holds or awaits the scope.
        let mut scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);
        if scopes
            .get(&self.scope)
            .is_some_and(|scope_lock| Arc::strong_count(scope_lock) == 1)
        {
            scopes.remove(&self.scope);
        }
    }
}

#[async_trait]
impl ScopedStorage for MemoryScope {
    async fn window_exists(
        &mut self,
        doctor_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ClinicResult<bool> {
        let tables = self.tables.lock().await;
        Ok(tables
            .windows
            .iter()
            .any(|w| w.doctor_id == doctor_id && w.start_time == start && w.end_time == end))
    }

    async fn find_overlapping_window(
        &mut self,
        doctor_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        day: DayBound,
    ) -> ClinicResult<bool> {
        let tables = self.tables.lock().await;
        Ok(tables
            .windows_for_day(doctor_id, &day)
            .iter()
            .any(|w| w.overlaps(start, end)))
    }

    async fn create_window(
        &mut self,
        doctor_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ClinicResult<ScheduleWindow> {
        let mut tables = self.tables.lock().await;
        let window = ScheduleWindow {
            id: tables.windows.len() as i64 + 1,
            doctor_id,
            start_time: start,
            end_time: end,
        };
        tables.windows.push(window.clone());
        Ok(window)
    }

    async fn list_windows_for_day(
        &mut self,
        doctor_id: i64,
        day: DayBound,
    ) -> ClinicResult<Vec<ScheduleWindow>> {
        Ok(self.tables.lock().await.windows_for_day(doctor_id, &day))
    }

    async fn find_active_appointment(
        &mut self,
        doctor_id: i64,
        start: DateTime<Utc>,
    ) -> ClinicResult<Option<Appointment>> {
        let tables = self.tables.lock().await;
        Ok(tables.active_appointment(doctor_id, start).cloned())
    }

    async fn create_appointment(
        &mut self,
        doctor_id: i64,
        patient_id: i64,
        start: DateTime<Utc>,
    ) -> ClinicResult<i64> {
        let mut tables = self.tables.lock().await;
        if tables.active_appointment(doctor_id, start).is_some() {
            return Err(ClinicError::slot_taken());
        }

        let id = tables.appointments.len() as i64 + 1;
        tables.appointments.push(Appointment {
            id,
            doctor_id,
            patient_id,
            start_time: start,
            active: true,
            cancelled_at: None,
        });
        Ok(id)
    }

    async fn get_appointment(&mut self, appointment_id: i64) -> ClinicResult<Option<Appointment>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .appointments
            .iter()
            .find(|a| a.id == appointment_id)
            .cloned())
    }

    async fn cancel_appointment(
        &mut self,
        appointment_id: i64,
        cancelled_at: DateTime<Utc>,
    ) -> ClinicResult<()> {
        let mut tables = self.tables.lock().await;
        match tables
            .appointments
            .iter_mut()
            .find(|a| a.id == appointment_id && a.active)
        {
            Some(appointment) => {
                appointment.active = false;
                appointment.cancelled_at = Some(cancelled_at);
                Ok(())
            }
            None => Err(ClinicError::already_cancelled(appointment_id)),
        }
    }

    async fn commit(&mut self) -> ClinicResult<()> {
        debug!("Committed {}", self.scope);
        Ok(())
    }
}
