//! [`Storage`] backed by PostgreSQL.
//!
//! A scope lock is a transaction-level advisory lock. The [`PgScope`] unit
//! owns that transaction and runs every query of the locked block on it, so
//! a block never holds more than one pooled connection. The lock is
//! released when the transaction commits or rolls back. The partial unique
//! index on active appointments backs up the slot lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clinic_core::{
    clock::DayBound,
    errors::{ClinicError, ClinicResult},
    models::{appointment::Appointment, schedule::ScheduleWindow},
    storage::{LockScope, ScopeGuard, ScopedStorage, Storage},
};
use sqlx::{PgConnection, Postgres, Transaction};
use tracing::debug;

use crate::{
    repositories::{account, appointment, schedule},
    DbPool,
};

#[derive(Clone)]
pub struct PgStorage {
    pool: DbPool,
}

impl PgStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(report: &eyre::Report) -> bool {
    match report.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(err)) => err.is_unique_violation(),
        _ => false,
    }
}

fn account_error(report: eyre::Report) -> ClinicError {
    if is_unique_violation(&report) {
        ClinicError::Conflict("account already exists".to_string())
    } else {
        ClinicError::Database(report)
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn lock(&self, scope: LockScope) -> ClinicResult<ScopeGuard> {
        debug!("Acquiring advisory lock for {}", scope);

        let mut tx = self.pool.begin().await.map_err(eyre::Report::from)?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(scope.key())
            .execute(&mut *tx)
            .await
            .map_err(eyre::Report::from)?;

        Ok(Box::new(PgScope {
            scope,
            tx: Some(tx),
        }))
    }

    async fn create_doctor(&self, name: &str) -> ClinicResult<i64> {
        let doctor = account::create_doctor(&self.pool, name)
            .await
            .map_err(account_error)?;
        Ok(doctor.id)
    }

    async fn create_patient(&self, name: &str) -> ClinicResult<i64> {
        let patient = account::create_patient(&self.pool, name)
            .await
            .map_err(account_error)?;
        Ok(patient.id)
    }

    async fn find_doctor_id(&self, name: &str) -> ClinicResult<Option<i64>> {
        Ok(account::get_doctor_id_by_name(&self.pool, name).await?)
    }

    async fn list_windows_for_day(
        &self,
        doctor_id: i64,
        day: DayBound,
    ) -> ClinicResult<Vec<ScheduleWindow>> {
        let rows = schedule::get_schedules_for_day(&self.pool, doctor_id, day.start, day.end).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_active_appointments_for_day(
        &self,
        doctor_id: i64,
        day: DayBound,
    ) -> ClinicResult<Vec<Appointment>> {
        let rows =
            appointment::get_active_appointments_for_day(&self.pool, doctor_id, day.start, day.end)
                .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Locked block running on the transaction that holds the advisory lock.
pub struct PgScope {
    scope: LockScope,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgScope {
    fn conn(&mut self) -> ClinicResult<&mut PgConnection> {
        match self.tx.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(ClinicError::Database(eyre::eyre!(
                "{} was already committed",
                self.scope
            ))),
        }
    }
}

#[async_trait]
impl ScopedStorage for PgScope {
    async fn window_exists(
        &mut self,
        doctor_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ClinicResult<bool> {
        Ok(schedule::schedule_exists(self.conn()?, doctor_id, start, end).await?)
    }

    async fn find_overlapping_window(
        &mut self,
        doctor_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        day: DayBound,
    ) -> ClinicResult<bool> {
        Ok(
            schedule::schedule_overlaps(self.conn()?, doctor_id, start, end, day.start, day.end)
                .await?,
        )
    }

    async fn create_window(
        &mut self,
        doctor_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ClinicResult<ScheduleWindow> {
        let row = schedule::create_schedule(self.conn()?, doctor_id, start, end)
            .await
            .map_err(|report| {
                if is_unique_violation(&report) {
                    ClinicError::Conflict("schedule already exists".to_string())
                } else {
                    ClinicError::Database(report)
                }
            })?;
        Ok(row.into())
    }

    async fn list_windows_for_day(
        &mut self,
        doctor_id: i64,
        day: DayBound,
    ) -> ClinicResult<Vec<ScheduleWindow>> {
        let rows =
            schedule::get_schedules_for_day(self.conn()?, doctor_id, day.start, day.end).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_active_appointment(
        &mut self,
        doctor_id: i64,
        start: DateTime<Utc>,
    ) -> ClinicResult<Option<Appointment>> {
        let row = appointment::get_active_appointment(self.conn()?, doctor_id, start).await?;
        Ok(row.map(Into::into))
    }

    async fn create_appointment(
        &mut self,
        doctor_id: i64,
        patient_id: i64,
        start: DateTime<Utc>,
    ) -> ClinicResult<i64> {
        let row = appointment::create_appointment(self.conn()?, doctor_id, patient_id, start)
            .await
            .map_err(|report| {
                if is_unique_violation(&report) {
                    ClinicError::slot_taken()
                } else {
                    ClinicError::Database(report)
                }
            })?;
        Ok(row.id)
    }

    async fn get_appointment(&mut self, appointment_id: i64) -> ClinicResult<Option<Appointment>> {
        let row = appointment::get_appointment_by_id(self.conn()?, appointment_id).await?;
        Ok(row.map(Into::into))
    }

    async fn cancel_appointment(
        &mut self,
        appointment_id: i64,
        cancelled_at: DateTime<Utc>,
    ) -> ClinicResult<()> {
        let updated =
            appointment::cancel_appointment(self.conn()?, appointment_id, cancelled_at).await?;
        if updated == 0 {
            return Err(ClinicError::already_cancelled(appointment_id));
        }
        Ok(())
    }

    async fn commit(&mut self) -> ClinicResult<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await.map_err(eyre::Report::from)?;
            debug!("Released advisory lock for {}", self.scope);
        }
        Ok(())
    }
}
