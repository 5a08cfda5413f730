use chrono::{DateTime, Utc};
use clinic_core::models::{appointment::Appointment, schedule::ScheduleWindow};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAccount {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDoctorSchedule {
    pub id: i64,
    pub doctor_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub start_time: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<DbDoctorSchedule> for ScheduleWindow {
    fn from(row: DbDoctorSchedule) -> Self {
        ScheduleWindow {
            id: row.id,
            doctor_id: row.doctor_id,
            start_time: row.start_time,
            end_time: row.end_time,
        }
    }
}

impl From<DbAppointment> for Appointment {
    fn from(row: DbAppointment) -> Self {
        Appointment {
            id: row.id,
            doctor_id: row.doctor_id,
            patient_id: row.patient_id,
            start_time: row.start_time,
            active: row.is_active,
            cancelled_at: row.cancelled_at,
        }
    }
}
