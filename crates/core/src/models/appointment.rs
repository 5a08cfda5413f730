use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// A persisted booking of one slot.
///
/// `active` only ever goes from `true` to `false`; `cancelled_at` is set at
/// the same moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub start_time: DateTime<Utc>,
    pub active: bool,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn is_cancelled(&self) -> bool {
        !self.active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRequest {
    pub doctorname: String,
    #[serde(with = "timestamp")]
    pub starttime: DateTime<Utc>,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookResponse {
    pub message: String,
    #[serde(rename = "appointmentid")]
    pub appointment_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    pub appointmentid: i64,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub message: String,
}
