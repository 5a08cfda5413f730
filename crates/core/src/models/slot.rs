use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, iter};

use super::{appointment::Appointment, schedule::ScheduleWindow, timestamp};

pub const SLOT_MINUTES: i64 = 15;

fn slot_length() -> Duration {
    Duration::minutes(SLOT_MINUTES)
}

/// True when `instant` sits exactly on a quarter-hour boundary.
pub fn is_slot_aligned(instant: DateTime<Utc>) -> bool {
    instant.minute() as i64 % SLOT_MINUTES == 0 && instant.second() == 0 && instant.nanosecond() == 0
}

/// A fifteen-minute unit inside a window. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(rename = "doctorid")]
    pub doctor_id: i64,
    #[serde(rename = "starttime", with = "timestamp")]
    pub start_time: DateTime<Utc>,
    pub booked: bool,
    #[serde(rename = "appointmentid")]
    pub appointment_id: Option<i64>,
    #[serde(rename = "patientid")]
    pub patient_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    pub appointment_id: i64,
    pub patient_id: i64,
}

/// Snapshot of one doctor's windows and active bookings for a day.
///
/// [`DaySchedule::slots`] walks the snapshot lazily and can be called any
/// number of times; every call yields the same sequence.
#[derive(Debug, Clone)]
pub struct DaySchedule {
    doctor_id: i64,
    windows: Vec<ScheduleWindow>,
    bookings: HashMap<DateTime<Utc>, Booking>,
}

impl DaySchedule {
    /// `windows` must be pairwise non-overlapping; they are sorted here.
    pub fn new(doctor_id: i64, mut windows: Vec<ScheduleWindow>, appointments: Vec<Appointment>) -> Self {
        windows.sort_by_key(|w| w.start_time);

        let bookings = appointments
            .into_iter()
            .filter(|a| a.active)
            .map(|a| {
                (
                    a.start_time,
                    Booking {
                        appointment_id: a.id,
                        patient_id: a.patient_id,
                    },
                )
            })
            .collect();

        Self {
            doctor_id,
            windows,
            bookings,
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.windows.iter().flat_map(move |window| {
            iter::successors(Some(window.start_time), |t| Some(*t + slot_length()))
                .take_while(move |t| *t < window.end_time)
                .map(move |start_time| self.slot_at(start_time))
        })
    }

    fn slot_at(&self, start_time: DateTime<Utc>) -> Slot {
        match self.bookings.get(&start_time) {
            Some(booking) => Slot {
                doctor_id: self.doctor_id,
                start_time,
                booked: true,
                appointment_id: Some(booking.appointment_id),
                patient_id: Some(booking.patient_id),
            },
            None => Slot {
                doctor_id: self.doctor_id,
                start_time,
                booked: false,
                appointment_id: None,
                patient_id: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListScheduleRequest {
    pub doctorname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListScheduleResponse {
    pub message: String,
    pub appointments: Vec<Slot>,
}
