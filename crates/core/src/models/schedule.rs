use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// A doctor's availability for one contiguous range of today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    pub id: i64,
    pub doctor_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl ScheduleWindow {
    /// Half-open intersection test.
    ///
    /// Equal starts or equal ends overlap, as does either start falling
    /// strictly inside the other range. Windows that only touch do not.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        ranges_overlap(self.start_time, self.end_time, start, end)
    }

    /// `start_time <= instant < end_time`
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start_time <= instant && instant < self.end_time
    }
}

pub fn ranges_overlap(
    start1: DateTime<Utc>,
    end1: DateTime<Utc>,
    start2: DateTime<Utc>,
    end2: DateTime<Utc>,
) -> bool {
    start1 < end2 && start2 < end1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddScheduleRequest {
    #[serde(with = "timestamp")]
    pub starttime: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub endtime: DateTime<Utc>,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddScheduleResponse {
    pub message: String,
    #[serde(rename = "scheduleid")]
    pub schedule_id: i64,
}
