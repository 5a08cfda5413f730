//! The four components of the booking engine.
//!
//! Each component owns its injected [`Storage`](crate::storage::Storage) and
//! [`ReferenceClock`](crate::clock::ReferenceClock) handles; none keeps state
//! between calls.

pub mod booking;
pub mod cancellation;
pub mod slot_projector;
pub mod window_manager;

pub use booking::BookingEngine;
pub use cancellation::CancellationGuard;
pub use slot_projector::SlotProjector;
pub use window_manager::WindowManager;

use crate::{
    errors::{ClinicError, ClinicResult},
    storage::Storage,
};

/// Resolves a doctor's display name to an id, exact match only.
pub(crate) async fn resolve_doctor(storage: &dyn Storage, doctor_name: &str) -> ClinicResult<i64> {
    storage
        .find_doctor_id(doctor_name)
        .await?
        .ok_or_else(|| ClinicError::NotFound(format!("Doctor {} not found in database", doctor_name)))
}
