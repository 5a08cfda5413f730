//! # Clinic Core
//!
//! Scheduling and booking engine: availability windows, fifteen-minute slot
//! projection, booking and cancellation. Persistence is reached only through
//! the [`storage::Storage`] trait and "now" only through
//! [`clock::ReferenceClock`], both injected at construction.

pub mod clock;
pub mod errors;
pub mod models;
pub mod scheduling;
pub mod service;
pub mod storage;

pub use service::AppointmentService;
