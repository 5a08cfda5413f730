pub mod account;
pub mod appointment;
pub mod schedule;
pub mod slot;
pub mod timestamp;
