pub mod account;
pub mod appointment;
pub mod schedule;
