/// Signup, schedule, booking and cancellation endpoints
pub mod appointment;
/// Liveness and version endpoints
pub mod health;
