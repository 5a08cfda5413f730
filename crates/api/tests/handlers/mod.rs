mod appointment_test;
mod middleware_test;
mod schedule_test;
