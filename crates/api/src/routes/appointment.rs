use axum::{routing::post, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/signup", post(handlers::account::signup))
        .route("/schedule", post(handlers::schedule::set_schedule))
        .route("/book", post(handlers::appointment::book_appointment))
        .route("/list", post(handlers::appointment::list_appointments))
        .route("/cancel", post(handlers::appointment::cancel_appointment))
}
