use axum::http::StatusCode;
use clinic_core::models::{
    appointment::{BookResponse, CancelResponse},
    slot::ListScheduleResponse,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::test_utils::{at, wire, TestContext};

async fn book(ctx: &TestContext, doctor: &str, hour: u32, minute: u32, token: &str) -> axum_test::TestResponse {
    ctx.server
        .post("/book")
        .json(&json!({
            "doctorname": doctor,
            "starttime": wire(hour, minute),
            "token": token,
        }))
        .await
}

#[tokio::test]
async fn test_book_list_and_double_book() {
    let ctx = TestContext::new();
    ctx.doctor_with_window("Dr. Grey", (9, 0), (9, 30)).await;
    let first = ctx.signup("Ann", "patient").await;
    let second = ctx.signup("Bob", "patient").await;

    let response = book(&ctx, "Dr. Grey", 9, 0, &first.token).await;
    response.assert_status_ok();
    let booked = response.json::<BookResponse>();
    assert_eq!(booked.message, "Appointment booked");

    let response = book(&ctx, "Dr. Grey", 9, 0, &second.token).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["message"], "slot already taken");

    let response = ctx
        .server
        .post("/list")
        .json(&json!({ "doctorname": "Dr. Grey" }))
        .await;
    response.assert_status_ok();
    let listed = response.json::<ListScheduleResponse>();

    assert_eq!(listed.message, "Appointments Listed");
    assert_eq!(listed.appointments.len(), 2);
    assert_eq!(listed.appointments[0].start_time, at(9, 0));
    assert!(listed.appointments[0].booked);
    assert_eq!(listed.appointments[0].appointment_id, Some(booked.appointment_id));
    assert_eq!(listed.appointments[0].patient_id, Some(first.id));
    assert_eq!(listed.appointments[1].start_time, at(9, 15));
    assert!(!listed.appointments[1].booked);
}

#[tokio::test]
async fn test_book_outside_schedule_is_conflict() {
    let ctx = TestContext::new();
    ctx.doctor_with_window("Dr. Grey", (9, 0), (9, 30)).await;
    let patient = ctx.signup("Ann", "patient").await;

    let response = book(&ctx, "Dr. Grey", 9, 45, &patient.token).await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["message"], "slot not within schedule");
}

#[tokio::test]
async fn test_book_unknown_doctor_is_not_found() {
    let ctx = TestContext::new();
    ctx.doctor_with_window("Dr. Grey", (9, 0), (9, 30)).await;
    let patient = ctx.signup("Ann", "patient").await;

    let response = book(&ctx, "dr. grey", 9, 0, &patient.token).await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "not_found");
}

#[tokio::test]
async fn test_doctor_cannot_book() {
    let ctx = TestContext::new();
    let doctor = ctx.doctor_with_window("Dr. Grey", (9, 0), (9, 30)).await;

    let response = book(&ctx, "Dr. Grey", 9, 0, &doctor.token).await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert!(ctx.storage.appointments().await.is_empty());
}

#[tokio::test]
async fn test_book_in_the_past_is_bad_request() {
    let ctx = TestContext::new();
    ctx.doctor_with_window("Dr. Grey", (9, 0), (9, 30)).await;
    let patient = ctx.signup("Ann", "patient").await;

    let response = book(&ctx, "Dr. Grey", 6, 45, &patient.token).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancel_by_doctor_then_repeat() {
    let ctx = TestContext::new();
    let doctor = ctx.doctor_with_window("Dr. Grey", (9, 0), (9, 30)).await;
    let patient = ctx.signup("Ann", "patient").await;
    let booked = book(&ctx, "Dr. Grey", 9, 0, &patient.token)
        .await
        .json::<BookResponse>();

    let cancel = json!({ "appointmentid": booked.appointment_id, "token": doctor.token });

    let response = ctx.server.post("/cancel").json(&cancel).await;
    response.assert_status_ok();
    assert_eq!(response.json::<CancelResponse>().message, "Appointment cancelled");

    let stored = ctx.storage.appointments().await;
    assert!(!stored[0].active);

    let response = ctx.server.post("/cancel").json(&cancel).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["message"],
        format!("appointment id {} is already cancelled", booked.appointment_id)
    );
}

#[tokio::test]
async fn test_cancel_by_other_patient_is_forbidden() {
    let ctx = TestContext::new();
    ctx.doctor_with_window("Dr. Grey", (9, 0), (9, 30)).await;
    let owner = ctx.signup("Ann", "patient").await;
    let stranger = ctx.signup("Bob", "patient").await;
    let booked = book(&ctx, "Dr. Grey", 9, 0, &owner.token)
        .await
        .json::<BookResponse>();

    let response = ctx
        .server
        .post("/cancel")
        .json(&json!({ "appointmentid": booked.appointment_id, "token": stranger.token }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert!(ctx.storage.appointments().await[0].active);
}

#[tokio::test]
async fn test_cancel_unknown_appointment_is_not_found() {
    let ctx = TestContext::new();
    let patient = ctx.signup("Ann", "patient").await;

    let response = ctx
        .server
        .post("/cancel")
        .json(&json!({ "appointmentid": 404, "token": patient.token }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>()["message"],
        "appointment id 404 does not exist in database"
    );
}
