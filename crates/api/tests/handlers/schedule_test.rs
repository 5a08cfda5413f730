use axum::http::StatusCode;
use clinic_core::models::schedule::AddScheduleResponse;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};

use crate::test_utils::{wire, TestContext};

#[tokio::test]
async fn test_doctor_creates_schedule() {
    let ctx = TestContext::new();
    let doctor = ctx.signup("Dr. Grey", "doctor").await;

    let response = ctx
        .server
        .post("/schedule")
        .json(&json!({
            "starttime": wire(9, 0),
            "endtime": wire(9, 30),
            "token": doctor.token,
        }))
        .await;

    response.assert_status_ok();
    let body = response.json::<AddScheduleResponse>();
    assert_eq!(body.message, "Schedule created");

    let windows = ctx.storage.windows().await;
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].doctor_id, doctor.id);
}

#[tokio::test]
async fn test_patient_cannot_create_schedule() {
    let ctx = TestContext::new();
    let patient = ctx.signup("Ann", "patient").await;

    let response = ctx
        .server
        .post("/schedule")
        .json(&json!({
            "starttime": wire(9, 0),
            "endtime": wire(9, 30),
            "token": patient.token,
        }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert!(ctx.storage.windows().await.is_empty());
}

#[tokio::test]
async fn test_overlapping_schedule_is_conflict() {
    let ctx = TestContext::new();
    let doctor = ctx.doctor_with_window("Dr. Grey", (9, 0), (10, 0)).await;

    let response = ctx
        .server
        .post("/schedule")
        .json(&json!({
            "starttime": wire(9, 30),
            "endtime": wire(10, 30),
            "token": doctor.token,
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], "schedule overlaps with existing schedule");
}

#[rstest]
#[case::unaligned(wire(9, 10), wire(9, 30))]
#[case::reversed(wire(10, 0), wire(9, 0))]
#[case::in_the_past(wire(6, 0), wire(6, 30))]
#[case::tomorrow("2024-05-07 09:00:00".to_string(), "2024-05-07 09:30:00".to_string())]
#[tokio::test]
async fn test_invalid_schedule_is_bad_request(#[case] start: String, #[case] end: String) {
    let ctx = TestContext::new();
    let doctor = ctx.signup("Dr. Grey", "doctor").await;

    let response = ctx
        .server
        .post("/schedule")
        .json(&json!({ "starttime": start, "endtime": end, "token": doctor.token }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_garbled_token_is_unauthorized() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/schedule")
        .json(&json!({
            "starttime": wire(9, 0),
            "endtime": wire(9, 30),
            "token": "%%%",
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}
