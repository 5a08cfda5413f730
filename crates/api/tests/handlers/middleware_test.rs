use axum::http::StatusCode;
use clinic_api::middleware::{auth, error_handling::map_error};
use clinic_core::{errors::ClinicError, models::account::Role};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};

use crate::test_utils::{wire, TestContext};

#[rstest]
#[case::not_found(ClinicError::NotFound("gone".into()), StatusCode::NOT_FOUND)]
#[case::validation(ClinicError::Validation("bad".into()), StatusCode::BAD_REQUEST)]
#[case::conflict(ClinicError::Conflict("taken".into()), StatusCode::CONFLICT)]
#[case::forbidden(ClinicError::Forbidden("no".into()), StatusCode::FORBIDDEN)]
#[case::database(ClinicError::Database(eyre::eyre!("pool closed")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: ClinicError, #[case] expected: StatusCode) {
    let response = map_error(error);

    assert_eq!(response.status(), expected);
}

#[rstest]
#[case::not_base64("not a token!")]
#[case::one_field("NDI")]
#[case::non_numeric_id("eHx1c2Vy")]
#[tokio::test]
async fn test_malformed_tokens_are_unauthorized(#[case] token: &str) {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/cancel")
        .json(&json!({ "appointmentid": 1, "token": token }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "unauthenticated");
}

#[rstest]
#[case::schedule("/schedule", json!({ "starttime": wire(9, 0), "endtime": wire(9, 30) }))]
#[case::book("/book", json!({ "doctorname": "Dr. Grey", "starttime": wire(9, 0) }))]
#[case::cancel("/cancel", json!({ "appointmentid": 1 }))]
#[tokio::test]
async fn test_unknown_role_in_token_is_bad_request(#[case] path: &str, #[case] body: Value) {
    let ctx = TestContext::new();
    let mut body = body;
    // "1|nurse"
    body["token"] = json!("MXxudXJzZQ");

    let response = ctx.server.post(path).json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "validation");
    assert_eq!(body["message"], "unknown usertype 'nurse'");
}

#[test]
fn test_role_in_token_is_case_insensitive() {
    // "5|Patient"
    let identity = auth::resolve_token("NXxQYXRpZW50").unwrap();

    assert_eq!(identity.subject_id, 5);
    assert_eq!(identity.role, Role::Patient);
}

#[tokio::test]
async fn test_signup_issues_resolvable_token() {
    let ctx = TestContext::new();

    let doctor = ctx.signup("Dr. Grey", "Doctor").await;
    let identity = auth::resolve_token(&doctor.token).unwrap();

    assert_eq!(identity.subject_id, doctor.id);
    assert_eq!(identity.role, Role::Doctor);
}

#[tokio::test]
async fn test_signup_rejects_unknown_usertype() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/signup")
        .json(&json!({ "name": "Eve", "usertype": "admin" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_twice_is_conflict() {
    let ctx = TestContext::new();
    ctx.signup("Dr. Grey", "doctor").await;

    let response = ctx
        .server
        .post("/signup")
        .json(&json!({ "name": "Dr. Grey", "usertype": "doctor" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["message"], "account already exists");
}

#[tokio::test]
async fn test_health_and_version() {
    let ctx = TestContext::new();

    let health = ctx.server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["status"], "ok");

    let version = ctx.server.get("/version").await;
    version.assert_status_ok();
    assert_eq!(version.json::<Value>()["name"], "clinic-api");
}
