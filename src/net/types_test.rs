use super::*;
use serde_json::json;

fn admin(id: &str) -> serde_json::Value {
    json!({ "id": id, "email": format!("{id}@turf.test"), "name": id, "role": "staff" })
}

#[test]
fn session_payload_prefers_user_then_admin() {
    let both: SessionPayload = serde_json::from_value(json!({ "user": admin("u"), "admin": admin("a") })).unwrap();
    assert_eq!(both.into_user().unwrap().id, "u");

    let admin_only: SessionPayload = serde_json::from_value(json!({ "admin": admin("a") })).unwrap();
    assert_eq!(admin_only.into_user().unwrap().id, "a");

    let neither: SessionPayload = serde_json::from_value(json!({})).unwrap();
    assert!(neither.into_user().is_none());
}

#[test]
fn login_request_serializes_email_and_password() {
    let body = serde_json::to_value(LoginRequest { email: "a@b.com", password: "pw" }).unwrap();
    assert_eq!(body, json!({ "email": "a@b.com", "password": "pw" }));
}

#[test]
fn error_payload_prefers_error_over_message() {
    let payload: ErrorPayload = serde_json::from_value(json!({ "error": "Invalid credentials", "message": "x" })).unwrap();
    assert_eq!(payload.into_message().as_deref(), Some("Invalid credentials"));
}

#[test]
fn error_payload_skips_empty_fields() {
    let payload: ErrorPayload = serde_json::from_value(json!({ "error": "", "message": "Account locked" })).unwrap();
    assert_eq!(payload.into_message().as_deref(), Some("Account locked"));

    let empty: ErrorPayload = serde_json::from_value(json!({ "status": 401 })).unwrap();
    assert_eq!(empty.into_message(), None);
}
