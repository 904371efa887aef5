use super::*;
use crate::net::types::Role;
use crate::store::MemoryStorage;

// =============================================================================
// paths
// =============================================================================

#[test]
fn admin_user_paths() {
    assert_eq!(admin_user_path("42", None), "/admin/users/42");
    assert_eq!(admin_user_path("42", Some("toggle-status")), "/admin/users/42/toggle-status");
    assert_eq!(admin_user_path("42", Some("reset-password")), "/admin/users/42/reset-password");
}

#[test]
fn record_paths() {
    assert_eq!(record_path(Collection::Courses, None), "/courses");
    assert_eq!(record_path(Collection::Fees, Some("f-1")), "/fees/f-1");
    assert_eq!(record_path(Collection::Assignments, Some("7")), "/assignments/7");
}

// =============================================================================
// classify_login_response
// =============================================================================

#[test]
fn login_success_decodes_payload() {
    let body = r#"{
        "success": true,
        "data": {
            "token": "jwt-1",
            "user": { "uuid": "u-1", "user_id": "TCH-1", "email": "t@school.test",
                      "first_name": "Tia", "last_name": "Ng", "role": "teacher" }
        }
    }"#;
    let env = classify_login_response(200, body).unwrap();
    assert!(env.success);
    let data = env.data.unwrap();
    assert_eq!(data.token.as_deref(), Some("jwt-1"));
    let user = data.user.unwrap();
    assert_eq!(user.id, "u-1");
    assert_eq!(user.into_session_user("jwt-1").unwrap().role, Role::Teacher);
}

#[test]
fn login_success_with_unknown_role_still_decodes() {
    let body = r#"{"success":true,"data":{"token":"t","user":{"id":"1","email":"p@school.test","role":"principal"}}}"#;
    let user = classify_login_response(200, body).unwrap().data.unwrap().user.unwrap();
    assert_eq!(user.role, "principal");
}

#[test]
fn login_rejection_with_401_envelope_is_structured() {
    let body = r#"{"success":false,"message":"Invalid email or password"}"#;
    let env = classify_login_response(401, body).unwrap();
    assert!(!env.success);
    assert!(env.data.is_none());
    assert_eq!(env.message.as_deref(), Some("Invalid email or password"));
}

#[test]
fn login_rejection_with_200_envelope_is_structured() {
    let env = classify_login_response(200, r#"{"success":false}"#).unwrap();
    assert!(!env.success);
}

#[test]
fn login_server_error_without_envelope_is_error() {
    let err = classify_login_response(502, "<html>Bad Gateway</html>").unwrap_err();
    assert_eq!(err.status(), Some(502));
}

#[test]
fn login_error_status_with_success_true_is_error() {
    let err = classify_login_response(500, r#"{"success":true,"message":"weird"}"#).unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.server_message(), Some("weird"));
}

#[test]
fn login_garbled_success_body_is_parse_error() {
    let err = classify_login_response(200, "not json").unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

// =============================================================================
// parse_envelope_response / parse_json_response
// =============================================================================

#[test]
fn profile_401_is_unauthorized_error() {
    let err = parse_envelope_response::<ProfilePayload>(401, r#"{"success":false,"message":"jwt expired"}"#)
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.server_message(), Some("jwt expired"));
}

#[test]
fn profile_success_decodes() {
    let env = parse_envelope_response::<ProfilePayload>(
        200,
        r#"{"success":true,"data":{"user":{"id":"9","email":"a@b.com","role":"admin"}}}"#,
    )
    .unwrap();
    assert_eq!(env.data.unwrap().into_user().id, "9");
}

#[test]
fn json_response_empty_body_is_null() {
    assert_eq!(parse_json_response(204, "").unwrap(), Value::Null);
}

#[test]
fn json_response_non_2xx_uses_raw_body_when_not_json() {
    let err = parse_json_response(403, " Forbidden \n").unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Forbidden");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn json_response_passes_through_value() {
    let value = parse_json_response(200, r#"{"success":true,"data":[1,2]}"#).unwrap();
    assert_eq!(value["data"], serde_json::json!([1, 2]));
}

// =============================================================================
// client construction
// =============================================================================

#[test]
fn client_builds_from_config() {
    let tokens = TokenStore::new(MemoryStorage::new());
    let client = HttpApiClient::new(PortalConfig::default(), tokens).unwrap();
    assert_eq!(client.config().base_url, crate::config::DEFAULT_BASE_URL);
}

#[tokio::test]
async fn transport_failure_surfaces_without_status() {
    // Port 9 (discard) on localhost is not expected to accept HTTP.
    let config = PortalConfig {
        base_url: "http://127.0.0.1:9".to_owned(),
        request_timeout_secs: 2,
        connect_timeout_secs: 1,
    };
    let client = HttpApiClient::new(config, TokenStore::new(MemoryStorage::new())).unwrap();
    let err = client.get_profile().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), None);
}
