//! Tests for console error construction, mapping, and serialisation.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
fn invalid_request_constructor_sets_code() {
    let err = Error::invalid_request("bad");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(!err.requires_login());
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn new_substitutes_blank_messages() {
    let err = Error::upstream("");
    assert_eq!(err.message(), "backend reported an error");
}

#[rstest]
#[case(FetchError::network("connection refused"), ErrorCode::ServiceUnavailable)]
#[case(FetchError::auth(401_u16), ErrorCode::Unauthorized)]
#[case(FetchError::auth(403_u16), ErrorCode::Unauthorized)]
#[case(FetchError::server(500_u16, "database offline"), ErrorCode::UpstreamError)]
#[case(FetchError::decode("expected value"), ErrorCode::UpstreamError)]
#[case(FetchError::invalid_request("path must start with '/'"), ErrorCode::InternalError)]
fn fetch_errors_map_to_codes(#[case] source: FetchError, #[case] expected: ErrorCode) {
    assert_eq!(Error::from(source).code(), expected);
}

#[rstest]
fn server_errors_keep_backend_message_and_status() {
    let err = Error::from(FetchError::server(409_u16, "Facility already approved"));
    assert_eq!(err.message(), "Facility already approved");
    assert_eq!(err.details(), Some(&json!({ "status": 409 })));
}

#[rstest]
fn auth_errors_require_login() {
    assert!(Error::from(FetchError::auth(401_u16)).requires_login());
}

#[rstest]
fn serialises_with_snake_case_code() {
    let err = Error::service_unavailable("backend unreachable");
    let value = serde_json::to_value(&err).expect("serialise");
    assert_eq!(
        value,
        json!({ "code": "service_unavailable", "message": "backend unreachable" })
    );
}

#[rstest]
fn deserialisation_rejects_blank_messages() {
    let result = serde_json::from_value::<Error>(json!({
        "code": "internal_error",
        "message": "  "
    }));
    assert!(result.is_err());
}
