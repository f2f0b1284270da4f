use pretty_assertions::assert_eq;
use tabshot_engine::{CaptureResult, MenuItem, WireRequest, ERROR_DETAIL_LIMIT};

#[test]
fn capture_request_round_trips() {
    let json = r#"{"action":"captureScreenshot","filename":"login-page"}"#;
    let request: WireRequest = serde_json::from_str(json).unwrap();
    assert_eq!(
        request,
        WireRequest::CaptureScreenshot {
            filename: "login-page".to_string()
        }
    );
    assert_eq!(serde_json::to_string(&request).unwrap(), json);
}

#[test]
fn unknown_actions_are_rejected() {
    let json = r#"{"action":"formatDisk","filename":"x"}"#;
    assert!(serde_json::from_str::<WireRequest>(json).is_err());
}

#[test]
fn success_response_omits_error_fields() {
    let json = serde_json::to_string(&CaptureResult::ok()).unwrap();
    assert_eq!(json, r#"{"success":true}"#);
}

#[test]
fn failure_response_uses_wire_field_names() {
    let result = CaptureResult::fail_with_details("boom", "trace");
    let json = serde_json::to_string(&result).unwrap();
    assert_eq!(
        json,
        r#"{"success":false,"error":"boom","errorDetails":"trace"}"#
    );
}

#[test]
fn error_details_are_truncated() {
    let long = "x".repeat(ERROR_DETAIL_LIMIT * 2);
    let result = CaptureResult::fail_with_details("boom", &long);
    assert_eq!(
        result.error_details.unwrap().chars().count(),
        ERROR_DETAIL_LIMIT
    );
}

#[test]
fn menu_items_map_ids_to_urls() {
    for item in MenuItem::ALL {
        assert_eq!(MenuItem::from_id(item.id()), Some(item));
        assert!(item.url().starts_with("https://"));
    }
    assert_eq!(MenuItem::from_id("unknown"), None);
}
