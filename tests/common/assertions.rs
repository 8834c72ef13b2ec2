//! Custom assertion macros
//!
//! Shorthands for the JSON error body every failing endpoint returns.

/// Assert that a response body is the standard error body
///
/// ```ignore
/// assert_error_body!(body, 404, "E001");
/// ```
#[macro_export]
macro_rules! assert_error_body {
    ($body:expr, $status:expr, $code:expr) => {{
        let body: &serde_json::Value = &$body;
        assert_eq!(body["status"], $status, "unexpected status in {}", body);
        assert_eq!(body["errorCode"], $code, "unexpected errorCode in {}", body);
        assert!(body["timestamp"].is_string(), "missing timestamp in {}", body);
        assert!(body["error"].is_string(), "missing error in {}", body);
        assert!(body["message"].is_string(), "missing message in {}", body);
    }};
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}
