//! Error classification logic

/// Map an HTTP status from the narrative backend to a stable error class.
pub(crate) fn error_class_for_status(status: u16) -> &'static str {
    match status {
        400 | 422 => "invalid_request",
        401 => "authentication",
        403 => "permission_denied",
        404 => "not_found",
        408 | 504 => "timeout",
        409 => "conflict",
        413 => "request_too_large",
        429 => "rate_limited",
        503 => "overloaded",
        500..=599 => "server_error",
        _ => "unknown",
    }
}

/// Whether a failure is worth trying again later with the same input.
///
/// Client errors will fail again for the same fingerprint; server-side and
/// transport trouble may not.
pub(crate) fn is_transient_error_class(error_class: &str) -> bool {
    match error_class {
        "rate_limited" | "overloaded" | "server_error" | "timeout" | "conflict" | "transport" => {
            true
        }
        "invalid_request" | "authentication" | "permission_denied" | "not_found"
        | "request_too_large" | "invalid_response" => false,
        _ => false,
    }
}
