use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::ClientError;

pub(crate) fn is_json_content(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

/// Human-readable message for a failed response.
///
/// JSON bodies contribute their `detail` (or `message`) field, other bodies
/// their raw text, and a generic status line is used when neither yields
/// anything.
pub(crate) fn error_message(status: StatusCode, is_json: bool, body: &str) -> String {
    let fallback = || format!("Request failed with status {}", status.as_u16());

    if is_json {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            return message_from_json(&value).unwrap_or_else(fallback);
        }
    }

    let text = body.trim();
    if text.is_empty() {
        fallback()
    } else {
        text.to_string()
    }
}

fn message_from_json(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => non_empty(text),
        Value::Object(map) => match map.get("detail") {
            Some(Value::String(detail)) => non_empty(detail),
            // FastAPI validation errors: [{"loc": [...], "msg": "...", ...}]
            Some(Value::Array(items)) if !items.is_empty() => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if messages.is_empty() {
                    Some(Value::Array(items.clone()).to_string())
                } else {
                    Some(messages.join("; "))
                }
            }
            Some(Value::Null) | None => map
                .get("message")
                .and_then(Value::as_str)
                .and_then(non_empty),
            Some(other) => Some(other.to_string()),
        },
        _ => None,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Text handed to the notifier for a failed call.
pub(crate) fn notification_text(error: &ClientError) -> String {
    match error {
        ClientError::Http { message, .. } => format!("API Error: {message}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn detects_json_content_type_with_parameters() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("Application/JSON; charset=utf-8"),
        );
        assert!(is_json_content(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        assert!(!is_json_content(&headers));
        assert!(!is_json_content(&HeaderMap::new()));
    }

    #[test]
    fn prefers_detail_field() {
        let body = r#"{"detail": "Incorrect credentials", "message": "ignored"}"#;
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, true, body),
            "Incorrect credentials"
        );
    }

    #[test]
    fn falls_back_to_message_field() {
        let body = r#"{"message": "Quota exceeded"}"#;
        assert_eq!(
            error_message(StatusCode::TOO_MANY_REQUESTS, true, body),
            "Quota exceeded"
        );
    }

    #[test]
    fn joins_validation_errors() {
        let body = r#"{"detail": [
            {"loc": ["body", "email"], "msg": "value is not a valid email address"},
            {"loc": ["body", "password"], "msg": "ensure this value has at least 8 characters"}
        ]}"#;
        assert_eq!(
            error_message(StatusCode::UNPROCESSABLE_ENTITY, true, body),
            "value is not a valid email address; ensure this value has at least 8 characters"
        );
    }

    #[test]
    fn non_string_detail_is_rendered_as_json() {
        let body = r#"{"detail": {"code": 42}}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, true, body),
            r#"{"code":42}"#
        );
    }

    #[test]
    fn json_without_message_uses_status_line() {
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, true, r#"{"error": true}"#),
            "Request failed with status 403"
        );
    }

    #[test]
    fn text_body_is_used_verbatim() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, false, "  upstream down \n"),
            "upstream down"
        );
    }

    #[test]
    fn mislabelled_json_falls_back_to_text() {
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, true, "Internal Server Error"),
            "Internal Server Error"
        );
    }

    #[test]
    fn empty_body_uses_status_line() {
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, false, ""),
            "Request failed with status 404"
        );
    }

    #[test]
    fn http_notifications_are_prefixed() {
        let err = ClientError::Http {
            status: StatusCode::UNAUTHORIZED,
            message: "Incorrect credentials".to_string(),
        };
        assert_eq!(notification_text(&err), "API Error: Incorrect credentials");
        assert_eq!(err.to_string(), "Incorrect credentials");

        let err = ClientError::Transport("connection refused".to_string());
        assert_eq!(notification_text(&err), "connection refused");
    }
}
