//! Wire format of the extraction backend.
//!
//! Error bodies come in two shapes: `{"message": ..}` from hand-written
//! handlers and `{"detail": ..}` from the framework's own exceptions. Both
//! are understood; anything else falls back to a generic message carrying the
//! status code.

use crate::session::{Operation, Usage};
use serde::{Deserialize, Serialize};

/// `200` body of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub extracted_text: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of `POST /process`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryRequest<'a> {
    pub user_prompt: &'a str,
}

/// `200` body of `POST /process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub ai_response: String,
    pub model_used: String,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Turn a non-2xx answer into the message shown to the user.
///
/// * body is not JSON → `Server error: <code> <reason>`
/// * non-empty string `message` → that
/// * non-empty string `detail` → that
/// * otherwise → `Failed to upload file. Status: <code>` (or the query
///   equivalent)
pub fn error_message(operation: Operation, status: u16, reason: Option<&str>, body: &[u8]) -> String {
    let value: serde_json::Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => {
            return format!("Server error: {} {}", status, reason.unwrap_or(""))
                .trim_end()
                .to_string();
        }
    };

    let field = |key: &str| {
        value
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    field("message")
        .or_else(|| field("detail"))
        .unwrap_or_else(|| match operation {
            Operation::Upload => format!("Failed to upload file. Status: {status}"),
            Operation::Query => format!("Failed to process prompt. Status: {status}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_field_wins() {
        let body = br#"{"message":"Quota exhausted","detail":"ignored"}"#;
        assert_eq!(
            error_message(Operation::Query, 429, Some("Too Many Requests"), body),
            "Quota exhausted"
        );
    }

    #[test]
    fn only_empty_message_falls_through() {
        let body = br#"{"message":"  ","detail":"unused"}"#;
        assert_eq!(error_message(Operation::Query, 400, None, body), "  ");

        let body = br#"{"message":"","detail":"Bad prompt"}"#;
        assert_eq!(error_message(Operation::Query, 400, None, body), "Bad prompt");
    }

    #[test]
    fn detail_field_is_used_when_no_message() {
        let body = br#"{"detail":"Invalid file type. Please upload a PDF file."}"#;
        assert_eq!(
            error_message(Operation::Upload, 400, Some("Bad Request"), body),
            "Invalid file type. Please upload a PDF file."
        );
    }

    #[test]
    fn structured_detail_falls_back_to_generic() {
        let body = br#"{"detail":[{"loc":["body","user_prompt"],"msg":"field required"}]}"#;
        assert_eq!(
            error_message(Operation::Query, 422, None, body),
            "Failed to process prompt. Status: 422"
        );
    }

    #[test]
    fn empty_json_object_uses_generic_upload_message() {
        assert_eq!(
            error_message(Operation::Upload, 500, Some("Internal Server Error"), b"{}"),
            "Failed to upload file. Status: 500"
        );
    }

    #[test]
    fn non_json_body_reports_status_line() {
        assert_eq!(
            error_message(Operation::Upload, 502, Some("Bad Gateway"), b"<html>oops</html>"),
            "Server error: 502 Bad Gateway"
        );
        assert_eq!(
            error_message(Operation::Query, 599, None, b""),
            "Server error: 599"
        );
    }

    #[test]
    fn query_request_shape() {
        let json = serde_json::to_value(QueryRequest {
            user_prompt: "What is this?",
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "user_prompt": "What is this?" }));
    }

    #[test]
    fn upload_response_tolerates_minimal_body() {
        let r: UploadResponse = serde_json::from_str(r#"{"extracted_text":"Hello world"}"#).unwrap();
        assert_eq!(r.extracted_text, "Hello world");
        assert_eq!(r.filename, None);
    }

    #[test]
    fn query_response_with_usage() {
        let r: QueryResponse = serde_json::from_str(
            r#"{"ai_response":"It's a greeting.","model_used":"gpt-x",
                "usage":{"prompt_tokens":10,"completion_tokens":4,"total_tokens":14}}"#,
        )
        .unwrap();
        assert_eq!(r.usage.map(|u| u.total_tokens), Some(14));
    }
}
