use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        /// Id of the already existing record, when the backend reports it
        existing_id: Option<i64>,
    },

    #[error("Invalid value for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Session expired or missing")]
    Unauthorized,

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Classify a non-success response from its status code and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let message = parsed
            .as_ref()
            .and_then(ErrorBody::message)
            .unwrap_or_else(|| fallback_message(status, body));

        match status {
            401 => ApiError::Unauthorized,
            409 => ApiError::Conflict {
                message,
                existing_id: parsed.as_ref().and_then(ErrorBody::existing_id),
            },
            400 | 422 => match parsed.as_ref().and_then(ErrorBody::first_field_error) {
                Some((field, field_message)) => ApiError::Validation {
                    field,
                    message: field_message,
                },
                None => ApiError::Status { status, message },
            },
            _ => ApiError::Status { status, message },
        }
    }
}

fn fallback_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() || body.len() > 200 {
        format!("request failed with status {status}")
    } else {
        body.to_string()
    }
}

/// Error bodies seen from the backend: `{ message, errors: { field: [..] } }`,
/// `{ detail: "..." }` or `{ detail: [{ loc: [.., field], msg }] }`.
#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    errors: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    student_id: Option<Value>,
    #[serde(default)]
    data: Option<Value>,
}

impl ErrorBody {
    fn message(&self) -> Option<String> {
        if let Some(m) = self.message.as_ref().or(self.error.as_ref()) {
            return Some(m.clone());
        }
        match &self.detail {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Array(items)) => items
                .first()
                .and_then(|item| item.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }

    fn first_field_error(&self) -> Option<(String, String)> {
        if let Some(Value::Object(map)) = &self.errors {
            if let Some((field, messages)) = map.iter().next() {
                let message = match messages {
                    Value::Array(list) => list.first().and_then(Value::as_str).unwrap_or_default(),
                    Value::String(s) => s.as_str(),
                    _ => "",
                };
                return Some((field.clone(), message.to_string()));
            }
        }

        if let Some(Value::Array(items)) = &self.detail {
            let item = items.first()?;
            let field = item
                .get("loc")
                .and_then(Value::as_array)
                .and_then(|loc| loc.last())
                .and_then(Value::as_str)?;
            let message = item.get("msg").and_then(Value::as_str).unwrap_or_default();
            return Some((field.to_string(), message.to_string()));
        }

        None
    }

    fn existing_id(&self) -> Option<i64> {
        let nested = self.data.as_ref().and_then(|d| d.get("id"));
        [self.id.as_ref(), self.student_id.as_ref(), nested]
            .into_iter()
            .flatten()
            .find_map(|v| match v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_carries_existing_id() {
        let err = ApiError::from_response(409, r#"{"message":"Student exists","data":{"id":"42"}}"#);
        match err {
            ApiError::Conflict { message, existing_id } => {
                assert_eq!(message, "Student exists");
                assert_eq!(existing_id, Some(42));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn laravel_style_validation_names_field() {
        let body = r#"{"message":"The given data was invalid.","errors":{"email":["The email has already been taken."]}}"#;
        match ApiError::from_response(422, body) {
            ApiError::Validation { field, message } => {
                assert_eq!(field, "email");
                assert_eq!(message, "The email has already been taken.");
            }
            other => panic!("expected validation, got {other:?}"),
        }
    }

    #[test]
    fn detail_list_validation_uses_last_loc_segment() {
        let body = r#"{"detail":[{"loc":["body","program_id"],"msg":"field required"}]}"#;
        match ApiError::from_response(422, body) {
            ApiError::Validation { field, message } => {
                assert_eq!(field, "program_id");
                assert_eq!(message, "field required");
            }
            other => panic!("expected validation, got {other:?}"),
        }
    }

    #[test]
    fn bad_request_without_fields_is_plain_status() {
        match ApiError::from_response(400, r#"{"detail":"Session closed"}"#) {
            ApiError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Session closed");
            }
            other => panic!("expected status, got {other:?}"),
        }
    }

    #[test]
    fn unauthorized_and_html_bodies() {
        assert!(matches!(ApiError::from_response(401, ""), ApiError::Unauthorized));

        let html = format!("<html>{}</html>", "x".repeat(300));
        match ApiError::from_response(502, &html) {
            ApiError::Status { message, .. } => {
                assert_eq!(message, "request failed with status 502");
            }
            other => panic!("expected status, got {other:?}"),
        }
    }
}
