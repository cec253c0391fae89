//! Uniform JSON response envelope

use serde::{Deserialize, Serialize};

/// `{"status": "success", "data": ...}` or `{"status": "error", "message": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success { data: T },
    Error { message: String },
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let envelope = Envelope::success(json!({ "message": "Welcome" }));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "status": "success", "data": { "message": "Welcome" } })
        );
    }

    #[test]
    fn test_error_shape() {
        let envelope: Envelope<()> = Envelope::error("404 - Not Found");
        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"status":"error","message":"404 - Not Found"}"#
        );
    }
}
