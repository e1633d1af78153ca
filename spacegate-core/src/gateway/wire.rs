//! JSON bodies exchanged with gateway clients

use crate::core_space::DataError;
use serde::{Deserialize, Serialize};

/// Success envelope: `{ "data": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Error body: `{ "message": ..., "info": { "prisma": bool, "code"?: ... } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub info: ErrorInfo,
}

/// Machine-readable part of an error body
///
/// The `prisma` key is kept on the wire so existing clients keep branching
/// on it; here it means "this failure came from the data layer".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(rename = "prisma")]
    pub data_layer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl ErrorBody {
    /// Body for a classified data-layer failure
    pub fn data(err: &DataError) -> Self {
        Self {
            message: err.message.clone(),
            info: ErrorInfo {
                data_layer: true,
                code: Some(err.code().to_string()),
                target: err.target.clone(),
            },
        }
    }

    /// Body for any failure outside the data layer
    pub fn plain(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            info: ErrorInfo {
                data_layer: false,
                code: None,
                target: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_space::DataErrorKind;
    use serde_json::json;

    #[test]
    fn test_data_error_body_shape() {
        let err = DataError::new(DataErrorKind::Uniqueness, "UNIQUE constraint failed: spaces.slug")
            .with_target("slug");
        let body = serde_json::to_value(ErrorBody::data(&err)).unwrap();

        assert_eq!(
            body,
            json!({
                "message": "UNIQUE constraint failed: spaces.slug",
                "info": { "prisma": true, "code": "P2002", "target": "slug" }
            })
        );
    }

    #[test]
    fn test_plain_body_has_no_code() {
        let body = serde_json::to_value(ErrorBody::plain("unauthorized")).unwrap();
        assert_eq!(body, json!({ "message": "unauthorized", "info": { "prisma": false } }));
    }

    #[test]
    fn test_parse_minimal_body() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"x","info":{"prisma":true,"code":"P2004"}}"#)
                .unwrap();
        assert!(body.info.data_layer);
        assert_eq!(body.info.code.as_deref(), Some("P2004"));
        assert_eq!(body.info.target, None);
    }
}
