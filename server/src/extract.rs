use axum::{body::Bytes, extract::FromRequest};
use platform_api::{ApiError, ApiResult};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// `axum::Json` with rejections mapped onto the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Parse a body that may legitimately be empty.
pub fn optional_json<T>(bytes: &Bytes) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(bytes)
        .map_err(|err| ApiError::validation(format!("invalid JSON body: {err}")))
}

/// Accept a caller-defined key/value object; `null` counts as absent.
pub fn optional_object(value: Option<Value>, field: &str) -> ApiResult<Option<Map<String, Value>>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(ApiError::validation(format!(
            "{field} must be a JSON object"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Toggle {
        completed: Option<bool>,
    }

    #[test]
    fn empty_body_uses_default() {
        let parsed: Toggle = optional_json(&Bytes::from_static(b"  ")).unwrap();
        assert!(parsed.completed.is_none());
        let parsed: Toggle = optional_json(&Bytes::from_static(b"{\"completed\":true}")).unwrap();
        assert_eq!(parsed.completed, Some(true));
        assert!(optional_json::<Toggle>(&Bytes::from_static(b"{oops")).is_err());
    }

    #[test]
    fn objects_only() {
        assert!(optional_object(Some(json!({"a": 1})), "ratings").unwrap().is_some());
        assert!(optional_object(Some(Value::Null), "ratings").unwrap().is_none());
        let err = optional_object(Some(json!([1, 2])), "ratings").unwrap_err();
        assert_eq!(err.to_string(), "ratings must be a JSON object");
    }
}
