//! Decoding of raw responses and classification of service reported errors.
use log::trace;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{Error, Result};

/// Code used when the service reports an error without one.
pub const DEFAULT_ERROR_CODE: i64 = -1;

/// Decode `body`, failing if it is not structured data or if it reports an error.
///
/// The HTTP status plays no part in the classification; it is only carried along for
/// diagnostics.
pub fn dispatch(url: &str, status: StatusCode, body: &str) -> Result<Value> {
    trace!("Received {status} from {url} ({} bytes)", body.len());
    let value = match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) | Err(_) => {
            return Err(Error::InvalidResult {
                status,
                body: body.to_string(),
                url: url.to_string(),
            })
        }
        Ok(v) => v,
    };
    if let Some(message) = value.get("message").filter(|m| !m.is_null()) {
        return Err(Error::ServiceError {
            message: text(message),
            code: value.get("code").map_or(DEFAULT_ERROR_CODE, integer),
            status,
            body: body.to_string(),
            url: url.to_string(),
        });
    }
    Ok(value)
}

/// Return `field` of `value` if it has one, otherwise `value` itself.
///
/// Some services wrap scalars in an object, others return them bare.
pub fn field_or_whole(value: &Value, field: &str) -> String {
    match value.get(field) {
        Some(v) if !v.is_null() => text(v),
        _ => text(value),
    }
}

pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        v => v.to_string(),
    }
}

pub(crate) fn integer(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .unwrap_or(DEFAULT_ERROR_CODE)
}
