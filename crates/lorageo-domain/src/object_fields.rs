use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{Bssid, WifiAccessPoint};

/// Failure while reading a configured field from the device-decoded object.
///
/// These never fail the uplink; the orchestrator logs them and treats the
/// field as absent.
#[derive(Debug, Error)]
pub enum ObjectFieldError {
    #[error("invalid object json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field {field}: expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("field {field}: base64 decode error: {source}")]
    Base64 {
        field: String,
        #[source]
        source: base64::DecodeError,
    },
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decodes the named object field as a base64 binary payload.
///
/// An empty object string or a missing field yields an empty payload; a
/// present field must be a base64 string.
pub fn gnss_payload(field: &str, object_json: &str) -> Result<Vec<u8>, ObjectFieldError> {
    if object_json.is_empty() {
        return Ok(Vec::new());
    }

    let object: Map<String, Value> = serde_json::from_str(object_json)?;
    let Some(value) = object.get(field) else {
        return Ok(Vec::new());
    };

    let Value::String(encoded) = value else {
        return Err(ObjectFieldError::TypeMismatch {
            field: field.to_string(),
            expected: "string",
            got: json_type_name(value),
        });
    };

    STANDARD
        .decode(encoded)
        .map_err(|source| ObjectFieldError::Base64 {
            field: field.to_string(),
            source,
        })
}

/// Decodes the named object field as a list of WiFi access points, in JSON
/// order. Each entry must carry a base64 `macAddress` and a numeric
/// `signalStrength`.
pub fn wifi_access_points(
    field: &str,
    object_json: &str,
) -> Result<Vec<WifiAccessPoint>, ObjectFieldError> {
    if object_json.is_empty() {
        return Ok(Vec::new());
    }

    let object: Map<String, Value> = serde_json::from_str(object_json)?;
    let Some(value) = object.get(field) else {
        return Ok(Vec::new());
    };

    let Value::Array(entries) = value else {
        return Err(ObjectFieldError::TypeMismatch {
            field: field.to_string(),
            expected: "array of objects",
            got: json_type_name(value),
        });
    };

    let mut out = Vec::with_capacity(entries.len());

    for entry in entries {
        let Value::Object(ap) = entry else {
            return Err(ObjectFieldError::TypeMismatch {
                field: field.to_string(),
                expected: "object",
                got: json_type_name(entry),
            });
        };

        let mac_value = ap.get("macAddress").unwrap_or(&Value::Null);
        let Value::String(mac) = mac_value else {
            return Err(ObjectFieldError::TypeMismatch {
                field: "macAddress".to_string(),
                expected: "string",
                got: json_type_name(mac_value),
            });
        };
        let mac_bytes = STANDARD
            .decode(mac)
            .map_err(|source| ObjectFieldError::Base64 {
                field: "macAddress".to_string(),
                source,
            })?;

        let strength_value = ap.get("signalStrength").unwrap_or(&Value::Null);
        let Some(signal_strength) = strength_value.as_f64() else {
            return Err(ObjectFieldError::TypeMismatch {
                field: "signalStrength".to_string(),
                expected: "number",
                got: json_type_name(strength_value),
            });
        };

        out.push(WifiAccessPoint {
            mac_address: Bssid::from_slice(&mac_bytes),
            signal_strength: signal_strength as i32,
        });
    }

    Ok(out)
}
