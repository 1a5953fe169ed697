//! Request and response values exchanged at the RPC boundary.

use posbridge_core::{Error, ErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named-field mapping used for arguments and success payloads.
pub type Payload = serde_json::Map<String, Value>;

/// A named command with its argument bag.
///
/// The method is kept as the raw name so unknown commands can still be
/// answered with [`Response::NotImplemented`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub args: Payload,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            args: Payload::new(),
        }
    }

    /// Add an argument, replacing any previous value under the same key.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// The single outcome of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Success { payload: Payload },
    Error { code: ErrorCode, message: String },
    NotImplemented,
}

impl Response {
    /// Build a success response from any serializable payload struct.
    pub fn success<T: Serialize>(payload: &T) -> Self {
        Response::Success {
            payload: to_payload(payload),
        }
    }

    pub fn error(error: &Error) -> Self {
        Response::Error {
            code: error.code(),
            message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    /// Success payload, if any.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Response::Success { payload } => Some(payload),
            _ => None,
        }
    }

    /// Error code, if this is an error response.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Response::Error { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Look up a field of the success payload.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload().and_then(|p| p.get(key))
    }
}

impl From<Error> for Response {
    fn from(error: Error) -> Self {
        Response::error(&error)
    }
}

impl<T: Serialize> From<posbridge_core::Result<T>> for Response {
    fn from(result: posbridge_core::Result<T>) -> Self {
        match result {
            Ok(payload) => Response::success(&payload),
            Err(e) => Response::error(&e),
        }
    }
}

/// Serialize a payload struct into a field map.
///
/// Payload structs are plain records of strings, numbers and booleans, so
/// anything that is not an object maps to an empty payload.
pub fn to_payload<T: Serialize>(value: &T) -> Payload {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Payload::new(),
    }
}
