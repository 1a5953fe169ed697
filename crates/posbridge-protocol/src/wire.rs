//! Envelope types for the JSON-lines transport.
//!
//! A request line is `{"id": 7, "method": "printText", "args": {...}}`. The
//! matching response line repeats the id next to the flattened [`Response`]:
//! `{"id": 7, "status": "success", "payload": {...}}`.

use crate::message::{Payload, Request, Response};
use serde::{Deserialize, Serialize};

/// Request envelope read from a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRequest {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub args: Payload,
}

impl WireRequest {
    pub fn new(id: u64, request: Request) -> Self {
        Self {
            id,
            method: request.method,
            args: request.args,
        }
    }

    pub fn into_request(self) -> (u64, Request) {
        (
            self.id,
            Request {
                method: self.method,
                args: self.args,
            },
        )
    }
}

/// Response envelope written back, tagged with the request id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireResponse {
    pub id: u64,
    #[serde(flatten)]
    pub response: Response,
}

impl WireResponse {
    pub fn new(id: u64, response: Response) -> Self {
        Self { id, response }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posbridge_core::Error;
    use serde_json::json;

    #[test]
    fn test_request_envelope() {
        let wire: WireRequest = serde_json::from_value(json!({
            "id": 3,
            "method": "printText",
            "args": {"text": "Hello"}
        }))
        .unwrap();

        let (id, request) = wire.into_request();
        assert_eq!(id, 3);
        assert_eq!(request.method, "printText");
        assert_eq!(request.args["text"], "Hello");
    }

    #[test]
    fn test_response_envelope_is_flat() {
        let wire = WireResponse::new(9, Response::from(Error::NotInitialized));
        assert_eq!(
            serde_json::to_value(&wire).unwrap(),
            json!({
                "id": 9,
                "status": "error",
                "code": "DEVICE_NOT_INITIALIZED",
                "message": "Device must be initialized first"
            })
        );
    }

    #[test]
    fn test_response_envelope_parses_back() {
        let line = r#"{"id":1,"status":"success","payload":{"success":true,"message":"Device opened"}}"#;
        let wire: WireResponse = serde_json::from_str(line).unwrap();
        assert_eq!(wire.id, 1);
        assert!(wire.response.is_success());
        assert_eq!(wire.response.field("message").unwrap(), "Device opened");
    }
}
