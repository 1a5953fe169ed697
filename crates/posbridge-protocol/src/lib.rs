//! RPC vocabulary of the POS bridge: method names, request and response
//! values, success payloads, argument extraction and the JSON-lines codec.

pub mod args;
pub mod codec;
pub mod commands;
pub mod message;
pub mod payloads;
pub mod receipt;
pub mod wire;

pub use codec::{CodecError, DecodedFrame, JsonLinesCodec};
pub use commands::{Method, Precondition};
pub use message::{Payload, Request, Response, to_payload};
pub use payloads::{
    Ack, DeviceInfoReport, Initialized, Opened, PrinterStatusReport, QrPrinted, ReceiptPrinted,
    ScanOutcome,
};
pub use receipt::{ReceiptData, ReceiptItem, Scalar};
pub use wire::{WireRequest, WireResponse};
