//! Tokio codec for newline-delimited JSON frames.
//!
//! Each frame is one JSON document followed by `\n`. The codec is generic
//! over the decoded type so the same framing serves both ends of a
//! connection:
//!
//! ```text
//! server: Framed<TcpStream, JsonLinesCodec<WireRequest>>   sends WireResponse
//! client: Framed<TcpStream, JsonLinesCodec<WireResponse>>  sends WireRequest
//! ```
//!
//! # Malformed frames
//!
//! A line that is not valid JSON for the decoded type does not end the
//! stream. It is yielded as `Err(serde_json::Error)` inside the item so the
//! peer can be answered and the next line read. Oversized frames and I/O
//! failures are fatal and surface as [`CodecError`].
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use tokio_util::codec::{Decoder, Encoder};
//! use posbridge_protocol::{JsonLinesCodec, Request, WireRequest};
//!
//! let mut codec = JsonLinesCodec::<WireRequest>::new();
//! let mut buffer = BytesMut::new();
//!
//! codec
//!     .encode(WireRequest::new(1, Request::new("getDeviceStatus")), &mut buffer)
//!     .unwrap();
//!
//! let decoded = codec.decode(&mut buffer).unwrap().unwrap().unwrap();
//! assert_eq!(decoded.method, "getDeviceStatus");
//! ```

use bytes::BytesMut;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

/// Default maximum frame size in bytes (64 KiB), excluding the newline.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// Fatal framing errors.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Frame too large (max {max_size} bytes)")]
    FrameTooLarge { max_size: usize },

    #[error("Failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One decoded line: the value, or the parse error for a malformed line.
pub type DecodedFrame<D> = std::result::Result<D, serde_json::Error>;

/// Newline-delimited JSON codec.
///
/// Line splitting and the length limit are [`LinesCodec`]'s; this layer adds
/// the JSON step.
#[derive(Debug)]
pub struct JsonLinesCodec<D> {
    lines: LinesCodec,
    _decoded: PhantomData<fn() -> D>,
}

impl<D> JsonLinesCodec<D> {
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_frame_size),
            _decoded: PhantomData,
        }
    }

    pub fn max_frame_size(&self) -> usize {
        self.lines.max_length()
    }

    fn framing_error(&self, error: LinesCodecError) -> CodecError {
        match error {
            LinesCodecError::MaxLineLengthExceeded => CodecError::FrameTooLarge {
                max_size: self.max_frame_size(),
            },
            LinesCodecError::Io(e) => CodecError::Io(e),
        }
    }
}

impl<D> Default for JsonLinesCodec<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DeserializeOwned> Decoder for JsonLinesCodec<D> {
    type Item = DecodedFrame<D>;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let line = match self.lines.decode(src) {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(None),
                Err(e) => return Err(self.framing_error(e)),
            };
            // Blank lines carry nothing
            if let Some(frame) = parse_line(&line) {
                return Ok(Some(frame));
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let line = match self.lines.decode_eof(src) {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(None),
                Err(e) => return Err(self.framing_error(e)),
            };
            if let Some(frame) = parse_line(&line) {
                return Ok(Some(frame));
            }
        }
    }
}

impl<D, E: Serialize> Encoder<E> for JsonLinesCodec<D> {
    type Error = CodecError;

    fn encode(&mut self, item: E, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_string(&item)?;

        if json.len() > self.max_frame_size() {
            return Err(CodecError::FrameTooLarge {
                max_size: self.max_frame_size(),
            });
        }

        self.lines
            .encode(json, dst)
            .map_err(|e| self.framing_error(e))
    }
}

fn parse_line<D: DeserializeOwned>(line: &str) -> Option<DecodedFrame<D>> {
    let body = line.trim();
    if body.is_empty() {
        return None;
    }
    Some(serde_json::from_str(body))
}
