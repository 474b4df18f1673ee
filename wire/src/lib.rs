#![forbid(unsafe_code)]

//! Components C3 and C4: length-prefixed channel framing and the typed
//! message schemas it carries.
//!
//! A frame on the wire is `varint(len) || varint(header) || payload`, where
//! `header = channel << 4 | type`. [`Decoder`] turns an arbitrarily chunked
//! byte stream into a sequence of [`Frame`]s; [`encode`] does the reverse
//! for a single frame. `payload` is a hand-written `prost::Message` struct
//! per [`MessageType`], except type 15 (`Extension`), whose payload is
//! opaque to this crate.

mod decoder;
mod error;
mod message;
mod schema;
mod types;
mod varint;

pub use decoder::{encode, Decoder, Frame, DEFAULT_MAX_FRAME_SIZE};
pub use error::FrameError;
pub use message::Message;
pub use schema::{Cancel, Close, Data, DataNode, Have, Open, Options, Request, Status, Unhave, Unwant, Want};
pub use types::{decode_header, encode_header, Channel, MessageType};

/// Encodes an extension id as the varint that opens a type-15 frame's body.
pub fn encode_extension_id(id: u64) -> Vec<u8> {
    varint::encode(id)
}

/// Splits a type-15 frame's body into its leading extension id and the
/// opaque payload bytes that follow it.
pub fn decode_extension_id(body: &[u8]) -> Result<(u64, &[u8]), FrameError> {
    match varint::decode(body)? {
        Some((id, consumed)) => Ok((id, &body[consumed..])),
        None => Err(FrameError::EmptyFrameBody),
    }
}
