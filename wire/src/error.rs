use std::fmt;

use crate::varint::VarintError;

/// Everything that can go wrong turning bytes into a [`crate::Frame`], or a
/// frame's schema-tagged body into a [`crate::Message`]. Every variant is
/// fatal to the connection: the decoder never recovers mid-stream from a
/// malformed frame, since doing so would require guessing where the next
/// one starts.
#[derive(Debug)]
pub enum FrameError {
    Varint(VarintError),
    FrameTooLarge { size: u64, max: u64 },
    EmptyFrameBody,
    HeaderDoesNotFitInBody,
    UnknownMessageType(u8),
    Schema(prost::DecodeError),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FrameError::Varint(err) => write!(f, "malformed varint: {}", err),
            FrameError::FrameTooLarge { size, max } => {
                write!(f, "frame of {} bytes exceeds the {} byte limit", size, max)
            }
            FrameError::EmptyFrameBody => write!(f, "frame body has zero length"),
            FrameError::HeaderDoesNotFitInBody => {
                write!(f, "declared frame body is too short to hold a complete header varint")
            }
            FrameError::UnknownMessageType(tag) => write!(f, "unknown message type {}", tag),
            FrameError::Schema(err) => write!(f, "failed to decode message body: {}", err),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::Varint(err) => Some(err),
            FrameError::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl From<VarintError> for FrameError {
    fn from(err: VarintError) -> Self {
        FrameError::Varint(err)
    }
}

impl From<prost::DecodeError> for FrameError {
    fn from(err: prost::DecodeError) -> Self {
        FrameError::Schema(err)
    }
}
