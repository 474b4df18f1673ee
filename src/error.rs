use std::{error, fmt};

/// Everything that can destroy a [`crate::Session`]. Every variant is
/// fatal: the session routes it through `destroy` and never attempts
/// local recovery.
///
/// Hand-rolled rather than derive-macro generated, matching the handshake
/// error type this composes.
#[derive(Debug)]
pub enum SessionError {
    Handshake(noise::HandshakeError),
    Frame(wire::FrameError),
    /// The remote side completed the handshake without attaching a payload.
    MissingRemotePayload,
    RemotePayloadDecode(prost::DecodeError),
    /// More than 1024 sends were queued before the handshake completed.
    QueueOverflow,
    /// A session method was called from within one of its own callbacks.
    Reentrant,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionError::Handshake(e) => write!(f, "handshake failed: {}", e),
            SessionError::Frame(e) => write!(f, "frame decode failed: {}", e),
            SessionError::MissingRemotePayload => {
                write!(f, "remote completed the handshake without a payload")
            }
            SessionError::RemotePayloadDecode(e) => {
                write!(f, "remote handshake payload failed to decode: {}", e)
            }
            SessionError::QueueOverflow => {
                write!(f, "pending send queue exceeded its 1024 entry cap")
            }
            SessionError::Reentrant => write!(f, "session method invoked reentrantly"),
        }
    }
}

impl error::Error for SessionError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            SessionError::Handshake(e) => Some(e),
            SessionError::Frame(e) => Some(e),
            SessionError::RemotePayloadDecode(e) => Some(e),
            SessionError::MissingRemotePayload
            | SessionError::QueueOverflow
            | SessionError::Reentrant => None,
        }
    }
}

impl From<noise::HandshakeError> for SessionError {
    fn from(e: noise::HandshakeError) -> Self {
        SessionError::Handshake(e)
    }
}

impl From<wire::FrameError> for SessionError {
    fn from(e: wire::FrameError) -> Self {
        SessionError::Frame(e)
    }
}
