use std::{error, fmt, io};

/// Errors produced while driving the Noise_XX handshake.
///
/// Mirrors the hand-rolled error style used by the rest of this workspace's
/// handshake code rather than reaching for a derive-macro error crate.
#[derive(Debug)]
pub enum HandshakeError {
    /// The underlying Noise state machine rejected a message: bad MAC,
    /// malformed payload, or a message delivered out of pattern order.
    Crypto(snow::Error),
    /// A length-prefixed handshake message exceeded the maximum the core
    /// will buffer (64 KiB, the largest value a `u16` length prefix can
    /// describe).
    MessageTooLarge,
    /// `recv` was called again after the handshake already completed.
    AlreadyComplete,
    /// The local payload failed to encode.
    Io(io::Error),
}

impl error::Error for HandshakeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            HandshakeError::Crypto(e) => Some(e),
            HandshakeError::Io(e) => Some(e),
            HandshakeError::MessageTooLarge | HandshakeError::AlreadyComplete => None,
        }
    }
}

impl fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HandshakeError::Crypto(e) => write!(f, "noise handshake crypto error: {}", e),
            HandshakeError::MessageTooLarge => {
                write!(f, "handshake message exceeds the 64 KiB framing limit")
            }
            HandshakeError::AlreadyComplete => write!(f, "handshake already completed"),
            HandshakeError::Io(e) => write!(f, "handshake payload io error: {}", e),
        }
    }
}

impl From<snow::Error> for HandshakeError {
    fn from(e: snow::Error) -> Self {
        HandshakeError::Crypto(e)
    }
}

impl From<io::Error> for HandshakeError {
    fn from(e: io::Error) -> Self {
        HandshakeError::Io(e)
    }
}
