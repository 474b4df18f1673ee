use byteorder::{BigEndian, ByteOrder};
use snow::{Builder, HandshakeState};
use tracing::trace;

use crate::error::HandshakeError;

const PROTOCOL_NAME: &str = "Noise_XX_25519_ChaChaPoly_BLAKE2b";
const LENGTH_HEADER_SIZE: usize = 2;
const MAX_HANDSHAKE_MESSAGE: usize = u16::MAX as usize;

/// Which side of the three-act Noise_XX exchange this session plays.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    Initiator,
    Responder,
}

impl Role {
    fn is_initiator(self) -> bool {
        matches!(self, Role::Initiator)
    }
}

/// Construction-time options for a [`Handshake`]. Mirrors the workspace's
/// functional-options convention: every field defaults to "generate or
/// derive this for me".
#[derive(Default)]
pub struct HandshakeOptions {
    /// Reuse a previously generated static key pair instead of minting a
    /// fresh one. Key pairs may be shared across sessions; the handshake
    /// never mutates them.
    pub static_keypair: Option<snow::Keypair>,
}

/// The two halves of symmetric key material a completed handshake yields.
/// `tx` keys this side's outbound keystream, `rx` the inbound one; the two
/// peers' `tx`/`rx` are mirror images of each other by construction.
#[derive(Clone)]
pub struct Split {
    pub tx: [u8; 32],
    pub rx: [u8; 32],
}

/// Everything the orchestrator needs once the handshake finishes.
pub struct Completion {
    pub remote_payload: Vec<u8>,
    pub split: Split,
    /// Bytes received in the same chunk as the final handshake message that
    /// belong to the first post-handshake frame.
    pub overflow: Vec<u8>,
    pub remote_public_key: Vec<u8>,
}

/// Result of feeding bytes (or starting) the handshake: zero or one outbound
/// message to relay verbatim through the session's `send` handler, plus the
/// completion data once the third act lands.
#[derive(Default)]
pub struct Progress {
    pub outbound: Option<Vec<u8>>,
    pub completion: Option<Completion>,
}

/// Drives one side of a Noise_XX handshake over an opaque byte stream.
///
/// The handshake frames its own messages with a 2-byte big-endian length
/// prefix so that `recv` can be fed arbitrarily chunked bytes and still find
/// message boundaries; bytes past the final act are returned as `overflow`
/// rather than consumed.
pub struct Handshake {
    role: Role,
    state: HandshakeState,
    local_payload: Vec<u8>,
    local_public_key: Vec<u8>,
    recv_buf: Vec<u8>,
    tx_scratch: Vec<u8>,
    rx_scratch: Vec<u8>,
    did_receive_first: bool,
    complete: bool,
}

impl Handshake {
    pub fn new(
        role: Role,
        local_payload: Vec<u8>,
        options: HandshakeOptions,
    ) -> Result<Self, HandshakeError> {
        let builder: Builder<'_> = Builder::new(PROTOCOL_NAME.parse().expect("valid noise params"));
        let keypair = match options.static_keypair {
            Some(kp) => kp,
            None => builder.generate_keypair()?,
        };
        let builder = builder.local_private_key(&keypair.private);
        let state = if role.is_initiator() {
            builder.build_initiator()?
        } else {
            builder.build_responder()?
        };

        trace!(initiator = role.is_initiator(), "handshake constructed");

        Ok(Handshake {
            role,
            state,
            local_payload,
            local_public_key: keypair.public,
            recv_buf: Vec::new(),
            tx_scratch: vec![0u8; MAX_HANDSHAKE_MESSAGE],
            rx_scratch: vec![0u8; MAX_HANDSHAKE_MESSAGE],
            did_receive_first: false,
            complete: false,
        })
    }

    pub fn local_public_key(&self) -> &[u8] {
        &self.local_public_key
    }

    /// The initiator speaks first: produces the framed act-one message.
    /// The responder has nothing to send yet, so this returns `None`.
    pub fn start(&mut self) -> Result<Option<Vec<u8>>, HandshakeError> {
        if !self.role.is_initiator() {
            return Ok(None);
        }
        let len = self.state.write_message(&self.local_payload, &mut self.tx_scratch)?;
        Ok(Some(frame(&self.tx_scratch[..len])))
    }

    /// Feed inbound bytes (handshake wire bytes, not yet decrypted). Returns
    /// any outbound reply to relay and, once the third act has landed, the
    /// [`Completion`].
    pub fn recv(&mut self, bytes: &[u8]) -> Result<Progress, HandshakeError> {
        if self.complete {
            return Err(HandshakeError::AlreadyComplete);
        }
        self.recv_buf.extend_from_slice(bytes);

        if self.recv_buf.len() < LENGTH_HEADER_SIZE {
            return Ok(Progress::default());
        }
        let len = BigEndian::read_u16(&self.recv_buf[..LENGTH_HEADER_SIZE]) as usize;
        if len > MAX_HANDSHAKE_MESSAGE {
            return Err(HandshakeError::MessageTooLarge);
        }
        if self.recv_buf.len() < LENGTH_HEADER_SIZE + len {
            return Ok(Progress::default());
        }

        let message: Vec<u8> = self
            .recv_buf
            .drain(..LENGTH_HEADER_SIZE + len)
            .skip(LENGTH_HEADER_SIZE)
            .collect();
        let rx_len = self.state.read_message(&message, &mut self.rx_scratch)?;
        trace!(bytes = rx_len, "handshake message read");

        let mut outbound = None;
        if !self.role.is_initiator() && !self.did_receive_first {
            // Act one just landed; the responder answers immediately with act two.
            self.did_receive_first = true;
            let len = self.state.write_message(&self.local_payload, &mut self.tx_scratch)?;
            return Ok(Progress {
                outbound: Some(frame(&self.tx_scratch[..len])),
                completion: None,
            });
        }
        if self.role.is_initiator() {
            // Act two just landed; the initiator answers with the final act three.
            let len = self.state.write_message(&self.local_payload, &mut self.tx_scratch)?;
            outbound = Some(frame(&self.tx_scratch[..len]));
        }

        if !self.state.is_handshake_finished() {
            return Ok(Progress { outbound, completion: None });
        }

        let (a, b) = self.state.dangerously_get_raw_split();
        let split = if self.role.is_initiator() {
            Split { tx: a, rx: b }
        } else {
            Split { tx: b, rx: a }
        };
        let remote_public_key = self.state.get_remote_static().unwrap_or(&[]).to_vec();
        let remote_payload = self.rx_scratch[..rx_len].to_vec();
        let overflow = std::mem::take(&mut self.recv_buf);
        self.complete = true;

        trace!("handshake complete");
        Ok(Progress {
            outbound,
            completion: Some(Completion {
                remote_payload,
                split,
                overflow,
                remote_public_key,
            }),
        })
    }
}

fn frame(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(LENGTH_HEADER_SIZE + message.len());
    let mut header = [0u8; LENGTH_HEADER_SIZE];
    BigEndian::write_u16(&mut header, message.len() as u16);
    out.extend_from_slice(&header);
    out.extend_from_slice(message);
    out
}
