use std::convert::TryInto;

use keystream::Keystream;
use noise::{Handshake, HandshakeOptions, NoisePayload, Role, Split};
use rand::RngCore;
use tracing::{trace, warn};
use wire::{
    Cancel, Channel, Close, Data, Decoder, Have, Message, Open, Options, Request, Status, Unhave,
    Unwant, Want,
};

use crate::capability::derive_capability;
use crate::error::SessionError;
use crate::handlers::SessionHandlers;
use crate::pending::PendingQueue;

/// Construction-time knobs for a [`Session`]; follows this workspace's
/// functional-options convention.
pub struct SessionOptions {
    pub handshake: HandshakeOptions,
    pub max_frame_size: u64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            handshake: HandshakeOptions::default(),
            max_frame_size: wire::DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

enum Phase {
    Handshaking(Handshake),
    Active { cipher: Keystream, decoder: Decoder },
    Dead,
}

/// Drives one side of the replication protocol: the Noise_XX handshake,
/// then an unbounded stream of encrypted, typed, channel-multiplexed
/// messages. Single-threaded and synchronous — every public method runs
/// to completion before returning, invoking `handlers` inline.
pub struct Session<H: SessionHandlers> {
    handlers: H,
    phase: Phase,
    pending: PendingQueue,
    local_nonce: [u8; 24],
    split: Option<Split>,
    remote_public_key: Option<Vec<u8>>,
    remote_payload: Option<NoisePayload>,
    local_public_key: Vec<u8>,
    max_frame_size: u64,
    busy: bool,
}

impl<H: SessionHandlers> Session<H> {
    pub fn new(role: Role, handlers: H, options: SessionOptions) -> Result<Self, SessionError> {
        let mut local_nonce = [0u8; 24];
        rand::thread_rng().fill_bytes(&mut local_nonce);
        let payload = NoisePayload::new(local_nonce).encode_to_vec();
        let handshake = Handshake::new(role, payload, options.handshake)?;
        let local_public_key = handshake.local_public_key().to_vec();

        Ok(Session {
            handlers,
            phase: Phase::Handshaking(handshake),
            pending: PendingQueue::new(),
            local_nonce,
            split: None,
            remote_public_key: None,
            remote_payload: None,
            local_public_key,
            max_frame_size: options.max_frame_size,
            busy: false,
        })
    }

    pub fn remote_public_key(&self) -> Option<&[u8]> {
        self.remote_public_key.as_deref()
    }

    pub fn local_public_key(&self) -> &[u8] {
        &self.local_public_key
    }

    pub fn split(&self) -> Option<&Split> {
        self.split.as_ref()
    }

    /// Initiators speak first: this writes and relays act one. A no-op for
    /// responders, who wait for the peer's first message instead.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if matches!(self.phase, Phase::Dead) {
            return Ok(());
        }
        if self.busy {
            return Err(self.fail(SessionError::Reentrant));
        }
        self.busy = true;
        let result = self.start_inner();
        self.busy = false;
        match result {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e)),
        }
    }

    fn start_inner(&mut self) -> Result<(), SessionError> {
        if let Phase::Handshaking(hs) = &mut self.phase {
            if let Some(bytes) = hs.start()? {
                self.handlers.send(&bytes);
            }
        }
        Ok(())
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self.phase, Phase::Dead)
    }

    /// Feeds inbound bytes: handshake wire bytes while `HANDSHAKING`,
    /// ciphertext frames once `ACTIVE`. A no-op once destroyed.
    pub fn recv(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        if matches!(self.phase, Phase::Dead) {
            return Ok(());
        }
        if self.busy {
            return Err(self.fail(SessionError::Reentrant));
        }
        self.busy = true;
        let result = self.recv_inner(bytes);
        self.busy = false;
        match result {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e)),
        }
    }

    fn recv_inner(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        match &mut self.phase {
            Phase::Dead => Ok(()),
            Phase::Handshaking(hs) => {
                let progress = hs.recv(bytes)?;
                if let Some(outbound) = progress.outbound {
                    self.handlers.send(&outbound);
                }
                if let Some(completion) = progress.completion {
                    self.complete_handshake(completion)?;
                }
                Ok(())
            }
            Phase::Active { cipher, decoder } => {
                let plaintext = cipher.decrypt(bytes);
                let frames = decoder.push(&plaintext)?;
                for frame in frames {
                    self.dispatch(frame.channel, frame.message);
                }
                Ok(())
            }
        }
    }

    fn complete_handshake(
        &mut self,
        completion: noise::Completion,
    ) -> Result<(), SessionError> {
        if completion.remote_payload.is_empty() {
            return Err(SessionError::MissingRemotePayload);
        }
        let remote_payload = NoisePayload::decode_from(&completion.remote_payload)
            .map_err(SessionError::RemotePayloadDecode)?;
        let remote_nonce: [u8; 24] = remote_payload
            .nonce
            .get(..24)
            .and_then(|s| s.try_into().ok())
            .ok_or(SessionError::MissingRemotePayload)?;

        self.split = Some(completion.split.clone());
        self.remote_public_key = Some(completion.remote_public_key.clone());
        self.remote_payload = Some(remote_payload.clone());
        let cipher = Keystream::new(
            completion.split.tx,
            self.local_nonce,
            completion.split.rx,
            remote_nonce,
        );
        self.phase = Phase::Active {
            cipher,
            decoder: Decoder::with_max_frame_size(self.max_frame_size),
        };

        trace!("handshake complete, session active");
        self.handlers.onhandshake();

        if !completion.overflow.is_empty() {
            self.recv_inner(&completion.overflow)?;
        }

        self.drain_pending()?;
        Ok(())
    }

    fn drain_pending(&mut self) -> Result<(), SessionError> {
        trace!(pending = self.pending.len(), "draining queued sends");
        while let Some((channel, message)) = self.pending.pop_front() {
            if matches!(self.phase, Phase::Dead) {
                break;
            }
            self.emit_frame(channel, message)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, channel: Channel, message: Message) {
        match message {
            Message::Open(m) => self.handlers.onopen(channel, &m),
            Message::Options(m) => self.handlers.onoptions(channel, &m),
            Message::Status(m) => self.handlers.onstatus(channel, &m),
            Message::Have(m) => self.handlers.onhave(channel, &m),
            Message::Unhave(m) => self.handlers.onunhave(channel, &m),
            Message::Want(m) => self.handlers.onwant(channel, &m),
            Message::Unwant(m) => self.handlers.onunwant(channel, &m),
            Message::Request(m) => self.handlers.onrequest(channel, &m),
            Message::Cancel(m) => self.handlers.oncancel(channel, &m),
            Message::Data(m) => self.handlers.ondata(channel, &m),
            Message::Close(m) => self.handlers.onclose(channel, &m),
            Message::Extension(body) => match wire::decode_extension_id(&body) {
                Ok((id, payload)) => self.handlers.onextension(channel, id, payload),
                Err(err) => warn!(%err, "dropped malformed extension frame"),
            },
        }
    }

    fn emit_frame(&mut self, channel: Channel, mut message: Message) -> Result<(), SessionError> {
        if let Message::Open(open) = &mut message {
            if open.key.is_some() && open.capability.is_none() {
                if let Some(split) = &self.split {
                    let key = open.key.take().expect("checked above");
                    open.capability = Some(derive_capability(split, &key));
                }
            }
        }
        let frame = wire::encode(channel, &message);
        if let Phase::Active { cipher, .. } = &mut self.phase {
            let ciphertext = cipher.encrypt(&frame);
            self.handlers.send(&ciphertext);
        }
        Ok(())
    }

    fn send_message(&mut self, channel: Channel, message: Message) -> Result<bool, SessionError> {
        let should_queue = !matches!(self.phase, Phase::Active { .. }) || !self.pending.is_empty();
        if should_queue {
            self.pending
                .push(channel, message)
                .map_err(|_| SessionError::QueueOverflow)?;
            Ok(false)
        } else {
            self.emit_frame(channel, message)?;
            Ok(true)
        }
    }

    fn guarded_send(&mut self, channel: Channel, message: Message) -> Result<bool, SessionError> {
        if matches!(self.phase, Phase::Dead) {
            return Ok(false);
        }
        if self.busy {
            return Err(self.fail(SessionError::Reentrant));
        }
        self.busy = true;
        let result = self.send_message(channel, message);
        self.busy = false;
        result.map_err(|e| self.fail(e))
    }

    pub fn open(&mut self, channel: Channel, message: Open) -> Result<bool, SessionError> {
        self.guarded_send(channel, Message::Open(message))
    }
    pub fn options(&mut self, channel: Channel, message: Options) -> Result<bool, SessionError> {
        self.guarded_send(channel, Message::Options(message))
    }
    pub fn status(&mut self, channel: Channel, message: Status) -> Result<bool, SessionError> {
        self.guarded_send(channel, Message::Status(message))
    }
    pub fn have(&mut self, channel: Channel, message: Have) -> Result<bool, SessionError> {
        self.guarded_send(channel, Message::Have(message))
    }
    pub fn unhave(&mut self, channel: Channel, message: Unhave) -> Result<bool, SessionError> {
        self.guarded_send(channel, Message::Unhave(message))
    }
    pub fn want(&mut self, channel: Channel, message: Want) -> Result<bool, SessionError> {
        self.guarded_send(channel, Message::Want(message))
    }
    pub fn unwant(&mut self, channel: Channel, message: Unwant) -> Result<bool, SessionError> {
        self.guarded_send(channel, Message::Unwant(message))
    }
    pub fn request(&mut self, channel: Channel, message: Request) -> Result<bool, SessionError> {
        self.guarded_send(channel, Message::Request(message))
    }
    pub fn cancel(&mut self, channel: Channel, message: Cancel) -> Result<bool, SessionError> {
        self.guarded_send(channel, Message::Cancel(message))
    }
    pub fn data(&mut self, channel: Channel, message: Data) -> Result<bool, SessionError> {
        self.guarded_send(channel, Message::Data(message))
    }
    pub fn close(&mut self, channel: Channel, message: Close) -> Result<bool, SessionError> {
        self.guarded_send(channel, Message::Close(message))
    }

    pub fn extension(&mut self, channel: Channel, id: u64, bytes: &[u8]) -> Result<bool, SessionError> {
        let mut body = wire::encode_extension_id(id);
        body.extend_from_slice(bytes);
        self.guarded_send(channel, Message::Extension(body))
    }

    /// Idempotent. Zeroes the cipher's key material and invokes `destroy`
    /// on the handler table at most once.
    pub fn destroy(&mut self) {
        self.fail_with(None);
    }

    fn fail(&mut self, err: SessionError) -> SessionError {
        self.fail_with(Some(&err));
        err
    }

    fn fail_with(&mut self, err: Option<&SessionError>) {
        if matches!(self.phase, Phase::Dead) {
            return;
        }
        match err {
            Some(err) => warn!(%err, "destroying session"),
            None => trace!("destroying session"),
        }
        if let Phase::Active { cipher, .. } = &mut self.phase {
            cipher.destroy();
        }
        self.phase = Phase::Dead;
        self.handlers.destroy(err);
    }
}
