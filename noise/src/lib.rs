#![forbid(unsafe_code)]

//! Noise_XX handshake driver for the feed replication protocol.
//!
//! This crate owns component C2 (the handshake) of the protocol core: it
//! speaks the three-act Noise_XX pattern over Curve25519, carries a small
//! application payload (each side's cipher nonce) on the handshake, and
//! yields the `{tx, rx}` key split the caller uses to key its own
//! post-handshake keystream. It does not touch sockets; it is fed bytes and
//! hands back bytes to send.

mod error;
mod handshake;
mod payload;

pub use error::HandshakeError;
pub use handshake::{Completion, Handshake, HandshakeOptions, Progress, Role, Split};
pub use payload::NoisePayload;

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_completion() -> (Completion, Completion) {
        let mut initiator = Handshake::new(
            Role::Initiator,
            NoisePayload::new([1u8; 24]).encode_to_vec(),
            HandshakeOptions::default(),
        )
        .unwrap();
        let mut responder = Handshake::new(
            Role::Responder,
            NoisePayload::new([2u8; 24]).encode_to_vec(),
            HandshakeOptions::default(),
        )
        .unwrap();

        let act1 = initiator.start().unwrap().unwrap();
        let progress = responder.recv(&act1).unwrap();
        assert!(progress.completion.is_none());
        let act2 = progress.outbound.unwrap();

        let progress = initiator.recv(&act2).unwrap();
        let act3 = progress.outbound.unwrap();
        let initiator_completion = progress.completion.unwrap();

        let progress = responder.recv(&act3).unwrap();
        assert!(progress.outbound.is_none());
        let responder_completion = progress.completion.unwrap();

        (initiator_completion, responder_completion)
    }

    #[test]
    fn handshake_completes_with_matching_split() {
        let (i, r) = run_to_completion();
        assert_eq!(i.split.tx, r.split.rx);
        assert_eq!(i.split.rx, r.split.tx);
        assert!(i.overflow.is_empty());
        assert!(r.overflow.is_empty());
    }

    #[test]
    fn remote_public_keys_match_static_keys() {
        let mut initiator = Handshake::new(
            Role::Initiator,
            NoisePayload::new([1u8; 24]).encode_to_vec(),
            HandshakeOptions::default(),
        )
        .unwrap();
        let mut responder = Handshake::new(
            Role::Responder,
            NoisePayload::new([2u8; 24]).encode_to_vec(),
            HandshakeOptions::default(),
        )
        .unwrap();
        let initiator_pub = initiator.local_public_key().to_vec();
        let responder_pub = responder.local_public_key().to_vec();

        let act1 = initiator.start().unwrap().unwrap();
        let act2 = responder.recv(&act1).unwrap().outbound.unwrap();
        let progress = initiator.recv(&act2).unwrap();
        let act3 = progress.outbound.unwrap();
        let i_completion = progress.completion.unwrap();
        let r_completion = responder.recv(&act3).unwrap().completion.unwrap();

        assert_eq!(i_completion.remote_public_key, responder_pub);
        assert_eq!(r_completion.remote_public_key, initiator_pub);
    }

    #[test]
    fn remote_payload_round_trips() {
        let (i, r) = run_to_completion();
        let i_nonce = NoisePayload::decode_from(&i.remote_payload).unwrap();
        let r_nonce = NoisePayload::decode_from(&r.remote_payload).unwrap();
        assert_eq!(i_nonce.nonce, vec![2u8; 24]);
        assert_eq!(r_nonce.nonce, vec![1u8; 24]);
    }

    #[test]
    fn overflow_bytes_are_preserved() {
        let mut initiator = Handshake::new(
            Role::Initiator,
            NoisePayload::new([1u8; 24]).encode_to_vec(),
            HandshakeOptions::default(),
        )
        .unwrap();
        let mut responder = Handshake::new(
            Role::Responder,
            NoisePayload::new([2u8; 24]).encode_to_vec(),
            HandshakeOptions::default(),
        )
        .unwrap();

        let act1 = initiator.start().unwrap().unwrap();
        let act2 = responder.recv(&act1).unwrap().outbound.unwrap();
        let progress = initiator.recv(&act2).unwrap();
        let act3 = progress.outbound.unwrap();

        let mut chunk = act3;
        chunk.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        let completion = responder.recv(&chunk).unwrap().completion.unwrap();
        assert_eq!(completion.overflow, vec![0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn recv_after_complete_is_rejected() {
        let mut initiator = Handshake::new(
            Role::Initiator,
            NoisePayload::new([1u8; 24]).encode_to_vec(),
            HandshakeOptions::default(),
        )
        .unwrap();
        let mut responder = Handshake::new(
            Role::Responder,
            NoisePayload::new([2u8; 24]).encode_to_vec(),
            HandshakeOptions::default(),
        )
        .unwrap();

        let act1 = initiator.start().unwrap().unwrap();
        let act2 = responder.recv(&act1).unwrap().outbound.unwrap();
        let progress = initiator.recv(&act2).unwrap();
        let act3 = progress.outbound.unwrap();
        responder.recv(&act3).unwrap();

        assert!(matches!(
            responder.recv(&[0u8]),
            Err(HandshakeError::AlreadyComplete)
        ));
    }
}
