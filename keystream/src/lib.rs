#![forbid(unsafe_code)]

//! Component C1: the post-handshake keystream cipher.
//!
//! This is a plain XChaCha20 XOR stream, not an AEAD. It provides no
//! per-frame authentication; integrity of the session rests on the
//! handshake-derived key binding, and any message that fails to decode
//! after decryption must be treated as adversarial by the caller. The
//! two directions (transmit/receive) run on independent key+nonce pairs so
//! that a peer's outbound stream and inbound stream never share keystream
//! bytes.

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::XChaCha20;

/// Two independently-keyed XChaCha20 instances, one per direction.
///
/// `XChaCha20` tracks its own block counter and keystream offset
/// internally, so splitting a call into arbitrary chunks and concatenating
/// the output is byte-identical to encrypting it in one call: the cipher
/// simply keeps running where the previous call left off.
pub struct Keystream {
    tx: Option<XChaCha20>,
    rx: Option<XChaCha20>,
}

impl Keystream {
    /// `tx_key`/`tx_nonce` key this side's outbound stream; `rx_key`/`rx_nonce`
    /// key the inbound one. Callers derive these from the Noise split: the
    /// first 32 bytes of each half as the key, the local/remote handshake
    /// nonces as the 24-byte XChaCha20 nonces.
    pub fn new(tx_key: [u8; 32], tx_nonce: [u8; 24], rx_key: [u8; 32], rx_nonce: [u8; 24]) -> Self {
        Keystream {
            tx: Some(XChaCha20::new(&tx_key.into(), &tx_nonce.into())),
            rx: Some(XChaCha20::new(&rx_key.into(), &rx_nonce.into())),
        }
    }

    /// XORs `data` against the transmit keystream and returns the result.
    ///
    /// Panics if called after [`Keystream::destroy`] — the session must
    /// never encrypt once its keys have been zeroed.
    pub fn encrypt(&mut self, data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        self.tx
            .as_mut()
            .expect("keystream encrypt called after destroy")
            .apply_keystream(&mut out);
        out
    }

    /// XORs `data` against the receive keystream and returns the result.
    pub fn decrypt(&mut self, data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        self.rx
            .as_mut()
            .expect("keystream decrypt called after destroy")
            .apply_keystream(&mut out);
        out
    }

    /// Zeroes both directions' key material. Idempotent.
    pub fn destroy(&mut self) {
        // Dropping the `XChaCha20` values runs their `ZeroizeOnDrop` impl
        // (the `zeroize` feature is enabled in Cargo.toml).
        self.tx = None;
        self.rx = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Keystream, Keystream) {
        let a_key = [1u8; 32];
        let b_key = [2u8; 32];
        let a_nonce = [3u8; 24];
        let b_nonce = [4u8; 24];
        // A's tx mirrors B's rx, and vice versa, exactly like the Noise split.
        let a = Keystream::new(a_key, a_nonce, b_key, b_nonce);
        let b = Keystream::new(b_key, b_nonce, a_key, a_nonce);
        (a, b)
    }

    #[test]
    fn round_trips_through_the_peer() {
        let (mut a, mut b) = fixture();
        let plaintext = b"replicate the feed".to_vec();
        let ciphertext = a.encrypt(&plaintext);
        let decrypted = b.decrypt(&ciphertext);
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn chunking_does_not_change_the_output() {
        let (mut whole, mut chunked) = fixture();
        let message: Vec<u8> = (0..250u16).map(|i| i as u8).collect();

        let whole_ct = whole.encrypt(&message);

        let mut chunked_ct = Vec::new();
        for piece in message.chunks(7) {
            chunked_ct.extend(chunked.encrypt(piece));
        }

        assert_eq!(whole_ct, chunked_ct);
    }

    #[test]
    fn destroy_then_encrypt_panics() {
        let (mut a, _b) = fixture();
        a.destroy();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| a.encrypt(b"x")));
        assert!(result.is_err());
    }
}
