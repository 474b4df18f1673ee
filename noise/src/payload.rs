/// The application payload carried on the Noise handshake: each side's
/// freshly generated cipher nonce, handed to the peer so it can key its
/// receive-direction keystream once the handshake completes.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NoisePayload {
    #[prost(bytes = "vec", tag = "1")]
    pub nonce: Vec<u8>,
}

impl NoisePayload {
    pub fn new(nonce: [u8; 24]) -> Self {
        NoisePayload {
            nonce: nonce.to_vec(),
        }
    }

    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(26);
        // A `Vec<u8>` buffer never runs out of capacity, so encoding cannot fail.
        prost::Message::encode(self, &mut buf).expect("buffer has unbounded capacity");
        buf
    }

    pub fn decode_from(bytes: &[u8]) -> Result<Self, prost::DecodeError> {
        prost::Message::decode(bytes)
    }
}
