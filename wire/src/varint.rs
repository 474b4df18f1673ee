use integer_encoding::VarInt;

/// The protocol caps varints at 10 continuation bytes and a 53-bit value,
/// matching the range a JavaScript `Number` can represent exactly — this
/// wire format grew up interoperating with JS peers and keeps the limit
/// even though this implementation has no such constraint of its own.
pub const MAX_VARINT_BYTES: usize = 10;
pub const MAX_VALUE: u64 = (1u64 << 53) - 1;

#[derive(Debug, Eq, PartialEq)]
pub enum VarintError {
    TooManyContinuationBytes,
    Overflow,
}

impl std::fmt::Display for VarintError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            VarintError::TooManyContinuationBytes => {
                write!(f, "varint exceeds the 10 byte continuation limit")
            }
            VarintError::Overflow => write!(f, "varint value exceeds the 53-bit protocol ceiling"),
        }
    }
}

impl std::error::Error for VarintError {}

pub fn encode(value: u64) -> Vec<u8> {
    value.encode_var_vec()
}

/// Attempts to decode one varint from the front of `bytes`.
///
/// - `Ok(None)` — not enough bytes yet; the caller should wait for more.
/// - `Ok(Some((value, consumed)))` — success.
/// - `Err(_)` — malformed: more than [`MAX_VARINT_BYTES`] continuation
///   bytes, or a value above [`MAX_VALUE`].
pub fn decode(bytes: &[u8]) -> Result<Option<(u64, usize)>, VarintError> {
    let probe_len = bytes.len().min(MAX_VARINT_BYTES);
    match u64::decode_var(&bytes[..probe_len]) {
        Some((value, consumed)) => {
            if value > MAX_VALUE {
                Err(VarintError::Overflow)
            } else {
                Ok(Some((value, consumed)))
            }
        }
        None if probe_len >= MAX_VARINT_BYTES => Err(VarintError::TooManyContinuationBytes),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_small_and_large_values() {
        for value in [0u64, 1, 127, 128, 300, 1 << 20, MAX_VALUE] {
            let bytes = encode(value);
            let (decoded, consumed) = decode(&bytes).unwrap().unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, bytes.len());
        }
    }

    #[test]
    fn incomplete_input_asks_for_more() {
        let bytes = encode(1 << 20);
        assert_eq!(decode(&bytes[..1]).unwrap(), None);
    }

    #[test]
    fn too_many_continuation_bytes_is_an_error() {
        let bytes = [0xFFu8; MAX_VARINT_BYTES];
        assert_eq!(decode(&bytes), Err(VarintError::TooManyContinuationBytes));
    }

    #[test]
    fn overflow_is_rejected() {
        let bytes = (MAX_VALUE + 1).encode_var_vec();
        assert_eq!(decode(&bytes), Err(VarintError::Overflow));
    }
}
