use blake2_rfc::blake2b::Blake2b;
use noise::Split;

/// Raw bytes prefixing every capability hash. Part of the wire contract —
/// changing it breaks interop with any peer that already speaks this
/// protocol.
pub const CAPABILITY_NAMESPACE: &[u8] = b"hypercore capability";

/// The capability this side presents for `key`: proof of knowledge of a
/// feed's long-term key, bound to this session's split so it cannot be
/// replayed against a different connection.
pub fn derive_capability(split: &Split, key: &[u8]) -> Vec<u8> {
    keyed_hash(&split.rx, &split.tx, key)
}

/// The capability this side expects the peer to present for `key`. Equal,
/// bytewise, to the peer's [`derive_capability`] for the same key — the
/// tx/rx halves swap between the two formulas to produce that symmetry.
pub fn derive_remote_capability(split: &Split, key: &[u8]) -> Vec<u8> {
    keyed_hash(&split.tx, &split.rx, key)
}

fn keyed_hash(hash_key: &[u8; 32], other_half: &[u8; 32], key: &[u8]) -> Vec<u8> {
    let mut context = Blake2b::with_key(32, hash_key);
    context.update(CAPABILITY_NAMESPACE);
    context.update(other_half);
    context.update(key);
    context.finalize().as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mirrored_splits() -> (Split, Split) {
        let a = Split { tx: [1u8; 32], rx: [2u8; 32] };
        let b = Split { tx: [2u8; 32], rx: [1u8; 32] };
        (a, b)
    }

    #[test]
    fn capability_and_remote_capability_agree_across_peers() {
        let (a, b) = mirrored_splits();
        let key = [7u8; 32];

        assert_eq!(derive_capability(&a, &key), derive_remote_capability(&b, &key));
        assert_eq!(derive_capability(&b, &key), derive_remote_capability(&a, &key));
    }

    #[test]
    fn different_keys_produce_different_capabilities() {
        let (a, _b) = mirrored_splits();
        assert_ne!(derive_capability(&a, &[1u8; 32]), derive_capability(&a, &[2u8; 32]));
    }

    /// Fixed test vector: pins the exact keyed-BLAKE2b construction against
    /// an independently computed digest, so a refactor that reorders the
    /// hashed fields gets caught even though `capability_and_remote_capability_agree_across_peers`
    /// would not notice it.
    #[test]
    fn matches_an_independently_computed_digest() {
        let split = Split { tx: [1u8; 32], rx: [2u8; 32] };
        let key = [0u8; 32];
        let capability = derive_capability(&split, &key);
        assert_eq!(
            hex::encode(&capability),
            "77d5efb99254a829fa52928bdb9246f476680b54d0307b8da674895e44a6e8a6"
        );
    }
}
