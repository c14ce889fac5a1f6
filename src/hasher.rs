//! The Hasher component (§4.2): a pure, fixed-seed, 64-bit non-cryptographic
//! hash of a normalized key's UTF-8 bytes.

use crate::model::Hash64;

/// Fixed seed recorded in the data model (§3) and in the run log at startup.
pub const HASH_SEED: u64 = 2024;

/// The pluggable hash algorithm. Exactly one implementation is compiled in
/// per build: the default (xxHash64) unless the `crypto-hash-fallback`
/// feature is enabled, in which case the BLAKE3-truncated fallback is used
/// instead. The two are never mixed within a single run (§4.2).
pub trait KeyHasher: Send + Sync {
    /// Human-readable name recorded once in the run log.
    fn name(&self) -> &'static str;

    /// Hash `key` (already-normalized UTF-8 bytes) with the fixed seed.
    fn hash(&self, key: &[u8]) -> Hash64;
}

/// Default implementation: xxHash64, seeded with [`HASH_SEED`]. Fast,
/// well-distributed, explicitly non-cryptographic — exactly what the
/// contract in §4.2 calls for.
#[derive(Debug, Default, Clone, Copy)]
pub struct Xxh64KeyHasher;

impl KeyHasher for Xxh64KeyHasher {
    fn name(&self) -> &'static str {
        "xxhash64"
    }

    fn hash(&self, key: &[u8]) -> Hash64 {
        Hash64(xxhash_rust::xxh64::xxh64(key, HASH_SEED))
    }
}

/// Deterministic cryptographic fallback, truncated to 64 bits, for
/// environments where the primary crate cannot be vendored. Off by default;
/// only compiled in with the `crypto-hash-fallback` feature, and only ever
/// used if a caller explicitly constructs it.
#[cfg(feature = "crypto-hash-fallback")]
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3TruncatedKeyHasher;

#[cfg(feature = "crypto-hash-fallback")]
impl KeyHasher for Blake3TruncatedKeyHasher {
    fn name(&self) -> &'static str {
        "blake3-truncated64"
    }

    fn hash(&self, key: &[u8]) -> Hash64 {
        // Mix the seed in as a domain-separating prefix rather than relying
        // on a keyed hash, so the algorithm stays a pure fn(seed, bytes).
        let mut hasher = blake3::Hasher::new();
        hasher.update(&HASH_SEED.to_le_bytes());
        hasher.update(key);
        let digest = hasher.finalize();
        let bytes: &[u8; 32] = digest.as_bytes();
        Hash64(u64::from_le_bytes(bytes[..8].try_into().unwrap()))
    }
}

/// Construct the default hasher for this build.
pub fn default_hasher() -> Xxh64KeyHasher {
    Xxh64KeyHasher
}
