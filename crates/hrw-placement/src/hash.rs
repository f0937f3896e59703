//! 64-bit hashing primitives used by the scoring function.
//!
//! Node names and keys are digested with BLAKE3 in separate derive-key
//! contexts and truncated to their first eight bytes (little-endian), so a
//! key spelled like a node name never shares its digest. The two digests are
//! then merged with a murmur3-style finalizer so that every (key, node) pair
//! yields a value that behaves like an independent uniform draw.

/// First finalizer multiplier (murmur3 `fmix64`).
const MIX_C1: u64 = 0xff51_afd7_ed55_8ccd;
/// Second finalizer multiplier (murmur3 `fmix64`).
const MIX_C2: u64 = 0xc4ce_b9fe_1a85_ec53;

/// Number of mantissa bits in an `f64`.
const MANTISSA_BITS: u32 = 53;

/// Derive-key context for node identities.
const IDENTITY_CONTEXT: &str = "hrw-placement 2026-10 node identity";
/// Derive-key context for lookup keys.
const KEY_CONTEXT: &str = "hrw-placement 2026-10 lookup key";

/// Hash bytes to a u64 within `context`: blake3 derive_key truncated to 8 bytes.
fn hash64(context: &str, data: &[u8]) -> u64 {
    let derived = blake3::derive_key(context, data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&derived[..8]);
    u64::from_le_bytes(bytes)
}

/// Identity hash of a node, derived only from its name.
///
/// Two registries holding the same node name always agree on this value,
/// which is what keeps placement stable across independent instances.
pub fn identity_hash(name: &str) -> u64 {
    hash64(IDENTITY_CONTEXT, name.as_bytes())
}

/// Hash of a lookup key.
pub fn key_hash(key: &str) -> u64 {
    hash64(KEY_CONTEXT, key.as_bytes())
}

/// Merge a key hash and a node identity hash into one well-mixed value.
///
/// All multiplications wrap modulo 2^64.
pub fn mix(key_hash: u64, identity_hash: u64) -> u64 {
    let mut acc = key_hash ^ identity_hash;
    acc ^= acc >> 33;
    acc = acc.wrapping_mul(MIX_C1);
    acc ^= acc >> 33;
    acc = acc.wrapping_mul(MIX_C2);
    acc ^= acc >> 33;
    acc
}

/// Map a uniformly random u64 to a uniformly random f64 in `[0, 1)`.
///
/// Keeps the top 53 bits and divides by 2^53, so every result is exactly
/// representable.
pub fn to_unit_float(value: u64) -> f64 {
    let top = value >> (64 - MANTISSA_BITS);
    top as f64 / (1u64 << MANTISSA_BITS) as f64
}
