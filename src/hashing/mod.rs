/// Lowercases and collapses whitespace so that trivially different spellings of the
/// same utterance share one cache key.
pub fn normalize_for_key(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// BLAKE3 hash of the normalized input.
#[inline]
pub fn hash_input(input: &str) -> [u8; 32] {
    *blake3::hash(normalize_for_key(input).as_bytes()).as_bytes()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used for log fields and diagnostics only; cache keys keep the full 32 bytes.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}
