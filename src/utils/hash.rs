//! Content hashing for artifacts and source snapshots.
//!
//! Uses `blake3` so fingerprints are stable across runs and platforms
//! (they are exposed to browsers as ETags).

/// Compute a 32-byte content hash.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> [u8; 32] {
    *blake3::hash(data.as_ref()).as_bytes()
}

/// Compute hash and return as 16-char hex fingerprint.
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(value: &T) -> String {
    hex::encode(&compute(value)[..8])
}
