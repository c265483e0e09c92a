//! Opaque document artifact produced by a successful execution.

use std::fmt;
use std::sync::Arc;

/// Artifact bytes, shared without copying between router and surfaces.
///
/// The payload is never reinterpreted or mutated after creation.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact(Arc<[u8]>);

impl Artifact {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Content fingerprint (16 hex chars), stable across runs.
    pub fn fingerprint(&self) -> String {
        crate::utils::hash::fingerprint(self.as_bytes())
    }
}

impl From<Vec<u8>> for Artifact {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}

impl From<&[u8]> for Artifact {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }
}

impl AsRef<[u8]> for Artifact {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

// Payloads can be megabytes; print the size only.
impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Artifact({} bytes)", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_bytes() {
        let artifact = Artifact::from(vec![1u8, 2, 3]);
        let clone = artifact.clone();
        assert_eq!(artifact.as_bytes().as_ptr(), clone.as_bytes().as_ptr());
    }

    #[test]
    fn test_debug_hides_payload() {
        let artifact = Artifact::from(&b"%PDF-1.4"[..]);
        assert_eq!(format!("{artifact:?}"), "Artifact(8 bytes)");
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = Artifact::from(&b"one"[..]);
        let b = Artifact::from(&b"two"[..]);
        assert_eq!(a.fingerprint(), Artifact::from(&b"one"[..]).fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
