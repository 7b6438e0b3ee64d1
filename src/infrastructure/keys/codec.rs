//! Key encoding, structural checks and hashing
//!
//! Defines the external textual shape of a key (prefix + url-safe base64
//! entropy) and the comparable form stored and matched at lookup time.
//! Only the SHA-256 comparable form is ever persisted; the raw key exists
//! once, in the generation response.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Shortest accepted encoded portion (16 bytes of entropy)
const MIN_ENCODED_LEN: usize = 22;
/// Longest accepted encoded portion (64 bytes of entropy)
const MAX_ENCODED_LEN: usize = 86;
/// Characters of the presented key kept visible in audit payloads
const MASK_VISIBLE_CHARS: usize = 8;

/// A freshly minted key: the raw value and its comparable form
#[derive(Debug, Clone)]
pub struct GeneratedKey {
    /// The full key (shown exactly once, at creation)
    pub raw: String,
    /// The stored comparable form
    pub comparable: String,
}

/// Codec for opaque API keys
#[derive(Debug, Clone)]
pub struct KeyCodec {
    prefix: String,
    entropy_bytes: usize,
}

impl KeyCodec {
    pub fn new(prefix: impl Into<String>, entropy_bytes: usize) -> Self {
        Self {
            prefix: prefix.into(),
            entropy_bytes,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Encode entropy into the external key shape
    pub fn encode(&self, entropy: &[u8]) -> String {
        format!("{}{}", self.prefix, URL_SAFE_NO_PAD.encode(entropy))
    }

    /// Mint a new candidate key from OS-level cryptographic randomness.
    ///
    /// Every call draws fresh entropy; a rejected candidate is never
    /// reused or perturbed.
    pub fn generate(&self) -> GeneratedKey {
        let mut entropy = vec![0u8; self.entropy_bytes];
        OsRng.fill_bytes(&mut entropy);

        let raw = self.encode(&entropy);
        let comparable = self.comparable_form(&raw);

        GeneratedKey { raw, comparable }
    }

    /// Compute the comparable form of a presented key
    pub fn comparable_form(&self, raw: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(raw.as_bytes());
        let digest = hasher.finalize();
        format!("sha256${}", URL_SAFE_NO_PAD.encode(digest))
    }

    /// Cheap structural screen applied before any store lookup.
    ///
    /// A negative result means the key cannot exist; a positive result
    /// says nothing about existence.
    pub fn looks_well_formed(&self, candidate: &str) -> bool {
        let candidate = candidate.trim();

        if candidate.is_empty() {
            return false;
        }

        let Some(encoded) = candidate.strip_prefix(self.prefix.as_str()) else {
            return false;
        };

        if encoded.len() < MIN_ENCODED_LEN || encoded.len() > MAX_ENCODED_LEN {
            return false;
        }

        encoded
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }
}

/// Mask a presented key for audit payloads.
///
/// Keeps at most the first eight characters; audit logs must never
/// carry a live credential.
pub fn mask_key(presented: &str) -> String {
    let visible: String = presented.chars().take(MASK_VISIBLE_CHARS).collect();
    format!("{visible}***")
}
