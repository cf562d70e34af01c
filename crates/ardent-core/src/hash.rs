use crate::traits::Hasher;
use sha2::{Digest, Sha256};
use std::fmt::Write;

///
/// Sha256Hasher
///
/// Default one-way digest for password attributes, hex-encoded. The
/// `Hasher` seam stays pluggable; deployments holding real credentials
/// should swap in a key-derivation hasher.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Hasher;

impl Sha256Hasher {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Hasher for Sha256Hasher {
    fn make(&self, plaintext: &str) -> String {
        let digest = Sha256::digest(plaintext.as_bytes());

        let mut out = String::with_capacity(digest.len() * 2);
        for byte in digest {
            let _ = write!(out, "{byte:02x}");
        }

        out
    }
}

///
/// TESTS
///
