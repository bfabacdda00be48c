//! Per-operation key derivation: PBKDF2-HMAC-SHA256.
//!
//! Every encryption draws a fresh 32-byte salt and stretches the master key
//! into a one-off 256-bit AES key. The iteration count is a fixed constant:
//! it is baked into every envelope ever produced, and changing it would make
//! existing ciphertext undecryptable.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

/// PBKDF2 iteration count. Fixed for the lifetime of the envelope format.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Byte length of a derived AES-256 key.
pub const DERIVED_KEY_LEN: usize = 32;

/// A derived per-operation key.
///
/// The buffer is overwritten with zeroes on drop to minimise the window
/// during which key material lives in RAM.
pub struct DerivedKey([u8; DERIVED_KEY_LEN]);

impl DerivedKey {
    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Stretch `master` and `salt` into a 256-bit key.
pub fn derive_key(master: &[u8], salt: &[u8]) -> DerivedKey {
    let mut out = [0u8; DERIVED_KEY_LEN];
    pbkdf2_hmac::<Sha256>(master, salt, PBKDF2_ITERATIONS, &mut out);
    DerivedKey(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_key(b"master", b"salt-salt-salt-salt-salt-salt-32");
        let b = derive_key(b"master", b"salt-salt-salt-salt-salt-salt-32");
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_salts_produce_different_keys() {
        let a = derive_key(b"master", b"salt-a");
        let b = derive_key(b"master", b"salt-b");
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_masters_produce_different_keys() {
        let a = derive_key(b"master-a", b"salt");
        let b = derive_key(b"master-b", b"salt");
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn known_rfc6070_style_vector() {
        // Single-iteration check against the reference implementation of
        // PBKDF2-HMAC-SHA256 ("password"/"salt", c=1).
        let mut key = [0u8; 32];
        pbkdf2_hmac::<Sha256>(b"password", b"salt", 1, &mut key);
        assert_eq!(
            key[..4],
            [0x12, 0x0f, 0xb6, 0xcf],
            "PBKDF2-HMAC-SHA256 output mismatch"
        );
    }

    #[test]
    fn derived_key_redacted_in_debug() {
        let key = derive_key(b"master", b"salt");
        assert!(format!("{key:?}").contains("REDACTED"));
    }
}
