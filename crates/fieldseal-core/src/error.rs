//! Error taxonomies for the crypto layer.

use thiserror::Error;

/// Errors produced while encrypting a single value.
#[derive(Debug, Error)]
pub enum EncryptionError {
    /// The AEAD cipher rejected the input or failed to produce ciphertext.
    #[error("aead encryption failed")]
    Aead,

    /// The requested key id has no key material in the keyring.
    #[error("unknown key id: {0}")]
    UnknownKeyId(String),
}

/// Errors produced while decrypting an envelope.
///
/// Decryption fails closed: none of these variants ever carry partial
/// plaintext, and callers must not treat any of them as an empty value.
#[derive(Debug, Error)]
pub enum DecryptionError {
    /// An envelope field is not valid base64.
    #[error("envelope field `{0}` is not valid base64")]
    InvalidBase64(&'static str),

    /// A fixed-length envelope field decoded to the wrong number of bytes.
    #[error("envelope field `{field}` has invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The envelope names a cipher suite this build does not support.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The envelope names a key id with no key material in the keyring.
    #[error("unknown key id: {0}")]
    UnknownKeyId(String),

    /// AEAD tag verification failed: wrong key or tampered ciphertext.
    #[error("authentication failed (wrong key or tampered ciphertext)")]
    AuthenticationFailed,

    /// The authenticated plaintext is not valid UTF-8.
    #[error("decrypted plaintext is not valid UTF-8")]
    InvalidUtf8,
}
