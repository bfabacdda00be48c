//! Crypto primitives for field-level encryption.
//!
//! This crate is intentionally free of configuration, registry, and logging
//! dependencies. It provides the envelope format, the key-derivation function,
//! and the AEAD seal/open operations used by the `fieldseal` crate.
//!
//! # Envelope format
//!
//! Each encrypted value is a self-describing JSON object:
//!
//! ```json
//! {
//!   "data": "<base64 ciphertext>",
//!   "iv": "<base64, 16 bytes>",
//!   "salt": "<base64, 32 bytes>",
//!   "tag": "<base64, 16 bytes>",
//!   "algorithm": "AES-256-GCM",
//!   "keyId": "default"
//! }
//! ```
//!
//! Decryption needs nothing beyond the envelope plus the master key named by
//! `keyId`. A fresh random salt and IV are drawn for every encryption, so the
//! same plaintext never produces the same envelope twice.

pub mod cipher;
pub mod envelope;
pub mod error;
pub mod kdf;

pub use cipher::{decrypt_value, encrypt_value};
pub use envelope::{EncryptedField, ALGORITHM, IV_LEN, SALT_LEN, TAG_LEN};
pub use error::{DecryptionError, EncryptionError};
