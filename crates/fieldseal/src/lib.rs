//! `fieldseal` — selective field-level encryption for JSON records.
//!
//! A [`FieldEncryptor`] derives a fresh AES-256 key per operation from a
//! master secret held in a [`Keyring`], seals individual string values into
//! self-describing envelopes, and applies this to whitelisted fields of
//! arbitrary records. Callers persist the envelopes verbatim (e.g. as a JSON
//! column) and pass them back for decryption later.
//!
//! # Usage
//!
//! ```no_run
//! use fieldseal::{Config, FieldEncryptor, FieldSet, Keyring};
//! use serde_json::{json, Map, Value};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config::from_env()?;
//! let enc = FieldEncryptor::new(Keyring::from_config(&cfg));
//!
//! let record: Map<String, Value> = serde_json::from_value(json!({
//!     "email": "a@b.com", "name": "Alice", "age": 30,
//! }))?;
//! let sensitive = FieldSet::new("user_data", ["email"]);
//!
//! let sealed = enc.encrypt_fields(&record, &sensitive);
//! assert!(sealed.failures.is_empty());
//! // `sealed.record["email"]` is now an envelope; `name` and `age` are untouched.
//!
//! let restored = enc.decrypt_fields(&sealed.record, &sensitive);
//! assert_eq!(restored.record, record);
//! # Ok(())
//! # }
//! ```
//!
//! Construct one [`FieldEncryptor`] at application startup and pass it to
//! every caller that needs encryption; there is deliberately no process-wide
//! singleton.

pub mod config;
pub mod encryptor;
pub mod fields;
pub mod keyring;
pub mod record;

pub use config::Config;
pub use encryptor::{FieldEncryptor, ReencryptError};
pub use fields::{FieldSet, FieldSetError, FieldSetRegistry};
pub use fieldseal_core::{DecryptionError, EncryptedField, EncryptionError, ALGORITHM};
pub use keyring::{Keyring, KeyringError, MasterKey};
pub use record::{FieldError, FieldFailure, RecordOutcome};
