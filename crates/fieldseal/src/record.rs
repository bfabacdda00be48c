//! Selective encryption and decryption of named fields within a record.
//!
//! Records are `serde_json::Map<String, Value>` — a database row or API
//! payload. Operations work on a copy; the input is never mutated. A field
//! that is absent or `null` passes through untouched, and a failure on one
//! field never aborts processing of the rest: the field becomes `null` in the
//! output and the failure is reported back to the caller.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use fieldseal_core::{DecryptionError, EncryptedField, EncryptionError};

use crate::encryptor::FieldEncryptor;
use crate::fields::FieldSet;

/// Why a single field could not be processed.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The stored value has a `data` attribute but is not a valid envelope.
    #[error("value is not a valid encrypted-field envelope")]
    MalformedEnvelope,

    /// The field's plaintext could not be serialised for encryption.
    #[error("failed to serialise field value: {0}")]
    Serialise(#[from] serde_json::Error),

    /// Encryption of the field's value failed.
    #[error(transparent)]
    Encrypt(#[from] EncryptionError),

    /// Decryption of the field's envelope failed.
    #[error(transparent)]
    Decrypt(#[from] DecryptionError),
}

/// A single field that could not be processed.
#[derive(Debug)]
pub struct FieldFailure {
    /// Name of the field within the record.
    pub field: String,
    /// What went wrong.
    pub error: FieldError,
}

/// Best-effort result of a record-level operation.
///
/// `record` always contains every input field; fields that failed hold
/// `null` (never partial plaintext or a stale envelope) and are listed in
/// `failures`.
#[derive(Debug)]
pub struct RecordOutcome {
    /// The transformed copy of the input record.
    pub record: Map<String, Value>,
    /// Per-field failures, in field-set order.
    pub failures: Vec<FieldFailure>,
}

impl RecordOutcome {
    /// Returns `true` if every listed field was processed cleanly.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl FieldEncryptor {
    /// Encrypt every listed field present in `record` with a non-null value.
    ///
    /// String values are encrypted directly; other values are JSON-serialised
    /// first so their original type survives the round trip. Fields not
    /// listed, absent, or `null` pass through unchanged — no envelope is
    /// synthesised for a field that was not there.
    ///
    /// Per-field failures are isolated: the field becomes `null` in the
    /// output (never left as plaintext) and is reported in the outcome.
    pub fn encrypt_fields(&self, record: &Map<String, Value>, fields: &FieldSet) -> RecordOutcome {
        let mut out = record.clone();
        let mut failures = Vec::new();

        for name in fields.iter() {
            let Some(value) = record.get(name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            match self.encrypt_record_value(value) {
                Ok(envelope) => {
                    out.insert(name.to_owned(), envelope);
                }
                Err(error) => {
                    warn!(field = %name, error = %error, "field encryption failed");
                    out.insert(name.to_owned(), Value::Null);
                    failures.push(FieldFailure {
                        field: name.to_owned(),
                        error,
                    });
                }
            }
        }

        RecordOutcome { record: out, failures }
    }

    /// Decrypt every listed field whose value is shaped like an envelope.
    ///
    /// Recovered plaintext is JSON-parsed so non-string originals come back
    /// as their structured value; text that is not valid JSON is restored as
    /// a plain string. Values without a `data` attribute — including `null`
    /// and absent fields — pass through unchanged.
    ///
    /// Per-field failures are isolated: the field becomes `null` in the
    /// output and is reported in the outcome, so one bad field cannot hide
    /// the successfully decrypted remainder of the record.
    pub fn decrypt_fields(&self, record: &Map<String, Value>, fields: &FieldSet) -> RecordOutcome {
        let mut out = record.clone();
        let mut failures = Vec::new();

        for name in fields.iter() {
            let Some(value) = record.get(name) else {
                continue;
            };
            if !is_envelope_shaped(value) {
                continue;
            }

            match self.decrypt_record_value(value) {
                Ok(plaintext) => {
                    out.insert(name.to_owned(), restore_value(plaintext));
                }
                Err(error) => {
                    warn!(field = %name, error = %error, "field decryption failed");
                    out.insert(name.to_owned(), Value::Null);
                    failures.push(FieldFailure {
                        field: name.to_owned(),
                        error,
                    });
                }
            }
        }

        RecordOutcome { record: out, failures }
    }

    fn encrypt_record_value(&self, value: &Value) -> Result<Value, FieldError> {
        let plaintext = match value {
            Value::String(s) => s.clone(),
            other => serde_json::to_string(other)?,
        };
        let envelope = self.encrypt_field(&plaintext)?;
        Ok(serde_json::to_value(envelope)?)
    }

    fn decrypt_record_value(&self, value: &Value) -> Result<String, FieldError> {
        let envelope: EncryptedField =
            serde_json::from_value(value.clone()).map_err(|_| FieldError::MalformedEnvelope)?;
        Ok(self.decrypt_field(&envelope)?)
    }
}

/// A value is treated as an envelope when it carries a `data` attribute.
fn is_envelope_shaped(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.contains_key("data"))
}

/// Restore a decrypted plaintext to its caller-visible value: structured
/// JSON when it parses, the raw string otherwise.
fn restore_value(plaintext: String) -> Value {
    serde_json::from_str(&plaintext).unwrap_or(Value::String(plaintext))
}
