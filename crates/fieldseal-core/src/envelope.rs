//! The [`EncryptedField`] envelope and its base64 codec.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::DecryptionError;

/// Byte length of the random KDF salt.
pub const SALT_LEN: usize = 32;

/// Byte length of the AES-GCM initialisation vector.
pub const IV_LEN: usize = 16;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Cipher-suite identifier stamped into every envelope.
///
/// Stored for forward compatibility: a future algorithm migration can branch
/// on this value instead of guessing from field shapes.
pub const ALGORITHM: &str = "AES-256-GCM";

/// A self-describing encrypted field value.
///
/// All byte fields are base64-encoded (standard alphabet, padded) so the
/// envelope can be persisted verbatim as a JSON column. `keyId` names the
/// master key the per-operation key was derived from; it is serialised in
/// camelCase to stay compatible with envelopes already at rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedField {
    /// Ciphertext bytes, base64-encoded.
    pub data: String,
    /// Initialisation vector, base64-encoded, [`IV_LEN`] bytes.
    pub iv: String,
    /// KDF salt, base64-encoded, [`SALT_LEN`] bytes.
    pub salt: String,
    /// GCM authentication tag, base64-encoded, [`TAG_LEN`] bytes.
    pub tag: String,
    /// Cipher-suite identifier, see [`ALGORITHM`].
    pub algorithm: String,
    /// Logical id of the master key used for derivation.
    #[serde(rename = "keyId")]
    pub key_id: String,
}

/// Raw decoded envelope contents, ready for the cipher layer.
pub(crate) struct DecodedEnvelope {
    pub data: Vec<u8>,
    pub iv: [u8; IV_LEN],
    pub salt: [u8; SALT_LEN],
    pub tag: [u8; TAG_LEN],
}

impl EncryptedField {
    /// Assemble an envelope from raw bytes.
    pub(crate) fn encode(
        data: &[u8],
        iv: &[u8; IV_LEN],
        salt: &[u8; SALT_LEN],
        tag: &[u8],
        key_id: &str,
    ) -> Self {
        Self {
            data: STANDARD.encode(data),
            iv: STANDARD.encode(iv),
            salt: STANDARD.encode(salt),
            tag: STANDARD.encode(tag),
            algorithm: ALGORITHM.to_owned(),
            key_id: key_id.to_owned(),
        }
    }

    /// Base64-decode and length-check all byte fields.
    ///
    /// # Errors
    ///
    /// Returns [`DecryptionError::UnsupportedAlgorithm`] if `algorithm` does
    /// not match [`ALGORITHM`], and [`DecryptionError::InvalidBase64`] /
    /// [`DecryptionError::InvalidLength`] naming the offending field.
    pub(crate) fn decode(&self) -> Result<DecodedEnvelope, DecryptionError> {
        if self.algorithm != ALGORITHM {
            return Err(DecryptionError::UnsupportedAlgorithm(self.algorithm.clone()));
        }

        let data = STANDARD
            .decode(&self.data)
            .map_err(|_| DecryptionError::InvalidBase64("data"))?;

        Ok(DecodedEnvelope {
            data,
            iv: decode_exact::<IV_LEN>("iv", &self.iv)?,
            salt: decode_exact::<SALT_LEN>("salt", &self.salt)?,
            tag: decode_exact::<TAG_LEN>("tag", &self.tag)?,
        })
    }
}

/// Decode a base64 field that must be exactly `N` bytes long.
fn decode_exact<const N: usize>(field: &'static str, value: &str) -> Result<[u8; N], DecryptionError> {
    let bytes = STANDARD
        .decode(value)
        .map_err(|_| DecryptionError::InvalidBase64(field))?;
    if bytes.len() != N {
        return Err(DecryptionError::InvalidLength {
            field,
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}
