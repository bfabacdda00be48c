//! AES-256-GCM encryption and decryption of individual field values.
//!
//! Every call derives a one-off key from the caller's master key and a fresh
//! random salt, so no two encryptions share key or IV material even under the
//! same master key. The ciphertext is bound to a fixed associated-data string;
//! an envelope produced by a different system (or a tampered one) fails tag
//! verification rather than yielding garbage plaintext.

use aes_gcm::{
    aead::{consts::U16, rand_core::RngCore, Aead, KeyInit, OsRng, Payload},
    aes::Aes256,
    AesGcm, Nonce,
};

use crate::envelope::{EncryptedField, IV_LEN, SALT_LEN, TAG_LEN};
use crate::error::{DecryptionError, EncryptionError};
use crate::kdf;

/// AES-256-GCM with a 16-byte IV, matching the envelope format.
type FieldCipher = AesGcm<Aes256, U16>;

/// Associated data bound into every tag. Integrity binding only, not secret.
const ASSOCIATED_DATA: &[u8] = b"fieldseal.field.v1";

/// Encrypt a plaintext string under `master`, stamping `key_id` into the
/// resulting envelope.
///
/// Generates a fresh random [`SALT_LEN`]-byte salt and [`IV_LEN`]-byte IV via
/// the OS CSPRNG, derives a per-operation key with PBKDF2, and seals the
/// plaintext with AES-256-GCM. The authentication tag is stored separately
/// from the ciphertext in the envelope.
///
/// # Errors
///
/// Returns [`EncryptionError::Aead`] if the cipher rejects the input. Never
/// returns a partially filled envelope.
pub fn encrypt_value(
    master: &[u8],
    key_id: &str,
    plaintext: &str,
) -> Result<EncryptedField, EncryptionError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let dek = kdf::derive_key(master, &salt);
    let cipher =
        FieldCipher::new_from_slice(dek.as_bytes()).map_err(|_| EncryptionError::Aead)?;

    let mut sealed = cipher
        .encrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: plaintext.as_bytes(),
                aad: ASSOCIATED_DATA,
            },
        )
        .map_err(|_| EncryptionError::Aead)?;

    // The aead API appends the tag to the ciphertext; the envelope stores
    // them as separate fields.
    let tag = sealed.split_off(sealed.len() - TAG_LEN);

    Ok(EncryptedField::encode(&sealed, &iv, &salt, &tag, key_id))
}

/// Decrypt an [`EncryptedField`] back to its plaintext string.
///
/// Re-derives the per-operation key from `master` and the embedded salt, then
/// runs AES-256-GCM verification-and-decryption with the embedded IV and tag.
///
/// # Errors
///
/// Fails closed: [`DecryptionError::AuthenticationFailed`] on tag mismatch
/// (wrong key or tampered envelope), and the envelope shape errors
/// ([`DecryptionError::InvalidBase64`], [`DecryptionError::InvalidLength`],
/// [`DecryptionError::UnsupportedAlgorithm`]) on malformed fields. No
/// plaintext is ever returned on partial or failed verification.
pub fn decrypt_value(master: &[u8], field: &EncryptedField) -> Result<String, DecryptionError> {
    let decoded = field.decode()?;

    let dek = kdf::derive_key(master, &decoded.salt);
    let cipher = FieldCipher::new_from_slice(dek.as_bytes())
        .map_err(|_| DecryptionError::AuthenticationFailed)?;

    let mut sealed = decoded.data;
    sealed.extend_from_slice(&decoded.tag);

    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(&decoded.iv),
            Payload {
                msg: &sealed,
                aad: ASSOCIATED_DATA,
            },
        )
        .map_err(|_| DecryptionError::AuthenticationFailed)?;

    String::from_utf8(plaintext).map_err(|_| DecryptionError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &[u8] = b"unit-test-master-key-material";

    #[test]
    fn encrypt_decrypt_round_trip() {
        let env = encrypt_value(MASTER, "default", "123-45-6789").unwrap();
        assert_eq!(decrypt_value(MASTER, &env).unwrap(), "123-45-6789");
    }

    #[test]
    fn round_trips_unicode() {
        let plaintext = "Bauherr: Müller, 東京都 🏗";
        let env = encrypt_value(MASTER, "default", plaintext).unwrap();
        assert_eq!(decrypt_value(MASTER, &env).unwrap(), plaintext);
    }

    #[test]
    fn round_trips_empty_string() {
        let env = encrypt_value(MASTER, "default", "").unwrap();
        assert_eq!(decrypt_value(MASTER, &env).unwrap(), "");
    }

    #[test]
    fn ciphertext_is_nondeterministic() {
        let a = encrypt_value(MASTER, "default", "same plaintext").unwrap();
        let b = encrypt_value(MASTER, "default", "same plaintext").unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.data, b.data);
        assert_eq!(decrypt_value(MASTER, &a).unwrap(), "same plaintext");
        assert_eq!(decrypt_value(MASTER, &b).unwrap(), "same plaintext");
    }

    #[test]
    fn wrong_master_key_fails() {
        let env = encrypt_value(MASTER, "default", "secret").unwrap();
        assert!(matches!(
            decrypt_value(b"some-other-master-key", &env),
            Err(DecryptionError::AuthenticationFailed)
        ));
    }

    #[test]
    fn tampered_data_fails_auth() {
        use base64::{engine::general_purpose::STANDARD, Engine as _};

        let env = encrypt_value(MASTER, "default", "tamper me please").unwrap();
        let mut data = STANDARD.decode(&env.data).unwrap();
        data[0] ^= 0x01;
        let tampered = EncryptedField {
            data: STANDARD.encode(&data),
            ..env
        };
        assert!(matches!(
            decrypt_value(MASTER, &tampered),
            Err(DecryptionError::AuthenticationFailed)
        ));
    }

    #[test]
    fn tampered_tag_fails_auth() {
        use base64::{engine::general_purpose::STANDARD, Engine as _};

        let env = encrypt_value(MASTER, "default", "tamper the tag").unwrap();
        let mut tag = STANDARD.decode(&env.tag).unwrap();
        tag[TAG_LEN - 1] ^= 0x80;
        let tampered = EncryptedField {
            tag: STANDARD.encode(&tag),
            ..env
        };
        assert!(matches!(
            decrypt_value(MASTER, &tampered),
            Err(DecryptionError::AuthenticationFailed)
        ));
    }

    #[test]
    fn envelope_carries_algorithm_and_key_id() {
        let env = encrypt_value(MASTER, "kms-2026-01", "x").unwrap();
        assert_eq!(env.algorithm, crate::envelope::ALGORITHM);
        assert_eq!(env.key_id, "kms-2026-01");
    }
}
