//! [`FieldEncryptor`]: single-value encryption and decryption against a keyring.

use std::sync::Arc;

use thiserror::Error;

use fieldseal_core::{cipher, DecryptionError, EncryptedField, EncryptionError};

use crate::keyring::Keyring;

/// Errors from re-encrypting an envelope onto the active key.
#[derive(Debug, Error)]
pub enum ReencryptError {
    /// The existing envelope could not be decrypted.
    #[error(transparent)]
    Decrypt(#[from] DecryptionError),

    /// Sealing under the active key failed.
    #[error(transparent)]
    Encrypt(#[from] EncryptionError),
}

/// Field-level encryptor bound to a [`Keyring`].
///
/// Construct one at application startup and pass it to every caller that
/// needs encryption. All operations are pure synchronous computations over
/// immutable key material; concurrent calls need no coordination.
#[derive(Clone, Debug)]
pub struct FieldEncryptor {
    keyring: Keyring,
}

impl FieldEncryptor {
    /// Create an encryptor over `keyring`.
    pub fn new(keyring: Keyring) -> Self {
        Self { keyring }
    }

    /// The keyring backing this encryptor.
    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }

    /// Encrypt a plaintext string under the active key.
    ///
    /// Each call draws a fresh salt and IV, so encrypting the same plaintext
    /// twice yields two different envelopes that decrypt identically.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::Aead`] if the cipher rejects the input.
    pub fn encrypt_field(&self, plaintext: &str) -> Result<EncryptedField, EncryptionError> {
        let (key_id, master) = self.keyring.active();
        cipher::encrypt_value(master.reveal(), &key_id, plaintext)
    }

    /// Encrypt a plaintext string under a specific key id.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::UnknownKeyId`] if `key_id` has no material
    /// in the keyring.
    pub fn encrypt_field_with(
        &self,
        key_id: &str,
        plaintext: &str,
    ) -> Result<EncryptedField, EncryptionError> {
        let master = self
            .keyring
            .get(key_id)
            .map_err(|_| EncryptionError::UnknownKeyId(key_id.to_owned()))?;
        cipher::encrypt_value(master.reveal(), key_id, plaintext)
    }

    /// Decrypt an envelope using the master key named by its `keyId`.
    ///
    /// # Errors
    ///
    /// Returns [`DecryptionError::UnknownKeyId`] if the envelope names a key
    /// this ring does not hold, and fails closed on tampered or malformed
    /// envelopes. Callers must not treat failure as an empty value.
    pub fn decrypt_field(&self, field: &EncryptedField) -> Result<String, DecryptionError> {
        let master = self.resolve(&field.key_id)?;
        cipher::decrypt_value(master.reveal(), field)
    }

    /// Decrypt an envelope and re-encrypt its plaintext under the active key.
    ///
    /// The key-rotation companion: after [`Keyring::rotate`], stored
    /// envelopes can be migrated off a retired key one at a time.
    ///
    /// # Errors
    ///
    /// Returns [`ReencryptError`] if either half of the operation fails; on
    /// failure the original envelope remains valid and untouched.
    pub fn reencrypt_field(&self, field: &EncryptedField) -> Result<EncryptedField, ReencryptError> {
        let plaintext = self.decrypt_field(field)?;
        Ok(self.encrypt_field(&plaintext)?)
    }

    fn resolve(&self, key_id: &str) -> Result<Arc<crate::keyring::MasterKey>, DecryptionError> {
        self.keyring
            .get(key_id)
            .map_err(|_| DecryptionError::UnknownKeyId(key_id.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyring::MasterKey;

    fn encryptor(master: &[u8]) -> FieldEncryptor {
        FieldEncryptor::new(Keyring::single("default", MasterKey::new(master)))
    }

    #[test]
    fn round_trip_through_keyring() {
        let enc = encryptor(b"round-trip-master-key");
        let env = enc.encrypt_field("hello world").unwrap();
        assert_eq!(env.key_id, "default");
        assert_eq!(enc.decrypt_field(&env).unwrap(), "hello world");
    }

    #[test]
    fn different_instance_with_other_key_rejects() {
        let enc_a = encryptor(b"master-key-instance-a");
        let enc_b = encryptor(b"master-key-instance-b");
        let env = enc_a.encrypt_field("secret").unwrap();
        assert!(matches!(
            enc_b.decrypt_field(&env),
            Err(DecryptionError::AuthenticationFailed)
        ));
    }

    #[test]
    fn unknown_key_id_is_distinguished_from_tamper() {
        let enc = encryptor(b"unknown-key-id-master");
        let mut env = enc.encrypt_field("x").unwrap();
        env.key_id = "retired-2019".into();
        assert!(matches!(
            enc.decrypt_field(&env),
            Err(DecryptionError::UnknownKeyId(id)) if id == "retired-2019"
        ));
    }

    #[test]
    fn encrypt_with_specific_key_id() {
        let enc = encryptor(b"specific-key-master");
        enc.keyring().rotate("2026", MasterKey::new(b"second-master-key"));

        let env = enc.encrypt_field_with("default", "old-key plaintext").unwrap();
        assert_eq!(env.key_id, "default");
        assert_eq!(enc.decrypt_field(&env).unwrap(), "old-key plaintext");

        assert!(matches!(
            enc.encrypt_field_with("nope", "x"),
            Err(EncryptionError::UnknownKeyId(_))
        ));
    }

    #[test]
    fn old_envelopes_survive_rotation() {
        let enc = encryptor(b"rotation-master-one");
        let old = enc.encrypt_field("sealed before rotation").unwrap();

        enc.keyring().rotate("2026", MasterKey::new(b"rotation-master-two"));

        // Old envelope still decrypts via the retired key.
        assert_eq!(enc.decrypt_field(&old).unwrap(), "sealed before rotation");
        // New envelopes stamp the new active id.
        let new = enc.encrypt_field("sealed after rotation").unwrap();
        assert_eq!(new.key_id, "2026");
    }

    #[test]
    fn reencrypt_moves_envelope_to_active_key() {
        let enc = encryptor(b"reencrypt-master-one");
        let old = enc.encrypt_field("migrate me").unwrap();

        enc.keyring().rotate("2026", MasterKey::new(b"reencrypt-master-two"));
        let migrated = enc.reencrypt_field(&old).unwrap();

        assert_eq!(migrated.key_id, "2026");
        assert_ne!(migrated.data, old.data);
        assert_eq!(enc.decrypt_field(&migrated).unwrap(), "migrate me");
        // The original stays valid until the caller overwrites it.
        assert_eq!(enc.decrypt_field(&old).unwrap(), "migrate me");
    }
}
