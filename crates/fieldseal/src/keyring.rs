//! [`Keyring`]: the `key id -> master key` lookup behind every envelope.
//!
//! Single-key deployments hold one entry stamped `"default"`. Key rotation is
//! additive: [`Keyring::rotate`] installs a new active key while retaining
//! retired keys, so envelopes produced under an old key id keep decrypting
//! until they are re-encrypted.

use std::{collections::HashMap, sync::Arc};

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::config::Config;

/// Errors from the keyring.
#[derive(Debug, Error)]
pub enum KeyringError {
    /// The requested key id has no entry in the ring.
    #[error("unknown key id: {0}")]
    UnknownKeyId(String),
}

/// Master key material.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which the secret lives in RAM.
pub struct MasterKey(Box<[u8]>);

impl MasterKey {
    /// Wrap raw secret bytes.
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        Self(bytes.as_ref().to_vec().into_boxed_slice())
    }

    /// Borrow the raw secret bytes for key derivation.
    pub fn reveal(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("MasterKey([REDACTED])")
    }
}

struct KeyringState {
    active: String,
    keys: HashMap<String, Arc<MasterKey>>,
}

/// Shared, lock-free `key id -> master key` lookup with one active key.
///
/// Reads never block; rotation atomically swaps in a new state so concurrent
/// encrypt/decrypt calls see either the old ring or the new one, never a
/// half-updated map.
#[derive(Clone)]
pub struct Keyring {
    inner: Arc<ArcSwap<KeyringState>>,
}

impl Keyring {
    /// Create a ring holding a single active key.
    pub fn single(key_id: impl Into<String>, master: MasterKey) -> Self {
        let active = key_id.into();
        let mut keys = HashMap::new();
        keys.insert(active.clone(), Arc::new(master));
        Self {
            inner: Arc::new(ArcSwap::new(Arc::new(KeyringState { active, keys }))),
        }
    }

    /// Build a single-key ring from validated [`Config`].
    pub fn from_config(cfg: &Config) -> Self {
        Self::single(cfg.key_id.clone(), MasterKey::new(cfg.master_key.as_bytes()))
    }

    /// The id of the active key.
    pub fn active_id(&self) -> String {
        self.inner.load().active.clone()
    }

    /// The active key and its id, used for all new encryptions.
    pub fn active(&self) -> (String, Arc<MasterKey>) {
        let state = self.inner.load();
        let key = state.keys[&state.active].clone();
        (state.active.clone(), key)
    }

    /// Look up a key by id.
    ///
    /// # Errors
    ///
    /// Returns [`KeyringError::UnknownKeyId`] if `key_id` is not present.
    pub fn get(&self, key_id: &str) -> Result<Arc<MasterKey>, KeyringError> {
        self.inner
            .load()
            .keys
            .get(key_id)
            .cloned()
            .ok_or_else(|| KeyringError::UnknownKeyId(key_id.to_owned()))
    }

    /// Install a new active key, retaining all existing keys for decryption.
    ///
    /// Rotating to an id that already exists replaces that entry's material.
    pub fn rotate(&self, key_id: impl Into<String>, master: MasterKey) {
        let key_id = key_id.into();
        let current = self.inner.load();
        let mut keys = current.keys.clone();
        keys.insert(key_id.clone(), Arc::new(master));
        self.inner.store(Arc::new(KeyringState {
            active: key_id,
            keys,
        }));
    }

    /// Number of keys (active + retired) in the ring.
    pub fn len(&self) -> usize {
        self.inner.load().keys.len()
    }

    /// Returns `true` if the ring holds no keys. Never true for a ring built
    /// via [`Keyring::single`] or [`Keyring::from_config`].
    pub fn is_empty(&self) -> bool {
        self.inner.load().keys.is_empty()
    }
}

impl std::fmt::Debug for Keyring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.load();
        f.debug_struct("Keyring")
            .field("active", &state.active)
            .field("keys", &state.keys.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_key_ring() {
        let ring = Keyring::single("default", MasterKey::new(b"master"));
        assert_eq!(ring.active_id(), "default");
        assert_eq!(ring.len(), 1);
        assert!(ring.get("default").is_ok());
        assert!(ring.get("other").is_err());
    }

    #[test]
    fn rotate_retains_retired_keys() {
        let ring = Keyring::single("2025", MasterKey::new(b"old-master"));
        ring.rotate("2026", MasterKey::new(b"new-master"));

        assert_eq!(ring.active_id(), "2026");
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.get("2025").unwrap().reveal(), b"old-master");
        assert_eq!(ring.get("2026").unwrap().reveal(), b"new-master");
    }

    #[test]
    fn rotate_to_same_id_replaces_material() {
        let ring = Keyring::single("default", MasterKey::new(b"first"));
        ring.rotate("default", MasterKey::new(b"second"));
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.get("default").unwrap().reveal(), b"second");
    }

    #[test]
    fn clones_share_state() {
        let ring = Keyring::single("a", MasterKey::new(b"master-a"));
        let clone = ring.clone();
        ring.rotate("b", MasterKey::new(b"master-b"));
        assert_eq!(clone.active_id(), "b");
    }

    #[test]
    fn master_key_redacted_in_debug() {
        let key = MasterKey::new(b"super secret");
        assert!(format!("{key:?}").contains("REDACTED"));

        let ring = Keyring::single("default", key);
        let rendered = format!("{ring:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("default"));
    }
}
