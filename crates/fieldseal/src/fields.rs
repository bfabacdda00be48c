//! Sensitive-field-set definitions and the process-wide registry.
//!
//! A [`FieldSet`] names the record fields considered sensitive for one entity
//! category (e.g. `user_data`). Sets are defined at process start — from the
//! built-in defaults or an external JSON document — and are not mutated at
//! runtime; the registry supports atomic whole-map replacement only.

use std::{collections::HashMap, sync::Arc};

use arc_swap::ArcSwap;
use serde::Deserialize;
use thiserror::Error;

/// Errors from the field-set registry.
#[derive(Debug, Error)]
pub enum FieldSetError {
    /// The requested set name has no entry in the registry.
    #[error("unknown field set: {0}")]
    UnknownSet(String),

    /// An external set definition document could not be parsed.
    #[error("invalid field set definition: {0}")]
    InvalidDefinition(#[from] serde_json::Error),
}

/// A named list of sensitive field names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldSet {
    name: String,
    fields: Vec<String>,
}

impl FieldSet {
    /// Create a set from a name and field names.
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The set's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterate over the field names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    /// Returns `true` if `field` is listed in this set.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Number of field names in the set.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the set lists no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Shared, lock-free registry of field sets keyed by set name.
///
/// Reads never block; [`FieldSetRegistry::replace_all`] atomically swaps in a
/// completely new map.
#[derive(Clone, Debug)]
pub struct FieldSetRegistry {
    inner: Arc<ArcSwap<HashMap<String, Arc<FieldSet>>>>,
}

impl FieldSetRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::new(Arc::new(HashMap::new()))),
        }
    }

    /// Create a registry holding the built-in entity categories.
    ///
    /// - `user_data`: contact and identity fields of a person record.
    /// - `project_data`: owner contact and site fields of a project record.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.replace_all(vec![
            FieldSet::new(
                "user_data",
                ["email", "phone", "address", "date_of_birth"],
            ),
            FieldSet::new(
                "project_data",
                [
                    "owner_name",
                    "owner_email",
                    "owner_phone",
                    "site_address",
                    "parcel_number",
                ],
            ),
        ]);
        registry
    }

    /// Number of sets currently registered.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Returns `true` if no sets are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }

    /// Look up a set by name.
    ///
    /// This is a lock-free read; safe to call on the hot encryption path.
    ///
    /// # Errors
    ///
    /// Returns [`FieldSetError::UnknownSet`] if `name` is not present.
    pub fn get(&self, name: &str) -> Result<Arc<FieldSet>, FieldSetError> {
        self.inner
            .load()
            .get(name)
            .cloned()
            .ok_or_else(|| FieldSetError::UnknownSet(name.to_owned()))
    }

    /// Atomically replace the entire registry contents.
    pub fn replace_all(&self, sets: impl IntoIterator<Item = FieldSet>) {
        let new_map: HashMap<String, Arc<FieldSet>> = sets
            .into_iter()
            .map(|set| (set.name.clone(), Arc::new(set)))
            .collect();
        self.inner.store(Arc::new(new_map));
    }

    /// Parse an external JSON definition document and replace the registry.
    ///
    /// The document maps set names to field-name arrays:
    ///
    /// ```json
    /// { "user_data": ["email", "phone"], "permit_data": ["applicant_ssn"] }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`FieldSetError::InvalidDefinition`] if the document does not
    /// parse; the previous registry contents are retained in that case.
    pub fn load_json(&self, document: &str) -> Result<(), FieldSetError> {
        let parsed: HashMap<String, Vec<String>> = serde_json::from_str(document)?;
        self.replace_all(
            parsed
                .into_iter()
                .map(|(name, fields)| FieldSet::new(name, fields)),
        );
        Ok(())
    }
}

impl Default for FieldSetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
