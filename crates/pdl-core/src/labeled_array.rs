//! String-keyed parameter maps.

use indexmap::IndexMap;
use log::debug;

use crate::{
    array::ArrayParameter,
    error::{ParameterError, Result},
    meta::Meta,
    parameter::Parameter,
    primitive::StringParameter,
    set::ParameterSet,
};

/// Where the keys of a labeled array come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Keys are generated from a pattern in which `%d` is replaced by an index.
    Pattern(String),
    /// Keys are the runtime values of another parameter, addressed by path.
    Reference(String),
}

/// Formats the key at `index` for `pattern`.
///
/// A pattern without `%d` gets the index appended.
///
/// # Examples
///
/// ```
/// use pdl_core::pattern_key;
///
/// assert_eq!(pattern_key("zone_%d", 2), "zone_2");
/// assert_eq!(pattern_key("zone", 2), "zone2");
/// ```
pub fn pattern_key(pattern: &str, index: usize) -> String {
    if pattern.contains("%d") {
        pattern.replacen("%d", &index.to_string(), 1)
    } else {
        format!("{pattern}{index}")
    }
}

/// A map from string keys to parameters sharing one element schema.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArrayParameter {
    key_source: KeySource,
    prototype: Box<Parameter>,
    entries: IndexMap<String, Parameter>,
    meta: Meta,
}

impl LabeledArrayParameter {
    /// Creates an empty map whose entries default to `prototype`.
    pub fn new(key_source: KeySource, prototype: impl Into<Parameter>, meta: Meta) -> Self {
        Self {
            key_source,
            prototype: Box::new(prototype.into()),
            entries: IndexMap::new(),
            meta,
        }
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn key_source(&self) -> &KeySource {
        &self.key_source
    }

    pub fn prototype(&self) -> &Parameter {
        &self.prototype
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.entries.iter().map(|(key, p)| (key.as_str(), p))
    }

    /// Inserts `parameter` under `key`, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        parameter: impl Into<Parameter>,
    ) -> Option<Parameter> {
        self.entries.insert(key.into(), parameter.into())
    }

    /// Returns the entry under `key`, inserting a prototype clone first if it
    /// does not exist.
    pub fn get_or_insert_default(&mut self, key: &str) -> &mut Parameter {
        let prototype = &self.prototype;
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| (**prototype).clone())
    }

    /// Returns the entry under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::MissingChild`] if there is no such entry.
    pub fn get(&self, key: &str) -> Result<&Parameter> {
        self.entries
            .get(key)
            .ok_or_else(|| ParameterError::MissingChild {
                container: self.meta.description().to_string(),
                name: key.to_string(),
            })
    }

    /// Mutable counterpart of [`get`](Self::get).
    pub fn get_mut(&mut self, key: &str) -> Result<&mut Parameter> {
        self.entries
            .get_mut(key)
            .ok_or_else(|| ParameterError::MissingChild {
                container: self.meta.description().to_string(),
                name: key.to_string(),
            })
    }

    pub fn remove(&mut self, key: &str) -> Option<Parameter> {
        self.entries.shift_remove(key)
    }

    /// Removes every entry whose key does not satisfy `keep`.
    pub fn retain_keys<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.entries.retain(|key, _| keep(key.as_str()));
    }

    /// Inserts `count` prototype entries with keys generated from the pattern.
    ///
    /// Does nothing for a reference key source.
    pub fn insert_default_entries(&mut self, count: usize) {
        if let KeySource::Pattern(pattern) = &self.key_source {
            let keys: Vec<String> = (0..count).map(|i| pattern_key(pattern, i)).collect();
            for key in keys {
                self.get_or_insert_default(&key);
            }
        }
    }

    /// Returns the first pattern key that is not yet in use.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::KeysExhausted`] for a reference key source,
    /// or when a pattern without `%d` is already in use.
    pub fn find_unique_new_key(&self) -> Result<String> {
        let KeySource::Pattern(pattern) = &self.key_source else {
            return Err(ParameterError::KeysExhausted(String::new()));
        };
        if !pattern.contains("%d") && !self.entries.contains_key(pattern) {
            return Ok(pattern.clone());
        }
        (0..=self.entries.len())
            .map(|i| pattern_key(pattern, i))
            .find(|key| !self.entries.contains_key(key))
            .ok_or_else(|| ParameterError::KeysExhausted(pattern.clone()))
    }

    /// Makes the key set equal to `keys`, keeping existing entries,
    /// inserting prototype clones for new keys and removing the rest.
    pub fn sync_keys<'k, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'k str>,
    {
        let keys: Vec<&str> = keys.into_iter().collect();
        for key in &keys {
            self.get_or_insert_default(key);
        }
        let before = self.entries.len();
        self.retain_keys(|key| keys.contains(&key));
        debug!(
            kept = self.entries.len(),
            removed = before - self.entries.len();
            "Synchronised labeled array keys"
        );
    }

    /// Synchronises the keys with the parameter named by a reference key
    /// source, resolved relative to `root`.
    ///
    /// The referenced parameter may be an array of strings (its values
    /// become the keys) or another labeled array (its keys are copied). For
    /// a pattern key source this is a no-op.
    pub fn sync_keys_from(&mut self, root: &ParameterSet) -> Result<()> {
        let KeySource::Reference(path) = &self.key_source else {
            return Ok(());
        };
        let source = root.get_path(path)?;
        let keys = referenced_keys(source)?;
        self.sync_keys(keys.iter().map(String::as_str));
        Ok(())
    }
}

fn referenced_keys(source: &Parameter) -> Result<Vec<String>> {
    match source {
        Parameter::LabeledArray(array) => Ok(array.keys().map(str::to_string).collect()),
        Parameter::Array(array) => array_keys(array),
        other => Err(ParameterError::KindMismatch {
            expected: "array",
            found: other.kind(),
        }),
    }
}

fn array_keys(array: &ArrayParameter) -> Result<Vec<String>> {
    array
        .iter()
        .map(|element| {
            element
                .downcast_ref::<StringParameter>()
                .map(|s| s.value().clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::IntParameter;

    fn int_map(key_source: KeySource) -> LabeledArrayParameter {
        LabeledArrayParameter::new(
            key_source,
            IntParameter::new(0, Meta::default()),
            Meta::new("zones"),
        )
    }

    #[test]
    fn test_default_entries_from_pattern() {
        let mut map = int_map(KeySource::Pattern("zone_%d".to_string()));
        map.insert_default_entries(3);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["zone_0", "zone_1", "zone_2"]);
    }

    #[test]
    fn test_reference_mode_has_no_default_entries() {
        let mut map = int_map(KeySource::Reference("names".to_string()));
        map.insert_default_entries(3);
        assert!(map.is_empty());
    }

    #[test]
    fn test_retain_keys() {
        let mut map = int_map(KeySource::Pattern("k%d".to_string()));
        for key in ["a", "b", "c"] {
            map.get_or_insert_default(key);
        }
        map.retain_keys(|key| key != "b");
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_find_unique_new_key() {
        let mut map = int_map(KeySource::Pattern("zone_%d".to_string()));
        map.get_or_insert_default("zone_0");
        map.get_or_insert_default("zone_2");
        assert_eq!(map.find_unique_new_key().unwrap(), "zone_1");

        let reference = int_map(KeySource::Reference("names".to_string()));
        assert!(reference.find_unique_new_key().is_err());
    }

    #[test]
    fn test_sync_keys_from_string_array() {
        let mut names = ArrayParameter::new(
            StringParameter::new(String::new(), Meta::default()),
            Meta::default(),
        );
        for name in ["inlet", "outlet"] {
            names.push(StringParameter::new(name.to_string(), Meta::default()));
        }
        let mut root = ParameterSet::default();
        root.insert("names", names);

        let mut map = int_map(KeySource::Reference("names".to_string()));
        map.get_or_insert_default("wall");
        map.sync_keys_from(&root).unwrap();

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["inlet", "outlet"]);
    }

    proptest::proptest! {
        #[test]
        fn prop_default_entries_are_distinct(count in 0usize..64) {
            let mut map = int_map(KeySource::Pattern("zone_%d".to_string()));
            map.insert_default_entries(count);
            proptest::prop_assert_eq!(map.len(), count);
            proptest::prop_assert!(
                map.find_unique_new_key().map_or(false, |key| !map.contains(&key))
            );
        }
    }
}
