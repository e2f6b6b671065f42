//! Ordered, named collections of parameters.

use indexmap::{IndexMap, map::Entry};
use log::debug;

use crate::{
    error::{ParameterError, Result},
    meta::Meta,
    parameter::{Cursor, Parameter},
    path,
};

/// An ordered mapping from names to parameters.
///
/// Iteration follows insertion order, which for generated code is the
/// declaration order of the schema fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    entries: IndexMap<String, Parameter>,
    meta: Meta,
}

impl ParameterSet {
    /// Creates an empty set.
    pub fn new(meta: Meta) -> Self {
        Self {
            entries: IndexMap::new(),
            meta,
        }
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Replaces the metadata, e.g. of an included set placed under a field
    /// with its own description.
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates over `(name, parameter)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.entries.iter().map(|(name, p)| (name.as_str(), p))
    }

    /// Returns the names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Inserts `parameter` under `name`, returning the previous value.
    ///
    /// A replaced entry keeps its position.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        parameter: impl Into<Parameter>,
    ) -> Option<Parameter> {
        self.entries.insert(name.into(), parameter.into())
    }

    /// Inserts `parameter` under `name`, merging it into an existing entry.
    ///
    /// See [`Parameter::merge`] for the merge rules.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::IncompatibleMerge`] if an entry of another
    /// kind already exists under `name`.
    pub fn insert_or_merge(
        &mut self,
        name: impl Into<String>,
        parameter: impl Into<Parameter>,
    ) -> Result<()> {
        let name = name.into();
        let parameter = parameter.into();
        match self.entries.entry(name) {
            Entry::Occupied(mut entry) => {
                debug!(name = entry.key().as_str(); "Merging into existing parameter");
                let name = entry.key().clone();
                entry.get_mut().merge(&name, parameter)
            }
            Entry::Vacant(entry) => {
                entry.insert(parameter);
                Ok(())
            }
        }
    }

    /// Merges every entry of `other` into this set.
    ///
    /// Absent names are appended; present names are merged recursively.
    pub fn merge_from(&mut self, other: ParameterSet) -> Result<()> {
        for (name, parameter) in other.entries {
            self.insert_or_merge(name, parameter)?;
        }
        Ok(())
    }

    /// Removes and returns the entry under `name`, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        self.entries.shift_remove(name)
    }

    /// Returns the entry under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::MissingChild`] if there is no such entry.
    pub fn get(&self, name: &str) -> Result<&Parameter> {
        self.entries.get(name).ok_or_else(|| self.missing(name))
    }

    /// Mutable counterpart of [`get`](Self::get).
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Parameter> {
        self.entries
            .get_mut(name)
            .ok_or_else(|| ParameterError::MissingChild {
                container: self.meta.description().to_string(),
                name: name.to_string(),
            })
    }

    /// Returns the entry under `name`, inserting the result of `make` first
    /// if it does not exist.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `make`.
    pub fn get_or_try_insert_with<F>(&mut self, name: &str, make: F) -> Result<&mut Parameter>
    where
        F: FnOnce() -> Result<Parameter>,
    {
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(make()?)),
        }
    }

    /// Looks up a node by slash-separated path.
    ///
    /// Components address set entries by name, array elements by index,
    /// labeled array entries by key and selectable subsets either through a
    /// case label or, for any other name, through the active case.
    ///
    /// # Errors
    ///
    /// Returns an error if any component cannot be resolved or the path
    /// ends on a selectable subset case rather than a parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdl_core::{IntParameter, Meta, ParameterError, ParameterSet};
    ///
    /// let mut mesh = ParameterSet::new(Meta::default());
    /// mesh.insert("nx", IntParameter::new(10, Meta::default()));
    /// let mut root = ParameterSet::new(Meta::default());
    /// root.insert("mesh", mesh);
    ///
    /// let nx = root.get_path("mesh/nx")?;
    /// assert_eq!(*nx.downcast_ref::<IntParameter>()?.value(), 10);
    /// # Ok::<(), ParameterError>(())
    /// ```
    pub fn get_path(&self, path: &str) -> Result<&Parameter> {
        let mut cursor = Cursor::Set(self);
        for component in path::components(path) {
            cursor = match cursor {
                Cursor::Set(set) => Cursor::Parameter(set.get(component)?),
                Cursor::Parameter(parameter) => parameter.child(component)?,
            };
        }
        match cursor {
            Cursor::Parameter(parameter) => Ok(parameter),
            Cursor::Set(_) => Err(ParameterError::InvalidPath(path.to_string())),
        }
    }

    fn missing(&self, name: &str) -> ParameterError {
        ParameterError::MissingChild {
            container: self.meta.description().to_string(),
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{BoolParameter, IntParameter, StringParameter};

    fn leaf(value: i64) -> Parameter {
        Parameter::from(IntParameter::new(value, Meta::default()))
    }

    fn int_at(set: &ParameterSet, name: &str) -> i64 {
        *set.get(name)
            .unwrap()
            .downcast_ref::<IntParameter>()
            .unwrap()
            .value()
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut set = ParameterSet::default();
        set.insert("z", leaf(1));
        set.insert("a", leaf(2));
        set.insert("m", leaf(3));
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["z", "a", "m"]);

        set.remove("a");
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["z", "m"]);
    }

    #[test]
    fn test_get_missing() {
        let set = ParameterSet::new(Meta::new("mesh"));
        let err = set.get("nx").unwrap_err();
        assert_eq!(
            err,
            ParameterError::MissingChild {
                container: "mesh".to_string(),
                name: "nx".to_string(),
            }
        );
    }

    #[test]
    fn test_get_or_try_insert_with() {
        let mut set = ParameterSet::default();
        set.get_or_try_insert_with("x", || Ok(leaf(1))).unwrap();
        set.get_or_try_insert_with("x", || Ok(leaf(2))).unwrap();
        assert_eq!(int_at(&set, "x"), 1);

        let err = set
            .get_or_try_insert_with("y", || Err(ParameterError::InvalidPath("y".to_string())))
            .unwrap_err();
        assert_eq!(err, ParameterError::InvalidPath("y".to_string()));
        assert!(!set.contains("y"));
    }

    #[test]
    fn test_merge_inserts_absent_and_keeps_present() {
        let mut existing = ParameterSet::default();
        existing.insert("a", leaf(1));

        let mut nested = ParameterSet::default();
        nested.insert("inner", leaf(10));
        existing.insert("sub", nested);

        let mut incoming = ParameterSet::default();
        incoming.insert("a", leaf(100));
        incoming.insert("b", leaf(2));
        let mut incoming_nested = ParameterSet::default();
        incoming_nested.insert("inner", leaf(20));
        incoming_nested.insert("extra", leaf(30));
        incoming.insert("sub", incoming_nested);

        existing.merge_from(incoming).unwrap();

        assert_eq!(existing.names().collect::<Vec<_>>(), vec!["a", "sub", "b"]);
        assert_eq!(int_at(&existing, "a"), 1);
        assert_eq!(int_at(&existing, "b"), 2);
        let sub = existing.get("sub").unwrap().downcast_ref::<ParameterSet>().unwrap();
        assert_eq!(int_at(sub, "inner"), 10);
        assert_eq!(int_at(sub, "extra"), 30);
    }

    #[test]
    fn test_merge_incompatible_kinds() {
        let mut existing = ParameterSet::default();
        existing.insert("a", leaf(1));

        let mut incoming = ParameterSet::default();
        incoming.insert("a", StringParameter::new("x".to_string(), Meta::default()));

        let err = existing.merge_from(incoming).unwrap_err();
        assert!(matches!(err, ParameterError::IncompatibleMerge { .. }));
    }

    #[test]
    fn test_get_path() {
        let mut inner = ParameterSet::default();
        inner.insert("flag", BoolParameter::new(true, Meta::default()));
        let mut root = ParameterSet::default();
        root.insert("run", inner);

        let flag = root.get_path("run/flag").unwrap();
        assert!(*flag.downcast_ref::<BoolParameter>().unwrap().value());

        assert!(root.get_path("run/missing").is_err());
        assert!(root.get_path("").is_err());
        assert!(root.get_path("run/flag/deeper").is_err());
    }
}
