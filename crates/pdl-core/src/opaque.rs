//! By-key factory for opaque leaf parameters.
//!
//! Some leaf kinds carry a payload whose meaning is defined outside of this
//! crate (geometry scripts, property library entries). The registry maps a
//! kind key to a factory that validates and normalises the payload; the
//! resulting [`OpaqueParameter`] stores it verbatim.

use indexmap::IndexMap;
use log::trace;

use crate::{
    error::{ParameterError, Result},
    meta::Meta,
    primitive::OpaqueParameter,
};

/// Kind key for CAD geometry script leaves.
pub const CAD_GEOMETRY: &str = "cadgeometry";
/// Kind key for property library selection leaves.
pub const PROPERTY_LIBRARY_SELECTION: &str = "propertylibraryselection";

/// Normalises an opaque payload before it is stored.
pub type OpaqueFactory = fn(&str) -> String;

/// Table of opaque leaf kinds.
#[derive(Debug, Clone, Default)]
pub struct OpaqueRegistry {
    factories: IndexMap<String, OpaqueFactory>,
}

impl OpaqueRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in opaque kinds registered.
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::new();
        registry.register(CAD_GEOMETRY, |script| script.trim().to_string());
        registry.register(PROPERTY_LIBRARY_SELECTION, str::to_string);
        registry
    }

    /// Registers `factory` under `key`, replacing any previous entry.
    pub fn register(&mut self, key: &str, factory: OpaqueFactory) {
        self.factories.insert(key.to_string(), factory);
    }

    /// Returns `true` if `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Creates an opaque leaf of kind `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::UnknownOpaqueKind`] if no factory is
    /// registered under `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdl_core::{Meta, OpaqueRegistry};
    ///
    /// let registry = OpaqueRegistry::with_builtin_kinds();
    /// let leaf = registry
    ///     .create("propertylibraryselection", "fluids", "water", Meta::default())
    ///     .unwrap();
    /// assert_eq!(leaf.qualifier(), "fluids");
    /// assert_eq!(leaf.value(), "water");
    /// ```
    pub fn create(
        &self,
        key: &str,
        qualifier: &str,
        payload: &str,
        meta: Meta,
    ) -> Result<OpaqueParameter> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| ParameterError::UnknownOpaqueKind(key.to_string()))?;
        trace!(key, qualifier; "Creating opaque parameter");
        Ok(OpaqueParameter::new(key, qualifier, factory(payload), meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kinds() {
        let registry = OpaqueRegistry::with_builtin_kinds();
        assert!(registry.contains(CAD_GEOMETRY));
        assert!(registry.contains(PROPERTY_LIBRARY_SELECTION));

        let geometry = registry
            .create(CAD_GEOMETRY, "", "  box = Box(O, 1, 1, 1);\n", Meta::default())
            .unwrap();
        assert_eq!(geometry.value(), "box = Box(O, 1, 1, 1);");
        assert_eq!(geometry.type_key(), CAD_GEOMETRY);
    }

    #[test]
    fn test_unknown_kind() {
        let registry = OpaqueRegistry::new();
        let err = registry
            .create("pointcloud", "", "", Meta::default())
            .unwrap_err();
        assert_eq!(
            err,
            ParameterError::UnknownOpaqueKind("pointcloud".to_string())
        );
    }
}
