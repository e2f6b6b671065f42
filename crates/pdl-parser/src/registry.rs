//! The table of parameter types known to the parser.

use indexmap::IndexMap;
use log::debug;

use crate::rules::{self, Rule};

/// Maps each type keyword (`int`, `array`, `selectablesubset`, ...) to the
/// rule parsing the body that follows it.
///
/// The grammar never names a parameter type itself; it reads a keyword and
/// delegates to the registered rule. Every built-in parameter kind
/// registers itself from [`Registry::with_builtin_kinds`]; further kinds are
/// added with [`Registry::register`] using the parsers of [`crate::rule`].
#[derive(Debug, Clone)]
pub struct Registry {
    rules: IndexMap<&'static str, Rule>,
}

impl Registry {
    /// Creates a registry without any parameter type.
    pub fn empty() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    /// Creates a registry holding every built-in parameter type.
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::empty();
        rules::primitive::register(&mut registry);
        rules::container::register(&mut registry);
        rules::record::register(&mut registry);
        rules::variant::register(&mut registry);
        debug!(kinds = registry.rules.len(); "Parameter types registered");
        registry
    }

    /// Registers `rule` for `keyword`, replacing any previous rule.
    pub fn register(&mut self, keyword: &'static str, rule: Rule) {
        if self.rules.insert(keyword, rule).is_some() {
            debug!(keyword; "Replaced parameter type rule");
        }
    }

    /// Returns the rule registered for `keyword`.
    pub fn rule(&self, keyword: &str) -> Option<Rule> {
        self.rules.get(keyword).copied()
    }

    /// Returns `true` if `keyword` names a registered parameter type.
    pub fn contains(&self, keyword: &str) -> bool {
        self.rules.contains_key(keyword)
    }

    /// Returns the registered keywords in registration order.
    pub fn keywords(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtin_kinds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keywords() {
        let registry = Registry::with_builtin_kinds();
        for keyword in [
            "bool",
            "int",
            "double",
            "string",
            "path",
            "directory",
            "date",
            "datetime",
            "dimensioned",
            "doublerange",
            "vector",
            "matrix",
            "selection",
            "cadgeometry",
            "propertylibraryselection",
            "array",
            "labeledarray",
            "set",
            "selectablesubset",
            "includedset",
        ] {
            assert!(registry.contains(keyword), "missing `{keyword}`");
        }
        assert!(!registry.contains("integer"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::empty();
        assert_eq!(registry.keywords().count(), 0);
        assert!(registry.rule("int").is_none());
    }
}
