//! Tagged unions of parameter sets.

use indexmap::{IndexMap, map::Entry};

use crate::{
    error::{ParameterError, Result},
    meta::Meta,
    set::ParameterSet,
};

/// A selector plus one parameter set per case.
///
/// Every case stays addressable; the selector decides which one is active.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectableSubsetParameter {
    selection: String,
    cases: IndexMap<String, ParameterSet>,
    meta: Meta,
}

impl SelectableSubsetParameter {
    /// Creates a subset without cases.
    pub fn new(meta: Meta) -> Self {
        Self {
            selection: String::new(),
            cases: IndexMap::new(),
            meta,
        }
    }

    /// Adds or replaces the case `label`.
    ///
    /// The first case added becomes the selection.
    pub fn add_case(&mut self, label: impl Into<String>, subset: ParameterSet) {
        let label = label.into();
        if self.cases.is_empty() {
            self.selection = label.clone();
        }
        self.cases.insert(label, subset);
    }

    /// Builder variant of [`add_case`](Self::add_case).
    pub fn with_case(mut self, label: impl Into<String>, subset: ParameterSet) -> Self {
        self.add_case(label, subset);
        self
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Returns the active case label.
    pub fn selection(&self) -> &str {
        &self.selection
    }

    /// Activates the case `label`.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::UnknownSelection`] if there is no such case.
    pub fn set_selection(&mut self, label: &str) -> Result<()> {
        if !self.cases.contains_key(label) {
            return Err(self.unknown(label));
        }
        self.selection = label.to_string();
        Ok(())
    }

    /// Iterates over the case labels in declaration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cases.keys().map(String::as_str)
    }

    /// Returns the parameter set of case `label`, whether active or not.
    pub fn subset(&self, label: &str) -> Result<&ParameterSet> {
        self.cases.get(label).ok_or_else(|| self.unknown(label))
    }

    /// Mutable counterpart of [`subset`](Self::subset).
    pub fn subset_mut(&mut self, label: &str) -> Result<&mut ParameterSet> {
        let err = self.unknown(label);
        self.cases.get_mut(label).ok_or(err)
    }

    /// Returns the parameter set of the active case.
    pub fn active(&self) -> Result<&ParameterSet> {
        self.subset(&self.selection)
    }

    /// Mutable counterpart of [`active`](Self::active).
    pub fn active_mut(&mut self) -> Result<&mut ParameterSet> {
        let label = self.selection.clone();
        self.subset_mut(&label)
    }

    /// Merges the cases of `other` into this subset.
    ///
    /// Cases present on both sides are merged; new cases are appended. The
    /// current selection is kept.
    pub fn merge_from(&mut self, other: SelectableSubsetParameter) -> Result<()> {
        for (label, subset) in other.cases {
            match self.cases.entry(label) {
                Entry::Occupied(mut entry) => entry.get_mut().merge_from(subset)?,
                Entry::Vacant(entry) => {
                    entry.insert(subset);
                }
            }
        }
        if self.selection.is_empty() {
            self.selection = other.selection;
        }
        Ok(())
    }

    fn unknown(&self, label: &str) -> ParameterError {
        ParameterError::UnknownSelection {
            name: self.meta.description().to_string(),
            selection: label.to_string(),
            options: self.cases.keys().cloned().collect::<Vec<_>>().join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::DoubleParameter;

    fn case(field: &str, value: f64) -> ParameterSet {
        let mut set = ParameterSet::default();
        set.insert(field, DoubleParameter::new(value, Meta::default()));
        set
    }

    fn shape() -> SelectableSubsetParameter {
        SelectableSubsetParameter::new(Meta::new("shape"))
            .with_case("circle", case("r", 1.0))
            .with_case("square", case("s", 2.0))
    }

    #[test]
    fn test_first_case_selected() {
        let shape = shape();
        assert_eq!(shape.selection(), "circle");
        assert!(shape.active().unwrap().contains("r"));
    }

    #[test]
    fn test_switch_selection_keeps_cases() {
        let mut shape = shape();
        shape.set_selection("square").unwrap();
        assert!(shape.active().unwrap().contains("s"));
        assert!(shape.subset("circle").unwrap().contains("r"));
    }

    #[test]
    fn test_unknown_selection() {
        let mut shape = shape();
        let err = shape.set_selection("triangle").unwrap_err();
        assert_eq!(
            err,
            ParameterError::UnknownSelection {
                name: "shape".to_string(),
                selection: "triangle".to_string(),
                options: "circle, square".to_string(),
            }
        );
        assert_eq!(shape.selection(), "circle");
    }

    #[test]
    fn test_merge_cases() {
        let mut existing = shape();
        existing.set_selection("square").unwrap();
        let incoming = SelectableSubsetParameter::new(Meta::default())
            .with_case("circle", case("d", 2.0))
            .with_case("hexagon", case("a", 1.0));

        existing.merge_from(incoming).unwrap();

        assert_eq!(
            existing.labels().collect::<Vec<_>>(),
            vec!["circle", "square", "hexagon"]
        );
        let circle = existing.subset("circle").unwrap();
        assert!(circle.contains("r") && circle.contains("d"));
        assert_eq!(existing.selection(), "square");
    }
}
