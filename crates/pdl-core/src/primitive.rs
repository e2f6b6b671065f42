//! Leaf parameter kinds.
//!
//! Most leaves are instances of the generic [`Primitive`] holding a single
//! value. Leaves with extra structure (paths, ranges, selections,
//! dimensioned scalars, opaque payloads) have dedicated types.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    error::{ParameterError, Result},
    matrix::Matrix,
    meta::Meta,
    units,
};

/// A leaf holding one value of type `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive<T> {
    value: T,
    meta: Meta,
}

impl<T> Primitive<T> {
    /// Creates a leaf initialised to `value`.
    pub fn new(value: T, meta: Meta) -> Self {
        Self { value, meta }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Replaces the stored value.
    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }
}

pub type BoolParameter = Primitive<bool>;
pub type IntParameter = Primitive<i64>;
pub type DoubleParameter = Primitive<f64>;
pub type StringParameter = Primitive<String>;
pub type DateParameter = Primitive<NaiveDate>;
pub type DateTimeParameter = Primitive<NaiveDateTime>;
pub type VectorParameter = Primitive<Vec<f64>>;
pub type MatrixParameter = Primitive<Matrix>;

/// A file or directory path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathParameter {
    path: PathBuf,
    directory: bool,
    meta: Meta,
}

impl PathParameter {
    pub fn file(path: impl Into<PathBuf>, meta: Meta) -> Self {
        Self {
            path: path.into(),
            directory: false,
            meta,
        }
    }

    pub fn directory(path: impl Into<PathBuf>, meta: Meta) -> Self {
        Self {
            path: path.into(),
            directory: true,
            meta,
        }
    }

    pub fn value(&self) -> &PathBuf {
        &self.path
    }

    pub fn set(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    /// Returns `true` if this parameter names a directory rather than a file.
    pub fn is_directory(&self) -> bool {
        self.directory
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }
}

/// A set of distinct values kept in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleRangeParameter {
    values: Vec<f64>,
    meta: Meta,
}

impl DoubleRangeParameter {
    pub fn new(values: Vec<f64>, meta: Meta) -> Self {
        Self {
            values: normalize_range(values),
            meta,
        }
    }

    pub fn value(&self) -> &Vec<f64> {
        &self.values
    }

    /// Replaces the stored values, sorting them and dropping duplicates.
    pub fn set(&mut self, values: Vec<f64>) {
        self.values = normalize_range(values);
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }
}

fn normalize_range(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

/// One label chosen from a fixed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionParameter {
    items: Vec<String>,
    selected: usize,
    meta: Meta,
}

impl SelectionParameter {
    /// Creates a selection over `items` with `default` selected.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::UnknownSelection`] if `default` is not one
    /// of `items`.
    pub fn new<I, S>(items: I, default: &str, meta: Meta) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        let mut selection = Self {
            items,
            selected: 0,
            meta,
        };
        selection.set_selection(default)?;
        Ok(selection)
    }

    /// Selects `label`.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::UnknownSelection`] if `label` is not one of
    /// the items; the current selection is left unchanged.
    pub fn set_selection(&mut self, label: &str) -> Result<()> {
        match self.items.iter().position(|item| item == label) {
            Some(index) => {
                self.selected = index;
                Ok(())
            }
            None => Err(ParameterError::UnknownSelection {
                name: self.meta.description().to_string(),
                selection: label.to_string(),
                options: self.items.join(", "),
            }),
        }
    }

    /// Returns the selected label.
    pub fn selection(&self) -> &str {
        self.items
            .get(self.selected)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn index(&self) -> usize {
        self.selected
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }
}

/// A physical quantity stored in SI units.
///
/// The default unit is only used for presentation; every value exchanged
/// through [`value`](Self::value) and [`set`](Self::set) is in SI.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionedParameter {
    value: f64,
    quantity: String,
    unit: String,
    meta: Meta,
}

impl DimensionedParameter {
    /// Creates a parameter from a value expressed in `unit`.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::UnknownUnit`] if `unit` is not a known unit
    /// of `quantity`.
    pub fn new(quantity: &str, value: f64, unit: &str, meta: Meta) -> Result<Self> {
        let factor = unit_factor(quantity, unit)?;
        Ok(Self {
            value: value * factor,
            quantity: quantity.to_string(),
            unit: unit.to_string(),
            meta,
        })
    }

    /// Returns the value in SI units.
    pub fn value(&self) -> &f64 {
        &self.value
    }

    /// Sets the value in SI units.
    pub fn set(&mut self, value: f64) {
        self.value = value;
    }

    /// Returns the value converted to the default unit.
    pub fn in_default_unit(&self) -> Result<f64> {
        Ok(self.value / unit_factor(&self.quantity, &self.unit)?)
    }

    /// Sets the value from an amount expressed in the default unit.
    pub fn set_in_default_unit(&mut self, value: f64) -> Result<()> {
        self.value = value * unit_factor(&self.quantity, &self.unit)?;
        Ok(())
    }

    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }
}

fn unit_factor(quantity: &str, unit: &str) -> Result<f64> {
    units::lookup(quantity, unit).ok_or_else(|| ParameterError::UnknownUnit {
        quantity: quantity.to_string(),
        unit: unit.to_string(),
    })
}

/// A leaf whose payload is interpreted by an external collaborator.
///
/// Instances are created through [`OpaqueRegistry`](crate::OpaqueRegistry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueParameter {
    type_key: String,
    qualifier: String,
    payload: String,
    meta: Meta,
}

impl OpaqueParameter {
    pub(crate) fn new(type_key: &str, qualifier: &str, payload: String, meta: Meta) -> Self {
        Self {
            type_key: type_key.to_string(),
            qualifier: qualifier.to_string(),
            payload,
            meta,
        }
    }

    /// Returns the factory key this parameter was created with.
    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    /// Returns the kind-specific qualifier, e.g. the library name of a
    /// property library selection.
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn value(&self) -> &String {
        &self.payload
    }

    pub fn set(&mut self, payload: impl Into<String>) {
        self.payload = payload.into();
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_primitive_set() {
        let mut p = IntParameter::new(5, Meta::new("count"));
        assert_eq!(*p.value(), 5);
        p.set(7);
        assert_eq!(*p.value(), 7);
        assert_eq!(p.meta().description(), "count");
    }

    #[test]
    fn test_double_range_sorted_and_unique() {
        let mut range = DoubleRangeParameter::new(vec![3.0, 1.0, 3.0, 2.0], Meta::default());
        assert_eq!(range.value(), &vec![1.0, 2.0, 3.0]);

        range.set(vec![0.5, 0.5]);
        assert_eq!(range.value(), &vec![0.5]);
    }

    #[test]
    fn test_selection_rejects_unknown_label() {
        let mut sel =
            SelectionParameter::new(["laminar", "turbulent"], "laminar", Meta::new("regime"))
                .unwrap();
        assert_eq!(sel.selection(), "laminar");

        sel.set_selection("turbulent").unwrap();
        assert_eq!(sel.selection(), "turbulent");
        assert_eq!(sel.index(), 1);

        let err = sel.set_selection("inviscid").unwrap_err();
        assert!(matches!(err, ParameterError::UnknownSelection { .. }));
        assert_eq!(sel.selection(), "turbulent");
    }

    #[test]
    fn test_selection_invalid_default() {
        let result = SelectionParameter::new(["a", "b"], "c", Meta::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_dimensioned_stores_si() {
        let mut length = DimensionedParameter::new("length", 250.0, "mm", Meta::default()).unwrap();
        assert_approx_eq!(f64, *length.value(), 0.25);
        assert_approx_eq!(f64, length.in_default_unit().unwrap(), 250.0);

        length.set_in_default_unit(1000.0).unwrap();
        assert_approx_eq!(f64, *length.value(), 1.0);
    }

    #[test]
    fn test_dimensioned_unknown_unit() {
        let err = DimensionedParameter::new("length", 1.0, "furlong", Meta::default()).unwrap_err();
        assert_eq!(
            err,
            ParameterError::UnknownUnit {
                quantity: "length".to_string(),
                unit: "furlong".to_string(),
            }
        );
    }

    #[test]
    fn test_path_directory_flag() {
        let dir = PathParameter::directory("out", Meta::default());
        assert!(dir.is_directory());
        let file = PathParameter::file("mesh.stl", Meta::default());
        assert!(!file.is_directory());
        assert_eq!(file.value(), &PathBuf::from("mesh.stl"));
    }
}
