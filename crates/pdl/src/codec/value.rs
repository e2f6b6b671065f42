//! Dynamically typed mirror of the generated static types.

use std::{collections::BTreeMap, path::PathBuf};

use indexmap::IndexMap;
use pdl_core::{
    Matrix,
    chrono::{NaiveDate, NaiveDateTime},
};

/// A value shaped like the static type generated for a schema node.
///
/// Records hold their base fields first, followed by their own fields,
/// like the flattened view through `Deref` of a generated struct.
#[derive(Debug, Clone, PartialEq)]
pub enum StaticValue {
    Bool(bool),
    Int(i64),
    /// A double or a dimensioned scalar in SI units.
    Double(f64),
    /// A string or the payload of an opaque leaf.
    String(String),
    Path(PathBuf),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// A vector or a double range.
    Doubles(Vec<f64>),
    Matrix(Matrix),
    /// The chosen label of a selection.
    Label(String),
    Record(IndexMap<String, StaticValue>),
    Array(Vec<StaticValue>),
    LabeledArray(BTreeMap<String, StaticValue>),
    /// The active case of a selectable subset and its record.
    Variant {
        case: String,
        value: Box<StaticValue>,
    },
}

impl StaticValue {
    /// Returns the name of this value's shape, as used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            StaticValue::Bool(_) => "bool",
            StaticValue::Int(_) => "int",
            StaticValue::Double(_) => "double",
            StaticValue::String(_) => "string",
            StaticValue::Path(_) => "path",
            StaticValue::Date(_) => "date",
            StaticValue::DateTime(_) => "datetime",
            StaticValue::Doubles(_) => "doubles",
            StaticValue::Matrix(_) => "matrix",
            StaticValue::Label(_) => "label",
            StaticValue::Record(_) => "record",
            StaticValue::Array(_) => "array",
            StaticValue::LabeledArray(_) => "labeledarray",
            StaticValue::Variant { .. } => "variant",
        }
    }

    /// Returns the field `name` of a record.
    pub fn field(&self, name: &str) -> Option<&StaticValue> {
        match self {
            StaticValue::Record(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Mutable counterpart of [`field`](Self::field).
    pub fn field_mut(&mut self, name: &str) -> Option<&mut StaticValue> {
        match self {
            StaticValue::Record(fields) => fields.get_mut(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_access() {
        let mut fields = IndexMap::new();
        fields.insert("x".to_string(), StaticValue::Int(5));
        let mut record = StaticValue::Record(fields);

        assert_eq!(record.field("x"), Some(&StaticValue::Int(5)));
        assert_eq!(record.field("y"), None);
        assert_eq!(StaticValue::Int(1).field("x"), None);

        if let Some(x) = record.field_mut("x") {
            *x = StaticValue::Int(7);
        }
        assert_eq!(record.field("x"), Some(&StaticValue::Int(7)));
        assert_eq!(record.shape(), "record");
    }
}
