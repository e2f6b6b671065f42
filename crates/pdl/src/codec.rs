//! Interpreting codec over the Generator tree.
//!
//! [`Codec`] performs the operations that the emitter writes out as Rust
//! code, directly against the runtime tree of `pdl-core`: the literal
//! default of a node, the construction of its dynamic tree, and the two
//! marshalling directions. Static values are represented by
//! [`StaticValue`].
//!
//! Both implementations follow the same rules:
//!
//! - a derived record handles its base first, then its own fields
//! - arrays are cleared and refilled on `set`, resized on `get`
//! - labeled arrays are pruned to the static keys on `set` and mirror
//!   every dynamic entry on `get`
//! - a variant only marshals its active case
//!
//! Raw initialization code of a record cannot be interpreted and is
//! skipped when building a dynamic tree.

mod value;

use std::{collections::BTreeMap, path::PathBuf};

use indexmap::IndexMap;
use log::{debug, trace};
use pdl_core::{
    ArrayParameter, BoolParameter, DateParameter, DateTimeParameter, DimensionedParameter,
    DoubleParameter, DoubleRangeParameter, IntParameter, KeySource, LabeledArrayParameter,
    MatrixParameter, Meta, OpaqueParameter, OpaqueRegistry, Parameter, ParameterError,
    ParameterSet, PathParameter, SelectableSubsetParameter, SelectionParameter,
    StringParameter, VectorParameter, pattern_key, units,
};
use pdl_parser::{
    Library,
    generator::{Field, Generator, GeneratorKind, Primitive, Record},
};
use thiserror::Error;

use crate::emit::opaque_parts;

pub use value::StaticValue;

/// Errors raised while interpreting a schema.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("value at `{path}` has shape `{found}`, expected `{expected}`")]
    Shape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("record `{path}` has no value for field `{name}`")]
    MissingField { path: String, name: String },

    #[error("unknown document `{0}`")]
    UnknownDocument(String),
}

/// Interprets the documents of a [`Library`].
pub struct Codec<'a> {
    library: &'a Library,
    opaque: OpaqueRegistry,
}

impl<'a> Codec<'a> {
    /// Creates a codec that knows the built-in opaque kinds.
    pub fn new(library: &'a Library) -> Self {
        Self::with_opaque_registry(library, OpaqueRegistry::with_builtin_kinds())
    }

    pub fn with_opaque_registry(library: &'a Library, opaque: OpaqueRegistry) -> Self {
        Self { library, opaque }
    }

    /// Returns the root generator of the document `name`.
    pub fn document(&self, name: &str) -> Result<&'a Generator, CodecError> {
        self.library
            .get(name)
            .map(|document| document.root())
            .ok_or_else(|| CodecError::UnknownDocument(name.to_string()))
    }

    /// Returns the static default of the document `name`.
    pub fn default_document(&self, name: &str) -> Result<StaticValue, CodecError> {
        self.default_value(self.document(name)?)
    }

    /// Builds the default dynamic tree of the document `name`.
    pub fn build_document(&self, name: &str) -> Result<ParameterSet, CodecError> {
        let root = self.document(name)?;
        let set = self.build_set(root)?;
        debug!(document = name, entries = set.len(); "Built default parameter tree");
        Ok(set)
    }

    /// Copies `value` into the dynamic tree `set` of the document `name`.
    pub fn set_document(
        &self,
        name: &str,
        value: &StaticValue,
        set: &mut ParameterSet,
    ) -> Result<(), CodecError> {
        let root = self.document(name)?;
        let (_, record) = self.record_of(root)?;
        let StaticValue::Record(fields) = value else {
            return Err(shape_error(root, "record", value));
        };
        self.record_set(root, record, fields, set)
    }

    /// Copies the dynamic tree `set` of the document `name` into `value`.
    pub fn get_document(
        &self,
        name: &str,
        set: &ParameterSet,
        value: &mut StaticValue,
    ) -> Result<(), CodecError> {
        let root = self.document(name)?;
        let (_, record) = self.record_of(root)?;
        let StaticValue::Record(fields) = value else {
            return Err(shape_error(root, "record", value));
        };
        self.record_get(root, record, set, fields)
    }

    /// Returns the literal default of `generator`.
    pub fn default_value(&self, generator: &Generator) -> Result<StaticValue, CodecError> {
        let value = match &generator.kind {
            GeneratorKind::Primitive(primitive) => self.leaf_default(primitive)?,
            GeneratorKind::Array { element, count } => StaticValue::Array(
                (0..*count)
                    .map(|_| self.default_value(element))
                    .collect::<Result<_, _>>()?,
            ),
            GeneratorKind::LabeledArray {
                element,
                count,
                keys,
            } => {
                let mut entries = BTreeMap::new();
                if let KeySource::Pattern(pattern) = keys {
                    for i in 0..*count {
                        entries.insert(pattern_key(pattern, i), self.default_value(element)?);
                    }
                }
                StaticValue::LabeledArray(entries)
            }
            GeneratorKind::Record(_) | GeneratorKind::Included { .. } => {
                let (_, record) = self.record_of(generator)?;
                StaticValue::Record(self.record_default(record)?)
            }
            GeneratorKind::Variant { cases, default } => {
                let case = find_case(generator, cases, default.inner())?;
                StaticValue::Variant {
                    case: default.inner().clone(),
                    value: Box::new(self.default_value(&case.generator)?),
                }
            }
        };
        Ok(value)
    }

    /// Builds the default dynamic node of `generator`.
    pub fn build_dynamic(&self, generator: &Generator) -> Result<Parameter, CodecError> {
        let meta = meta(generator);
        let parameter = match &generator.kind {
            GeneratorKind::Primitive(primitive) => self.leaf_build(primitive, meta)?,
            GeneratorKind::Array { element, count } => {
                let mut array = ArrayParameter::new(self.build_dynamic(element)?, meta);
                array.resize(*count);
                array.into()
            }
            GeneratorKind::LabeledArray {
                element,
                count,
                keys,
            } => {
                let prototype = self.build_dynamic(element)?;
                let mut array = LabeledArrayParameter::new(keys.clone(), prototype, meta);
                array.insert_default_entries(*count);
                array.into()
            }
            GeneratorKind::Record(_) | GeneratorKind::Included { .. } => {
                self.build_set(generator)?.into()
            }
            GeneratorKind::Variant { cases, default } => {
                let mut subset = SelectableSubsetParameter::new(meta);
                for case in cases {
                    subset.add_case(case.label.inner().as_str(), self.build_set(&case.generator)?);
                }
                subset.set_selection(default.inner())?;
                subset.into()
            }
        };
        Ok(parameter)
    }

    /// Copies `value` into `node` ("set").
    pub fn marshal_to_dynamic(
        &self,
        generator: &Generator,
        value: &StaticValue,
        node: &mut Parameter,
    ) -> Result<(), CodecError> {
        trace!(path = generator.path(); "Marshalling to dynamic");
        match (&generator.kind, value) {
            (GeneratorKind::Primitive(primitive), value) => {
                self.leaf_set(generator, primitive, value, node)
            }
            (GeneratorKind::Array { element, .. }, StaticValue::Array(items)) => {
                let array = node.downcast_mut::<ArrayParameter>()?;
                array.clear();
                for item in items {
                    let mut slot = array.make_element();
                    self.marshal_to_dynamic(element, item, &mut slot)?;
                    array.push(slot);
                }
                Ok(())
            }
            (GeneratorKind::LabeledArray { element, .. }, StaticValue::LabeledArray(entries)) => {
                let array = node.downcast_mut::<LabeledArrayParameter>()?;
                for (key, item) in entries {
                    let slot = array.get_or_insert_default(key);
                    self.marshal_to_dynamic(element, item, slot)?;
                }
                array.retain_keys(|key| entries.contains_key(key));
                Ok(())
            }
            (
                GeneratorKind::Record(_) | GeneratorKind::Included { .. },
                StaticValue::Record(fields),
            ) => {
                let (root, record) = self.record_of(generator)?;
                self.record_set(root, record, fields, node.downcast_mut::<ParameterSet>()?)
            }
            (GeneratorKind::Variant { cases, .. }, StaticValue::Variant { case, value }) => {
                let case_field = find_case(generator, cases, case)?;
                let subset = node.downcast_mut::<SelectableSubsetParameter>()?;
                subset.set_selection(case)?;
                let StaticValue::Record(fields) = value.as_ref() else {
                    return Err(shape_error(&case_field.generator, "record", value));
                };
                let (root, record) = self.record_of(&case_field.generator)?;
                self.record_set(root, record, fields, subset.active_mut()?)
            }
            (_, value) => Err(shape_error(generator, expected_shape(generator), value)),
        }
    }

    /// Copies `node` into `value` ("get").
    pub fn marshal_from_dynamic(
        &self,
        generator: &Generator,
        node: &Parameter,
        value: &mut StaticValue,
    ) -> Result<(), CodecError> {
        trace!(path = generator.path(); "Marshalling from dynamic");
        match &generator.kind {
            GeneratorKind::Primitive(primitive) => {
                *value = leaf_get(primitive, node)?;
                Ok(())
            }
            GeneratorKind::Array { element, .. } => {
                let array = node.downcast_ref::<ArrayParameter>()?;
                let StaticValue::Array(items) = value else {
                    return Err(shape_error(generator, "array", value));
                };
                items.truncate(array.len());
                while items.len() < array.len() {
                    items.push(self.default_value(element)?);
                }
                for (item, slot) in items.iter_mut().zip(array.iter()) {
                    self.marshal_from_dynamic(element, slot, item)?;
                }
                Ok(())
            }
            GeneratorKind::LabeledArray { element, .. } => {
                let array = node.downcast_ref::<LabeledArrayParameter>()?;
                let StaticValue::LabeledArray(entries) = value else {
                    return Err(shape_error(generator, "labeledarray", value));
                };
                for (key, slot) in array.iter() {
                    if !entries.contains_key(key) {
                        entries.insert(key.to_string(), self.default_value(element)?);
                    }
                    if let Some(item) = entries.get_mut(key) {
                        self.marshal_from_dynamic(element, slot, item)?;
                    }
                }
                Ok(())
            }
            GeneratorKind::Record(_) | GeneratorKind::Included { .. } => {
                let (root, record) = self.record_of(generator)?;
                let StaticValue::Record(fields) = value else {
                    return Err(shape_error(generator, "record", value));
                };
                self.record_get(root, record, node.downcast_ref::<ParameterSet>()?, fields)
            }
            GeneratorKind::Variant { cases, .. } => {
                let subset = node.downcast_ref::<SelectableSubsetParameter>()?;
                let label = subset.selection();
                let case = find_case(generator, cases, label)?;
                let mut fresh = self.default_value(&case.generator)?;
                let (root, record) = self.record_of(&case.generator)?;
                let StaticValue::Record(fields) = &mut fresh else {
                    return Err(shape_error(&case.generator, "record", &fresh));
                };
                self.record_get(root, record, subset.active()?, fields)?;
                *value = StaticValue::Variant {
                    case: label.to_string(),
                    value: Box::new(fresh),
                };
                Ok(())
            }
        }
    }

    /// Resolves the record behind a record or included-set generator.
    fn record_of<'g>(
        &'g self,
        generator: &'g Generator,
    ) -> Result<(&'g Generator, &'g Record), CodecError> {
        match &generator.kind {
            GeneratorKind::Record(record) => Ok((generator, record)),
            GeneratorKind::Included { target } => {
                let root = self.document(target.inner())?;
                let record = root
                    .as_record()
                    .ok_or_else(|| CodecError::UnknownDocument(target.inner().clone()))?;
                Ok((root, record))
            }
            _ => Err(CodecError::Shape {
                path: generator.path().to_string(),
                expected: "record",
                found: expected_shape(generator),
            }),
        }
    }

    /// Resolves the base of `record`; a generic base has no fields.
    fn base_of(&self, record: &Record) -> Result<Option<(&'a Generator, &'a Record)>, CodecError> {
        let Some(base) = &record.base else {
            return Ok(None);
        };
        if record.has_generic_base() {
            return Ok(None);
        }
        let root = self.document(base.inner())?;
        Ok(root.as_record().map(|record| (root, record)))
    }

    fn build_set(&self, generator: &Generator) -> Result<ParameterSet, CodecError> {
        let (root, record) = self.record_of(generator)?;
        let set = self.record_build(root, record)?;
        Ok(match &generator.kind {
            GeneratorKind::Included { .. } => set.with_meta(meta(generator)),
            _ => set,
        })
    }

    fn record_build(&self, generator: &Generator, record: &Record) -> Result<ParameterSet, CodecError> {
        let mut set = ParameterSet::new(meta(generator));
        if let Some((base_root, base)) = self.base_of(record)? {
            set.merge_from(self.record_build(base_root, base)?)?;
        }
        for field in &record.fields {
            set.insert_or_merge(field.label.inner().as_str(), self.build_dynamic(&field.generator)?)?;
        }
        if record.init_code.is_some() {
            trace!(path = generator.path(); "Skipping initialization code");
        }
        Ok(set)
    }

    fn record_default(&self, record: &Record) -> Result<IndexMap<String, StaticValue>, CodecError> {
        let mut fields = match self.base_of(record)? {
            Some((_, base)) => self.record_default(base)?,
            None => IndexMap::new(),
        };
        for field in &record.fields {
            fields.insert(
                field.label.inner().clone(),
                self.default_value(&field.generator)?,
            );
        }
        Ok(fields)
    }

    fn record_set(
        &self,
        generator: &Generator,
        record: &Record,
        fields: &IndexMap<String, StaticValue>,
        set: &mut ParameterSet,
    ) -> Result<(), CodecError> {
        if let Some((base_root, base)) = self.base_of(record)? {
            self.record_set(base_root, base, fields, set)?;
        }
        for field in &record.fields {
            let name = field.label.inner();
            let value = fields.get(name).ok_or_else(|| CodecError::MissingField {
                path: generator.path().to_string(),
                name: name.clone(),
            })?;
            if !set.contains(name) {
                set.insert(name.as_str(), self.build_dynamic(&field.generator)?);
            }
            self.marshal_to_dynamic(&field.generator, value, set.get_mut(name)?)?;
        }
        Ok(())
    }

    fn record_get(
        &self,
        generator: &Generator,
        record: &Record,
        set: &ParameterSet,
        fields: &mut IndexMap<String, StaticValue>,
    ) -> Result<(), CodecError> {
        if let Some((base_root, base)) = self.base_of(record)? {
            self.record_get(base_root, base, set, fields)?;
        }
        for field in &record.fields {
            let name = field.label.inner();
            let node = set.get(name)?;
            if !fields.contains_key(name) {
                fields.insert(name.clone(), self.default_value(&field.generator)?);
            }
            let value = fields.get_mut(name).ok_or_else(|| CodecError::MissingField {
                path: generator.path().to_string(),
                name: name.clone(),
            })?;
            self.marshal_from_dynamic(&field.generator, node, value)?;
        }
        Ok(())
    }

    fn leaf_default(&self, primitive: &Primitive) -> Result<StaticValue, CodecError> {
        let value = match primitive {
            Primitive::Bool(value) => StaticValue::Bool(*value),
            Primitive::Int(value) => StaticValue::Int(*value),
            Primitive::Double(value) => StaticValue::Double(*value),
            Primitive::String(value) => StaticValue::String(value.clone()),
            Primitive::Path(value) | Primitive::Directory(value) => {
                StaticValue::Path(PathBuf::from(value))
            }
            Primitive::Date(value) => StaticValue::Date(*value),
            Primitive::DateTime(value) => StaticValue::DateTime(*value),
            Primitive::Dimensioned {
                quantity,
                value,
                unit,
            } => {
                let factor =
                    units::lookup(quantity, unit).ok_or_else(|| ParameterError::UnknownUnit {
                        quantity: quantity.clone(),
                        unit: unit.clone(),
                    })?;
                StaticValue::Double(value * factor)
            }
            Primitive::DoubleRange(values) => {
                let mut values = values.clone();
                values.sort_by(f64::total_cmp);
                values.dedup();
                StaticValue::Doubles(values)
            }
            Primitive::Vector(values) => StaticValue::Doubles(values.clone()),
            Primitive::Matrix(matrix) => StaticValue::Matrix(matrix.clone()),
            Primitive::Selection { default, .. } => StaticValue::Label(default.clone()),
            Primitive::CadGeometry(_) | Primitive::PropertyLibrarySelection { .. } => {
                let leaf = self.opaque_leaf(primitive, Meta::default())?;
                StaticValue::String(leaf.value().clone())
            }
        };
        Ok(value)
    }

    fn leaf_build(&self, primitive: &Primitive, meta: Meta) -> Result<Parameter, CodecError> {
        let parameter = match primitive {
            Primitive::Bool(value) => BoolParameter::new(*value, meta).into(),
            Primitive::Int(value) => IntParameter::new(*value, meta).into(),
            Primitive::Double(value) => DoubleParameter::new(*value, meta).into(),
            Primitive::String(value) => StringParameter::new(value.clone(), meta).into(),
            Primitive::Path(value) => PathParameter::file(value, meta).into(),
            Primitive::Directory(value) => PathParameter::directory(value, meta).into(),
            Primitive::Date(value) => DateParameter::new(*value, meta).into(),
            Primitive::DateTime(value) => DateTimeParameter::new(*value, meta).into(),
            Primitive::Dimensioned {
                quantity,
                value,
                unit,
            } => DimensionedParameter::new(quantity, *value, unit, meta)?.into(),
            Primitive::DoubleRange(values) => DoubleRangeParameter::new(values.clone(), meta).into(),
            Primitive::Vector(values) => VectorParameter::new(values.clone(), meta).into(),
            Primitive::Matrix(matrix) => MatrixParameter::new(matrix.clone(), meta).into(),
            Primitive::Selection { items, default } => {
                SelectionParameter::new(items.iter().map(String::as_str), default, meta)?.into()
            }
            Primitive::CadGeometry(_) | Primitive::PropertyLibrarySelection { .. } => {
                self.opaque_leaf(primitive, meta)?.into()
            }
        };
        Ok(parameter)
    }

    fn opaque_leaf(&self, primitive: &Primitive, meta: Meta) -> Result<OpaqueParameter, CodecError> {
        let (key, qualifier, payload) = opaque_parts(primitive)
            .ok_or_else(|| ParameterError::UnknownOpaqueKind(primitive.parameter_kind().to_string()))?;
        Ok(self.opaque.create(key, qualifier, payload, meta)?)
    }

    fn leaf_set(
        &self,
        generator: &Generator,
        primitive: &Primitive,
        value: &StaticValue,
        node: &mut Parameter,
    ) -> Result<(), CodecError> {
        match (primitive, value) {
            (Primitive::Bool(_), StaticValue::Bool(v)) => node.downcast_mut::<BoolParameter>()?.set(*v),
            (Primitive::Int(_), StaticValue::Int(v)) => node.downcast_mut::<IntParameter>()?.set(*v),
            (Primitive::Double(_), StaticValue::Double(v)) => {
                node.downcast_mut::<DoubleParameter>()?.set(*v)
            }
            (Primitive::Dimensioned { .. }, StaticValue::Double(v)) => {
                node.downcast_mut::<DimensionedParameter>()?.set(*v)
            }
            (Primitive::String(_), StaticValue::String(v)) => {
                node.downcast_mut::<StringParameter>()?.set(v.clone())
            }
            (Primitive::Path(_) | Primitive::Directory(_), StaticValue::Path(v)) => {
                node.downcast_mut::<PathParameter>()?.set(v.clone())
            }
            (Primitive::Date(_), StaticValue::Date(v)) => node.downcast_mut::<DateParameter>()?.set(*v),
            (Primitive::DateTime(_), StaticValue::DateTime(v)) => {
                node.downcast_mut::<DateTimeParameter>()?.set(*v)
            }
            (Primitive::DoubleRange(_), StaticValue::Doubles(v)) => {
                node.downcast_mut::<DoubleRangeParameter>()?.set(v.clone())
            }
            (Primitive::Vector(_), StaticValue::Doubles(v)) => {
                node.downcast_mut::<VectorParameter>()?.set(v.clone())
            }
            (Primitive::Matrix(_), StaticValue::Matrix(v)) => {
                node.downcast_mut::<MatrixParameter>()?.set(v.clone())
            }
            (Primitive::Selection { .. }, StaticValue::Label(v)) => {
                node.downcast_mut::<SelectionParameter>()?.set_selection(v)?
            }
            (
                Primitive::CadGeometry(_) | Primitive::PropertyLibrarySelection { .. },
                StaticValue::String(v),
            ) => node.downcast_mut::<OpaqueParameter>()?.set(v.as_str()),
            (_, value) => return Err(shape_error(generator, expected_shape(generator), value)),
        }
        Ok(())
    }
}

fn leaf_get(primitive: &Primitive, node: &Parameter) -> Result<StaticValue, CodecError> {
    let value = match primitive {
        Primitive::Bool(_) => StaticValue::Bool(*node.downcast_ref::<BoolParameter>()?.value()),
        Primitive::Int(_) => StaticValue::Int(*node.downcast_ref::<IntParameter>()?.value()),
        Primitive::Double(_) => {
            StaticValue::Double(*node.downcast_ref::<DoubleParameter>()?.value())
        }
        Primitive::Dimensioned { .. } => {
            StaticValue::Double(*node.downcast_ref::<DimensionedParameter>()?.value())
        }
        Primitive::String(_) => {
            StaticValue::String(node.downcast_ref::<StringParameter>()?.value().clone())
        }
        Primitive::Path(_) | Primitive::Directory(_) => {
            StaticValue::Path(node.downcast_ref::<PathParameter>()?.value().clone())
        }
        Primitive::Date(_) => StaticValue::Date(*node.downcast_ref::<DateParameter>()?.value()),
        Primitive::DateTime(_) => {
            StaticValue::DateTime(*node.downcast_ref::<DateTimeParameter>()?.value())
        }
        Primitive::DoubleRange(_) => {
            StaticValue::Doubles(node.downcast_ref::<DoubleRangeParameter>()?.value().clone())
        }
        Primitive::Vector(_) => {
            StaticValue::Doubles(node.downcast_ref::<VectorParameter>()?.value().clone())
        }
        Primitive::Matrix(_) => {
            StaticValue::Matrix(node.downcast_ref::<MatrixParameter>()?.value().clone())
        }
        Primitive::Selection { .. } => StaticValue::Label(
            node.downcast_ref::<SelectionParameter>()?
                .selection()
                .to_string(),
        ),
        Primitive::CadGeometry(_) | Primitive::PropertyLibrarySelection { .. } => {
            StaticValue::String(node.downcast_ref::<OpaqueParameter>()?.value().clone())
        }
    };
    Ok(value)
}

/// Metadata of the dynamic node built for `generator`.
fn meta(generator: &Generator) -> Meta {
    let meta = &generator.meta;
    Meta::new(meta.description.as_str())
        .with_hidden(meta.hidden)
        .with_expert(meta.expert)
        .with_necessary(meta.necessary)
        .with_order(meta.order)
}

fn find_case<'g>(
    generator: &Generator,
    cases: &'g [Field],
    label: &str,
) -> Result<&'g Field, CodecError> {
    cases
        .iter()
        .find(|case| case.label.inner() == label)
        .ok_or_else(|| {
            let options: Vec<&str> = cases.iter().map(|c| c.label.inner().as_str()).collect();
            ParameterError::UnknownSelection {
                name: generator.path().to_string(),
                selection: label.to_string(),
                options: options.join(", "),
            }
            .into()
        })
}

/// The [`StaticValue`] shape expected for `generator`.
fn expected_shape(generator: &Generator) -> &'static str {
    match &generator.kind {
        GeneratorKind::Primitive(primitive) => match primitive {
            Primitive::Bool(_) => "bool",
            Primitive::Int(_) => "int",
            Primitive::Double(_) | Primitive::Dimensioned { .. } => "double",
            Primitive::String(_)
            | Primitive::CadGeometry(_)
            | Primitive::PropertyLibrarySelection { .. } => "string",
            Primitive::Path(_) | Primitive::Directory(_) => "path",
            Primitive::Date(_) => "date",
            Primitive::DateTime(_) => "datetime",
            Primitive::DoubleRange(_) | Primitive::Vector(_) => "doubles",
            Primitive::Matrix(_) => "matrix",
            Primitive::Selection { .. } => "label",
        },
        GeneratorKind::Array { .. } => "array",
        GeneratorKind::LabeledArray { .. } => "labeledarray",
        GeneratorKind::Record(_) | GeneratorKind::Included { .. } => "record",
        GeneratorKind::Variant { .. } => "variant",
    }
}

fn shape_error(generator: &Generator, expected: &'static str, found: &StaticValue) -> CodecError {
    CodecError::Shape {
        path: generator.path().to_string(),
        expected,
        found: found.shape(),
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use pdl_parser::parse_library;

    use super::*;

    fn library(source: &str) -> Library {
        parse_library([("Doc", source)]).expect("Failed to parse")
    }

    #[test]
    fn test_default_value_of_scalars() {
        let library = library(
            r#"
            x = int 5 "count"
            len = dimensioned length 2 mm "length"
            range = doublerange (3 1, 2 1) "range"
            "#,
        );
        let codec = Codec::new(&library);
        let value = codec.default_document("Doc").unwrap();

        assert_eq!(value.field("x"), Some(&StaticValue::Int(5)));
        let Some(StaticValue::Double(len)) = value.field("len") else {
            panic!("Expected a double");
        };
        assert_approx_eq!(f64, *len, 0.002);
        assert_eq!(
            value.field("range"),
            Some(&StaticValue::Doubles(vec![1.0, 2.0, 3.0]))
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let library = library("x = int 5");
        let codec = Codec::new(&library);
        let mut set = codec.build_document("Doc").unwrap();

        let mut fields = IndexMap::new();
        fields.insert("x".to_string(), StaticValue::Bool(true));
        let err = codec
            .set_document("Doc", &StaticValue::Record(fields), &mut set)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "value at `x` has shape `bool`, expected `int`"
        );
    }

    #[test]
    fn test_missing_field() {
        let library = library("x = int 5");
        let codec = Codec::new(&library);
        let mut set = codec.build_document("Doc").unwrap();

        let err = codec
            .set_document("Doc", &StaticValue::Record(IndexMap::new()), &mut set)
            .unwrap_err();
        assert!(matches!(err, CodecError::MissingField { name, .. } if name == "x"));
    }

    #[test]
    fn test_unknown_document() {
        let library = library("x = int 5");
        let codec = Codec::new(&library);
        assert!(matches!(
            codec.build_document("Other"),
            Err(CodecError::UnknownDocument(name)) if name == "Other"
        ));
    }
}
