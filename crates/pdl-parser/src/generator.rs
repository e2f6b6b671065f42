//! The Generator tree produced by parsing a PDL document.
//!
//! A [`Generator`] describes one schema element. Its [`GeneratorKind`] is a
//! closed set of node shapes: primitive leaves, the two containers, records,
//! variants and references to records declared in other documents. Names,
//! paths and scopes are filled in after parsing by [`crate::naming`].

use pdl_core::{
    KeySource, Matrix,
    chrono::{NaiveDate, NaiveDateTime},
};

use crate::{
    scope::Scope,
    span::{Span, Spanned},
};

/// Attributes shared by every generator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratorMeta {
    /// Field label, case label or derived element name.
    pub name: String,
    pub description: String,
    pub hidden: bool,
    pub expert: bool,
    pub necessary: bool,
    /// Declaration index within the enclosing record.
    pub order: i32,
    /// Slash separated path from the document root.
    pub path: String,
    /// Module path in which the static type of this node is declared.
    pub scope: Scope,
    pub span: Span,
}

/// One node of the schema tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    pub meta: GeneratorMeta,
    pub kind: GeneratorKind,
}

/// A named child of a record or a case of a variant.
///
/// The label belongs to the parent; the naming pass copies it into the
/// child's [`GeneratorMeta::name`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: Spanned<String>,
    pub generator: Generator,
}

/// An ordered set of fields, optionally extending a base record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub fields: Vec<Field>,
    /// Document this record inherits from.
    pub base: Option<Spanned<String>>,
    /// Generic parameter standing in for the base of a document.
    pub generic: Option<Spanned<String>>,
    /// Raw code appended to the default constructor.
    pub init_code: Option<String>,
}

impl Record {
    /// Returns the field labelled `name`.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.label.inner() == name)
    }

    /// Returns `true` if the base is the generic parameter rather than a
    /// document of the library.
    pub fn has_generic_base(&self) -> bool {
        match (&self.base, &self.generic) {
            (Some(base), Some(generic)) => base.inner() == generic.inner(),
            _ => false,
        }
    }
}

/// Shapes a generator can take.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorKind {
    Primitive(Primitive),
    /// A sequence of `count` default elements.
    Array {
        element: Box<Generator>,
        count: usize,
    },
    /// A string keyed map; `count` default entries are generated from a
    /// key pattern, none for referenced keys.
    LabeledArray {
        element: Box<Generator>,
        count: usize,
        keys: KeySource,
    },
    Record(Record),
    /// A tagged union over record cases.
    Variant {
        cases: Vec<Field>,
        default: Spanned<String>,
    },
    /// The root record of another document.
    Included { target: Spanned<String> },
}

/// Leaf kinds with their literal default.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Path(String),
    Directory(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// A scalar with a physical unit, `value` given in `unit`.
    Dimensioned {
        quantity: String,
        value: f64,
        unit: String,
    },
    DoubleRange(Vec<f64>),
    Vector(Vec<f64>),
    Matrix(Matrix),
    Selection {
        items: Vec<String>,
        default: String,
    },
    CadGeometry(String),
    PropertyLibrarySelection {
        library: String,
        entry: String,
    },
}

impl Primitive {
    /// Returns the kind name of the runtime parameter built for this leaf.
    pub fn parameter_kind(&self) -> &'static str {
        match self {
            Primitive::Bool(_) => "bool",
            Primitive::Int(_) => "int",
            Primitive::Double(_) => "double",
            Primitive::String(_) => "string",
            Primitive::Path(_) | Primitive::Directory(_) => "path",
            Primitive::Date(_) => "date",
            Primitive::DateTime(_) => "datetime",
            Primitive::Dimensioned { .. } => "dimensioned",
            Primitive::DoubleRange(_) => "doublerange",
            Primitive::Vector(_) => "vector",
            Primitive::Matrix(_) => "matrix",
            Primitive::Selection { .. } => "selection",
            Primitive::CadGeometry(_) | Primitive::PropertyLibrarySelection { .. } => "opaque",
        }
    }
}

impl Generator {
    pub fn new(kind: GeneratorKind, span: Span) -> Self {
        Self {
            meta: GeneratorMeta {
                span,
                ..GeneratorMeta::default()
            },
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn path(&self) -> &str {
        &self.meta.path
    }

    pub fn scope(&self) -> &Scope {
        &self.meta.scope
    }

    pub fn as_record(&self) -> Option<&Record> {
        match &self.kind {
            GeneratorKind::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns `true` for nodes that declare a type of their own.
    pub fn is_composite(&self) -> bool {
        match &self.kind {
            GeneratorKind::Primitive(primitive) => {
                matches!(primitive, Primitive::Selection { .. })
            }
            GeneratorKind::Included { .. } => false,
            GeneratorKind::Array { .. }
            | GeneratorKind::LabeledArray { .. }
            | GeneratorKind::Record(_)
            | GeneratorKind::Variant { .. } => true,
        }
    }

    /// Returns the kind name of the runtime parameter built for this node.
    ///
    /// An included record builds a set.
    pub fn parameter_kind(&self) -> &'static str {
        match &self.kind {
            GeneratorKind::Primitive(primitive) => primitive.parameter_kind(),
            GeneratorKind::Array { .. } => "array",
            GeneratorKind::LabeledArray { .. } => "labeledarray",
            GeneratorKind::Record(_) | GeneratorKind::Included { .. } => "set",
            GeneratorKind::Variant { .. } => "selectablesubset",
        }
    }

    /// Visits this node and all its descendants in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Generator)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Returns the direct children of this node in declaration order.
    pub fn children(&self) -> Vec<&Generator> {
        match &self.kind {
            GeneratorKind::Array { element, .. } | GeneratorKind::LabeledArray { element, .. } => {
                vec![element.as_ref()]
            }
            GeneratorKind::Record(record) => {
                record.fields.iter().map(|f| &f.generator).collect()
            }
            GeneratorKind::Variant { cases, .. } => cases.iter().map(|c| &c.generator).collect(),
            GeneratorKind::Primitive(_) | GeneratorKind::Included { .. } => Vec::new(),
        }
    }
}
