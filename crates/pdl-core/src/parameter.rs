//! The [`Parameter`] node enum and typed access to its kinds.

use crate::{
    array::ArrayParameter,
    error::{ParameterError, Result},
    labeled_array::LabeledArrayParameter,
    meta::Meta,
    primitive::{
        BoolParameter, DateParameter, DateTimeParameter, DimensionedParameter,
        DoubleParameter, DoubleRangeParameter, IntParameter, MatrixParameter, OpaqueParameter,
        PathParameter, SelectionParameter, StringParameter, VectorParameter,
    },
    selectable::SelectableSubsetParameter,
    set::ParameterSet,
};

/// One node of a dynamic parameter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Bool(BoolParameter),
    Int(IntParameter),
    Double(DoubleParameter),
    String(StringParameter),
    Path(PathParameter),
    Date(DateParameter),
    DateTime(DateTimeParameter),
    Vector(VectorParameter),
    DoubleRange(DoubleRangeParameter),
    Matrix(MatrixParameter),
    Selection(SelectionParameter),
    Dimensioned(DimensionedParameter),
    Opaque(OpaqueParameter),
    Array(ArrayParameter),
    LabeledArray(LabeledArrayParameter),
    Set(ParameterSet),
    SelectableSubset(SelectableSubsetParameter),
}

/// A concrete parameter type that can be viewed through a [`Parameter`].
pub trait ParameterKind: Sized {
    /// Human readable kind name used in error messages.
    const KIND: &'static str;

    fn from_parameter(parameter: &Parameter) -> Option<&Self>;

    fn from_parameter_mut(parameter: &mut Parameter) -> Option<&mut Self>;
}

macro_rules! parameter_kind {
    ($($variant:ident($ty:ty) => $name:literal),+ $(,)?) => {
        $(
            impl ParameterKind for $ty {
                const KIND: &'static str = $name;

                fn from_parameter(parameter: &Parameter) -> Option<&Self> {
                    match parameter {
                        Parameter::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn from_parameter_mut(parameter: &mut Parameter) -> Option<&mut Self> {
                    match parameter {
                        Parameter::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Parameter {
                fn from(inner: $ty) -> Self {
                    Parameter::$variant(inner)
                }
            }
        )+

        impl Parameter {
            /// Returns the kind name of this node.
            pub fn kind(&self) -> &'static str {
                match self {
                    $(Parameter::$variant(_) => $name,)+
                }
            }

            /// Returns the metadata of this node.
            pub fn meta(&self) -> &Meta {
                match self {
                    $(Parameter::$variant(inner) => inner.meta(),)+
                }
            }
        }
    };
}

parameter_kind! {
    Bool(BoolParameter) => "bool",
    Int(IntParameter) => "int",
    Double(DoubleParameter) => "double",
    String(StringParameter) => "string",
    Path(PathParameter) => "path",
    Date(DateParameter) => "date",
    DateTime(DateTimeParameter) => "datetime",
    Vector(VectorParameter) => "vector",
    DoubleRange(DoubleRangeParameter) => "doublerange",
    Matrix(MatrixParameter) => "matrix",
    Selection(SelectionParameter) => "selection",
    Dimensioned(DimensionedParameter) => "dimensioned",
    Opaque(OpaqueParameter) => "opaque",
    Array(ArrayParameter) => "array",
    LabeledArray(LabeledArrayParameter) => "labeledarray",
    Set(ParameterSet) => "set",
    SelectableSubset(SelectableSubsetParameter) => "selectablesubset",
}

impl Parameter {
    /// Views this node as a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::KindMismatch`] if the node is of another kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdl_core::{IntParameter, Meta, Parameter, ParameterError};
    ///
    /// let p = Parameter::from(IntParameter::new(5, Meta::new("count")));
    /// assert_eq!(*p.downcast_ref::<IntParameter>()?.value(), 5);
    /// # Ok::<(), ParameterError>(())
    /// ```
    pub fn downcast_ref<T: ParameterKind>(&self) -> Result<&T> {
        let found = self.kind();
        T::from_parameter(self).ok_or(ParameterError::KindMismatch {
            expected: T::KIND,
            found,
        })
    }

    /// Mutable counterpart of [`downcast_ref`](Self::downcast_ref).
    pub fn downcast_mut<T: ParameterKind>(&mut self) -> Result<&mut T> {
        let found = self.kind();
        T::from_parameter_mut(self).ok_or(ParameterError::KindMismatch {
            expected: T::KIND,
            found,
        })
    }

    /// Merges `incoming` into this node.
    ///
    /// Sets are merged key by key and selectable subsets case by case.
    /// For any other pair of nodes of the same kind the existing value is
    /// kept.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::IncompatibleMerge`] if the two nodes are of
    /// different kinds.
    pub fn merge(&mut self, name: &str, incoming: Parameter) -> Result<()> {
        match (self, incoming) {
            (Parameter::Set(existing), Parameter::Set(incoming)) => existing.merge_from(incoming),
            (Parameter::SelectableSubset(existing), Parameter::SelectableSubset(incoming)) => {
                existing.merge_from(incoming)
            }
            (existing, incoming) if existing.kind() == incoming.kind() => Ok(()),
            (existing, incoming) => Err(ParameterError::IncompatibleMerge {
                name: name.to_string(),
                existing: existing.kind(),
                incoming: incoming.kind(),
            }),
        }
    }

    /// Resolves one path component below this node.
    pub(crate) fn child(&self, component: &str) -> Result<Cursor<'_>> {
        match self {
            Parameter::Set(set) => set.get(component).map(Cursor::Parameter),
            Parameter::Array(array) => {
                let index = component
                    .parse::<usize>()
                    .map_err(|_| ParameterError::InvalidPath(component.to_string()))?;
                array.get(index).map(Cursor::Parameter)
            }
            Parameter::LabeledArray(array) => array.get(component).map(Cursor::Parameter),
            Parameter::SelectableSubset(subset) => match subset.subset(component) {
                Ok(case) => Ok(Cursor::Set(case)),
                Err(_) => subset.active()?.get(component).map(Cursor::Parameter),
            },
            _ => Err(ParameterError::InvalidPath(component.to_string())),
        }
    }
}

/// Position reached while walking a slash-separated path.
pub(crate) enum Cursor<'a> {
    Set(&'a ParameterSet),
    Parameter(&'a Parameter),
}
