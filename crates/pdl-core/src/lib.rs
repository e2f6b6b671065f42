//! PDL Core Runtime
//!
//! This crate provides the dynamic, introspectable parameter tree that
//! host applications work with and that code generated from PDL schemas
//! reads from and writes to. It includes:
//!
//! - **Parameters**: the [`Parameter`] node enum and its kinds
//! - **Containers**: [`ParameterSet`], [`ArrayParameter`],
//!   [`LabeledArrayParameter`] and [`SelectableSubsetParameter`]
//! - **Leaves**: primitive values, selections, dimensioned scalars
//!   ([`units`] table) and opaque payloads ([`OpaqueRegistry`])
//! - **Static binding**: the [`StaticParameters`] trait implemented by
//!   generated types

pub mod array;
pub mod error;
pub mod labeled_array;
pub mod matrix;
pub mod meta;
pub mod opaque;
pub mod parameter;
pub mod path;
pub mod primitive;
pub mod selectable;
pub mod set;
pub mod units;

pub use chrono;

pub use array::ArrayParameter;
pub use error::{ParameterError, Result};
pub use labeled_array::{KeySource, LabeledArrayParameter, pattern_key};
pub use matrix::Matrix;
pub use meta::Meta;
pub use opaque::OpaqueRegistry;
pub use parameter::{Parameter, ParameterKind};
pub use primitive::{
    BoolParameter, DateParameter, DateTimeParameter, DimensionedParameter, DoubleParameter,
    DoubleRangeParameter, IntParameter, MatrixParameter, OpaqueParameter, PathParameter,
    Primitive, SelectionParameter, StringParameter, VectorParameter,
};
pub use selectable::SelectableSubsetParameter;
pub use set::ParameterSet;

/// A strongly-typed parameter record bound to a dynamic [`ParameterSet`].
///
/// Implemented by every record type generated from a schema. The static
/// value and the dynamic tree are independent; data moves between them
/// only through [`set`](Self::set) and [`get`](Self::get).
pub trait StaticParameters: Default {
    /// Builds the dynamic tree of this record, populated with its defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a default cannot be represented, e.g. an unknown
    /// unit or opaque kind.
    fn make_default() -> Result<ParameterSet>;

    /// Copies this value into `p`, creating missing entries.
    fn set(&self, p: &mut ParameterSet) -> Result<()>;

    /// Copies the content of `p` into this value.
    fn get(&mut self, p: &ParameterSet) -> Result<()>;

    /// Returns the default static value together with the default dynamic tree.
    fn build_default() -> Result<(Self, ParameterSet)> {
        Ok((Self::default(), Self::make_default()?))
    }
}
