//! Body rules of the built-in parameter types.
//!
//! Each submodule parses the bodies of a family of parameter types and
//! registers its keywords through a `register` function called by
//! [`Registry::with_builtin_kinds`](crate::Registry::with_builtin_kinds).

pub(crate) mod container;
pub(crate) mod primitive;
pub(crate) mod record;
pub(crate) mod variant;

use crate::{
    generator::GeneratorKind,
    parser::{Grammar, IResult, Input},
};

/// Parses the body following a type keyword.
///
/// Rules are registered per keyword with [`Registry::register`](crate::Registry::register).
pub type Rule = fn(&mut Grammar<'_>, &mut Input<'_>) -> IResult<GeneratorKind>;
