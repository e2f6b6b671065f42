//! Building blocks for parameter type rules.
//!
//! A [`Rule`] parses the body that follows a type keyword and returns the
//! [`GeneratorKind`](crate::generator::GeneratorKind) it describes. The
//! description and flags after the body are handled by the grammar. Rules
//! are added to a [`Registry`](crate::Registry) with
//! [`Registry::register`](crate::Registry::register); the grammar itself
//! never changes.
//!
//! Body parsers skip leading whitespace and comments. A rule reports a
//! semantic error through [`Grammar::fail`], which aborts parsing with
//! the given diagnostic.
//!
//! ```
//! use pdl_parser::{
//!     Registry,
//!     generator::{GeneratorKind, Primitive},
//!     parse_document_with,
//!     rule::{Grammar, IResult, Input, int_literal},
//! };
//!
//! fn integer(_: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
//!     let value = int_literal(input)?;
//!     Ok(GeneratorKind::Primitive(Primitive::Int(value.into_inner())))
//! }
//!
//! let mut registry = Registry::with_builtin_kinds();
//! registry.register("integer", integer);
//!
//! let document = parse_document_with(&registry, "Mesh", "cells = integer 10").unwrap();
//! assert!(document.record().unwrap().field("cells").is_some());
//! ```

pub use crate::{
    parser::{
        Context, Grammar, IResult, Input, annotations, code_block, fields, float_literal,
        generator, identifier, int_literal, keyword, punct, raw_identifier, string_literal,
        ws_comments0,
    },
    rules::Rule,
    tokens::{PositionedToken, Token},
};
