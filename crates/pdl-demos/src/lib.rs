//! Parameter types generated from the PDL demo schemas.
//!
//! `build.rs` compiles `demos/*.pdl` together with the schemas in
//! `schemas/` and writes the result to `$OUT_DIR/params.rs`. Every document
//! becomes a struct at the crate root, e.g. [`Case`] or [`Mesh`], with its
//! nested types in a module of the same name.

#![allow(clippy::redundant_static_lifetimes)]

include!(concat!(env!("OUT_DIR"), "/params.rs"));
