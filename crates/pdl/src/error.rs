//! Error types for PDL operations.
//!
//! This module provides the main error type [`PdlError`] which wraps the
//! error conditions of each compilation stage.

use std::io;

use thiserror::Error;

use pdl_core::ParameterError;
use pdl_parser::error::ParseError;

use crate::codec::CodecError;

/// The main error type for PDL operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the diagnostics of one document together
/// with its source text, so that they can be rendered with snippets.
#[derive(Debug, Error)]
pub enum PdlError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse {
        document: String,
        err: ParseError,
        src: String,
    },

    #[error("Emit error: {0}")]
    Emit(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] ParameterError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

impl PdlError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(
        document: impl Into<String>,
        err: ParseError,
        src: impl Into<String>,
    ) -> Self {
        Self::Parse {
            document: document.into(),
            err,
            src: src.into(),
        }
    }
}
