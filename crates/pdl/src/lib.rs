//! PDL - A schema compiler for hierarchical parameter sets.
//!
//! PDL documents describe typed, defaulted and documented parameters.
//! This crate compiles a library of documents into Rust source: for every
//! record a struct holding the static values, a `Default` impl with the
//! schema defaults, and a [`StaticParameters`](pdl_core::StaticParameters)
//! impl that builds the matching dynamic tree of `pdl-core` and copies
//! values between the two.
//!
//! The same operations are available without code generation through the
//! interpreting [`codec`].

pub mod codec;
pub mod config;
pub mod emit;
pub mod tree;

mod error;

pub use pdl_core;
pub use pdl_parser::{Document, DocumentError, Library, Registry, document_name};

pub use error::PdlError;

use log::{debug, info, trace};

use config::AppConfig;
use pdl_core::ParameterSet;

/// Builder for parsing PDL documents and generating code from them.
///
/// # Examples
///
/// ```
/// use pdl::{SchemaCompiler, config::AppConfig};
///
/// let compiler = SchemaCompiler::new(AppConfig::default());
/// let library = compiler
///     .parse(&[("Mesh", "cells = int 10 \"number of cells\"")])
///     .expect("Failed to parse");
///
/// let code = compiler.emit(&library).expect("Failed to emit");
/// assert!(code.contains("pub struct Mesh"));
/// ```
pub struct SchemaCompiler {
    config: AppConfig,
    registry: Registry,
}

impl Default for SchemaCompiler {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl SchemaCompiler {
    /// Create a compiler with the builtin type keywords.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            registry: Registry::with_builtin_kinds(),
        }
    }

    /// Create a compiler with a custom keyword registry.
    pub fn with_registry(config: AppConfig, registry: Registry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse `(name, source)` pairs into a validated library.
    ///
    /// # Errors
    ///
    /// Returns [`PdlError::Parse`] for the first document that fails to
    /// parse or whose references to other documents are invalid.
    pub fn parse(&self, sources: &[(&str, &str)]) -> Result<Library, PdlError> {
        info!(documents = sources.len(); "Parsing library");

        let mut library = Library::new();
        for (name, source) in sources {
            let document = pdl_parser::parse_document_with(&self.registry, name, source)
                .map_err(|err| PdlError::new_parse_error(*name, err, *source))?;
            library.add(document);
        }

        library.validate().map_err(|DocumentError { document, error }| {
            let src = sources
                .iter()
                .find(|(name, _)| *name == document)
                .map(|(_, source)| *source)
                .unwrap_or_default();
            PdlError::new_parse_error(document, error, src)
        })?;

        debug!(documents = library.len(); "Library validated");
        Ok(library)
    }

    /// Generate the Rust source of every document in `library`.
    ///
    /// # Errors
    ///
    /// Returns [`PdlError::Emit`] when the schema cannot be expressed as
    /// Rust items, e.g. two names mapping to one identifier.
    pub fn emit(&self, library: &Library) -> Result<String, PdlError> {
        let code = emit::emit_library(library, self.config.emit())?;
        trace!(bytes = code.len(); "Generated code");
        Ok(code)
    }

    /// Build the default dynamic tree of the document `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PdlError::Codec`] if the document is unknown or one of
    /// its defaults cannot be represented.
    pub fn default_tree(&self, library: &Library, name: &str) -> Result<ParameterSet, PdlError> {
        let tree = codec::Codec::new(library).build_document(name)?;
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_keeps_source() {
        let compiler = SchemaCompiler::default();
        let err = compiler
            .parse(&[("Good", "x = int 1"), ("Bad", "x = nosuchtype 1")])
            .unwrap_err();

        match err {
            PdlError::Parse { document, src, .. } => {
                assert_eq!(document, "Bad");
                assert_eq!(src, "x = nosuchtype 1");
            }
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_error_keeps_source() {
        let compiler = SchemaCompiler::default();
        let err = compiler
            .parse(&[("Case", "mesh = includedset Missing")])
            .unwrap_err();

        match err {
            PdlError::Parse { document, src, .. } => {
                assert_eq!(document, "Case");
                assert_eq!(src, "mesh = includedset Missing");
            }
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_tree() {
        let compiler = SchemaCompiler::default();
        let library = compiler.parse(&[("Mesh", "cells = int 10")]).unwrap();
        let tree = compiler.default_tree(&library, "Mesh").unwrap();
        assert!(tree.contains("cells"));
        assert!(matches!(
            compiler.default_tree(&library, "Other"),
            Err(PdlError::Codec(_))
        ));
    }
}
