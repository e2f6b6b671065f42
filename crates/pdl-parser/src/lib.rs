//! # PDL Parser
//!
//! Parser for the PDL parameter description language. This crate turns
//! PDL documents into trees of [`Generator`](generator::Generator)s with
//! their names, paths and code-generation scopes assigned, and checks the
//! references between documents compiled together.
//!
//! ## Usage
//!
//! ```
//! # use pdl_parser::{parse_document, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         // Mesh resolution
//!         cells = int 100 "number of cells" *necessary
//!         method = selection (euler rk4) euler "time integration"
//!     "#;
//!
//!     let document = parse_document("Solver", source)?;
//!     assert_eq!(document.name(), "Solver");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod generator;
mod lexer;
mod library;
pub mod naming;
mod parser;
#[cfg(test)]
mod parser_tests;
mod registry;
pub mod rule;
mod rules;
pub mod scope;
mod span;
mod tokens;

pub use library::{Document, DocumentError, Library};
pub use registry::Registry;
pub use span::{Span, Spanned};

use log::info;

use error::ParseError;

/// Separator between the package prefix and the document name of a file
/// stem, as in `solvers__Mesh.pdl`.
const PACKAGE_SEPARATOR: &str = "__";

/// Parse one document with the builtin type keywords.
///
/// The pipeline is:
///
/// 1. **Tokenize** - Convert source text to tokens
/// 2. **Parse** - Build the generator tree, one registered rule per type keyword
/// 3. **Assign** - Give every generator its name, path and scope
///
/// References to other documents are not resolved here; see
/// [`Library::validate_document`].
///
/// # Errors
///
/// Returns a [`ParseError`] carrying the diagnostics of the first failure.
pub fn parse_document(name: &str, source: &str) -> Result<Document, ParseError> {
    parse_document_with(&Registry::with_builtin_kinds(), name, source)
}

/// Parse one document with the type keywords of `registry`.
///
/// # Errors
///
/// Returns a [`ParseError`] carrying the diagnostics of the first failure.
pub fn parse_document_with(
    registry: &Registry,
    name: &str,
    source: &str,
) -> Result<Document, ParseError> {
    let tokens = lexer::tokenize(source)?;

    let mut root = parser::build_document(&tokens, registry)?;

    naming::assign_document(&mut root, name);

    info!(
        document = name,
        fields = root.as_record().map_or(0, |r| r.fields.len());
        "Parsed document",
    );
    Ok(Document::new(name, root))
}

/// Parse `(name, source)` pairs into a validated [`Library`].
///
/// # Errors
///
/// Returns a [`DocumentError`] naming the first document that fails to
/// parse or to validate.
pub fn parse_library<'a, I>(sources: I) -> Result<Library, DocumentError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let registry = Registry::with_builtin_kinds();
    let mut library = Library::new();
    for (name, source) in sources {
        let document =
            parse_document_with(&registry, name, source).map_err(|error| DocumentError {
                document: name.to_string(),
                error,
            })?;
        library.add(document);
    }
    library.validate()?;
    Ok(library)
}

/// Returns the document name of a file stem: the part after the last
/// package separator.
///
/// ```
/// assert_eq!(pdl_parser::document_name("solvers__Mesh"), "Mesh");
/// assert_eq!(pdl_parser::document_name("Mesh"), "Mesh");
/// ```
pub fn document_name(stem: &str) -> &str {
    stem.rsplit(PACKAGE_SEPARATOR).next().unwrap_or(stem)
}
