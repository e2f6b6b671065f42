//! Documents compiled together and the checks that span them.
//!
//! A document may include or inherit the root record of another document
//! by name. These references are resolved, and checked for cycles and
//! conflicting field kinds, once every document of the [`Library`] has
//! been parsed.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, warn};
use thiserror::Error;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    generator::{Field, Generator, GeneratorKind, Record},
    span::Spanned,
};

/// A parsed document: the root record of one PDL source.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    name: String,
    root: Generator,
}

impl Document {
    pub(crate) fn new(name: impl Into<String>, root: Generator) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the generator of the root record.
    pub fn root(&self) -> &Generator {
        &self.root
    }

    /// Returns the root record.
    pub fn record(&self) -> Option<&Record> {
        self.root.as_record()
    }

    /// Returns `true` if the document declares a generic base.
    pub fn is_generic(&self) -> bool {
        self.record().is_some_and(|r| r.generic.is_some())
    }
}

/// A failure in one document of a library.
#[derive(Debug, Error)]
#[error("document `{document}`: {error}")]
pub struct DocumentError {
    /// Name of the document the diagnostics refer to.
    pub document: String,
    #[source]
    pub error: ParseError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReferenceKind {
    Include,
    Base,
}

impl ReferenceKind {
    fn noun(self) -> &'static str {
        match self {
            ReferenceKind::Include => "included set",
            ReferenceKind::Base => "base",
        }
    }
}

struct Reference<'a> {
    target: &'a Spanned<String>,
    kind: ReferenceKind,
}

/// Returns every reference to another document made inside `root`.
fn references(root: &Generator) -> Vec<Reference<'_>> {
    let mut found = Vec::new();
    root.walk(&mut |g| match &g.kind {
        GeneratorKind::Included { target } => found.push(Reference {
            target,
            kind: ReferenceKind::Include,
        }),
        GeneratorKind::Record(record) if !record.has_generic_base() => {
            if let Some(base) = &record.base {
                found.push(Reference {
                    target: base,
                    kind: ReferenceKind::Base,
                });
            }
        }
        _ => {}
    });
    found
}

/// The set of documents compiled together.
#[derive(Debug, Clone, Default)]
pub struct Library {
    documents: IndexMap<String, Document>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `document`, replacing a document of the same name.
    pub fn add(&mut self, document: Document) -> Option<Document> {
        let replaced = self.documents.insert(document.name.clone(), document);
        if let Some(old) = &replaced {
            warn!(document = old.name.as_str(); "Document replaced in library");
        }
        replaced
    }

    pub fn get(&self, name: &str) -> Option<&Document> {
        self.documents.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterates over the documents in the order they were added.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Validates every document.
    ///
    /// # Errors
    ///
    /// Returns the diagnostics of the first document that fails.
    pub fn validate(&self) -> Result<(), DocumentError> {
        for name in self.documents.keys() {
            self.validate_document(name)
                .map_err(|error| DocumentError {
                    document: name.clone(),
                    error,
                })?;
        }
        Ok(())
    }

    /// Checks the references made by the document `name`: every included
    /// or inherited document exists and is not generic, no document
    /// reaches itself, and inherited fields keep their parameter kind.
    ///
    /// All diagnostics refer to the source of `name`.
    pub fn validate_document(&self, name: &str) -> Result<(), ParseError> {
        let Some(document) = self.get(name) else {
            return Err(Diagnostic::error(format!("unknown document `{name}`"))
                .with_code(ErrorCode::E300)
                .into());
        };

        let mut collector = DiagnosticCollector::new();
        check_generic(document, &mut collector);
        self.check_references(document, &mut collector);
        if !collector.has_errors() {
            self.check_cycles(document, &mut collector);
        }
        if !collector.has_errors() {
            self.check_inherited_fields(document, &mut collector);
        }
        debug!(document = name, failed = collector.has_errors(); "Validated document");
        collector.finish()
    }

    fn check_references(&self, document: &Document, collector: &mut DiagnosticCollector) {
        for reference in references(document.root()) {
            let target = reference.target.inner();
            match self.get(target) {
                None => {
                    let known = self
                        .documents
                        .keys()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    collector.emit(
                        Diagnostic::error(format!(
                            "unresolved {} `{target}`",
                            reference.kind.noun()
                        ))
                        .with_code(ErrorCode::E300)
                        .with_label(reference.target.span(), "no document of this name")
                        .with_help(format!("documents in this compilation: {known}")),
                    );
                }
                Some(target_document) if target_document.is_generic() => {
                    collector.emit(
                        Diagnostic::error(format!(
                            "generic document `{target}` cannot be used as {}",
                            match reference.kind {
                                ReferenceKind::Include => "an included set",
                                ReferenceKind::Base => "a base",
                            }
                        ))
                        .with_code(ErrorCode::E303)
                        .with_label(reference.target.span(), "generic document")
                        .with_help("only non-generic documents can be included or inherited"),
                    );
                }
                Some(_) => {}
            }
        }
    }

    /// Returns `true` if `target` is reachable from `from` over references.
    fn reaches(&self, from: &str, target: &str, visited: &mut HashSet<String>) -> bool {
        if from == target {
            return true;
        }
        if !visited.insert(from.to_string()) {
            return false;
        }
        let Some(document) = self.get(from) else {
            return false;
        };
        references(document.root())
            .iter()
            .any(|r| self.reaches(r.target.inner(), target, visited))
    }

    fn check_cycles(&self, document: &Document, collector: &mut DiagnosticCollector) {
        let cyclic = references(document.root())
            .into_iter()
            .find(|r| self.reaches(r.target.inner(), document.name(), &mut HashSet::new()));

        if let Some(reference) = cyclic {
            collector.emit(
                Diagnostic::error(format!(
                    "document `{}` refers to itself through {} `{}`",
                    document.name(),
                    reference.kind.noun(),
                    reference.target.inner()
                ))
                .with_code(ErrorCode::E301)
                .with_label(reference.target.span(), "cyclic reference")
                .with_help("break the cycle of `includedset` and `inherits` references"),
            );
        }
    }

    /// Collects the fields of the document `name` and of its bases.
    fn inherited_fields<'a>(
        &'a self,
        name: &str,
        visited: &mut HashSet<String>,
        fields: &mut Vec<(&'a str, &'a Field)>,
    ) {
        if !visited.insert(name.to_string()) {
            return;
        }
        let Some((document, record)) = self
            .get(name)
            .and_then(|d| d.record().map(|r| (d, r)))
        else {
            return;
        };
        fields.extend(record.fields.iter().map(|f| (document.name(), f)));
        if let Some(base) = &record.base {
            self.inherited_fields(base.inner(), visited, fields);
        }
    }

    fn check_inherited_fields(&self, document: &Document, collector: &mut DiagnosticCollector) {
        let mut derived_records = Vec::new();
        document.root().walk(&mut |g| {
            if let GeneratorKind::Record(record) = &g.kind {
                if !record.has_generic_base() && record.base.is_some() {
                    derived_records.push(record);
                }
            }
        });

        for record in derived_records {
            let Some(base) = &record.base else {
                continue;
            };
            let mut inherited = Vec::new();
            self.inherited_fields(base.inner(), &mut HashSet::new(), &mut inherited);

            for field in &record.fields {
                let conflict = inherited.iter().find(|(_, f)| {
                    f.label == field.label
                        && f.generator.parameter_kind() != field.generator.parameter_kind()
                });
                if let Some((origin, inherited_field)) = conflict {
                    collector.emit(
                        Diagnostic::error(format!(
                            "field `{}` is `{}` in base `{origin}` but `{}` here",
                            field.label.inner(),
                            inherited_field.generator.parameter_kind(),
                            field.generator.parameter_kind()
                        ))
                        .with_code(ErrorCode::E302)
                        .with_label(field.label.span(), "incompatible redefinition")
                        .with_help("an inherited field can only be redefined with the same kind"),
                    );
                }
            }
        }
    }
}

/// A generic parameter must stand for the document's own base.
fn check_generic(document: &Document, collector: &mut DiagnosticCollector) {
    let Some(record) = document.record() else {
        return;
    };
    let Some(generic) = &record.generic else {
        return;
    };
    if !record.has_generic_base() {
        collector.emit(
            Diagnostic::error(format!(
                "generic parameter `{}` of `{}` is not its base",
                generic.inner(),
                document.name()
            ))
            .with_code(ErrorCode::E303)
            .with_label(generic.span(), "unused generic parameter")
            .with_help(format!("add `inherits {}` after the parameter", generic.inner())),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_document;

    fn library(sources: &[(&str, &str)]) -> Library {
        let mut library = Library::new();
        for (name, source) in sources {
            library.add(parse_document(name, source).expect("document parses"));
        }
        library
    }

    fn first_code(library: &Library, name: &str) -> Option<ErrorCode> {
        library
            .validate_document(name)
            .err()
            .and_then(|e| e.diagnostics()[0].code())
    }

    #[test]
    fn test_resolved_references() {
        let library = library(&[
            ("Mesh", "cells = int 100 \"cells\""),
            ("Solver", "inherits Mesh\nmesh = includedset Mesh \"mesh\""),
        ]);
        assert!(library.validate().is_ok());
    }

    #[test]
    fn test_unresolved_include() {
        let library = library(&[("Solver", "mesh = includedset Mesh \"mesh\"")]);
        assert_eq!(first_code(&library, "Solver"), Some(ErrorCode::E300));

        let err = library.validate().unwrap_err();
        assert_eq!(err.document, "Solver");
    }

    #[test]
    fn test_include_cycle() {
        let library = library(&[
            ("A", "b = includedset B \"b\""),
            ("B", "a = includedset A \"a\""),
        ]);
        assert_eq!(first_code(&library, "A"), Some(ErrorCode::E301));
        assert_eq!(first_code(&library, "B"), Some(ErrorCode::E301));
    }

    #[test]
    fn test_self_inheritance() {
        let library = library(&[("A", "inherits A\nx = int 1 \"x\"")]);
        assert_eq!(first_code(&library, "A"), Some(ErrorCode::E301));
    }

    #[test]
    fn test_incompatible_inherited_field() {
        let library = library(&[
            ("Base", "x = int 1 \"x\""),
            ("Derived", "inherits Base\nx = double 1.0 \"x\""),
        ]);
        assert_eq!(first_code(&library, "Derived"), Some(ErrorCode::E302));
    }

    #[test]
    fn test_compatible_redefinition() {
        let library = library(&[
            ("Base", "x = int 1 \"x\""),
            ("Derived", "inherits Base\nx = int 2 \"x\""),
        ]);
        assert!(library.validate_document("Derived").is_ok());
    }

    #[test]
    fn test_generic_documents() {
        let library = library(&[
            ("Wrapper", "<B> inherits B\ny = int 1 \"y\""),
            ("Unused", "<B>\ny = int 1 \"y\""),
            ("User", "w = includedset Wrapper \"w\""),
        ]);
        assert!(library.validate_document("Wrapper").is_ok());
        assert_eq!(first_code(&library, "Unused"), Some(ErrorCode::E303));
        assert_eq!(first_code(&library, "User"), Some(ErrorCode::E303));
    }
}
