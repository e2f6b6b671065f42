//! Rust source generation for a library of PDL documents.
//!
//! The emitter walks every document four times:
//!
//! 1. [`declare`] - structs, enums and type aliases mirroring the schema
//! 2. [`default`] - `Default` impls holding the literal defaults
//! 3. [`build`] - `make_default`, which builds the dynamic tree
//! 4. [`marshal`] - `set` and `get`, copying between the two representations,
//!    plus the field setters, `to_parameters` and `TryFrom<&ParameterSet>`
//!
//! Each pass adds items to a [`ModuleTree`] at the scope assigned by the
//! parser. The tree is only rendered once all passes succeeded, so a
//! failing compilation produces no output at all.
//!
//! Every type reference is written relative to the module it appears in
//! with [`Scope::qualify`]. Runtime items go through the configured runtime
//! crate path.

mod build;
mod declare;
mod default;
mod marshal;
mod writer;

use std::collections::HashSet;

use log::{debug, info};
use pdl_core::{
    OpaqueRegistry,
    opaque::{CAD_GEOMETRY, PROPERTY_LIBRARY_SELECTION},
};
use pdl_parser::{
    Library,
    generator::{Generator, GeneratorKind, Primitive, Record},
    scope::{Scope, type_name},
};

use crate::{config::EmitConfig, error::PdlError};

use writer::{CodeWriter, ModuleTree};

/// Generates the Rust source of every document in `library`.
///
/// # Errors
///
/// Returns [`PdlError::Emit`] if two schema names map to the same Rust
/// identifier in one module, or a default cannot be represented.
pub fn emit_library(library: &Library, config: &EmitConfig) -> Result<String, PdlError> {
    let ctx = Context::new(config);
    let mut tree = ModuleTree::new();

    let roots: Vec<&Generator> = library.documents().map(|d| d.root()).collect();
    check_unique(
        "document type",
        "",
        roots.iter().map(|root| type_name(root.name())),
    )?;
    check_unique(
        "document module",
        "",
        roots.iter().map(|root| module_ident(root.name())),
    )?;

    for root in &roots {
        declare::declare(&ctx, root, &mut tree)?;
    }
    debug!(documents = roots.len(); "Declared types");
    for root in &roots {
        default::default_impls(&ctx, root, &mut tree)?;
    }
    for root in &roots {
        build::build_impls(&ctx, root, &mut tree)?;
    }
    for root in &roots {
        marshal::marshal_impls(&ctx, root, &mut tree)?;
    }

    let mut writer = CodeWriter::new();
    if config.header() {
        writer.line(format!(
            "// @generated by pdl {}. Do not edit by hand.",
            env!("CARGO_PKG_VERSION")
        ));
        let names: Vec<&str> = roots.iter().map(|root| root.name()).collect();
        writer.line(format!("// Documents: {}", names.join(", ")));
        writer.blank();
    }
    tree.render(&mut writer);
    let source = writer.finish();

    info!(documents = roots.len(), bytes = source.len(); "Emitted Rust source");
    Ok(source)
}

/// Settings shared by all passes.
pub(crate) struct Context<'a> {
    /// Path of the runtime crate.
    pub(crate) rt: &'a str,
    derives: &'a [String],
    opaque: OpaqueRegistry,
}

impl<'a> Context<'a> {
    pub(crate) fn new(config: &'a EmitConfig) -> Self {
        Self {
            rt: config.runtime_crate(),
            derives: config.derives(),
            opaque: OpaqueRegistry::with_builtin_kinds(),
        }
    }

    /// Returns the derive attribute for generated types, if any.
    pub(crate) fn derive_attr(&self) -> Option<String> {
        if self.derives.is_empty() {
            None
        } else {
            Some(format!("#[derive({})]", self.derives.join(", ")))
        }
    }

    /// Returns the static type of `generator` as written from module `at`.
    pub(crate) fn static_type(&self, generator: &Generator, at: &Scope) -> String {
        let rt = self.rt;
        match &generator.kind {
            GeneratorKind::Primitive(primitive) => match primitive {
                Primitive::Bool(_) => "bool".to_string(),
                Primitive::Int(_) => "i64".to_string(),
                Primitive::Double(_) | Primitive::Dimensioned { .. } => "f64".to_string(),
                Primitive::String(_)
                | Primitive::CadGeometry(_)
                | Primitive::PropertyLibrarySelection { .. } => "::std::string::String".to_string(),
                Primitive::Path(_) | Primitive::Directory(_) => "::std::path::PathBuf".to_string(),
                Primitive::Date(_) => format!("{rt}::chrono::NaiveDate"),
                Primitive::DateTime(_) => format!("{rt}::chrono::NaiveDateTime"),
                Primitive::DoubleRange(_) | Primitive::Vector(_) => {
                    "::std::vec::Vec<f64>".to_string()
                }
                Primitive::Matrix(_) => format!("{rt}::Matrix"),
                Primitive::Selection { .. } => declared_type(generator, at),
            },
            GeneratorKind::Included { target } => {
                Scope::root().qualify(at, &type_name(target.inner()))
            }
            GeneratorKind::Array { .. }
            | GeneratorKind::LabeledArray { .. }
            | GeneratorKind::Record(_)
            | GeneratorKind::Variant { .. } => declared_type(generator, at),
        }
    }

    /// Returns the expression building the metadata of `generator`.
    pub(crate) fn meta_expr(&self, generator: &Generator) -> String {
        let meta = &generator.meta;
        let mut expr = format!("{}::Meta::new({:?})", self.rt, meta.description);
        if meta.hidden {
            expr.push_str(".with_hidden(true)");
        }
        if meta.expert {
            expr.push_str(".with_expert(true)");
        }
        if meta.necessary {
            expr.push_str(".with_necessary(true)");
        }
        if meta.order != 0 {
            expr.push_str(&format!(".with_order({})", meta.order));
        }
        expr
    }

    /// Returns the normalized payload of an opaque leaf.
    pub(crate) fn opaque_payload(
        &self,
        generator: &Generator,
        key: &str,
        qualifier: &str,
        payload: &str,
    ) -> Result<String, PdlError> {
        self.opaque
            .create(key, qualifier, payload, pdl_core::Meta::default())
            .map(|leaf| leaf.value().clone())
            .map_err(|err| emit_error(generator, err))
    }
}

/// Returns the factory key, qualifier and payload of an opaque leaf.
pub(crate) fn opaque_parts(primitive: &Primitive) -> Option<(&'static str, &str, &str)> {
    match primitive {
        Primitive::CadGeometry(script) => Some((CAD_GEOMETRY, "", script)),
        Primitive::PropertyLibrarySelection { library, entry } => {
            Some((PROPERTY_LIBRARY_SELECTION, library, entry))
        }
        _ => None,
    }
}

/// The name of a type declared for `generator`, qualified from `at`.
fn declared_type(generator: &Generator, at: &Scope) -> String {
    generator.scope().qualify(at, &type_name(generator.name()))
}

/// Identifier of the struct field or module named after `name`.
pub(crate) fn module_ident(name: &str) -> String {
    pdl_parser::scope::module_name(name)
}

/// Generic parameter of a record, if its base is one.
pub(crate) fn generic_param(record: &Record) -> Option<&str> {
    if record.has_generic_base() {
        record.generic.as_ref().map(|g| g.inner().as_str())
    } else {
        None
    }
}

/// Builds the header of an impl block for the type of `generator`.
///
/// For a generic record the parameter is bounded by `bound`, if not empty.
pub(crate) fn impl_header(
    generator: &Generator,
    record: Option<&Record>,
    trait_path: Option<&str>,
    bound: &str,
) -> String {
    let ident = type_name(generator.name());
    let generic = record.and_then(generic_param);
    let (params, args) = match generic {
        Some(param) if bound.is_empty() => (format!("<{param}>"), format!("<{param}>")),
        Some(param) => (format!("<{param}: {bound}>"), format!("<{param}>")),
        None => (String::new(), String::new()),
    };
    match trait_path {
        Some(trait_path) => format!("impl{params} {trait_path} for {ident}{args}"),
        None => format!("impl{params} {ident}{args}"),
    }
}

/// Writes one `///` line per line of `description`.
pub(crate) fn doc_comment(description: &str) -> String {
    description
        .lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                "///".to_string()
            } else {
                format!("/// {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A Rust literal for `value`.
pub(crate) fn float_lit(value: f64) -> String {
    if value.is_nan() {
        "f64::NAN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "f64::INFINITY".to_string()
        } else {
            "f64::NEG_INFINITY".to_string()
        }
    } else {
        format!("{value:?}")
    }
}

/// A `Vec<f64>` expression holding `values`.
pub(crate) fn floats_lit(values: &[f64]) -> String {
    if values.is_empty() {
        "::std::vec::Vec::new()".to_string()
    } else {
        let values: Vec<String> = values.iter().copied().map(float_lit).collect();
        format!("::std::vec![{}]", values.join(", "))
    }
}

pub(crate) fn string_lit(value: &str) -> String {
    format!("::std::string::String::from({value:?})")
}

pub(crate) fn emit_error(generator: &Generator, message: impl std::fmt::Display) -> PdlError {
    PdlError::Emit(format!("`{}`: {message}", generator.path()))
}

/// Fails if two schema names of one scope map to the same identifier.
pub(crate) fn check_unique(
    what: &str,
    path: &str,
    idents: impl IntoIterator<Item = String>,
) -> Result<(), PdlError> {
    let mut seen = HashSet::new();
    for ident in idents {
        if !seen.insert(ident.clone()) {
            return Err(PdlError::Emit(format!(
                "`{path}`: two names map to the {what} `{ident}`"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_literals() {
        assert_eq!(float_lit(1.0), "1.0");
        assert_eq!(float_lit(-0.25), "-0.25");
        assert_eq!(float_lit(1e-6), "1e-6");
        assert_eq!(float_lit(f64::NAN), "f64::NAN");
        assert_eq!(float_lit(f64::NEG_INFINITY), "f64::NEG_INFINITY");
        assert_eq!(floats_lit(&[]), "::std::vec::Vec::new()");
        assert_eq!(floats_lit(&[1.0, 2.5]), "::std::vec![1.0, 2.5]");
    }

    #[test]
    fn test_doc_comment() {
        assert_eq!(doc_comment("Cell count\n\nper axis"), "/// Cell count\n///\n/// per axis");
        assert_eq!(doc_comment(""), "");
    }

    #[test]
    fn test_check_unique() {
        let ok = check_unique("type", "mesh", ["A".to_string(), "B".to_string()]);
        assert!(ok.is_ok());

        let err = check_unique("type", "mesh", ["MaxIter".to_string(), "MaxIter".to_string()])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Emit error: `mesh`: two names map to the type `MaxIter`"
        );
    }
}
