//! Pass 1: the static types mirroring the schema.

use pdl_parser::{
    generator::{Field, Generator, GeneratorKind, Primitive, Record},
    scope::{Scope, type_name},
};

use super::{
    Context, check_unique, doc_comment, generic_param, impl_header, module_ident,
    writer::{CodeWriter, ModuleTree},
};
use crate::error::PdlError;

/// Declares the type of `generator`, if it has one, then those of its
/// descendants.
pub(super) fn declare(
    ctx: &Context<'_>,
    generator: &Generator,
    tree: &mut ModuleTree,
) -> Result<(), PdlError> {
    let scope = generator.scope();
    match &generator.kind {
        GeneratorKind::Primitive(Primitive::Selection { items, .. }) => {
            check_unique(
                "selection variant",
                generator.path(),
                items.iter().map(|item| type_name(item)),
            )?;
            tree.push(scope, declare_selection(ctx, generator, items));
        }
        GeneratorKind::Primitive(_) | GeneratorKind::Included { .. } => {}
        GeneratorKind::Array { element, .. } => {
            let element_type = ctx.static_type(element, scope);
            let target = format!("::std::vec::Vec<{element_type}>");
            tree.push(scope, declare_alias(generator, &target));
        }
        GeneratorKind::LabeledArray { element, .. } => {
            let element_type = ctx.static_type(element, scope);
            let target = format!(
                "::std::collections::BTreeMap<::std::string::String, {element_type}>"
            );
            tree.push(scope, declare_alias(generator, &target));
        }
        GeneratorKind::Record(record) => {
            check_record(generator, record)?;
            tree.push(scope, declare_record(ctx, generator, record));
        }
        GeneratorKind::Variant { cases, .. } => {
            check_variant(generator, cases)?;
            tree.push(scope, declare_variant(ctx, generator, cases));
        }
    }

    for child in generator.children() {
        declare(ctx, child, tree)?;
    }
    Ok(())
}

fn check_record(generator: &Generator, record: &Record) -> Result<(), PdlError> {
    let path = generator.path();
    let base = record.base.as_ref().map(|_| "base".to_string());
    check_unique(
        "field",
        path,
        base.into_iter()
            .chain(record.fields.iter().map(|f| module_ident(f.label.inner()))),
    )?;

    let composites: Vec<&Field> = record
        .fields
        .iter()
        .filter(|f| f.generator.is_composite())
        .collect();
    check_unique(
        "type",
        path,
        composites.iter().map(|f| type_name(f.label.inner())),
    )?;
    check_unique(
        "module",
        path,
        composites.iter().map(|f| module_ident(f.label.inner())),
    )
}

fn check_variant(generator: &Generator, cases: &[Field]) -> Result<(), PdlError> {
    let path = generator.path();
    check_unique(
        "variant",
        path,
        cases.iter().map(|c| type_name(c.label.inner())),
    )?;
    let declared: Vec<&Field> = cases
        .iter()
        .filter(|c| c.generator.is_composite())
        .collect();
    check_unique(
        "module",
        path,
        declared.iter().map(|c| module_ident(c.label.inner())),
    )
}

fn start_item(ctx: &Context<'_>, generator: &Generator, w: &mut CodeWriter) {
    if !generator.meta.description.is_empty() {
        w.lines(&doc_comment(&generator.meta.description));
    }
    if let Some(derive) = ctx.derive_attr() {
        w.line(derive);
    }
}

fn declare_alias(generator: &Generator, target: &str) -> String {
    let mut w = CodeWriter::new();
    if !generator.meta.description.is_empty() {
        w.lines(&doc_comment(&generator.meta.description));
    }
    w.line(format!("pub type {} = {target};", type_name(generator.name())));
    w.finish()
}

fn declare_record(ctx: &Context<'_>, generator: &Generator, record: &Record) -> String {
    let scope = generator.scope();
    let ident = type_name(generator.name());
    let generic = generic_param(record);

    let mut w = CodeWriter::new();
    start_item(ctx, generator, &mut w);
    match generic {
        Some(param) => w.open(format!("pub struct {ident}<{param}>")),
        None => w.open(format!("pub struct {ident}")),
    }

    let base_type = record.base.as_ref().map(|base| match generic {
        Some(param) => param.to_string(),
        None => Scope::root().qualify(scope, &type_name(base.inner())),
    });
    if let Some(base_type) = &base_type {
        w.line(format!("pub base: {base_type},"));
    }
    for field in &record.fields {
        if !field.generator.meta.description.is_empty() {
            w.lines(&doc_comment(&field.generator.meta.description));
        }
        w.line(format!(
            "pub {}: {},",
            module_ident(field.label.inner()),
            ctx.static_type(&field.generator, scope)
        ));
    }
    w.close();

    if let Some(base_type) = base_type {
        w.blank();
        w.open(impl_header(generator, Some(record), Some("::std::ops::Deref"), ""));
        w.line(format!("type Target = {base_type};"));
        w.blank();
        w.open("fn deref(&self) -> &Self::Target");
        w.line("&self.base");
        w.close();
        w.close();
        w.blank();
        w.open(impl_header(generator, Some(record), Some("::std::ops::DerefMut"), ""));
        w.open("fn deref_mut(&mut self) -> &mut Self::Target");
        w.line("&mut self.base");
        w.close();
        w.close();
    }
    w.finish()
}

fn declare_variant(ctx: &Context<'_>, generator: &Generator, cases: &[Field]) -> String {
    let scope = generator.scope();

    let mut w = CodeWriter::new();
    start_item(ctx, generator, &mut w);
    w.open(format!("pub enum {}", type_name(generator.name())));
    for case in cases {
        w.line(format!(
            "{}({}),",
            type_name(case.label.inner()),
            ctx.static_type(&case.generator, scope)
        ));
    }
    w.close();
    w.finish()
}

fn declare_selection(ctx: &Context<'_>, generator: &Generator, items: &[String]) -> String {
    let rt = ctx.rt;
    let ident = type_name(generator.name());
    let labels: Vec<String> = items.iter().map(|item| format!("{item:?}")).collect();

    let mut w = CodeWriter::new();
    start_item(ctx, generator, &mut w);
    w.open(format!("pub enum {ident}"));
    for item in items {
        w.line(format!("{},", type_name(item)));
    }
    w.close();
    w.blank();

    w.open(format!("impl {ident}"));
    w.line("/// Labels in declaration order.");
    w.line(format!(
        "pub const LABELS: &'static [&'static str] = &[{}];",
        labels.join(", ")
    ));
    w.blank();
    w.open("pub fn as_str(&self) -> &'static str");
    w.open("match self");
    for (item, label) in items.iter().zip(&labels) {
        w.line(format!("Self::{} => {label},", type_name(item)));
    }
    w.close();
    w.close();
    w.blank();
    w.open(format!("pub fn from_label(label: &str) -> {rt}::Result<Self>"));
    w.open("match label");
    for (item, label) in items.iter().zip(&labels) {
        w.line(format!("{label} => Ok(Self::{}),", type_name(item)));
    }
    w.open(format!("_ => Err({rt}::ParameterError::UnknownSelection"));
    w.line(format!(
        "name: ::std::string::String::from({:?}),",
        generator.path()
    ));
    w.line("selection: label.to_string(),");
    w.line(format!(
        "options: ::std::string::String::from({:?}),",
        items.join(", ")
    ));
    w.close_with("),");
    w.close();
    w.close();
    w.close();
    w.finish()
}
