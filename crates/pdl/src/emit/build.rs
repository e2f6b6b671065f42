//! Pass 3: `make_default`, building the dynamic tree of a type.

use pdl_core::KeySource;
use pdl_parser::{
    generator::{Field, Generator, GeneratorKind, Primitive, Record},
    scope::{Scope, type_name},
};

use super::{
    Context, default::default_expr, floats_lit, float_lit, generic_param, impl_header,
    opaque_parts, string_lit,
    writer::{CodeWriter, ModuleTree},
};
use crate::error::PdlError;

pub(super) fn build_impls(
    ctx: &Context<'_>,
    generator: &Generator,
    tree: &mut ModuleTree,
) -> Result<(), PdlError> {
    let scope = generator.scope();
    let static_parameters = format!("{}::StaticParameters", ctx.rt);
    match &generator.kind {
        GeneratorKind::Record(record) => {
            let header = impl_header(
                generator,
                Some(record),
                Some(&static_parameters),
                &static_parameters,
            );
            let member = record_make_default(ctx, generator, record)?;
            tree.impl_members(scope, &header).push(member);

            if generator.path().is_empty() {
                let header = impl_header(generator, Some(record), None, &static_parameters);
                tree.impl_members(scope, &header)
                    .push(build_default_fn(ctx));
            }
        }
        GeneratorKind::Variant { cases, default } => {
            let header = impl_header(generator, None, None, "");
            let member = variant_make_default(ctx, generator, cases, default.inner())?;
            tree.impl_members(scope, &header).push(member);
        }
        GeneratorKind::Primitive(_)
        | GeneratorKind::Array { .. }
        | GeneratorKind::LabeledArray { .. }
        | GeneratorKind::Included { .. } => {}
    }

    for child in generator.children() {
        build_impls(ctx, child, tree)?;
    }
    Ok(())
}

fn build_default_fn(ctx: &Context<'_>) -> String {
    let rt = ctx.rt;
    let mut w = CodeWriter::new();
    w.line("/// Returns the default static value together with the default dynamic tree.");
    w.open(format!(
        "pub fn build_default() -> {rt}::Result<(Self, {rt}::ParameterSet)>"
    ));
    w.line(format!("<Self as {rt}::StaticParameters>::build_default()"));
    w.close();
    w.finish()
}

/// The base record type as written in the module of `generator`.
pub(super) fn base_type(generator: &Generator, record: &Record) -> Option<String> {
    let base = record.base.as_ref()?;
    Some(match generic_param(record) {
        Some(param) => param.to_string(),
        None => Scope::root().qualify(generator.scope(), &type_name(base.inner())),
    })
}

fn record_make_default(
    ctx: &Context<'_>,
    generator: &Generator,
    record: &Record,
) -> Result<String, PdlError> {
    let rt = ctx.rt;
    let at = generator.scope();
    let base = base_type(generator, record);
    let mutated = base.is_some() || !record.fields.is_empty() || record.init_code.is_some();

    let mut w = CodeWriter::new();
    w.open(format!("fn make_default() -> {rt}::Result<{rt}::ParameterSet>"));
    w.line(format!(
        "let {}p = {rt}::ParameterSet::new({});",
        if mutated { "mut " } else { "" },
        ctx.meta_expr(generator)
    ));
    if let Some(base) = base {
        w.line(format!(
            "p.merge_from(<{base} as {rt}::StaticParameters>::make_default()?)?;"
        ));
    }
    for field in &record.fields {
        w.line(format!(
            "p.insert_or_merge({:?}, {})?;",
            field.label.inner(),
            build_expr(ctx, &field.generator, at)?
        ));
    }
    if let Some(code) = &record.init_code {
        w.open("");
        w.lines(code.trim());
        w.close();
    }
    w.line("Ok(p)");
    w.close();
    Ok(w.finish())
}

fn variant_make_default(
    ctx: &Context<'_>,
    generator: &Generator,
    cases: &[Field],
    default: &str,
) -> Result<String, PdlError> {
    let rt = ctx.rt;
    let at = generator.scope();

    let mut w = CodeWriter::new();
    w.line("/// Builds the dynamic node with every case and the default case selected.");
    w.open(format!(
        "pub fn make_default() -> {rt}::Result<{rt}::SelectableSubsetParameter>"
    ));
    w.line(format!(
        "let mut p = {rt}::SelectableSubsetParameter::new({});",
        ctx.meta_expr(generator)
    ));
    for case in cases {
        w.line(format!(
            "p.add_case({:?}, {});",
            case.label.inner(),
            build_expr(ctx, &case.generator, at)?
        ));
    }
    w.line(format!("p.set_selection({default:?})?;"));
    w.line("Ok(p)");
    w.close();
    Ok(w.finish())
}

/// An expression, valid in module `at` inside a function returning the
/// runtime `Result`, that builds the default dynamic node of `generator`.
pub(super) fn build_expr(
    ctx: &Context<'_>,
    generator: &Generator,
    at: &Scope,
) -> Result<String, PdlError> {
    let rt = ctx.rt;
    let meta = ctx.meta_expr(generator);
    let expr = match &generator.kind {
        GeneratorKind::Primitive(primitive) => match primitive {
            Primitive::Bool(_) => leaf(ctx, "BoolParameter", generator, at)?,
            Primitive::Int(_) => leaf(ctx, "IntParameter", generator, at)?,
            Primitive::Double(_) => leaf(ctx, "DoubleParameter", generator, at)?,
            Primitive::String(_) => leaf(ctx, "StringParameter", generator, at)?,
            Primitive::Date(_) => leaf(ctx, "DateParameter", generator, at)?,
            Primitive::DateTime(_) => leaf(ctx, "DateTimeParameter", generator, at)?,
            Primitive::Matrix(_) => leaf(ctx, "MatrixParameter", generator, at)?,
            Primitive::Path(path) => format!("{rt}::PathParameter::file({path:?}, {meta})"),
            Primitive::Directory(path) => {
                format!("{rt}::PathParameter::directory({path:?}, {meta})")
            }
            Primitive::Dimensioned {
                quantity,
                value,
                unit,
            } => format!(
                "{rt}::DimensionedParameter::new({quantity:?}, {}, {unit:?}, {meta})?",
                float_lit(*value)
            ),
            Primitive::DoubleRange(values) => format!(
                "{rt}::DoubleRangeParameter::new({}, {meta})",
                floats_lit(values)
            ),
            Primitive::Vector(values) => {
                format!("{rt}::VectorParameter::new({}, {meta})", floats_lit(values))
            }
            Primitive::Selection { items, default } => {
                let items: Vec<String> = items.iter().map(|item| format!("{item:?}")).collect();
                format!(
                    "{rt}::SelectionParameter::new([{}], {default:?}, {meta})?",
                    items.join(", ")
                )
            }
            Primitive::CadGeometry(_) | Primitive::PropertyLibrarySelection { .. } => {
                let Some((key, qualifier, payload)) = opaque_parts(primitive) else {
                    return Err(super::emit_error(generator, "not an opaque leaf"));
                };
                format!(
                    "{rt}::OpaqueRegistry::with_builtin_kinds()\
                     .create({key:?}, {qualifier:?}, {payload:?}, {meta})?"
                )
            }
        },
        GeneratorKind::Array { element, count } => {
            let prototype = build_expr(ctx, element, at)?;
            let array = format!("{rt}::ArrayParameter::new({prototype}, {meta})");
            if *count == 0 {
                array
            } else {
                format!("{{ let mut a = {array}; a.resize({count}); a }}")
            }
        }
        GeneratorKind::LabeledArray {
            element,
            count,
            keys,
        } => {
            let prototype = build_expr(ctx, element, at)?;
            let source = match keys {
                KeySource::Pattern(pattern) => {
                    format!("{rt}::KeySource::Pattern({})", string_lit(pattern))
                }
                KeySource::Reference(path) => {
                    format!("{rt}::KeySource::Reference({})", string_lit(path))
                }
            };
            let array = format!("{rt}::LabeledArrayParameter::new({source}, {prototype}, {meta})");
            if *count > 0 && matches!(keys, KeySource::Pattern(_)) {
                format!("{{ let mut a = {array}; a.insert_default_entries({count}); a }}")
            } else {
                array
            }
        }
        GeneratorKind::Record(_) => format!(
            "<{} as {rt}::StaticParameters>::make_default()?",
            ctx.static_type(generator, at)
        ),
        GeneratorKind::Included { .. } => format!(
            "<{} as {rt}::StaticParameters>::make_default()?.with_meta({meta})",
            ctx.static_type(generator, at)
        ),
        GeneratorKind::Variant { .. } => {
            format!("{}::make_default()?", ctx.static_type(generator, at))
        }
    };
    Ok(expr)
}

/// `Kind::new(default, meta)` for a leaf wrapping its static value.
fn leaf(
    ctx: &Context<'_>,
    kind: &str,
    generator: &Generator,
    at: &Scope,
) -> Result<String, PdlError> {
    Ok(format!(
        "{}::{kind}::new({}, {})",
        ctx.rt,
        default_expr(ctx, generator, at)?,
        ctx.meta_expr(generator)
    ))
}
