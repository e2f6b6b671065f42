//! Pass 2: `Default` impls holding the literal schema defaults.

use pdl_core::{
    KeySource,
    chrono::{Datelike, Timelike},
    pattern_key, units,
};
use pdl_parser::{
    generator::{Field, Generator, GeneratorKind, Primitive, Record},
    scope::{Scope, type_name},
};

use super::{
    Context, emit_error, float_lit, floats_lit, impl_header, module_ident,
    opaque_parts, string_lit,
    writer::{CodeWriter, ModuleTree},
};
use crate::error::PdlError;

const DEFAULT_TRAIT: &str = "::std::default::Default";

pub(super) fn default_impls(
    ctx: &Context<'_>,
    generator: &Generator,
    tree: &mut ModuleTree,
) -> Result<(), PdlError> {
    let scope = generator.scope();
    match &generator.kind {
        GeneratorKind::Primitive(Primitive::Selection { default, .. }) => {
            let body = format!("Self::{}", type_name(default));
            tree.push(scope, default_impl(generator, None, &body));
        }
        GeneratorKind::Record(record) => {
            let body = record_default(ctx, generator, record)?;
            tree.push(scope, default_impl(generator, Some(record), &body));
        }
        GeneratorKind::Variant { cases, default } => {
            let body = variant_default(ctx, generator, cases, default.inner())?;
            tree.push(scope, default_impl(generator, None, &body));
        }
        GeneratorKind::Primitive(_)
        | GeneratorKind::Included { .. }
        | GeneratorKind::Array { .. }
        | GeneratorKind::LabeledArray { .. } => {}
    }

    for child in generator.children() {
        default_impls(ctx, child, tree)?;
    }
    Ok(())
}

fn default_impl(generator: &Generator, record: Option<&Record>, body: &str) -> String {
    let mut w = CodeWriter::new();
    w.open(impl_header(generator, record, Some(DEFAULT_TRAIT), DEFAULT_TRAIT));
    w.open("fn default() -> Self");
    w.lines(body);
    w.close();
    w.close();
    w.finish()
}

fn record_default(
    ctx: &Context<'_>,
    generator: &Generator,
    record: &Record,
) -> Result<String, PdlError> {
    let at = generator.scope();
    let mut w = CodeWriter::new();
    w.open("Self");
    if record.base.is_some() {
        w.line(format!("base: {DEFAULT_TRAIT}::default(),"));
    }
    for field in &record.fields {
        w.line(format!(
            "{}: {},",
            module_ident(field.label.inner()),
            default_expr(ctx, &field.generator, at)?
        ));
    }
    w.close();
    Ok(w.finish())
}

fn variant_default(
    ctx: &Context<'_>,
    generator: &Generator,
    cases: &[Field],
    default: &str,
) -> Result<String, PdlError> {
    let case = cases
        .iter()
        .find(|c| c.label.inner() == default)
        .ok_or_else(|| emit_error(generator, format!("default case `{default}` is not declared")))?;
    Ok(format!(
        "Self::{}({})",
        type_name(default),
        default_expr(ctx, &case.generator, generator.scope())?
    ))
}

/// An expression, valid in module `at`, evaluating to the static default
/// of `generator`.
pub(super) fn default_expr(
    ctx: &Context<'_>,
    generator: &Generator,
    at: &Scope,
) -> Result<String, PdlError> {
    let rt = ctx.rt;
    let expr = match &generator.kind {
        GeneratorKind::Primitive(primitive) => match primitive {
            Primitive::Bool(value) => value.to_string(),
            Primitive::Int(value) => value.to_string(),
            Primitive::Double(value) => float_lit(*value),
            Primitive::String(value) => string_lit(value),
            Primitive::Path(value) | Primitive::Directory(value) => {
                format!("::std::path::PathBuf::from({value:?})")
            }
            Primitive::Date(date) => format!(
                "{rt}::chrono::NaiveDate::from_ymd_opt({}, {}, {}).unwrap_or_default()",
                date.year(),
                date.month(),
                date.day()
            ),
            Primitive::DateTime(datetime) => format!(
                "{rt}::chrono::NaiveDate::from_ymd_opt({}, {}, {})\
                 .and_then(|d| d.and_hms_opt({}, {}, {}))\
                 .unwrap_or_default()",
                datetime.year(),
                datetime.month(),
                datetime.day(),
                datetime.hour(),
                datetime.minute(),
                datetime.second()
            ),
            Primitive::Dimensioned {
                quantity,
                value,
                unit,
            } => {
                let factor = units::lookup(quantity, unit).ok_or_else(|| {
                    emit_error(generator, format!("unknown unit `{unit}` for `{quantity}`"))
                })?;
                float_lit(value * factor)
            }
            Primitive::DoubleRange(values) => {
                let mut values = values.clone();
                values.sort_by(f64::total_cmp);
                values.dedup();
                floats_lit(&values)
            }
            Primitive::Vector(values) => floats_lit(values),
            Primitive::Matrix(matrix) => format!(
                "{rt}::Matrix::new({}, {}, {})",
                matrix.rows(),
                matrix.cols(),
                floats_lit(matrix.as_slice())
            ),
            Primitive::Selection { default, .. } => {
                format!("{}::{}", ctx.static_type(generator, at), type_name(default))
            }
            Primitive::CadGeometry(_) | Primitive::PropertyLibrarySelection { .. } => {
                let (key, qualifier, payload) = opaque_parts(primitive)
                    .ok_or_else(|| emit_error(generator, "not an opaque leaf"))?;
                string_lit(&ctx.opaque_payload(generator, key, qualifier, payload)?)
            }
        },
        GeneratorKind::Array { element, count } => {
            if *count == 0 {
                "::std::vec::Vec::new()".to_string()
            } else {
                format!(
                    "(0..{count}).map(|_| {}).collect()",
                    default_expr(ctx, element, at)?
                )
            }
        }
        GeneratorKind::LabeledArray {
            element,
            count,
            keys,
        } => match keys {
            KeySource::Pattern(pattern) if *count > 0 => {
                let element = default_expr(ctx, element, at)?;
                let entries: Vec<String> = (0..*count)
                    .map(|i| format!("({}, {element})", string_lit(&pattern_key(pattern, i))))
                    .collect();
                format!("[{}].into_iter().collect()", entries.join(", "))
            }
            _ => "::std::collections::BTreeMap::new()".to_string(),
        },
        GeneratorKind::Record(_) | GeneratorKind::Variant { .. } | GeneratorKind::Included { .. } => {
            format!("<{} as {DEFAULT_TRAIT}>::default()", ctx.static_type(generator, at))
        }
    };
    Ok(expr)
}
