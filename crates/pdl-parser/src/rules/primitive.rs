//! Leaf parameter types.

use log::trace;
use pdl_core::{
    Matrix,
    chrono::{NaiveDate, NaiveDateTime},
    units,
};
use winnow::{Parser as _, combinator::opt, error::ErrMode, stream::Stream};

use crate::{
    error::{Diagnostic, ErrorCode},
    generator::{GeneratorKind, Primitive},
    parser::{
        Context, Grammar, IResult, Input, float_literal, identifier, int_literal, punct,
        raw_identifier, string_literal,
    },
    registry::Registry,
    span::Spanned,
    tokens::Token,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

pub(crate) fn register(registry: &mut Registry) {
    registry.register("bool", bool_rule);
    registry.register("int", int_rule);
    registry.register("double", double_rule);
    registry.register("string", string_rule);
    registry.register("path", path_rule);
    registry.register("directory", directory_rule);
    registry.register("date", date_rule);
    registry.register("datetime", datetime_rule);
    registry.register("dimensioned", dimensioned_rule);
    registry.register("doublerange", double_range_rule);
    registry.register("vector", vector_rule);
    registry.register("matrix", matrix_rule);
    registry.register("selection", selection_rule);
    registry.register("cadgeometry", cad_geometry_rule);
    registry.register("propertylibraryselection", property_library_rule);
}

fn primitive(primitive: Primitive) -> IResult<GeneratorKind> {
    Ok(GeneratorKind::Primitive(primitive))
}

fn bool_rule(_: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let value = raw_identifier
        .verify_map(|word| match *word.inner() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        })
        .context(Context::Label("`true` or `false`"))
        .parse_next(input)?;
    primitive(Primitive::Bool(value))
}

fn int_rule(_: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let value = int_literal.parse_next(input)?;
    primitive(Primitive::Int(value.into_inner()))
}

fn double_rule(_: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let value = float_literal.parse_next(input)?;
    primitive(Primitive::Double(value.into_inner()))
}

fn string_rule(_: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let value = string_literal.parse_next(input)?;
    primitive(Primitive::String(value.into_inner()))
}

fn path_rule(_: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let value = string_literal.parse_next(input)?;
    primitive(Primitive::Path(value.into_inner()))
}

fn directory_rule(_: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let value = string_literal.parse_next(input)?;
    primitive(Primitive::Directory(value.into_inner()))
}

fn cad_geometry_rule(_: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let script = string_literal.parse_next(input)?;
    primitive(Primitive::CadGeometry(script.into_inner()))
}

fn property_library_rule(_: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let library = identifier.parse_next(input)?;
    let entry = string_literal.parse_next(input)?;
    primitive(Primitive::PropertyLibrarySelection {
        library: library.into_inner(),
        entry: entry.into_inner(),
    })
}

fn invalid_literal<O>(
    g: &mut Grammar<'_>,
    literal: &Spanned<String>,
    what: &str,
    help: &str,
) -> IResult<O> {
    let diagnostic = Diagnostic::error(format!(
        "invalid {what} `{}`{}",
        literal.inner(),
        g.location()
    ))
    .with_code(ErrorCode::E205)
    .with_label(literal.span(), format!("not a valid {what}"))
    .with_help(help.to_string());
    g.fail(diagnostic)
}

fn date_rule(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let literal = string_literal.parse_next(input)?;
    match NaiveDate::parse_from_str(literal.inner(), DATE_FORMAT) {
        Ok(date) => primitive(Primitive::Date(date)),
        Err(_) => invalid_literal(g, &literal, "date", "dates are written as \"YYYY-MM-DD\""),
    }
}

fn datetime_rule(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let literal = string_literal.parse_next(input)?;
    let parsed = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(literal.inner(), format).ok());
    match parsed {
        Some(datetime) => primitive(Primitive::DateTime(datetime)),
        None => invalid_literal(
            g,
            &literal,
            "datetime",
            "datetimes are written as \"YYYY-MM-DDTHH:MM:SS\"",
        ),
    }
}

/// `dimensioned quantity value unit`
fn dimensioned_rule(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let quantity = identifier
        .context(Context::Label("quantity"))
        .parse_next(input)?;
    let value = float_literal.parse_next(input)?;
    let unit = identifier.context(Context::Label("unit")).parse_next(input)?;

    if !units::is_quantity(quantity.inner()) {
        let diagnostic = Diagnostic::error(format!(
            "unknown quantity `{}`{}",
            quantity.inner(),
            g.location()
        ))
        .with_code(ErrorCode::E203)
        .with_label(quantity.span(), "unknown quantity")
        .with_help("use a quantity such as `length`, `pressure` or `temperature`");
        return g.fail(diagnostic);
    }
    if units::lookup(quantity.inner(), unit.inner()).is_none() {
        let diagnostic = Diagnostic::error(format!(
            "unknown unit `{}` for quantity `{}`{}",
            unit.inner(),
            quantity.inner(),
            g.location()
        ))
        .with_code(ErrorCode::E203)
        .with_label(unit.span(), "unknown unit")
        .with_help(format!(
            "known units of `{}`: {}",
            quantity.inner(),
            units::units_of(quantity.inner()).join(", ")
        ));
        return g.fail(diagnostic);
    }

    primitive(Primitive::Dimensioned {
        quantity: quantity.into_inner(),
        value: value.into_inner(),
        unit: unit.into_inner(),
    })
}

/// Parse `( number* )`; numbers may be separated by commas.
fn number_list(input: &mut Input<'_>) -> IResult<Vec<f64>> {
    punct(input, Token::LeftParen, "`(`")?;
    let mut values = Vec::new();
    loop {
        if let Some(value) = opt(float_literal).parse_next(input)? {
            values.push(value.into_inner());
            opt(|input: &mut Input<'_>| punct(input, Token::Comma, "`,`")).parse_next(input)?;
            continue;
        }
        punct(input, Token::RightParen, "`)`")?;
        return Ok(values);
    }
}

fn double_range_rule(_: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let mut values = number_list(input)?;
    values.sort_by(f64::total_cmp);
    values.dedup();
    primitive(Primitive::DoubleRange(values))
}

fn vector_rule(_: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let values = number_list(input)?;
    primitive(Primitive::Vector(values))
}

/// `matrix ( (1 2) (3 4) )`
fn matrix_rule(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let open = punct(input, Token::LeftParen, "`(`")?;
    let mut rows = Vec::new();
    loop {
        let checkpoint = input.checkpoint();
        match number_list(input) {
            Ok(row) => rows.push(row),
            Err(ErrMode::Backtrack(_)) => {
                input.reset(&checkpoint);
                break;
            }
            Err(e) => return Err(e),
        }
    }
    let close = punct(input, Token::RightParen, "`)`")?;

    match Matrix::from_rows(rows) {
        Some(matrix) => primitive(Primitive::Matrix(matrix)),
        None => {
            let diagnostic = Diagnostic::error(format!("ragged matrix rows{}", g.location()))
                .with_code(ErrorCode::E205)
                .with_label(open.union(close), "rows differ in length")
                .with_help("every row of a matrix must have the same number of values");
            g.fail(diagnostic)
        }
    }
}

/// `selection ( item* ) default`
fn selection_rule(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let open = punct(input, Token::LeftParen, "`(`")?;
    let mut items: Vec<Spanned<String>> = Vec::new();
    while let Some(item) = opt(identifier).parse_next(input)? {
        if let Some(first) = items.iter().find(|i| **i == item) {
            let diagnostic = Diagnostic::error(format!(
                "selection item `{}` is listed multiple times{}",
                item.inner(),
                g.location()
            ))
            .with_code(ErrorCode::E200)
            .with_label(item.span(), "duplicate item")
            .with_secondary_label(first.span(), "first listed here");
            return g.fail(diagnostic);
        }
        items.push(item);
        opt(|input: &mut Input<'_>| punct(input, Token::Comma, "`,`")).parse_next(input)?;
    }
    let close = punct(input, Token::RightParen, "`)`")?;

    if items.is_empty() {
        let diagnostic = Diagnostic::error(format!("empty selection{}", g.location()))
            .with_code(ErrorCode::E207)
            .with_label(open.union(close), "no items")
            .with_help("list at least one item, e.g. `selection (linear quadratic) linear`");
        return g.fail(diagnostic);
    }

    let default = identifier
        .context(Context::Label("default item"))
        .parse_next(input)?;
    if !items.contains(&default) {
        let listed = items
            .iter()
            .map(|i| i.inner().as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let diagnostic = Diagnostic::error(format!(
            "default `{}` is not an item of the selection{}",
            default.inner(),
            g.location()
        ))
        .with_code(ErrorCode::E202)
        .with_label(default.span(), "unknown item")
        .with_help(format!("choose one of: {listed}"));
        return g.fail(diagnostic);
    }

    trace!(items = items.len(), default = default.inner().as_str(); "Parsed selection");
    primitive(Primitive::Selection {
        items: items.into_iter().map(Spanned::into_inner).collect(),
        default: default.into_inner(),
    })
}
