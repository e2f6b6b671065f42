//! Selectable subsets: tagged unions over record cases.

use log::trace;
use winnow::{Parser as _, error::ErrMode, stream::Stream};

use crate::{
    error::{Diagnostic, ErrorCode},
    generator::{Field, Generator, GeneratorKind},
    parser::{
        Context, Grammar, IResult, Input, annotations, cut_err, generator, identifier,
        next_span, peek_puncts, punct,
    },
    registry::Registry,
    rules::record::record_body,
    tokens::Token,
};

pub(crate) fn register(registry: &mut Registry) {
    registry.register("selectablesubset", variant_rule);
}

/// Parse one case: `set ...`, `includedset ...` or the shorthand
/// `{ field* }`.
fn case(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<Generator> {
    if peek_puncts(input, &[Token::LeftBrace]) {
        let span = next_span(input).unwrap_or_default();
        let record = record_body(g, input)?;
        let mut case = Generator::new(GeneratorKind::Record(record), span);
        annotations(&mut case, input)?;
        return Ok(case);
    }

    let case = generator(g, input)?;
    match case.kind {
        GeneratorKind::Record(_) | GeneratorKind::Included { .. } => Ok(case),
        _ => {
            let diagnostic = Diagnostic::error(format!("case{} must be a set", g.location()))
            .with_code(ErrorCode::E206)
            .with_label(case.meta.span, format!("`{}` is not a set", case.parameter_kind()))
            .with_help("write the case as `{ ... }`, `set { ... }` or `includedset Document`");
            g.fail(diagnostic)
        }
    }
}

/// Parse `{ { (label case)* } } default`.
fn cases_and_default(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    punct(input, Token::LeftBrace, "`{{`")?;
    punct(input, Token::LeftBrace, "`{{`")?;

    let mut cases: Vec<Field> = Vec::new();
    loop {
        let checkpoint = input.checkpoint();
        let label = match identifier.parse_next(input) {
            Ok(label) => label,
            Err(ErrMode::Backtrack(_)) => {
                input.reset(&checkpoint);
                break;
            }
            Err(e) => return Err(e),
        };

        if let Some(first) = cases.iter().find(|c| c.label == label) {
            let diagnostic = Diagnostic::error(format!(
                "case {} is defined multiple times",
                g.describe(label.inner())
            ))
            .with_code(ErrorCode::E200)
            .with_label(label.span(), "duplicate case")
            .with_secondary_label(first.label.span(), "first defined here");
            return g.fail(diagnostic);
        }

        let mut generator = g.with_path(label.inner(), |g| {
            cut_err(input, |input| case(g, input))
        })?;
        generator.meta.order = i32::try_from(cases.len()).unwrap_or(i32::MAX);
        cases.push(Field { label, generator });
    }

    punct(input, Token::RightBrace, "case or `}}`")?;
    punct(input, Token::RightBrace, "`}}`")?;

    let default = identifier
        .context(Context::Label("default case"))
        .parse_next(input)?;
    if !cases.iter().any(|c| c.label == default) {
        let labels = cases
            .iter()
            .map(|c| c.label.inner().as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let diagnostic = Diagnostic::error(format!(
            "default case `{}` is not a case of the selectable subset{}",
            default.inner(),
            g.location()
        ))
        .with_code(ErrorCode::E201)
        .with_label(default.span(), "unknown case")
        .with_help(if labels.is_empty() {
            "declare at least one case".to_string()
        } else {
            format!("choose one of: {labels}")
        });
        return g.fail(diagnostic);
    }

    trace!(cases = cases.len(), default = default.inner().as_str(); "Parsed selectable subset");
    Ok(GeneratorKind::Variant { cases, default })
}

fn variant_rule(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    cases_and_default(g, input)
}

/// A selectable subset written without its keyword.
pub(crate) fn bare_variant(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    cut_err(input, |input| cases_and_default(g, input))
}
