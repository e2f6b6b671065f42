//! Arrays and labeled arrays.

use pdl_core::KeySource;
use winnow::{Parser as _, combinator::opt};

use crate::{
    error::{Diagnostic, ErrorCode},
    generator::{Generator, GeneratorKind},
    naming::ELEMENT_SUFFIX,
    parser::{Grammar, IResult, Input, cut_err, generator, int_literal, keyword, punct, string_literal},
    registry::Registry,
    tokens::Token,
};

/// Key pattern of a labeled array declared without one.
const DEFAULT_KEY_PATTERN: &str = "%d";

pub(crate) fn register(registry: &mut Registry) {
    registry.register("array", array_rule);
    registry.register("labeledarray", labeled_array_rule);
}

/// Parse `[ generator ] * count`.
fn element_and_count(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<(Generator, usize)> {
    punct(input, Token::LeftBracket, "`[`")?;
    let element_name = format!("{}{ELEMENT_SUFFIX}", g.current_name());
    let element = g.with_path(&element_name, |g| {
        cut_err(input, |input| generator(g, input))
    })?;
    punct(input, Token::RightBracket, "`]`")?;
    punct(input, Token::Star, "`*`")?;

    let count = int_literal.parse_next(input)?;
    match usize::try_from(*count.inner()) {
        Ok(n) => Ok((element, n)),
        Err(_) => {
            let diagnostic = Diagnostic::error(format!(
                "negative element count {}{}",
                count.inner(),
                g.location()
            ))
            .with_code(ErrorCode::E204)
            .with_label(count.span(), "negative count")
            .with_help("use `* 0` for an initially empty array");
            g.fail(diagnostic)
        }
    }
}

fn array_rule(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let (element, count) = element_and_count(g, input)?;
    Ok(GeneratorKind::Array {
        element: Box::new(element),
        count,
    })
}

/// An array written without its keyword.
pub(crate) fn bare_array(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    cut_err(input, |input| array_rule(g, input))
}

/// `labeledarray ("keysFrom" path | pattern)? [ generator ] * count`
fn labeled_array_rule(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let keys = if opt(|input: &mut Input<'_>| keyword(input, "keysFrom"))
        .parse_next(input)?
        .is_some()
    {
        KeySource::Reference(string_literal.parse_next(input)?.into_inner())
    } else {
        match opt(string_literal).parse_next(input)? {
            Some(pattern) => KeySource::Pattern(pattern.into_inner()),
            None => KeySource::Pattern(DEFAULT_KEY_PATTERN.to_string()),
        }
    };

    let (element, count) = element_and_count(g, input)?;
    Ok(GeneratorKind::LabeledArray {
        element: Box::new(element),
        count,
        keys,
    })
}
