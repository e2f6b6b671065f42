//! Records (`set`) and references to records of other documents
//! (`includedset`).

use winnow::{Parser as _, combinator::opt};

use crate::{
    error::{Diagnostic, ErrorCode},
    generator::{GeneratorKind, Record},
    parser::{
        Context, Grammar, IResult, Input, code_block, fields, identifier, keyword, peek_puncts,
        punct,
    },
    registry::Registry,
    span::Spanned,
    tokens::Token,
};

pub(crate) fn register(registry: &mut Registry) {
    registry.register("set", set_rule);
    registry.register("includedset", included_set_rule);
}

/// Parse `< name >`.
pub(crate) fn generic_parameter(input: &mut Input<'_>) -> IResult<Spanned<String>> {
    let open = punct(input, Token::LeftAngle, "`<`")?;
    let name = identifier
        .context(Context::Label("generic parameter"))
        .parse_next(input)?;
    let close = punct(input, Token::RightAngle, "`>`")?;
    Ok(Spanned::new(name.into_inner(), open.union(close)))
}

/// Parse an optional `inherits Base`.
pub(crate) fn base(input: &mut Input<'_>) -> IResult<Option<Spanned<String>>> {
    if opt(|input: &mut Input<'_>| keyword(input, "inherits"))
        .parse_next(input)?
        .is_none()
    {
        return Ok(None);
    }
    let base = identifier
        .context(Context::Label("base document"))
        .parse_next(input)?;
    Ok(Some(base))
}

/// Parse `{ field* } codeblock?`.
pub(crate) fn record_body(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<Record> {
    punct(input, Token::LeftBrace, "`{`")?;
    let fields = fields(g, input)?;
    punct(input, Token::RightBrace, "field definition or `}`")?;
    let init_code = code_block(input)?;
    Ok(Record {
        fields,
        init_code,
        ..Record::default()
    })
}

/// `set (inherits Base)? { field* } codeblock?`
fn set_rule(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    if peek_puncts(input, &[Token::LeftAngle]) {
        let generic = generic_parameter(input)?;
        let diagnostic = Diagnostic::error(format!(
            "generic parameter `{}` on a nested set{}",
            generic.inner(),
            g.location()
        ))
        .with_code(ErrorCode::E303)
        .with_label(generic.span(), "not allowed here")
        .with_help("only a document may declare a generic base, before its fields");
        return g.fail(diagnostic);
    }

    let base = base(input)?;
    let record = record_body(g, input)?;
    Ok(GeneratorKind::Record(Record { base, ..record }))
}

/// `includedset Document`
fn included_set_rule(_: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let target = identifier
        .context(Context::Label("document name"))
        .parse_next(input)?;
    Ok(GeneratorKind::Included { target })
}
