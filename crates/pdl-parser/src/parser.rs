//! Parser for PDL source tokens.
//!
//! This module turns the token stream from the [`lexer`](super::lexer) into
//! a [`Generator`] tree. The grammar only knows documents, fields,
//! descriptions and flags; the body following a type keyword is parsed by
//! the rule registered for that keyword in the [`Registry`]. The public
//! entry point is [`build_document`].

use winnow::{
    Parser as _,
    combinator::{eof, opt, preceded, repeat},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    error::{Diagnostic, ErrorCode},
    generator::{Field, Generator, GeneratorKind, Record},
    registry::Registry,
    rules::{container, record, variant},
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) at error start position
    ///
    /// Used to calculate start_offset as: `tokens.len() - start_offset_value`
    StartOffset(usize),
}

pub type Input<'src> = TokenSlice<'src, PositionedToken<'src>>;
pub type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;

/// Parser state threaded through every rule.
///
/// Besides the registry it tracks the path of the field being parsed, for
/// diagnostics, and the first semantic error, which takes precedence over
/// the syntax error it unwinds as.
pub struct Grammar<'r> {
    registry: &'r Registry,
    path: Vec<String>,
    semantic: Option<Diagnostic>,
}

impl<'r> Grammar<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            path: Vec::new(),
            semantic: None,
        }
    }

    /// Records a semantic error and aborts parsing.
    pub fn fail<O>(&mut self, diagnostic: Diagnostic) -> IResult<O> {
        self.semantic.get_or_insert(diagnostic);
        Err(ErrMode::Cut(ContextError::new()))
    }

    /// Returns the slash separated path of the field being parsed.
    pub fn current_path(&self) -> String {
        self.path.join("/")
    }

    /// Returns the name of the innermost field being parsed.
    pub fn current_name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Returns a suffix naming the field being parsed, empty at the root.
    pub fn location(&self) -> String {
        if self.path.is_empty() {
            String::new()
        } else {
            format!(" at `{}`", self.current_path())
        }
    }

    /// Runs `f` with `segment` appended to the current path.
    pub fn with_path<O, F>(&mut self, segment: &str, f: F) -> IResult<O>
    where
        F: FnOnce(&mut Self) -> IResult<O>,
    {
        self.path.push(segment.to_string());
        let result = f(self);
        self.path.pop();
        result
    }

    /// Returns the path of `name` inside the field being parsed, for messages.
    pub fn describe(&self, name: &str) -> String {
        let path = self.current_path();
        if path.is_empty() {
            format!("`{name}`")
        } else {
            format!("`{name}` in `{path}`")
        }
    }
}

pub(crate) fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

/// Parse whitespace and comments
fn ws_comment<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| token.is_trivia())
        .void()
        .parse_next(input)
}

/// Parse zero or more whitespace/comments
pub fn ws_comments0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., ws_comment).parse_next(input)
}

/// Parse one punctuation token, skipping leading trivia.
pub fn punct<'src>(
    input: &mut Input<'src>,
    expected: Token<'static>,
    label: &'static str,
) -> IResult<Span> {
    preceded(
        ws_comments0,
        any.verify(|token: &PositionedToken<'_>| token.token == expected)
            .map(|token: &PositionedToken<'_>| token.span),
    )
    .context(Context::Label(label))
    .parse_next(input)
}

/// Returns `true` if the next significant tokens are `expected`, without
/// consuming anything.
pub(crate) fn peek_puncts(input: &mut Input<'_>, expected: &[Token<'static>]) -> bool {
    let checkpoint = input.checkpoint();
    let matched = expected.iter().all(|token| {
        preceded(
            ws_comments0,
            any.verify(|t: &PositionedToken<'_>| t.token == *token),
        )
        .parse_next(input)
        .is_ok()
    });
    input.reset(&checkpoint);
    matched
}

/// Parse an identifier with span preservation
pub fn raw_identifier<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    preceded(
        ws_comments0,
        any.verify_map(|token: &PositionedToken<'src>| match &token.token {
            Token::Identifier(name) => Some(Spanned::new(*name, token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("identifier"))
    .parse_next(input)
}

/// Parse an identifier and convert it to an owned name
pub fn identifier<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    let raw = raw_identifier.parse_next(input)?;
    Ok(raw.map(|name| name.to_string()))
}

/// Parse the contextual keyword `word`
pub fn keyword<'src>(input: &mut Input<'src>, word: &'static str) -> IResult<Span> {
    preceded(
        ws_comments0,
        any.verify_map(|token: &PositionedToken<'src>| match &token.token {
            Token::Identifier(name) if *name == word => Some(token.span),
            _ => None,
        }),
    )
    .context(Context::Label(word))
    .parse_next(input)
}

/// Parse string literal
pub fn string_literal<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    preceded(
        ws_comments0,
        any.verify_map(|token: &PositionedToken<'_>| match &token.token {
            Token::StringLiteral(s) => Some(Spanned::new(s.clone(), token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("string literal"))
    .parse_next(input)
}

/// Parse an integer literal
pub fn int_literal<'src>(input: &mut Input<'src>) -> IResult<Spanned<i64>> {
    preceded(
        ws_comments0,
        any.verify_map(|token: &PositionedToken<'_>| match &token.token {
            Token::Number(text) => text
                .parse::<i64>()
                .ok()
                .map(|value| Spanned::new(value, token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("integer literal"))
    .parse_next(input)
}

/// Parse a floating point literal; integer literals are accepted too
pub fn float_literal<'src>(input: &mut Input<'src>) -> IResult<Spanned<f64>> {
    preceded(
        ws_comments0,
        any.verify_map(|token: &PositionedToken<'_>| match &token.token {
            Token::Number(text) => text
                .parse::<f64>()
                .ok()
                .map(|value| Spanned::new(value, token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("number"))
    .parse_next(input)
}

/// Parse an optional code block
pub fn code_block<'src>(input: &mut Input<'src>) -> IResult<Option<String>> {
    opt(preceded(
        ws_comments0,
        any.verify_map(|token: &PositionedToken<'_>| match &token.token {
            Token::CodeBlock(body) => Some(body.to_string()),
            _ => None,
        }),
    ))
    .parse_next(input)
}

/// Returns the span of the next significant token, if any.
pub(crate) fn next_span(input: &mut Input<'_>) -> Option<Span> {
    let checkpoint = input.checkpoint();
    let span = preceded(ws_comments0, any)
        .parse_next(input)
        .ok()
        .map(|token: &PositionedToken<'_>| token.span);
    input.reset(&checkpoint);
    span
}

/// Parse the optional flags following a description: `*necessary`,
/// `*expert` and `*hidden`.
fn flags(generator: &mut Generator, input: &mut Input<'_>) -> IResult<()> {
    loop {
        let checkpoint = input.checkpoint();
        if punct(input, Token::Star, "`*`").is_err() {
            input.reset(&checkpoint);
            return Ok(());
        }
        match raw_identifier.parse_next(input).map(|flag| *flag.inner()) {
            Ok("necessary") => generator.meta.necessary = true,
            Ok("expert") => generator.meta.expert = true,
            Ok("hidden") => generator.meta.hidden = true,
            _ => {
                input.reset(&checkpoint);
                return Ok(());
            }
        }
    }
}

/// Parse one generator: a type keyword followed by its body, or one of the
/// keyword-less forms `[ ... ] * N` and `{{ ... }} default`, then an
/// optional description and flags.
pub fn generator(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<Generator> {
    let span = next_span(input).unwrap_or_default();

    let kind = if peek_puncts(input, &[Token::LeftBracket]) {
        container::bare_array(g, input)?
    } else if peek_puncts(input, &[Token::LeftBrace, Token::LeftBrace]) {
        variant::bare_variant(g, input)?
    } else {
        let keyword = raw_identifier
            .context(Context::Label("parameter type"))
            .parse_next(input)?;
        let Some(rule) = g.registry.rule(keyword.inner()) else {
            let known = g.registry.keywords().collect::<Vec<_>>().join(", ");
            let diagnostic = Diagnostic::error(format!(
                "unknown parameter type `{}`{}",
                keyword.inner(),
                g.location()
            ))
            .with_code(ErrorCode::E102)
            .with_label(keyword.span(), "unknown type")
            .with_help(format!("known parameter types: {known}"));
            return g.fail(diagnostic);
        };
        cut_err(input, |input| rule(g, input))?
    };

    let mut generator = Generator::new(kind, span);
    annotations(&mut generator, input)?;
    Ok(generator)
}

/// Parse the optional description and flags of a generator.
pub fn annotations(generator: &mut Generator, input: &mut Input<'_>) -> IResult<()> {
    if let Some(description) = opt(string_literal).parse_next(input)? {
        generator.meta.description = description.into_inner();
    }
    flags(generator, input)
}

/// Parse `name =`, backtracking if the input does not start a field.
fn field_label<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    let label = identifier.parse_next(input)?;
    punct(input, Token::Equals, "`=`")?;
    Ok(label)
}

/// Parse the fields of a record until the next token cannot start one.
///
/// Field names must be unique; the order of a field is its index.
pub fn fields(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<Vec<Field>> {
    let mut fields: Vec<Field> = Vec::new();

    loop {
        let checkpoint = input.checkpoint();
        let label = match field_label(input) {
            Ok(label) => label,
            Err(ErrMode::Backtrack(_)) => {
                input.reset(&checkpoint);
                break;
            }
            Err(e) => return Err(e),
        };

        if let Some(first) = fields.iter().find(|f| f.label == label) {
            let diagnostic = Diagnostic::error(format!(
                "parameter {} is defined multiple times",
                g.describe(label.inner())
            ))
            .with_code(ErrorCode::E200)
            .with_label(label.span(), "duplicate definition")
            .with_secondary_label(first.label.span(), "first defined here")
            .with_help("remove the duplicate or use a different name");
            return g.fail(diagnostic);
        }

        let mut generator = g.with_path(label.inner(), |g| {
            cut_err(input, |input| generator(g, input))
        })?;
        generator.meta.order = i32::try_from(fields.len()).unwrap_or(i32::MAX);
        fields.push(Field { label, generator });
    }

    Ok(fields)
}

/// Parse a complete document:
/// `('<' ident '>')? ('inherits' ident)? codeblock? field*`
fn document(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<Generator> {
    let span = next_span(input).unwrap_or_default();

    let generic = if peek_puncts(input, &[Token::LeftAngle]) {
        Some(record::generic_parameter(input)?)
    } else {
        None
    };
    let base = record::base(input)?;
    let init_code = code_block(input)?;
    let fields = fields(g, input)?;

    preceded(ws_comments0, eof)
        .void()
        .context(Context::Label("field definition"))
        .parse_next(input)?;

    Ok(Generator::new(
        GeneratorKind::Record(Record {
            fields,
            base,
            generic,
            init_code,
        }),
        span,
    ))
}

/// Converts a winnow error into a diagnostic
///
/// Extracts position information from error context (StartOffset) and
/// computes the error span from the token array.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken],
    current_remaining: usize,
) -> Diagnostic {
    let significant = |t: &&PositionedToken<'_>| !t.is_trivia();

    // Extract start offset from error context if available
    let start_remaining = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().find_map(|ctx| match ctx {
            Context::StartOffset(n) => Some(*n),
            _ => None,
        }),
        _ => None,
    };

    let end_offset = tokens.len() - current_remaining;
    let start_offset = start_remaining.map(|r| tokens.len() - r).unwrap_or(0);

    let last_significant = tokens
        .iter()
        .rev()
        .find(significant)
        .map(|t| t.span)
        .unwrap_or_default();

    match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => {
            let contexts: Vec<String> = e
                .context()
                .filter_map(|ctx| match ctx {
                    Context::Label(label) => Some(format!("expected {label}")),
                    _ => None,
                })
                .collect();

            let message = if contexts.is_empty() {
                "unexpected token or end of input".to_string()
            } else {
                contexts.join(" → ")
            };

            // The offending token is the first significant one at or after
            // the error position; at the end of input it is the last one.
            let error_span = tokens[end_offset.min(tokens.len())..]
                .iter()
                .find(significant)
                .map(|t| t.span)
                .unwrap_or(last_significant);
            let context_span = start_remaining.and_then(|_| {
                tokens[start_offset.min(end_offset)..end_offset]
                    .iter()
                    .find(significant)
                    .map(|t| t.span)
            });

            let diagnostic = Diagnostic::error(format!("unexpected token: {message}"))
                .with_code(ErrorCode::E100)
                .with_label(error_span, "unexpected token");
            match context_span {
                Some(span) if span != error_span => {
                    diagnostic.with_secondary_label(span, "while parsing this")
                }
                _ => diagnostic,
            }
            .with_help("check the syntax of the parameter definition")
        }
        ErrMode::Incomplete(_) => Diagnostic::error("incomplete input, more tokens expected")
            .with_code(ErrorCode::E101)
            .with_label(last_significant, "incomplete")
            .with_help("ensure input is complete"),
    }
}

/// Build the generator tree of a document from tokens
pub(crate) fn build_document(
    tokens: &[PositionedToken<'_>],
    registry: &Registry,
) -> Result<Generator, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);
    let mut grammar = Grammar::new(registry);

    match document(&mut grammar, &mut token_slice) {
        Ok(document) => Ok(document),
        Err(e) => match grammar.semantic.take() {
            Some(diagnostic) => Err(diagnostic),
            None => {
                let current_remaining = token_slice.eof_offset();
                Err(convert_error(e, tokens, current_remaining))
            }
        },
    }
}
