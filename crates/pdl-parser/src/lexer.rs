//! Lexical analyzer for PDL source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! It handles whitespace, both comment styles, string literals, numbers,
//! embedded code blocks and punctuation.
//!
//! The public entry point is [`tokenize`], which performs error-recovering
//! lexical analysis and collects all diagnostics in a single pass.

use winnow::{
    Parser as _,
    ascii::digit1,
    combinator::{alt, cut_err, not, opt, peek, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, none_of, one_of, take, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Keyword introducing a raw code block appended to the default constructor.
const CODE_BLOCK_KEYWORD: &str = "addTo_makeDefault";

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()` to provide detailed error
/// messages with codes, help text, and precise span information.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    pub code: ErrorCode,
    pub message: &'static str,
    pub help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    pub start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse an escape sequence in a string starting with backslash.
///
/// Handles `\n`, `\r`, `\t`, `\\`, `\"` and `\0`.
fn string_escape<'a>(input: &mut Input<'a>) -> IResult<'a, char> {
    let escape_start = input.current_token_start();

    '\\'.parse_next(input)?;

    let escaped: IResult<'a, char> = one_of(['n', 'r', 't', '\\', '"', '0'])
        .map(|c| match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '0' => '\0',
            other => other,
        })
        .parse_next(input);

    match escaped {
        Ok(ch) => Ok(ch),
        Err(_) => Err(ErrMode::Cut(ContextError::new().add_context(
            input,
            &input.checkpoint(),
            LexerDiagnostic {
                code: ErrorCode::E003,
                message: "invalid escape sequence",
                help: Some("valid escapes: `\\n`, `\\r`, `\\t`, `\\\\`, `\\\"`, `\\0`"),
                start: escape_start,
            },
        ))),
    }
}

/// Parse a complete string literal with double quotes.
///
/// Strings may span several lines; the line breaks are kept.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let string_content = repeat(0.., alt((string_escape, none_of(['"', '\\'])))).fold(
        String::new,
        |mut acc, ch| {
            acc.push(ch);
            acc
        },
    );

    let start_pos = input.current_token_start();

    '"'.parse_next(input)?;

    cut_err(terminated(string_content, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"`"),
            start: start_pos,
        })
        .parse_next(input)
        .map(Token::StringLiteral)
}

/// Returns the byte length of the text up to the brace closing an already
/// opened block, or `None` if the braces are unbalanced.
fn balanced_block_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(offset),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Parse the braces and raw body of a code block after its keyword.
fn code_block_body<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    take_while(0.., char::is_whitespace).parse_next(input)?;
    '{'.parse_next(input)?;
    let text: &'a str = **input;
    let len = balanced_block_len(text).ok_or_else(|| ErrMode::Backtrack(ContextError::new()))?;
    let body = take(text[..len].chars().count()).parse_next(input)?;
    '}'.parse_next(input)?;
    Ok(Token::CodeBlock(body))
}

/// Parse `addTo_makeDefault { ... }` into a single code block token.
///
/// Nested braces inside the block are balanced; the token holds the raw
/// text between the outermost braces.
fn code_block<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start_pos = input.current_token_start();

    terminated(
        literal(CODE_BLOCK_KEYWORD),
        peek(not(one_of(is_identifier_char))),
    )
    .parse_next(input)?;

    cut_err(code_block_body)
    .context(LexerDiagnostic {
        code: ErrorCode::E004,
        message: "unterminated code block",
        help: Some("code blocks are written as `addTo_makeDefault { ... }` with balanced braces"),
        start: start_pos,
    })
    .parse_next(input)
}

/// Parse a numeric literal: `-?digits(.digits)?([eE][+-]?digits)?`
///
/// The literal is kept as text; the grammar decides whether an integer or
/// a floating point value is expected.
fn number<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    terminated(
        (
            opt('-'),
            digit1,
            opt(('.', take_while(0.., |c: char| c.is_ascii_digit()))),
            opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
        )
            .take(),
        peek(not(one_of(is_identifier_char))),
    )
    .map(Token::Number)
    .parse_next(input)
}

/// Parse line comments starting with `//` or `#`
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    preceded(alt(("//", "#")), take_while(0.., |c| c != '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

/// Parse identifiers
fn identifier<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_identifier_char),
    )
        .take()
        .map(Token::Identifier)
        .parse_next(input)
}

/// Parse single character tokens
fn single_char_token<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        '='.value(Token::Equals),
        '*'.value(Token::Star),
        ','.value(Token::Comma),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        '<'.value(Token::LeftAngle),
        '>'.value(Token::RightAngle),
    ))
    .parse_next(input)
}

/// Parse whitespace (spaces, tabs, etc. but not newlines)
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

/// Parse newline
fn newline<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        line_comment,      // Must come before single chars
        string_literal,    // Must come before any single char
        code_block,        // Must come before identifier
        number,            // Must come before identifier
        identifier,        // Must come before single chars
        single_char_token, // Single character tokens
        newline,           // Must come before whitespace
        whitespace,        // General whitespace
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    let span = Span::new(start_pos..end_pos);

    Ok(PositionedToken::new(token, span))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer.
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(token) => {
                    self.tokens.push(token);
                }
                Err(e) => {
                    let error_pos = input.current_token_start();

                    let diagnostic = Self::convert_err_mode(e, error_pos);
                    self.diagnostics.emit(diagnostic);

                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    /// Finish lexing and return tokens or collected errors.
    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Extracts `LexerDiagnostic` from the error context for rich error info
    /// with code, message, and help. Falls back to E002 (unexpected character)
    /// if no diagnostic context is found.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos.max(*start + 1));

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Parse tokens from a string input, collecting multiple errors.
///
/// Attempts to recover from errors and continue tokenizing, collecting
/// all errors encountered.
///
/// # Returns
///
/// - `Ok(tokens)` - All tokens successfully parsed
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let located_input = LocatingSlice::new(input);
    let mut lexer = Lexer::new();
    lexer.tokenize(located_input);
    lexer.finish()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn test_single_token(input: &str, expected: Token<'_>) {
        let mut located_input = LocatingSlice::new(input);
        let result = positioned_token(&mut located_input);
        assert!(result.is_ok(), "Failed to parse: {}", input);
        let positioned = result.unwrap();
        assert_eq!(positioned.token, expected);
    }

    fn significant(input: &str) -> Vec<Token<'_>> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .filter(|t| !t.is_trivia())
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_identifiers() {
        test_single_token("mesh", Token::Identifier("mesh"));
        test_single_token("_private", Token::Identifier("_private"));
        test_single_token("nax_parameter2", Token::Identifier("nax_parameter2"));
        test_single_token("selectablesubset", Token::Identifier("selectablesubset"));
    }

    #[test]
    fn test_numbers() {
        test_single_token("5", Token::Number("5"));
        test_single_token("-12", Token::Number("-12"));
        test_single_token("0.25", Token::Number("0.25"));
        test_single_token("1e-5", Token::Number("1e-5"));
        test_single_token("2.5E+3", Token::Number("2.5E+3"));
        test_single_token("3.", Token::Number("3."));
    }

    #[test]
    fn test_number_followed_by_identifier_is_rejected() {
        assert!(tokenize("3abc").is_err());
    }

    #[test]
    fn test_punctuation() {
        test_single_token("=", Token::Equals);
        test_single_token("*", Token::Star);
        test_single_token("(", Token::LeftParen);
        test_single_token(")", Token::RightParen);
        test_single_token("{", Token::LeftBrace);
        test_single_token("}", Token::RightBrace);
        test_single_token("[", Token::LeftBracket);
        test_single_token("]", Token::RightBracket);
        test_single_token("<", Token::LeftAngle);
        test_single_token(">", Token::RightAngle);
        test_single_token(",", Token::Comma);
    }

    #[test]
    fn test_string_literals() {
        test_single_token("\"count\"", Token::StringLiteral("count".to_string()));
        test_single_token("\"\"", Token::StringLiteral(String::new()));
        test_single_token(
            "\"say \\\"hi\\\"\\n\"",
            Token::StringLiteral("say \"hi\"\n".to_string()),
        );
        test_single_token(
            "\"first line\nsecond line\"",
            Token::StringLiteral("first line\nsecond line".to_string()),
        );
    }

    #[test]
    fn test_comments() {
        test_single_token("// note", Token::LineComment(" note"));
        test_single_token("# note", Token::LineComment(" note"));
        assert_eq!(
            significant("x # trailing\ny"),
            vec![Token::Identifier("x"), Token::Identifier("y")]
        );
    }

    #[test]
    fn test_code_block() {
        test_single_token(
            "addTo_makeDefault { if x { y } }",
            Token::CodeBlock(" if x { y } "),
        );
        test_single_token(
            "addTo_makeDefault_suffix",
            Token::Identifier("addTo_makeDefault_suffix"),
        );
    }

    #[test]
    fn test_unterminated_code_block() {
        let err = tokenize("addTo_makeDefault { {").unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E004));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("x = string \"open").unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E001));
    }

    #[test]
    fn test_invalid_escape() {
        let err = tokenize("\"bad \\q\"").unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E003));
    }

    #[test]
    fn test_unexpected_characters_collected() {
        let err = tokenize("x = int 5 @ y = int 6 $").unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert!(
            err.diagnostics()
                .iter()
                .all(|d| d.code() == Some(ErrorCode::E002))
        );
    }

    #[test]
    fn test_field_tokens() {
        assert_eq!(
            significant("pts = [ double 0.0 \"coord\" ] * 3"),
            vec![
                Token::Identifier("pts"),
                Token::Equals,
                Token::LeftBracket,
                Token::Identifier("double"),
                Token::Number("0.0"),
                Token::StringLiteral("coord".to_string()),
                Token::RightBracket,
                Token::Star,
                Token::Number("3"),
            ]
        );
    }

    #[test]
    fn test_spans_cover_source() {
        let source = "x = int 5";
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens.first().unwrap().span.start(), 0);
        assert_eq!(tokens.last().unwrap().span.end(), source.len());
    }

    proptest! {
        #[test]
        fn prop_identifiers_lex_as_one_token(name in "[A-Za-z_][A-Za-z0-9_]{0,16}") {
            prop_assume!(!name.starts_with(CODE_BLOCK_KEYWORD));
            let tokens = tokenize(&name).unwrap();
            prop_assert_eq!(tokens.len(), 1);
            prop_assert_eq!(&tokens[0].token, &Token::Identifier(name.as_str()));
        }

        #[test]
        fn prop_integers_lex_as_numbers(value in any::<i64>()) {
            let text = value.to_string();
            let tokens = tokenize(&text).unwrap();
            prop_assert_eq!(tokens.len(), 1);
            prop_assert_eq!(&tokens[0].token, &Token::Number(text.as_str()));
        }

        #[test]
        fn prop_floats_lex_as_numbers(value in -1.0e6f64..1.0e6) {
            let text = format!("{value:?}");
            let tokens = tokenize(&text).unwrap();
            prop_assert_eq!(tokens.len(), 1);
            prop_assert_eq!(&tokens[0].token, &Token::Number(text.as_str()));
        }
    }
}
