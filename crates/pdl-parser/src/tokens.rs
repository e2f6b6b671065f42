//! Token definitions for the PDL lexer.

use std::fmt;

use winnow::stream::Location;

use crate::span::Span;

/// Token types of the parameter description language.
///
/// Type keywords (`int`, `set`, ...) are plain identifiers; they are looked
/// up in the [`Registry`](crate::Registry) by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Literals
    StringLiteral(String),
    Number(&'src str),
    Identifier(&'src str),
    /// Body of an `addTo_makeDefault { ... }` block, without the outer braces.
    CodeBlock(&'src str),

    // Punctuation
    Equals,       // =
    Star,         // *
    Comma,        // ,
    LeftParen,    // (
    RightParen,   // )
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    LeftAngle,    // <
    RightAngle,   // >

    // Comments
    LineComment(&'src str),

    // Whitespace
    Whitespace,
    Newline,
}

/// A token with its position in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }

    /// Returns `true` for tokens the grammar skips between significant tokens.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.token,
            Token::Whitespace | Token::Newline | Token::LineComment(_)
        )
    }
}

impl Location for PositionedToken<'_> {
    fn previous_token_end(&self) -> usize {
        self.span.start()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::StringLiteral(s) => write!(f, "{s:?}"),
            Token::Number(n) => write!(f, "{n}"),
            Token::Identifier(name) => write!(f, "{name}"),
            Token::CodeBlock(_) => write!(f, "addTo_makeDefault {{...}}"),

            Token::Equals => write!(f, "="),
            Token::Star => write!(f, "*"),
            Token::Comma => write!(f, ","),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::LeftAngle => write!(f, "<"),
            Token::RightAngle => write!(f, ">"),

            Token::LineComment(comment) => write!(f, "//{comment}"),
            Token::Whitespace => write!(f, " "),
            Token::Newline => write!(f, "\\n"),
        }
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}
