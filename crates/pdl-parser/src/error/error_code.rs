//! Error codes for the PDL diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Schema errors detected while parsing a document
//! - `E3xx` - Library errors detected across documents

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    E001,

    /// Unexpected character.
    ///
    /// A character was encountered that starts no token.
    E002,

    /// Invalid escape sequence.
    ///
    /// Valid escapes are: `\n`, `\r`, `\t`, `\\`, `\"`, `\0`.
    E003,

    /// Unterminated code block.
    ///
    /// An `addTo_makeDefault` block is missing its braces or they do not
    /// balance.
    E004,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    E100,

    /// Incomplete input.
    ///
    /// The input ended before a complete construct was parsed.
    E101,

    /// Unknown parameter type.
    ///
    /// The keyword after `=` is not registered as a parameter type.
    E102,

    // =========================================================================
    // Schema Errors (E2xx)
    // =========================================================================
    /// Duplicate name.
    ///
    /// Two fields of one set, two cases of one selectable subset or two
    /// items of one selection share a name.
    E200,

    /// Unknown variant default.
    ///
    /// The default of a selectable subset names no declared case.
    E201,

    /// Unknown selection default.
    ///
    /// The default of a selection names no declared item.
    E202,

    /// Unknown quantity or unit.
    E203,

    /// Negative element count.
    E204,

    /// Invalid literal.
    ///
    /// A number, date, datetime or matrix literal could not be read.
    E205,

    /// Invalid case.
    ///
    /// A case of a selectable subset must be a set or an included set.
    E206,

    /// Empty selection.
    E207,

    // =========================================================================
    // Library Errors (E3xx)
    // =========================================================================
    /// Unresolved document reference.
    ///
    /// An `includedset` or `inherits` names a document that is not part of
    /// the library.
    E300,

    /// Cyclic document reference.
    E301,

    /// Incompatible inherited field.
    ///
    /// A derived document redeclares a field of its base with a different
    /// parameter kind.
    E302,

    /// Invalid generic base.
    E303,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            // Parser errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            // Schema errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
            ErrorCode::E207 => "E207",
            // Library errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E004 => "unterminated code block",
            // Parser errors
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "unknown parameter type",
            // Schema errors
            ErrorCode::E200 => "duplicate name",
            ErrorCode::E201 => "unknown variant default",
            ErrorCode::E202 => "unknown selection default",
            ErrorCode::E203 => "unknown quantity or unit",
            ErrorCode::E204 => "negative element count",
            ErrorCode::E205 => "invalid literal",
            ErrorCode::E206 => "invalid case",
            ErrorCode::E207 => "empty selection",
            // Library errors
            ErrorCode::E300 => "unresolved document",
            ErrorCode::E301 => "cyclic document reference",
            ErrorCode::E302 => "incompatible inherited field",
            ErrorCode::E303 => "invalid generic base",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E102.to_string(), "E102");
        assert_eq!(ErrorCode::E207.to_string(), "E207");
        assert_eq!(ErrorCode::E303.to_string(), "E303");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E004.description(), "unterminated code block");
        assert_eq!(ErrorCode::E200.description(), "duplicate name");
        assert_eq!(ErrorCode::E301.description(), "cyclic document reference");
    }
}
