//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A labeled span in source code.
///
/// A diagnostic carries one primary label marking where the problem is and
/// any number of secondary labels pointing at related locations, such as
/// the first definition of a duplicated field.
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_kinds() {
        let primary = Label::primary(Span::new(10..20), "duplicate definition");
        assert_eq!(primary.span().start(), 10);
        assert_eq!(primary.message(), "duplicate definition");
        assert!(primary.is_primary());

        let secondary = Label::secondary(Span::new(5..15), "first defined here");
        assert_eq!(secondary.span().end(), 15);
        assert!(secondary.is_secondary());
    }
}
