//! Descriptive metadata shared by every parameter node.

/// Description and presentation flags of a parameter.
///
/// The flags do not influence marshalling; they are carried so that a host
/// application can decide how to present a parameter (hide it, put it in an
/// "expert" section, mark it as mandatory) and in which order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    description: String,
    hidden: bool,
    expert: bool,
    necessary: bool,
    order: i32,
}

impl Meta {
    /// Creates metadata with the given description and all flags cleared.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_expert(mut self, expert: bool) -> Self {
        self.expert = expert;
        self
    }

    pub fn with_necessary(mut self, necessary: bool) -> Self {
        self.necessary = necessary;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Returns the free-text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_expert(&self) -> bool {
        self.expert
    }

    pub fn is_necessary(&self) -> bool {
        self.necessary
    }

    /// Returns the display order.
    pub fn order(&self) -> i32 {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_builder() {
        let meta = Meta::new("count")
            .with_hidden(true)
            .with_necessary(true)
            .with_order(3);

        assert_eq!(meta.description(), "count");
        assert!(meta.is_hidden());
        assert!(!meta.is_expert());
        assert!(meta.is_necessary());
        assert_eq!(meta.order(), 3);
    }
}
