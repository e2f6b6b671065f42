//! Error type for runtime parameter tree operations.

use thiserror::Error;

/// Errors raised while navigating or modifying a parameter tree.
///
/// Generated marshalling code propagates these with `?`; a failure in the
/// middle of a `set`/`get` call aborts the whole transfer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("no parameter named `{name}` in `{container}`")]
    MissingChild { container: String, name: String },

    #[error("parameter has kind `{found}`, expected `{expected}`")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("`{selection}` is not one of the options of `{name}` ({options})")]
    UnknownSelection {
        name: String,
        selection: String,
        options: String,
    },

    #[error("index {index} out of range for array `{name}` of length {len}")]
    IndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },

    #[error("cannot merge `{name}`: existing `{existing}` is incompatible with `{incoming}`")]
    IncompatibleMerge {
        name: String,
        existing: &'static str,
        incoming: &'static str,
    },

    #[error("invalid parameter path `{0}`")]
    InvalidPath(String),

    #[error("unknown unit `{unit}` for quantity `{quantity}`")]
    UnknownUnit { quantity: String, unit: String },

    #[error("no opaque parameter factory registered for `{0}`")]
    UnknownOpaqueKind(String),

    #[error("no unused key could be derived from label pattern `{0}`")]
    KeysExhausted(String),
}

/// A type alias for `Result<T, ParameterError>`.
pub type Result<T> = std::result::Result<T, ParameterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_child_display() {
        let err = ParameterError::MissingChild {
            container: "mesh".to_string(),
            name: "nx".to_string(),
        };
        assert_eq!(err.to_string(), "no parameter named `nx` in `mesh`");
    }

    #[test]
    fn test_kind_mismatch_display() {
        let err = ParameterError::KindMismatch {
            expected: "int",
            found: "double",
        };
        assert_eq!(err.to_string(), "parameter has kind `double`, expected `int`");
    }
}
