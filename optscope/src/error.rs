use crate::value::OptionKind;
use thiserror::Error;

/// Errors raised by the option registry and value writes.
///
/// A failing write never commits anything and never notifies.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionError {
    /// An option (or abbreviation) with this name is already registered
    #[error("option already registered: {0}")]
    DuplicateOption(String),

    /// No option is registered under this name
    #[error("unknown option: {0}")]
    UnknownOption(String),

    /// The value does not have the option's kind
    #[error("option {name} takes a {expected} value, got {found}")]
    TypeMismatch {
        name: String,
        expected: OptionKind,
        found: OptionKind,
    },
}
