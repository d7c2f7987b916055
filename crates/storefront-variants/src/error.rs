use thiserror::Error;

/// Rejected editing-session mutations.
///
/// A rejected mutation leaves the session exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("attribute index {index} is out of range (attribute count {len})")]
    AttributeIndexOutOfRange { index: usize, len: usize },

    #[error("attribute name must be non-empty")]
    EmptyAttributeName,

    #[error("duplicate attribute name: '{0}'")]
    DuplicateAttributeName(String),

    #[error("attribute '{attribute}' has no value '{value}'")]
    ValueNotFound { attribute: String, value: String },

    #[error("attribute '{attribute}' already has value '{value}'")]
    DuplicateValue { attribute: String, value: String },

    #[error("product has no attributes; stock is entered on the default variant")]
    NoParentAxis,

    #[error("parent attribute '{0}' has no values; add a value before entering stock")]
    DegenerateParentAxis(String),

    #[error("'{value}' is not a value of parent attribute '{attribute}'")]
    UnknownParentValue { attribute: String, value: String },

    #[error("no variant matches combination {0}")]
    UnknownCombination(String),
}
