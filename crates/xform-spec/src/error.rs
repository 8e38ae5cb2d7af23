use thiserror::Error;

/// Errors raised while reading, checking or compiling a control tree.
#[derive(Debug, Error)]
pub enum XFormError {
    #[error("failed to parse control tree: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("control at '{path}' has no name")]
    MissingName { path: String },
    #[error("control name '{name}' at '{path}' is not a valid XML name")]
    InvalidName { path: String, name: String },
    #[error("duplicate control name '{name}' under '{path}'")]
    DuplicateName { path: String, name: String },
    #[error("bounds at '{path}' have min {min} greater than max {max}")]
    InvalidBounds { path: String, min: f64, max: f64 },
    #[error("at least one active language is required")]
    NoLanguages,
    #[error("language '{0}' is listed more than once")]
    DuplicateLanguage(String),
    #[error("instance root '{0}' is not a valid XML name")]
    InvalidInstanceRoot(String),
    #[error("xml node '{0}' carries both a value and children")]
    Node(String),
}

pub type Result<T> = std::result::Result<T, XFormError>;
