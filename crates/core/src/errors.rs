use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to parse Malloy result: {0}")]
    MalformedInput(String),
    #[error("result missing schema information")]
    MissingSchema,
    #[error("{capability} is required for this conversion. {guidance}")]
    MissingCapability { capability: &'static str, guidance: &'static str },
    #[error("expected a QueryResult object with `result` field")]
    InvalidInputShape,
}

impl DecodeError {
    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        Self::MalformedInput(detail.to_string())
    }

    /// Stable class name for structured output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::MissingSchema => "missing_schema",
            Self::MissingCapability { .. } => "missing_capability",
            Self::InvalidInputShape => "invalid_input_shape",
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(value: serde_json::Error) -> Self {
        Self::malformed(value)
    }
}
