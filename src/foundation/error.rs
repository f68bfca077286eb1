/// Convenience result type used across fbxbake.
pub type BakeResult<T> = Result<T, BakeError>;

/// Top-level error taxonomy used by the baking pipeline.
#[derive(thiserror::Error, Debug)]
pub enum BakeError {
    /// Missing or unusable paths, missing template, invalid settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unbalanced braces or a malformed node in the interchange text.
    #[error("structural error: {0}")]
    Structural(String),

    /// An object or layer the pipeline needs to reference is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// A required top-level section (Objects, Definitions, Connections) is absent.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// Errors when serializing or deserializing capture/config data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BakeError {
    /// Build a [`BakeError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`BakeError::Structural`] value pointing at a 1-based source line.
    pub fn structural(line: usize, msg: impl Into<String>) -> Self {
        Self::Structural(format!("line {line}: {}", msg.into()))
    }

    /// Build a [`BakeError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`BakeError::Lookup`] value for a missing section.
    pub fn lookup(section: &str) -> Self {
        Self::Lookup(format!("section '{section}' is missing"))
    }

    /// Build a [`BakeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for errors that only invalidate a single tracked object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
