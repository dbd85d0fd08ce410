//! Error types for the choropleth engine.

use thiserror::Error;

/// Result type alias using AtlasError.
pub type AtlasResult<T> = Result<T, AtlasError>;

/// Primary error type shared by the atlas crates.
#[derive(Debug, Error)]
pub enum AtlasError {
    // === Input Errors ===
    #[error("Invalid visualization setting '{field}': {message}")]
    InvalidSetting { field: String, message: String },

    #[error("Unknown palette: {0}")]
    UnknownPalette(String),

    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    // === Layer Errors ===
    #[error("Layer construction failed: {0}")]
    Construction(String),

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Duplicate layer id: {0}")]
    DuplicateLayer(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    // === Infrastructure Errors ===
    #[error("IO error: {0}")]
    Io(String),
}

impl AtlasError {
    pub fn invalid_setting(field: impl Into<String>, message: impl Into<String>) -> Self {
        AtlasError::InvalidSetting {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by caller input rather than the engine itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AtlasError::InvalidSetting { .. }
                | AtlasError::UnknownPalette(_)
                | AtlasError::Parse { .. }
                | AtlasError::DuplicateLayer(_)
        )
    }
}

impl From<std::io::Error> for AtlasError {
    fn from(err: std::io::Error) -> Self {
        AtlasError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AtlasError {
    fn from(err: serde_json::Error) -> Self {
        AtlasError::Parse {
            what: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_classification() {
        assert!(AtlasError::invalid_setting("opacity", "out of range").is_input_error());
        assert!(AtlasError::UnknownPalette("nope".into()).is_input_error());
        assert!(!AtlasError::Render("pixmap".into()).is_input_error());
        assert!(!AtlasError::Construction("factory".into()).is_input_error());
    }

    #[test]
    fn test_error_messages() {
        let err = AtlasError::invalid_setting("level", "must be between 5 and 10");
        assert_eq!(
            err.to_string(),
            "Invalid visualization setting 'level': must be between 5 and 10"
        );
    }
}
