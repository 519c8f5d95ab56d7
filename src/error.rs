use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two user adjustable door dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Width,
    Height,
}

impl Dimension {
    /// Id of the range input that drives this dimension.
    pub fn input_id(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
        }
    }

    /// Id of the element that displays the current value.
    pub fn label_id(self) -> &'static str {
        match self {
            Self::Width => "widthValue",
            Self::Height => "heightValue",
        }
    }

    /// The dimension that is not being changed.
    pub fn other(self) -> Self {
        match self {
            Self::Width => Self::Height,
            Self::Height => Self::Width,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.input_id())
    }
}

/// Errors reported by the door generator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DoorError {
    /// The dimension is not finite or leaves no room for the center panel.
    #[error("invalid door {dimension} {value}: must be finite and greater than {minimum}")]
    InvalidDimension {
        dimension: Dimension,
        value: f32,
        minimum: f32,
    },
}

/// Failures that prevent a texture from resolving. They are recovered locally
/// by rendering the affected material untextured.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },
}

/// Errors raised while bringing up or driving the GPU renderer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No drawing surface, adapter or device could be created. Startup halts.
    #[error("rendering environment unavailable: {0}")]
    EnvironmentUnavailable(String),
    #[error("GPU is out of memory")]
    OutOfMemory,
}

impl RenderError {
    pub fn unavailable(stage: &str, err: impl fmt::Display) -> Self {
        Self::EnvironmentUnavailable(format!("failed to initialize {stage}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_ids_match_markup() {
        assert_eq!(Dimension::Width.input_id(), "width");
        assert_eq!(Dimension::Height.label_id(), "heightValue");
        assert_eq!(Dimension::Width.other(), Dimension::Height);
    }

    #[test]
    fn invalid_dimension_names_the_value() {
        let err = DoorError::InvalidDimension {
            dimension: Dimension::Height,
            value: 0.2,
            minimum: 0.2,
        };
        let message = err.to_string();
        assert!(message.contains("height"));
        assert!(message.contains("0.2"));
    }
}
