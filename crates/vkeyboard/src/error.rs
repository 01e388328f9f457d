use std::result::Result as StdResult;

use thiserror::Error;

use crate::geom;

/// Result type for keyboard operations.
pub type Result<T> = StdResult<T, Error>;

/// Keyboard error type.
///
/// Configuration errors surface only while building a layout or a keyboard,
/// or while recomputing geometry after a resize. Event handling never fails:
/// events that don't apply are silently ignored.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    #[error("configuration: {0}")]
    /// Invalid layout or keyboard configuration.
    Configuration(String),
    #[error("geometry: {0}")]
    /// Geometry failure.
    Geometry(String),
    #[error("render: {0}")]
    /// The host canvas failed to draw.
    Render(String),
}

impl Error {
    /// Shorthand for a configuration error.
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<geom::Error> for Error {
    fn from(e: geom::Error) -> Self {
        Self::Geometry(e.to_string())
    }
}
