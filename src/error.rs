use thiserror::Error;

use crate::state::{TabId, WindowId};

/// A call into the browser's tab service (or the background channel) failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("no tab with id {0}")]
    NoSuchTab(TabId),
    #[error("no window with id {0}")]
    NoSuchWindow(WindowId),
    #[error("background channel disconnected")]
    Disconnected,
    #[error("{0}")]
    Rejected(String),
}

/// Pointer helpers could not resolve element geometry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("element geometry unavailable: {0}")]
pub struct GeometryError(pub String);

#[derive(Debug, Error)]
pub enum DragError {
    #[error("a commit is already in flight")]
    Busy,
    #[error("tab {0} is no longer open")]
    TabNotFound(TabId),
    #[error("drop target is no longer available")]
    TargetNotFound,
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("moving tabs failed: {0}")]
    ExternalMove(#[source] ServiceError),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeymapError {
    #[error("{chord} is already bound to {existing}")]
    Conflict { chord: String, existing: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DragError::ExternalMove(ServiceError::NoSuchTab(4));
        assert_eq!(err.to_string(), "moving tabs failed: no tab with id 4");

        let err = DragError::from(GeometryError("handle detached".to_string()));
        assert_eq!(err.to_string(), "element geometry unavailable: handle detached");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SettingsError = io_err.into();
        assert!(matches!(err, SettingsError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }
}
