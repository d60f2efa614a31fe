//! Error types
//!
//! Nothing in the per-frame path can fail. These cover the two places a host
//! can get something back: mounting and loading settings.

use thiserror::Error;

/// Why `mount` did not start the animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MountError {
    /// The surface has no 2D context; the component stays inert
    #[error("drawing surface has no 2D context, particle background disabled")]
    NoContext,
    #[error("particle background is already mounted")]
    AlreadyMounted,
    /// Unmount is terminal
    #[error("particle background was unmounted and cannot be mounted again")]
    Unmounted,
}

/// Settings that failed to parse or validate
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
