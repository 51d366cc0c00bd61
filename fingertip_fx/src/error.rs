//! Setup failures.  Each one ends session setup and is shown to the user as
//! a single message; none is retried.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("the camera needs a secure context")]
    InsecureContext,
    #[error("no camera support in this environment")]
    UnsupportedEnvironment,
    #[error("hand tracking is unavailable: {0}")]
    DetectorUnavailable(String),
    #[error("camera access was denied")]
    PermissionDenied,
    #[error("camera error: {0}")]
    Device(String),
}
