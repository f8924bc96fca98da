//! Error kinds surfaced to callers.
//!
//! Programmer errors (null/zero-sized arguments, unbalanced scopes, wrong
//! tags) are not representable here: they abort via [`crate::bug`] instead
//! of being returned, matching the "abort via assert_log equivalent"
//! failure model.

use thiserror::Error;

/// Coarse error classification mirrored from the C-side `out_error` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No error.
    None,
    /// A caller-supplied argument was invalid.
    InvalidParameter,
    /// An allocation could not be satisfied.
    OutOfMemory,
    /// `acquire_by_name` found no matching entry.
    ResourceNotLoaded,
    /// The backend (GPU API) reported a failure.
    BackendError,
}

impl ErrorKind {
    /// Stringify, matching the C API's `vkr_error_to_string`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::InvalidParameter => "INVALID_PARAMETER",
            Self::OutOfMemory => "OUT_OF_MEMORY",
            Self::ResourceNotLoaded => "RESOURCE_NOT_LOADED",
            Self::BackendError => "BACKEND_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The crate's fallible-operation error type.
#[derive(Error, Debug)]
pub enum RenderGraphError {
    /// A caller-supplied argument was invalid (bad handle, empty name, ...).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Host or GPU allocation failed.
    #[error("out of memory")]
    OutOfMemory,

    /// `acquire_by_name` found no entry for the given name.
    #[error("resource not loaded: {0}")]
    ResourceNotLoaded(String),

    /// The graphics backend reported a failure.
    #[error("backend error: {0}")]
    Backend(String),

    /// Render graph compilation failed; the graph is left in its
    /// pre-compile state so the caller can fix declarations and retry.
    #[error("graph compile failed: {0}")]
    Compile(String),
}

impl RenderGraphError {
    /// The coarse [`ErrorKind`] this error maps to.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::OutOfMemory => ErrorKind::OutOfMemory,
            Self::ResourceNotLoaded(_) => ErrorKind::ResourceNotLoaded,
            Self::Backend(_) => ErrorKind::BackendError,
            Self::Compile(_) => ErrorKind::BackendError,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RenderGraphError>;

/// Abort on a programmer error: null/zero-sized arguments, wrong tags,
/// end-scope without begin. Logs at `error!` before panicking, matching the
/// "abort via assert_log equivalent" failure model used throughout the
/// allocator and graph code.
#[macro_export]
macro_rules! bug {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
        panic!($($arg)*);
    }};
}
