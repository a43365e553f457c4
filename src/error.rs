//! The DM-authored error taxonomy of section 7. These are the Rust-facing errors
//! returned by this crate's safe constructors (loading a library, opening the
//! registry); they are a different thing from the diagnostic records pushed onto a
//! handle's stack by a dispatch shim (see [`crate::handles::diagnostics`]), which
//! never unwind across the ODBC ABI boundary.

use thiserror::Error;

/// Errors produced while standing up or tearing down the driver manager itself,
/// as opposed to errors produced while servicing an individual ODBC call (which are
/// reported as [`crate::handles::diagnostics::Record`]s pushed to a handle, never as
/// a Rust `Result`).
#[derive(Debug, Error)]
pub enum DmError {
    /// Neither the direct nor the client driver library could be loaded. Section
    /// 4.1: allocating an environment requires at least one of the two to load.
    #[error("neither the direct nor the client driver library could be loaded")]
    NoDriverAvailable,

    /// A specific library failed to load, or was missing a required entry point.
    /// Reported with native error code 90001 (`tt_ErrDMDriverLoad`) when pushed as a
    /// diagnostic record, see section 7 and `ttdrvmgr.h`.
    #[error("failed to load driver library '{library}': {reason}")]
    LibraryLoad { library: String, reason: String },

    /// Allocation of a DM handle or its mutex failed. Native error code 90000
    /// (`tt_ErrDMNoMemory`).
    #[error("out of memory allocating a driver-manager handle")]
    OutOfMemory,

    /// A negative buffer length, unsupported option, or null output pointer for a
    /// mandatory output. Native error code 90003 (`tt_ErrDMInvalidArg`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was requested on a connection in the wrong state. Native error
    /// code 90002 (`tt_ErrDMNotDisconnected`) when the violation is "still connected".
    #[error("operation is not valid in the current connection state: {0}")]
    SequenceError(String),

    /// The supplied handle failed tag/kind validation, or belongs to the wrong
    /// parent. Reported as the dedicated invalid-handle return code, never pushed to
    /// any diagnostic stack (section 7).
    #[error("invalid handle")]
    InvalidHandle,
}

pub type DmResult<T> = Result<T, DmError>;
