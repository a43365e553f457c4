//! Handle kinds and the shared handle-layer types used by the dispatch shims: one
//! module per kind of ODBC (or TimesTen-specific) handle, plus the diagnostic stack
//! every one of them carries.

mod any_handle;
mod as_handle;
mod change_capture;
mod connection;
mod descriptor;
pub mod diagnostics;
mod environment;
pub mod header;
mod logging;
mod sql_char;
mod sql_result;
mod statement;
mod utility;

pub use any_handle::AnyHandle;
pub use as_handle::AsHandle;
pub use change_capture::ChangeCapture;
pub use connection::{Connection, ConnectionState};
pub use descriptor::{Descriptor, DescriptorOrigin};
pub use diagnostics::{DiagStack, Encoding, NativeDiagnostics, Record, State, Text};
pub use environment::Environment;
pub use header::HandleHeader;
pub use logging::log_diagnostics;
pub use sql_char::{ansi_slice_to_utf8, utf16_slice_to_utf8, utf8_to_ansi, utf8_to_utf16};
pub use sql_result::{worse, ExtSqlReturn, SqlResult};
pub use statement::Statement;
pub use utility::UtilityHandle;

#[cfg(feature = "trace_calls")]
pub use logging::{trace_call, trace_return};

use odbc_sys::HandleType;

/// Which kind of DM handle an opaque pointer handed back to the application names.
/// Every handle struct reports its own kind through [`AnyHandle`]; the allocation
/// layer checks this before trusting a raw pointer enough to downcast it (section 3
/// "Handle validation").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Environment,
    Connection,
    Statement,
    Descriptor,
    ChangeCapture,
    Utility,
}

impl HandleKind {
    /// The ODBC handle-type constant this kind is reported as in `GetDiagRec`-style
    /// calls. Change-capture and utility handles have no ODBC handle-type counterpart.
    pub fn native_handle_type(self) -> Option<HandleType> {
        match self {
            HandleKind::Environment => Some(HandleType::Env),
            HandleKind::Connection => Some(HandleType::Dbc),
            HandleKind::Statement => Some(HandleType::Stmt),
            HandleKind::Descriptor => Some(HandleType::Desc),
            HandleKind::ChangeCapture | HandleKind::Utility => None,
        }
    }
}
