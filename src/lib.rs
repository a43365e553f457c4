//! ttdrvmgr dispatches ODBC calls between two TimesTen driver libraries, direct and
//! client, presenting a single ODBC driver-manager surface to the application. It
//! loads whichever of the two is present, decides which one a given connection
//! should use, and merges each driver's own diagnostics with its own into one
//! coherent stack per handle. See `SPEC_FULL.md` for the full behavior this crate
//! implements.

mod abi;
pub mod dispatch;
pub mod error;
pub mod handles;
pub mod loader;
pub mod registry;
pub mod version;

pub use error::{DmError, DmResult};
pub use handles::{
    AnyHandle, AsHandle, ChangeCapture, Connection, ConnectionState, Descriptor,
    DescriptorOrigin, DiagStack, Encoding, Environment, HandleKind, NativeDiagnostics, Record,
    SqlResult, Statement, State, Text, UtilityHandle,
};
pub use loader::{CaptureFn, FunctionTable, Kind as LibraryKind, OdbcFn, UtilityFn};
pub use version::{ConnectionType, OdbcVersion};
