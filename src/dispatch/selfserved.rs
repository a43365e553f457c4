//! Requests the DM answers itself without consulting either driver (section 4.3
//! "self-served requests"): the DM's own version, the environment's capability
//! bitmask, the connection type a connection committed to, and the native-handle
//! queries used to recover a driver's own handle for calls the application wants to
//! route around the DM entirely (section 8 scenario C).

use crate::handles::{Connection, Descriptor, Environment, Statement};
use crate::version::{ConnectionType, DM_VERSION_INTEGER, DM_VERSION_STRING};
use odbc_sys::Handle;

/// `GetEnvAttr(SQL_ATTR_TTDM_VERSION)` as an integer, section 6.
pub fn dispatch_version_integer() -> u32 {
    DM_VERSION_INTEGER
}

/// `GetInfo`'s ASCII DM-version string, section 6.
pub fn dispatch_version_string() -> &'static str {
    DM_VERSION_STRING
}

/// `GetEnvAttr(SQL_ATTR_TTDM_CAPABILITIES)`, answered from which libraries this
/// particular environment loaded (section 4.3).
pub fn dispatch_capabilities(environment: &Environment) -> u32 {
    environment.capabilities()
}

/// `GetConnectAttr(TTDM_CONNECTION_TYPE)`: which driver a connection committed to,
/// or `ConnectionType::None` before `Connect`/`DriverConnect` succeeds (section 6).
pub fn dispatch_connection_type(connection: &Connection) -> ConnectionType {
    connection.connection_type()
}

/// The outcome of a native-handle query: either the driver-native handle the caller
/// asked for, or a rejection because the handle named in the request does not
/// belong to the connection it was asked about (section 8 scenario C).
pub enum NativeHandleQuery {
    Handle(Handle),
    NotYetConnected,
    WrongOwner,
}

/// Recovers the driver-native `Dbc` handle backing `connection`, for an application
/// that wants to call the underlying driver directly. `None` means not yet
/// connected; this never fails with `WrongOwner` since a connection is always
/// queried about itself.
pub fn dispatch_native_connection_handle(connection: &Connection) -> NativeHandleQuery {
    match connection.native_handle() {
        Some(handle) => NativeHandleQuery::Handle(handle),
        None => NativeHandleQuery::NotYetConnected,
    }
}

/// Recovers the driver-native `Stmt` handle for `statement`, verifying it still
/// belongs to `expected_connection` (section 8 scenario C: a statement handle
/// queried against the wrong connection is rejected, not silently answered).
pub fn dispatch_native_statement_handle(
    statement: &Statement,
    expected_connection: &Connection,
) -> NativeHandleQuery {
    match statement.connection.upgrade() {
        Some(owner) if std::ptr::eq(owner.as_ref(), expected_connection) => {
            NativeHandleQuery::Handle(statement.native_handle())
        }
        Some(_) => NativeHandleQuery::WrongOwner,
        None => NativeHandleQuery::NotYetConnected,
    }
}

/// Recovers the driver-native `Desc` handle for `descriptor`, with the same
/// wrong-owner rejection as [`dispatch_native_statement_handle`].
pub fn dispatch_native_descriptor_handle(
    descriptor: &Descriptor,
    expected_connection: &Connection,
) -> NativeHandleQuery {
    match descriptor.connection.upgrade() {
        Some(owner) if std::ptr::eq(owner.as_ref(), expected_connection) => {
            NativeHandleQuery::Handle(descriptor.native_handle())
        }
        Some(_) => NativeHandleQuery::WrongOwner,
        None => NativeHandleQuery::NotYetConnected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dm_version_constants_are_reported_verbatim() {
        assert_eq!(dispatch_version_integer(), DM_VERSION_INTEGER);
        assert_eq!(dispatch_version_string(), DM_VERSION_STRING);
    }
}
