//! The connect decision rule of section 4.3: try the client driver first, retry on
//! the direct driver only when the client's failure looks like "this isn't a client
//! DSN" rather than a real connect error, and commit to whichever table a
//! driver-level `Connect` actually succeeds against.

use crate::handles::{
    diagnostics::{Encoding, NativeDiagnostics},
    Connection, Environment, Record, SqlResult, State, Text,
};
use crate::loader::{FunctionTable, OdbcFn};
use crate::version::{native_error, ConnectionType, OdbcVersion};
use odbc_sys::{Handle, HandleType, InfoType, SqlReturn};
use std::ffi::c_void;
use std::mem::transmute;
use std::ptr::null_mut;
use std::sync::Arc;

type AllocHandleFn = unsafe extern "system" fn(HandleType, Handle, *mut Handle) -> SqlReturn;
type FreeHandleFn = unsafe extern "system" fn(HandleType, Handle) -> SqlReturn;
type ConnectFn =
    unsafe extern "system" fn(Handle, *const u8, i16, *const u8, i16, *const u8, i16) -> SqlReturn;
type DisconnectFn = unsafe extern "system" fn(Handle) -> SqlReturn;
type GetInfoWFn = unsafe extern "system" fn(Handle, InfoType, *mut c_void, i16, *mut i16) -> SqlReturn;

/// Queries the driver for a UTF-16 `GetInfo` string, growing the buffer once if the
/// driver reports the supplied one was too small. Grounded on the teacher's
/// `fetch_database_management_system_name` buffer-growth-on-truncation pattern.
fn get_info_text(table: &FunctionTable, handle: Handle, info: InfoType) -> Option<Text> {
    let raw = table.odbc(OdbcFn::GetInfoW);
    let f: GetInfoWFn = unsafe { transmute(raw) };
    const PROBE_LEN: usize = 128;
    let mut buf = vec![0u16; PROBE_LEN];
    let mut length_bytes: i16 = 0;
    let ret = unsafe {
        f(
            handle,
            info,
            buf.as_mut_ptr() as *mut c_void,
            (buf.len() * 2) as i16,
            &mut length_bytes,
        )
    };
    if !matches!(ret, SqlReturn::SUCCESS | SqlReturn::SUCCESS_WITH_INFO) {
        return None;
    }
    if (buf.len() * 2) < (length_bytes as usize + 2) {
        buf.resize(length_bytes as usize / 2 + 1, 0);
        let ret = unsafe {
            f(
                handle,
                info,
                buf.as_mut_ptr() as *mut c_void,
                (buf.len() * 2) as i16,
                &mut length_bytes,
            )
        };
        if !matches!(ret, SqlReturn::SUCCESS | SqlReturn::SUCCESS_WITH_INFO) {
            return None;
        }
    }
    buf.truncate((length_bytes as usize) / 2);
    Some(Text::Utf16(buf))
}

/// Captures the connection and server names a freshly connected driver-native
/// handle reports (section 4.3's post-connect step), without letting the probe
/// calls' own driver diagnostics leak into the connection's DM-visible stack: the
/// stack is snapshotted first and restored once both queries have run. Falls back
/// to `dsn` for whichever query the driver doesn't answer.
pub(crate) fn capture_names(
    table: &FunctionTable,
    native: Handle,
    connection: &Arc<Connection>,
    dsn: &str,
    encoding: Encoding,
) -> (Text, Text) {
    let snapshot = connection.diagnostics.lock().unwrap().snapshot();
    let connection_name = get_info_text(table, native, InfoType::DataSourceName)
        .unwrap_or_else(|| Text::ansi(dsn))
        .to_encoding(encoding);
    let server_name = get_info_text(table, native, InfoType::ServerName)
        .unwrap_or_else(|| Text::ansi(dsn))
        .to_encoding(encoding);
    connection.diagnostics.lock().unwrap().restore(snapshot);
    (connection_name, server_name)
}

pub(crate) fn alloc_dbc(table: &FunctionTable, env_handle: Handle) -> Option<Handle> {
    let raw = table.odbc(OdbcFn::AllocHandle);
    if raw.is_null() {
        return None;
    }
    let f: AllocHandleFn = unsafe { transmute(raw) };
    let mut handle = null_mut();
    let ret = unsafe { f(HandleType::Dbc, env_handle, &mut handle) };
    matches!(ret, SqlReturn::SUCCESS | SqlReturn::SUCCESS_WITH_INFO).then_some(handle)
}

fn connect(table: &FunctionTable, handle: Handle, dsn: &str, user: &str, password: &str) -> SqlReturn {
    let raw = table.odbc(OdbcFn::Connect);
    let f: ConnectFn = unsafe { transmute(raw) };
    let (dsn, user, password) = (dsn.as_bytes(), user.as_bytes(), password.as_bytes());
    unsafe {
        f(
            handle,
            dsn.as_ptr(),
            dsn.len() as i16,
            user.as_ptr(),
            user.len() as i16,
            password.as_ptr(),
            password.len() as i16,
        )
    }
}

pub(crate) fn disconnect_and_free(table: &FunctionTable, handle: Handle) {
    let raw = table.odbc(OdbcFn::Disconnect);
    if !raw.is_null() {
        let f: DisconnectFn = unsafe { transmute(raw) };
        unsafe {
            f(handle);
        }
    }
    let raw = table.odbc(OdbcFn::FreeHandle);
    if !raw.is_null() {
        let f: FreeHandleFn = unsafe { transmute(raw) };
        unsafe {
            f(HandleType::Dbc, handle);
        }
    }
}

/// Attempts to connect `connection` to `dsn`, implementing the fan-out of section
/// 4.3. Returns the severity of the winning (or final failing) attempt; diagnostics
/// from every attempt that actually ran a driver are pushed onto `connection`'s
/// stack in the order they were produced.
pub fn dispatch_connect(
    environment: &Arc<Environment>,
    connection: &Arc<Connection>,
    dsn: &str,
    user: &str,
    password: &str,
    encoding: Encoding,
) -> SqlResult<()> {
    connection.diagnostics.lock().unwrap().clear();

    let attempts: Vec<(ConnectionType, Arc<FunctionTable>, Handle)> = [
        environment
            .client()
            .zip(environment.client_env_handle())
            .map(|(t, h)| (ConnectionType::Client, t.clone(), h)),
        environment
            .direct()
            .zip(environment.direct_env_handle())
            .map(|(t, h)| (ConnectionType::Direct, t.clone(), h)),
    ]
    .into_iter()
    .flatten()
    .collect();

    let multiple_candidates = attempts.len() > 1;

    for (index, (connection_type, table, env_handle)) in attempts.iter().enumerate() {
        let Some(native) = alloc_dbc(table, *env_handle) else { continue };
        let ret = connect(table, native, dsn, user, password);
        match ret {
            SqlReturn::SUCCESS | SqlReturn::SUCCESS_WITH_INFO => {
                let (connection_name, server_name) = capture_names(table, native, connection, dsn, encoding);
                connection.commit(table.clone(), native, *connection_type, connection_name, server_name);
                if ret == SqlReturn::SUCCESS_WITH_INFO {
                    let diag = NativeDiagnostics {
                        table: table.clone(),
                        handle_type: HandleType::Dbc,
                        handle: native,
                    };
                    diag.drain_into(&mut connection.diagnostics.lock().unwrap(), encoding);
                    return SqlResult::SuccessWithInfo(());
                }
                return SqlResult::Success(());
            }
            _ => {
                let diag = NativeDiagnostics {
                    table: table.clone(),
                    handle_type: HandleType::Dbc,
                    handle: native,
                };
                let is_last_attempt = index + 1 == attempts.len();
                let looks_like_wrong_dsn_kind = diag
                    .record(1, Encoding::Ansi)
                    .map(|r| r.state.is_cannot_connect_to_dsn(r.native_error))
                    .unwrap_or(false);

                if multiple_candidates && looks_like_wrong_dsn_kind && !is_last_attempt {
                    disconnect_and_free(table, native);
                    continue;
                }
                diag.drain_into(&mut connection.diagnostics.lock().unwrap(), encoding);
                disconnect_and_free(table, native);
                return SqlResult::Error;
            }
        }
    }

    SqlResult::Error
}

/// Picks the single best table for a raw connection-string attempt: client
/// preferred, else direct. Unlike [`dispatch_connect`]'s full decision rule there is
/// no retry on a "wrong DSN kind" signal, since the connection string here is
/// forwarded unparsed straight to the driver and the DM has no DSN name of its own
/// to decide a retry on (a deliberate simplification, see DESIGN.md).
fn pick_table(environment: &Environment) -> Option<(ConnectionType, Arc<FunctionTable>, Handle)> {
    environment
        .client()
        .zip(environment.client_env_handle())
        .map(|(t, h)| (ConnectionType::Client, t.clone(), h))
        .or_else(|| {
            environment
                .direct()
                .zip(environment.direct_env_handle())
                .map(|(t, h)| (ConnectionType::Direct, t.clone(), h))
        })
}

macro_rules! driver_connect_fn {
    ($name:ident, $entry:expr, $char:ty, $encoding:expr) => {
        #[allow(clippy::too_many_arguments)]
        pub fn $name(
            environment: &Arc<Environment>,
            connection: &Arc<Connection>,
            window_handle: Handle,
            in_connection_string: *const $char,
            string_length1: i16,
            out_connection_string: *mut $char,
            buffer_length: i16,
            out_length: *mut i16,
            driver_completion: u16,
        ) -> SqlResult<()> {
            connection.diagnostics.lock().unwrap().clear();
            let Some((connection_type, table, env_handle)) = pick_table(environment) else {
                return SqlResult::Error;
            };
            let Some(native) = alloc_dbc(&table, env_handle) else {
                return SqlResult::Error;
            };
            type F = unsafe extern "system" fn(
                Handle,
                Handle,
                *const $char,
                i16,
                *mut $char,
                i16,
                *mut i16,
                u16,
            ) -> SqlReturn;
            let f: F = unsafe { transmute(table.odbc($entry)) };
            let ret = unsafe {
                f(
                    native,
                    window_handle,
                    in_connection_string,
                    string_length1,
                    out_connection_string,
                    buffer_length,
                    out_length,
                    driver_completion,
                )
            };
            match ret {
                SqlReturn::SUCCESS | SqlReturn::SUCCESS_WITH_INFO => {
                    let (connection_name, server_name) = capture_names(&table, native, connection, "", $encoding);
                    connection.commit(table.clone(), native, connection_type, connection_name, server_name);
                    if ret == SqlReturn::SUCCESS_WITH_INFO {
                        let diag = NativeDiagnostics { table: table.clone(), handle_type: HandleType::Dbc, handle: native };
                        diag.drain_into(&mut connection.diagnostics.lock().unwrap(), $encoding);
                        return SqlResult::SuccessWithInfo(());
                    }
                    SqlResult::Success(())
                }
                _ => {
                    let diag = NativeDiagnostics { table: table.clone(), handle_type: HandleType::Dbc, handle: native };
                    diag.drain_into(&mut connection.diagnostics.lock().unwrap(), $encoding);
                    disconnect_and_free(&table, native);
                    SqlResult::Error
                }
            }
        }
    };
}

driver_connect_fn!(dispatch_driver_connect, OdbcFn::DriverConnect, u8, Encoding::Ansi);
driver_connect_fn!(dispatch_driver_connect_w, OdbcFn::DriverConnectW, u16, Encoding::Utf16);

macro_rules! browse_connect_fn {
    ($name:ident, $entry:expr, $char:ty, $encoding:expr) => {
        /// Unlike the other connect entries this returns the raw driver code: a
        /// browse still in progress reports `SQL_NEED_DATA`, which is neither
        /// success nor a failure the DM should tear the attempt down for.
        pub fn $name(
            environment: &Arc<Environment>,
            connection: &Arc<Connection>,
            in_connection_string: *const $char,
            string_length1: i16,
            out_connection_string: *mut $char,
            buffer_length: i16,
            out_length: *mut i16,
        ) -> SqlReturn {
            connection.diagnostics.lock().unwrap().clear();
            let Some((connection_type, table, env_handle)) = pick_table(environment) else {
                return SqlReturn::ERROR;
            };
            let Some(native) = alloc_dbc(&table, env_handle) else {
                return SqlReturn::ERROR;
            };
            type F = unsafe extern "system" fn(Handle, *const $char, i16, *mut $char, i16, *mut i16) -> SqlReturn;
            let f: F = unsafe { transmute(table.odbc($entry)) };
            let ret = unsafe { f(native, in_connection_string, string_length1, out_connection_string, buffer_length, out_length) };
            let diag = NativeDiagnostics { table: table.clone(), handle_type: HandleType::Dbc, handle: native };
            diag.drain_into(&mut connection.diagnostics.lock().unwrap(), $encoding);
            match ret {
                SqlReturn::SUCCESS | SqlReturn::SUCCESS_WITH_INFO => {
                    let (connection_name, server_name) = capture_names(&table, native, connection, "", $encoding);
                    connection.commit(table.clone(), native, connection_type, connection_name, server_name);
                }
                SqlReturn::NEED_DATA => {}
                _ => disconnect_and_free(&table, native),
            }
            ret
        }
    };
}

browse_connect_fn!(dispatch_browse_connect, OdbcFn::BrowseConnect, u8, Encoding::Ansi);
browse_connect_fn!(dispatch_browse_connect_w, OdbcFn::BrowseConnectW, u16, Encoding::Utf16);

/// `SQLDisconnect`: refuses while any statement or explicit descriptor is still
/// alive (same "dependents" rule as freeing the connection, section 4.2), otherwise
/// calls the driver's own `Disconnect` and reverts the connection to `Alloc` so a
/// later connect attempt may commit to either driver again.
pub fn dispatch_disconnect(connection: &Arc<Connection>) -> SqlReturn {
    if connection.has_live_children() {
        connection.diagnostics.lock().unwrap().push(Record::dm_authored(
            SqlReturn::ERROR,
            State::sequence_error(OdbcVersion::current()),
            native_error::NOT_DISCONNECTED,
            "connection still has live statements or descriptors",
            Encoding::Ansi,
        ));
        return SqlReturn::ERROR;
    }
    let (Some(table), Some(native)) = (connection.table(), connection.native_handle()) else {
        return SqlReturn::SUCCESS;
    };
    let raw = table.odbc(OdbcFn::Disconnect);
    if !raw.is_null() {
        let f: DisconnectFn = unsafe { transmute(raw) };
        unsafe {
            f(native);
        }
    }
    connection.reset();
    SqlReturn::SUCCESS
}
