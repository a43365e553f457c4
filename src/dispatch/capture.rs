//! Change-capture (XLA) lifecycle (section 4.5 "Change-capture"): a connection
//! opened in direct mode may allocate a single change-capture handle wrapping the
//! driver-native capture handle, with a back-pointer to its owning connection. All
//! capture shims validate the wrapper and pass the wrapped driver handle straight
//! through to the matching `CaptureFn` entry point.

use crate::handles::{ChangeCapture, DiagStack, Encoding, Record, SqlResult, State};
use crate::loader::CaptureFn;
use crate::version::{native_error, ConnectionType, OdbcVersion};
use odbc_sys::SqlReturn;
use std::ffi::c_void;
use std::mem::transmute;
use std::ptr::null_mut;
use std::sync::{Arc, Mutex};

type CaptureOpenFn = unsafe extern "system" fn(*mut c_void, *mut *mut c_void) -> SqlReturn;
type CaptureCloseFn = unsafe extern "system" fn(*mut c_void) -> SqlReturn;
type CaptureStatusFn = unsafe extern "system" fn(*mut c_void) -> SqlReturn;

fn push(diagnostics: &Mutex<DiagStack>, record: Record) {
    diagnostics.lock().unwrap().push(record);
}

fn dm_error(state: State, native_error: i32, message: impl AsRef<str>) -> Record {
    Record::dm_authored(SqlReturn::ERROR, state, native_error, message, Encoding::Ansi)
}

/// Opens a change-capture subscription against `connection`'s committed driver.
/// Requires a direct-mode connection (section 4.5) with no capture handle already
/// registered (`Connection::set_change_capture`'s single-assignment guard).
pub fn dispatch_change_capture_open(
    connection: &Arc<crate::handles::Connection>,
) -> SqlResult<Arc<ChangeCapture>> {
    if connection.connection_type() != ConnectionType::Direct {
        push(
            &connection.diagnostics,
            dm_error(
                State::sequence_error(OdbcVersion::current()),
                native_error::INVALID_ARG,
                "change-capture requires a direct-mode connection",
            ),
        );
        return SqlResult::Error;
    }
    if connection.change_capture().is_some() {
        push(
            &connection.diagnostics,
            dm_error(
                State::sequence_error(OdbcVersion::current()),
                native_error::INVALID_ARG,
                "connection already has a change-capture handle",
            ),
        );
        return SqlResult::Error;
    }
    let table = connection.table().expect("Direct connection_type implies a committed table");
    let Some(raw) = table.capture(CaptureFn::Open) else {
        push(
            &connection.diagnostics,
            dm_error(
                State::resource_error(OdbcVersion::current()),
                native_error::NO_MEMORY,
                "direct driver does not expose ttXlaOpen",
            ),
        );
        return SqlResult::Error;
    };
    let dbc = connection.native_handle().expect("Connected implies a native handle") as *mut c_void;
    let f: CaptureOpenFn = unsafe { transmute(raw) };
    let mut native = null_mut();
    let ret = unsafe { f(dbc, &mut native) };
    if !matches!(ret, SqlReturn::SUCCESS | SqlReturn::SUCCESS_WITH_INFO) {
        push(
            &connection.diagnostics,
            dm_error(
                State::resource_error(OdbcVersion::current()),
                native_error::NO_MEMORY,
                "driver failed to open a change-capture subscription",
            ),
        );
        return SqlResult::Error;
    }
    let capture = Arc::new(ChangeCapture::new(Arc::downgrade(connection), native));
    if connection.set_change_capture(capture.clone()).is_err() {
        let raw = table.capture(CaptureFn::Close);
        if let Some(raw) = raw {
            let f: CaptureCloseFn = unsafe { transmute(raw) };
            unsafe {
                f(native);
            }
        }
        push(
            &connection.diagnostics,
            dm_error(
                State::sequence_error(OdbcVersion::current()),
                native_error::INVALID_ARG,
                "connection already has a change-capture handle",
            ),
        );
        return SqlResult::Error;
    }
    SqlResult::Success(capture)
}

/// Closes the driver-native capture handle and clears the connection's slot so a
/// later `Open` may succeed.
pub fn dispatch_change_capture_close(capture: &Arc<ChangeCapture>) -> SqlReturn {
    let Some(connection) = capture.connection.upgrade() else {
        return SqlReturn::INVALID_HANDLE;
    };
    let Some(table) = connection.table() else {
        return SqlReturn::INVALID_HANDLE;
    };
    if let Some(raw) = table.capture(CaptureFn::Close) {
        let f: CaptureCloseFn = unsafe { transmute(raw) };
        unsafe {
            f(capture.native_handle());
        }
    }
    connection.clear_change_capture();
    SqlReturn::SUCCESS
}

/// Forwards to the native `ttXlaStatus` entry point.
pub fn dispatch_change_capture_status(capture: &Arc<ChangeCapture>) -> SqlReturn {
    let Some(connection) = capture.connection.upgrade() else {
        return SqlReturn::INVALID_HANDLE;
    };
    let Some(table) = connection.table() else {
        return SqlReturn::INVALID_HANDLE;
    };
    let Some(raw) = table.capture(CaptureFn::Status) else {
        return SqlReturn::ERROR;
    };
    let f: CaptureStatusFn = unsafe { transmute(raw) };
    unsafe { f(capture.native_handle()) }
}
