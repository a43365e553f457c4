//! Utility-handle lifecycle (section 4.5 "Utility"): `Open`/`Close`/`Status` are the
//! only three entry points the dispatch layer exercises against the utility
//! library; the rest of [`crate::loader::UtilityFn`] is resolved at load time (so a
//! missing symbol still fails the table) but never called, see
//! [`crate::loader::UtilityFn::is_reserved`].

use crate::handles::{DiagStack, Encoding, Record, SqlResult, State, UtilityHandle};
use crate::loader::UtilityFn;
use crate::version::{native_error, OdbcVersion};
use odbc_sys::{Handle, SqlReturn};
use std::mem::transmute;
use std::ptr::null_mut;
use std::sync::{Arc, Mutex};

type UtilOpenFn = unsafe extern "system" fn(*mut Handle) -> SqlReturn;
type UtilCloseFn = unsafe extern "system" fn(Handle) -> SqlReturn;
type UtilStatusFn = unsafe extern "system" fn(Handle) -> SqlReturn;

fn push(diagnostics: &Mutex<DiagStack>, record: Record) {
    diagnostics.lock().unwrap().push(record);
}

fn dm_error(state: State, native_error: i32, message: impl AsRef<str>) -> Record {
    Record::dm_authored(SqlReturn::ERROR, state, native_error, message, Encoding::Ansi)
}

/// Allocates the utility sentinel (creating the hidden direct-mode environment on
/// first use, section 4.5 "Utility") and opens a native utility session against it.
pub fn dispatch_utility_open() -> SqlResult<Arc<UtilityHandle>> {
    let handle = match crate::registry::alloc_utility_handle() {
        Ok(handle) => Arc::new(handle),
        Err(_) => return SqlResult::Error,
    };
    let Some(raw) = handle.table().utility(UtilityFn::Open) else {
        crate::registry::free_utility_handle();
        push(
            &handle.diagnostics,
            dm_error(
                State::resource_error(OdbcVersion::current()),
                native_error::NO_MEMORY,
                "utility library does not expose ttUtilOpen",
            ),
        );
        return SqlResult::Error;
    };
    let f: UtilOpenFn = unsafe { transmute(raw) };
    let mut native = null_mut();
    let ret = unsafe { f(&mut native) };
    if !matches!(ret, SqlReturn::SUCCESS | SqlReturn::SUCCESS_WITH_INFO) {
        crate::registry::free_utility_handle();
        push(
            &handle.diagnostics,
            dm_error(
                State::resource_error(OdbcVersion::current()),
                native_error::NO_MEMORY,
                "utility library failed to open a session",
            ),
        );
        return SqlResult::Error;
    }
    handle.set_native_handle(native);
    SqlResult::Success(handle)
}

/// Closes the native utility session and releases the sentinel (the last free
/// tears down the hidden direct-mode environment, section 4.5).
pub fn dispatch_utility_close(handle: &Arc<UtilityHandle>) -> SqlReturn {
    if let Some(native) = handle.native_handle() {
        if let Some(raw) = handle.table().utility(UtilityFn::Close) {
            let f: UtilCloseFn = unsafe { transmute(raw) };
            unsafe {
                f(native);
            }
        }
    }
    crate::registry::free_utility_handle();
    SqlReturn::SUCCESS
}

/// Forwards to the native `ttUtilStatus` entry point.
pub fn dispatch_utility_status(handle: &Arc<UtilityHandle>) -> SqlReturn {
    let Some(native) = handle.native_handle() else {
        return SqlReturn::INVALID_HANDLE;
    };
    let Some(raw) = handle.table().utility(UtilityFn::Status) else {
        return SqlReturn::ERROR;
    };
    let f: UtilStatusFn = unsafe { transmute(raw) };
    unsafe { f(native) }
}
