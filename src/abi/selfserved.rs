//! `SQLGetEnvAttr`/`SQLSetEnvAttr`, `SQLGetConnectAttr(W)`/`SQLSetConnectAttr(W)`,
//! `SQLGetConnectOption`/`SQLSetConnectOption`, and `SQLGetInfo(W)`: the self-served
//! attributes of section 4.3/6 are answered here without touching either driver,
//! everything else falls through to whichever driver the connection committed to.

use crate::abi::opaque;
use crate::dispatch::selfserved::{self, NativeHandleQuery};
use crate::handles::{Connection, Environment, HandleKind};
use crate::version::{SQL_ATTR_TTDM_CAPABILITIES, SQL_ATTR_TTDM_VERSION, TTDM_CONNECTION_TYPE};
use odbc_sys::{Handle, InfoType, SqlReturn};
use std::ffi::c_void;
use std::mem::transmute;

type GetEnvAttrFn = unsafe extern "system" fn(Handle, i32, *mut c_void, i32, *mut i32) -> SqlReturn;
type SetEnvAttrFn = unsafe extern "system" fn(Handle, i32, *mut c_void, i32) -> SqlReturn;
type GetConnectAttrFn = unsafe extern "system" fn(Handle, i32, *mut c_void, i32, *mut i32) -> SqlReturn;
type SetConnectAttrFn = unsafe extern "system" fn(Handle, i32, *const c_void, i32) -> SqlReturn;
type GetInfoFn = unsafe extern "system" fn(Handle, InfoType, *mut c_void, i16, *mut i16) -> SqlReturn;

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLGetEnvAttr(
    environment_handle: Handle,
    attribute: i32,
    value: *mut c_void,
    _buffer_length: i32,
    string_length: *mut i32,
) -> SqlReturn {
    let Some(environment) =
        (unsafe { opaque::validated::<Environment>(environment_handle, HandleKind::Environment) })
    else {
        return SqlReturn::INVALID_HANDLE;
    };
    match attribute {
        SQL_ATTR_TTDM_VERSION => {
            unsafe {
                if !value.is_null() {
                    *(value as *mut u32) = selfserved::dispatch_version_integer();
                }
                if !string_length.is_null() {
                    *string_length = std::mem::size_of::<u32>() as i32;
                }
            }
            SqlReturn::SUCCESS
        }
        SQL_ATTR_TTDM_CAPABILITIES => {
            unsafe {
                if !value.is_null() {
                    *(value as *mut u32) = selfserved::dispatch_capabilities(&environment);
                }
                if !string_length.is_null() {
                    *string_length = std::mem::size_of::<u32>() as i32;
                }
            }
            SqlReturn::SUCCESS
        }
        _ => {
            let Some(table) = environment.direct().or_else(|| environment.client()) else {
                return SqlReturn::ERROR;
            };
            let Some(native) = environment.direct_env_handle().or_else(|| environment.client_env_handle())
            else {
                return SqlReturn::ERROR;
            };
            let raw = table.odbc(crate::loader::OdbcFn::GetEnvAttr);
            let f: GetEnvAttrFn = unsafe { transmute(raw) };
            unsafe { f(native, attribute, value, _buffer_length, string_length) }
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLSetEnvAttr(
    environment_handle: Handle,
    attribute: i32,
    value: *mut c_void,
    string_length: i32,
) -> SqlReturn {
    let Some(environment) =
        (unsafe { opaque::validated::<Environment>(environment_handle, HandleKind::Environment) })
    else {
        return SqlReturn::INVALID_HANDLE;
    };
    if matches!(attribute, SQL_ATTR_TTDM_VERSION | SQL_ATTR_TTDM_CAPABILITIES) {
        // Both are read-only, reported by the DM itself; there is nothing to set.
        return SqlReturn::ERROR;
    }
    let Some(table) = environment.direct().or_else(|| environment.client()) else {
        return SqlReturn::ERROR;
    };
    let Some(native) = environment.direct_env_handle().or_else(|| environment.client_env_handle()) else {
        return SqlReturn::ERROR;
    };
    let raw = table.odbc(crate::loader::OdbcFn::SetEnvAttr);
    let f: SetEnvAttrFn = unsafe { transmute(raw) };
    unsafe { f(native, attribute, value, string_length) }
}

fn get_connect_attr(
    connection_handle: Handle,
    attribute: i32,
    value: *mut c_void,
    buffer_length: i32,
    string_length: *mut i32,
) -> SqlReturn {
    let Some(connection) =
        (unsafe { opaque::validated::<Connection>(connection_handle, HandleKind::Connection) })
    else {
        return SqlReturn::INVALID_HANDLE;
    };
    if attribute == TTDM_CONNECTION_TYPE {
        unsafe {
            if !value.is_null() {
                *(value as *mut i32) = selfserved::dispatch_connection_type(&connection) as i32;
            }
            if !string_length.is_null() {
                *string_length = std::mem::size_of::<i32>() as i32;
            }
        }
        return SqlReturn::SUCCESS;
    }
    let Some(table) = connection.table() else { return SqlReturn::ERROR };
    let Some(native) = connection.native_handle() else { return SqlReturn::ERROR };
    let raw = table.odbc(crate::loader::OdbcFn::GetConnectAttr);
    let f: GetConnectAttrFn = unsafe { transmute(raw) };
    unsafe { f(native, attribute, value, buffer_length, string_length) }
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLGetConnectAttr(
    connection_handle: Handle,
    attribute: i32,
    value: *mut c_void,
    buffer_length: i32,
    string_length: *mut i32,
) -> SqlReturn {
    get_connect_attr(connection_handle, attribute, value, buffer_length, string_length)
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLGetConnectAttrW(
    connection_handle: Handle,
    attribute: i32,
    value: *mut c_void,
    buffer_length: i32,
    string_length: *mut i32,
) -> SqlReturn {
    get_connect_attr(connection_handle, attribute, value, buffer_length, string_length)
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLGetConnectOption(
    connection_handle: Handle,
    option: i32,
    value: *mut c_void,
) -> SqlReturn {
    get_connect_attr(connection_handle, option, value, 0, std::ptr::null_mut())
}

fn set_connect_attr(connection_handle: Handle, attribute: i32, value: *const c_void, string_length: i32) -> SqlReturn {
    let Some(connection) =
        (unsafe { opaque::validated::<Connection>(connection_handle, HandleKind::Connection) })
    else {
        return SqlReturn::INVALID_HANDLE;
    };
    if attribute == TTDM_CONNECTION_TYPE {
        // Self-served and read-only: the DM decides this during connect, an
        // application cannot force it.
        return SqlReturn::ERROR;
    }
    let Some(table) = connection.table() else { return SqlReturn::ERROR };
    let Some(native) = connection.native_handle() else { return SqlReturn::ERROR };
    let raw = table.odbc(crate::loader::OdbcFn::SetConnectAttr);
    let f: SetConnectAttrFn = unsafe { transmute(raw) };
    unsafe { f(native, attribute, value, string_length) }
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLSetConnectAttr(
    connection_handle: Handle,
    attribute: i32,
    value: *const c_void,
    string_length: i32,
) -> SqlReturn {
    set_connect_attr(connection_handle, attribute, value, string_length)
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLSetConnectAttrW(
    connection_handle: Handle,
    attribute: i32,
    value: *const c_void,
    string_length: i32,
) -> SqlReturn {
    set_connect_attr(connection_handle, attribute, value, string_length)
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLSetConnectOption(connection_handle: Handle, option: i32, value: usize) -> SqlReturn {
    set_connect_attr(connection_handle, option, value as *const c_void, 0)
}

/// Writes a native-handle query's outcome into `info_value`, which already holds the
/// application handle the caller named (for the statement/descriptor variants) and is
/// overwritten in place with the driver-native equivalent on success — matching plain
/// ODBC's own `SQL_DRIVER_H*` convention, so no extra symbol needs linking (section 6
/// "DM-specific extensions", section 8 scenario C).
fn native_handle_result(query: NativeHandleQuery, info_value: *mut c_void) -> SqlReturn {
    match query {
        NativeHandleQuery::Handle(handle) => {
            unsafe {
                if !info_value.is_null() {
                    *(info_value as *mut Handle) = handle;
                }
            }
            SqlReturn::SUCCESS
        }
        NativeHandleQuery::NotYetConnected => SqlReturn::ERROR,
        NativeHandleQuery::WrongOwner => {
            SqlReturn::ERROR
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLGetInfo(
    connection_handle: Handle,
    info_type: InfoType,
    info_value: *mut c_void,
    buffer_length: i16,
    string_length: *mut i16,
) -> SqlReturn {
    let Some(connection) =
        (unsafe { opaque::validated::<Connection>(connection_handle, HandleKind::Connection) })
    else {
        return SqlReturn::INVALID_HANDLE;
    };

    match info_type {
        InfoType::DriverHdbc => {
            return native_handle_result(
                selfserved::dispatch_native_connection_handle(&connection),
                info_value,
            );
        }
        InfoType::DriverHstmt => {
            let app_handle = unsafe { *(info_value as *const Handle) };
            let Some(statement) = (unsafe {
                opaque::validated::<crate::handles::Statement>(app_handle, HandleKind::Statement)
            }) else {
                return SqlReturn::INVALID_HANDLE;
            };
            return native_handle_result(
                selfserved::dispatch_native_statement_handle(&statement, &connection),
                info_value,
            );
        }
        InfoType::DriverHdesc => {
            let app_handle = unsafe { *(info_value as *const Handle) };
            let Some(descriptor) = (unsafe {
                opaque::validated::<crate::handles::Descriptor>(app_handle, HandleKind::Descriptor)
            }) else {
                return SqlReturn::INVALID_HANDLE;
            };
            return native_handle_result(
                selfserved::dispatch_native_descriptor_handle(&descriptor, &connection),
                info_value,
            );
        }
        _ => {}
    }

    let Some(table) = connection.table() else { return SqlReturn::ERROR };
    let Some(native) = connection.native_handle() else { return SqlReturn::ERROR };
    let raw = table.odbc(crate::loader::OdbcFn::GetInfo);
    let f: GetInfoFn = unsafe { transmute(raw) };
    unsafe { f(native, info_type, info_value, buffer_length, string_length) }
}
