//! `SQLConnect`/`SQLConnectW`/`SQLDisconnect` (section 4.3's connect decision rule).

use crate::abi::opaque;
use crate::abi::text::{ansi_str, wide_str};
use crate::dispatch::connect as dispatch;
use crate::handles::{Connection, Encoding, HandleKind};
use odbc_sys::{Handle, SqlReturn};

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLConnect(
    connection_handle: Handle,
    server_name: *const u8,
    name_length1: i16,
    user_name: *const u8,
    name_length2: i16,
    authentication: *const u8,
    name_length3: i16,
) -> SqlReturn {
    let Some(connection) =
        (unsafe { opaque::validated::<Connection>(connection_handle, HandleKind::Connection) })
    else {
        return SqlReturn::INVALID_HANDLE;
    };
    let Some(environment) = connection.environment.upgrade() else {
        return SqlReturn::INVALID_HANDLE;
    };
    let dsn = unsafe { ansi_str(server_name, name_length1) };
    let user = unsafe { ansi_str(user_name, name_length2) };
    let password = unsafe { ansi_str(authentication, name_length3) };
    dispatch::dispatch_connect(&environment, &connection, &dsn, &user, &password, Encoding::Ansi)
        .to_sql_return()
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLConnectW(
    connection_handle: Handle,
    server_name: *const u16,
    name_length1: i16,
    user_name: *const u16,
    name_length2: i16,
    authentication: *const u16,
    name_length3: i16,
) -> SqlReturn {
    let Some(connection) =
        (unsafe { opaque::validated::<Connection>(connection_handle, HandleKind::Connection) })
    else {
        return SqlReturn::INVALID_HANDLE;
    };
    let Some(environment) = connection.environment.upgrade() else {
        return SqlReturn::INVALID_HANDLE;
    };
    let dsn = unsafe { wide_str(server_name, name_length1) };
    let user = unsafe { wide_str(user_name, name_length2) };
    let password = unsafe { wide_str(authentication, name_length3) };
    dispatch::dispatch_connect(&environment, &connection, &dsn, &user, &password, Encoding::Utf16)
        .to_sql_return()
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLDriverConnect(
    connection_handle: Handle,
    window_handle: Handle,
    in_connection_string: *const u8,
    string_length1: i16,
    out_connection_string: *mut u8,
    buffer_length: i16,
    out_length: *mut i16,
    driver_completion: u16,
) -> SqlReturn {
    let Some(connection) =
        (unsafe { opaque::validated::<Connection>(connection_handle, HandleKind::Connection) })
    else {
        return SqlReturn::INVALID_HANDLE;
    };
    let Some(environment) = connection.environment.upgrade() else {
        return SqlReturn::INVALID_HANDLE;
    };
    dispatch::dispatch_driver_connect(
        &environment,
        &connection,
        window_handle,
        in_connection_string,
        string_length1,
        out_connection_string,
        buffer_length,
        out_length,
        driver_completion,
    )
    .to_sql_return()
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLDriverConnectW(
    connection_handle: Handle,
    window_handle: Handle,
    in_connection_string: *const u16,
    string_length1: i16,
    out_connection_string: *mut u16,
    buffer_length: i16,
    out_length: *mut i16,
    driver_completion: u16,
) -> SqlReturn {
    let Some(connection) =
        (unsafe { opaque::validated::<Connection>(connection_handle, HandleKind::Connection) })
    else {
        return SqlReturn::INVALID_HANDLE;
    };
    let Some(environment) = connection.environment.upgrade() else {
        return SqlReturn::INVALID_HANDLE;
    };
    dispatch::dispatch_driver_connect_w(
        &environment,
        &connection,
        window_handle,
        in_connection_string,
        string_length1,
        out_connection_string,
        buffer_length,
        out_length,
        driver_completion,
    )
    .to_sql_return()
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLBrowseConnect(
    connection_handle: Handle,
    in_connection_string: *const u8,
    string_length1: i16,
    out_connection_string: *mut u8,
    buffer_length: i16,
    out_length: *mut i16,
) -> SqlReturn {
    let Some(connection) =
        (unsafe { opaque::validated::<Connection>(connection_handle, HandleKind::Connection) })
    else {
        return SqlReturn::INVALID_HANDLE;
    };
    let Some(environment) = connection.environment.upgrade() else {
        return SqlReturn::INVALID_HANDLE;
    };
    dispatch::dispatch_browse_connect(
        &environment,
        &connection,
        in_connection_string,
        string_length1,
        out_connection_string,
        buffer_length,
        out_length,
    )
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLBrowseConnectW(
    connection_handle: Handle,
    in_connection_string: *const u16,
    string_length1: i16,
    out_connection_string: *mut u16,
    buffer_length: i16,
    out_length: *mut i16,
) -> SqlReturn {
    let Some(connection) =
        (unsafe { opaque::validated::<Connection>(connection_handle, HandleKind::Connection) })
    else {
        return SqlReturn::INVALID_HANDLE;
    };
    let Some(environment) = connection.environment.upgrade() else {
        return SqlReturn::INVALID_HANDLE;
    };
    dispatch::dispatch_browse_connect_w(
        &environment,
        &connection,
        in_connection_string,
        string_length1,
        out_connection_string,
        buffer_length,
        out_length,
    )
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLDisconnect(connection_handle: Handle) -> SqlReturn {
    let Some(connection) =
        (unsafe { opaque::validated::<Connection>(connection_handle, HandleKind::Connection) })
    else {
        return SqlReturn::INVALID_HANDLE;
    };
    dispatch::dispatch_disconnect(&connection)
}
