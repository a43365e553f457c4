//! `SQLGetDiagRec`/`SQLGetDiagRecW`/`SQLGetDiagField`/`SQLGetDiagFieldW` (section
//! 4.4): the DM stack is presented first, then the driver-native stack.

use crate::abi::opaque;
use crate::abi::text::{write_ansi, write_wide};
use crate::dispatch::diag;
use crate::handles::{AsHandle, Connection, DiagStack, Descriptor, Encoding, Environment, HandleKind, Statement};
use odbc_sys::{Handle, HandleType, SqlReturn, SQLSTATE_SIZE};
use std::sync::{Arc, Mutex};

enum AnyHandleObject {
    Env(Arc<Environment>),
    Dbc(Arc<Connection>),
    Stmt(Arc<Statement>),
    Desc(Arc<Descriptor>),
}

impl AnyHandleObject {
    unsafe fn validate(handle_type: HandleType, handle: Handle) -> Option<Self> {
        match handle_type {
            HandleType::Env => unsafe { opaque::validated::<Environment>(handle, HandleKind::Environment) }
                .map(AnyHandleObject::Env),
            HandleType::Dbc => unsafe { opaque::validated::<Connection>(handle, HandleKind::Connection) }
                .map(AnyHandleObject::Dbc),
            HandleType::Stmt => unsafe { opaque::validated::<Statement>(handle, HandleKind::Statement) }
                .map(AnyHandleObject::Stmt),
            HandleType::Desc => unsafe { opaque::validated::<Descriptor>(handle, HandleKind::Descriptor) }
                .map(AnyHandleObject::Desc),
            _ => None,
        }
    }

    fn as_handle(&self) -> &dyn AsHandle {
        match self {
            AnyHandleObject::Env(h) => h.as_ref(),
            AnyHandleObject::Dbc(h) => h.as_ref(),
            AnyHandleObject::Stmt(h) => h.as_ref(),
            AnyHandleObject::Desc(h) => h.as_ref(),
        }
    }

    fn diagnostics(&self) -> &Mutex<DiagStack> {
        match self {
            AnyHandleObject::Env(h) => &h.diagnostics,
            AnyHandleObject::Dbc(h) => &h.diagnostics,
            AnyHandleObject::Stmt(h) => &h.diagnostics,
            AnyHandleObject::Desc(h) => &h.diagnostics,
        }
    }
}

fn get_diag_rec(
    handle_type: HandleType,
    handle: Handle,
    rec_number: i16,
    encoding: Encoding,
) -> Option<crate::handles::Record> {
    if rec_number <= 0 {
        return None;
    }
    let object = unsafe { AnyHandleObject::validate(handle_type, handle)? };
    diag::dispatch_get_diag_rec(object.as_handle(), object.diagnostics(), rec_number, encoding)
}

fn write_state_ansi(buf: *mut u8, state: &crate::handles::State) {
    if buf.is_null() {
        return;
    }
    unsafe {
        std::ptr::copy_nonoverlapping(state.as_str().as_ptr(), buf, SQLSTATE_SIZE);
        *buf.add(SQLSTATE_SIZE) = 0;
    }
}

fn write_state_wide(buf: *mut u16, state: &crate::handles::State) {
    if buf.is_null() {
        return;
    }
    unsafe {
        for (i, byte) in state.as_str().bytes().take(SQLSTATE_SIZE).enumerate() {
            *buf.add(i) = byte as u16;
        }
        *buf.add(SQLSTATE_SIZE) = 0;
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLGetDiagRec(
    handle_type: HandleType,
    handle: Handle,
    rec_number: i16,
    sqlstate: *mut u8,
    native_error: *mut i32,
    message_text: *mut u8,
    buffer_length: i16,
    text_length: *mut i16,
) -> SqlReturn {
    let Some(record) = get_diag_rec(handle_type, handle, rec_number, Encoding::Ansi) else {
        return SqlReturn::NO_DATA;
    };
    write_state_ansi(sqlstate, &record.state);
    unsafe {
        if !native_error.is_null() {
            *native_error = record.native_error;
        }
    }
    unsafe { write_ansi(message_text, buffer_length, text_length, &record.message.to_ansi()) }
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLGetDiagRecW(
    handle_type: HandleType,
    handle: Handle,
    rec_number: i16,
    sqlstate: *mut u16,
    native_error: *mut i32,
    message_text: *mut u16,
    buffer_length: i16,
    text_length: *mut i16,
) -> SqlReturn {
    let Some(record) = get_diag_rec(handle_type, handle, rec_number, Encoding::Utf16) else {
        return SqlReturn::NO_DATA;
    };
    write_state_wide(sqlstate, &record.state);
    unsafe {
        if !native_error.is_null() {
            *native_error = record.native_error;
        }
    }
    unsafe { write_wide(message_text, buffer_length, text_length, &record.message.to_utf16()) }
}

/// Standard `SQL_DIAG_*` identifiers this DM answers (section 4.4 "Header fields vs
/// row fields"); unrecognized identifiers are rejected.
mod field {
    pub const RETURNCODE: i16 = 1;
    pub const NUMBER: i16 = 2;
    pub const SQLSTATE: i16 = 4;
    pub const NATIVE: i16 = 5;
    pub const MESSAGE_TEXT: i16 = 6;
    pub const CLASS_ORIGIN: i16 = 8;
    pub const SUBCLASS_ORIGIN: i16 = 9;
    pub const CONNECTION_NAME: i16 = 10;
    pub const SERVER_NAME: i16 = 11;
}

fn get_diag_field(
    handle_type: HandleType,
    handle: Handle,
    rec_number: i16,
    diag_identifier: i16,
    encoding: Encoding,
) -> Option<DiagFieldValue> {
    let object = unsafe { AnyHandleObject::validate(handle_type, handle)? };
    match diag_identifier {
        field::NUMBER => Some(DiagFieldValue::Int(diag::dispatch_diag_count(
            object.as_handle(),
            object.diagnostics(),
        ) as i32)),
        field::RETURNCODE => Some(DiagFieldValue::Int(
            diag::dispatch_leading_return_code(object.as_handle(), object.diagnostics()) as i32,
        )),
        _ if rec_number > 0 => {
            let record =
                diag::dispatch_get_diag_rec(object.as_handle(), object.diagnostics(), rec_number, encoding)?;
            match diag_identifier {
                field::SQLSTATE => Some(DiagFieldValue::Text(record.state.as_str().to_owned())),
                field::NATIVE => Some(DiagFieldValue::Int(record.native_error)),
                field::MESSAGE_TEXT => Some(DiagFieldValue::Text(record.message.to_string_lossy())),
                field::CLASS_ORIGIN => Some(DiagFieldValue::Text(record.class_origin.to_owned())),
                field::SUBCLASS_ORIGIN => Some(DiagFieldValue::Text(record.subclass_origin.to_owned())),
                field::CONNECTION_NAME => Some(DiagFieldValue::Text(record.connection_name.to_string_lossy())),
                field::SERVER_NAME => Some(DiagFieldValue::Text(record.server_name.to_string_lossy())),
                _ => None,
            }
        }
        _ => None,
    }
}

enum DiagFieldValue {
    Int(i32),
    Text(String),
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLGetDiagField(
    handle_type: HandleType,
    handle: Handle,
    rec_number: i16,
    diag_identifier: i16,
    diag_info: *mut std::ffi::c_void,
    buffer_length: i16,
    string_length: *mut i16,
) -> SqlReturn {
    match get_diag_field(handle_type, handle, rec_number, diag_identifier, Encoding::Ansi) {
        Some(DiagFieldValue::Int(value)) => {
            unsafe {
                if !diag_info.is_null() {
                    *(diag_info as *mut i32) = value;
                }
            }
            SqlReturn::SUCCESS
        }
        Some(DiagFieldValue::Text(text)) => unsafe {
            write_ansi(diag_info as *mut u8, buffer_length, string_length, text.as_bytes())
        },
        None => SqlReturn::ERROR,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLGetDiagFieldW(
    handle_type: HandleType,
    handle: Handle,
    rec_number: i16,
    diag_identifier: i16,
    diag_info: *mut std::ffi::c_void,
    buffer_length: i16,
    string_length: *mut i16,
) -> SqlReturn {
    match get_diag_field(handle_type, handle, rec_number, diag_identifier, Encoding::Utf16) {
        Some(DiagFieldValue::Int(value)) => {
            unsafe {
                if !diag_info.is_null() {
                    *(diag_info as *mut i32) = value;
                }
            }
            SqlReturn::SUCCESS
        }
        Some(DiagFieldValue::Text(text)) => {
            let units: Vec<u16> = text.encode_utf16().collect();
            unsafe { write_wide(diag_info as *mut u16, buffer_length, string_length, &units) }
        }
        None => SqlReturn::ERROR,
    }
}
