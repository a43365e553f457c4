//! `SQLAllocHandle`/`SQLFreeHandle` (section 4.2): the only entry points that create
//! or destroy a DM handle object, and so the only ones that call [`opaque::into_handle`]
//! or reclaim a leaked reference.

use crate::abi::opaque;
use crate::dispatch::alloc as dispatch;
use crate::handles::{Connection, Descriptor, Encoding, Environment, HandleKind, SqlResult, Statement};
use odbc_sys::{Handle, HandleType, SqlReturn};
use std::ptr::null_mut;

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLAllocHandle(
    handle_type: HandleType,
    input_handle: Handle,
    output_handle: *mut Handle,
) -> SqlReturn {
    if output_handle.is_null() {
        return SqlReturn::ERROR;
    }
    unsafe {
        *output_handle = null_mut();
    }
    match handle_type {
        HandleType::Env => match dispatch::dispatch_alloc_environment() {
            SqlResult::Success(environment) => {
                unsafe {
                    *output_handle = opaque::into_handle(environment);
                }
                SqlReturn::SUCCESS
            }
            _ => SqlReturn::ERROR,
        },
        HandleType::Dbc => {
            let Some(environment) =
                (unsafe { opaque::validated::<Environment>(input_handle, HandleKind::Environment) })
            else {
                return SqlReturn::INVALID_HANDLE;
            };
            match dispatch::dispatch_alloc_connection(&environment, Encoding::Ansi) {
                SqlResult::Success(connection) => {
                    unsafe {
                        *output_handle = opaque::into_handle(connection);
                    }
                    SqlReturn::SUCCESS
                }
                _ => SqlReturn::ERROR,
            }
        }
        HandleType::Stmt => {
            let Some(connection) =
                (unsafe { opaque::validated::<Connection>(input_handle, HandleKind::Connection) })
            else {
                return SqlReturn::INVALID_HANDLE;
            };
            match dispatch::dispatch_alloc_statement(&connection) {
                SqlResult::Success(statement) => {
                    unsafe {
                        *output_handle = opaque::into_handle(statement);
                    }
                    SqlReturn::SUCCESS
                }
                _ => SqlReturn::ERROR,
            }
        }
        HandleType::Desc => {
            let Some(connection) =
                (unsafe { opaque::validated::<Connection>(input_handle, HandleKind::Connection) })
            else {
                return SqlReturn::INVALID_HANDLE;
            };
            match dispatch::dispatch_alloc_descriptor(&connection) {
                SqlResult::Success(descriptor) => {
                    unsafe {
                        *output_handle = opaque::into_handle(descriptor);
                    }
                    SqlReturn::SUCCESS
                }
                _ => SqlReturn::ERROR,
            }
        }
        _ => SqlReturn::ERROR,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLFreeHandle(handle_type: HandleType, handle: Handle) -> SqlReturn {
    match handle_type {
        HandleType::Env => {
            let Some(environment) =
                (unsafe { opaque::validated::<Environment>(handle, HandleKind::Environment) })
            else {
                return SqlReturn::INVALID_HANDLE;
            };
            let ret = dispatch::dispatch_free_environment(&environment);
            drop(environment);
            if ret == SqlReturn::SUCCESS {
                unsafe { opaque::release::<Environment>(handle) };
            }
            ret
        }
        HandleType::Dbc => {
            let Some(connection) =
                (unsafe { opaque::validated::<Connection>(handle, HandleKind::Connection) })
            else {
                return SqlReturn::INVALID_HANDLE;
            };
            let ret = dispatch::dispatch_free_connection(&connection);
            drop(connection);
            if ret == SqlReturn::SUCCESS {
                unsafe { opaque::release::<Connection>(handle) };
            }
            ret
        }
        HandleType::Stmt => {
            let Some(statement) =
                (unsafe { opaque::validated::<Statement>(handle, HandleKind::Statement) })
            else {
                return SqlReturn::INVALID_HANDLE;
            };
            let ret = dispatch::dispatch_free_statement(&statement);
            drop(statement);
            if ret == SqlReturn::SUCCESS {
                unsafe { opaque::release::<Statement>(handle) };
            }
            ret
        }
        HandleType::Desc => {
            let Some(descriptor) =
                (unsafe { opaque::validated::<Descriptor>(handle, HandleKind::Descriptor) })
            else {
                return SqlReturn::INVALID_HANDLE;
            };
            let ret = dispatch::dispatch_free_descriptor(&descriptor);
            drop(descriptor);
            if ret == SqlReturn::SUCCESS {
                unsafe { opaque::release::<Descriptor>(handle) };
            }
            ret
        }
        _ => SqlReturn::ERROR,
    }
}
