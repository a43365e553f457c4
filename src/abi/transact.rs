//! `SQLEndTran`/`SQLTransact`, environment-scoped fan-out (section 4.3).

use crate::abi::opaque;
use crate::dispatch::transact as dispatch;
use crate::handles::{Environment, HandleKind};
use odbc_sys::{CompletionType, Handle, HandleType, SqlReturn};

fn end_tran(handle_type: HandleType, handle: Handle, completion: CompletionType) -> SqlReturn {
    if handle_type != HandleType::Env {
        // Only environment-scoped fan-out is implemented (section 4.3); a
        // connection-scoped end-transaction is a single driver call with no DM-level
        // behavior to add, which this DM does not yet expose as a separate path.
        return SqlReturn::ERROR;
    }
    let Some(environment) = (unsafe { opaque::validated::<Environment>(handle, HandleKind::Environment) }) else {
        return SqlReturn::INVALID_HANDLE;
    };
    dispatch::dispatch_end_tran(&environment, completion).to_sql_return()
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLEndTran(
    handle_type: HandleType,
    handle: Handle,
    completion_type: CompletionType,
) -> SqlReturn {
    end_tran(handle_type, handle, completion_type)
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLTransact(
    environment_handle: Handle,
    _connection_handle: Handle,
    completion_type: CompletionType,
) -> SqlReturn {
    end_tran(HandleType::Env, environment_handle, completion_type)
}
