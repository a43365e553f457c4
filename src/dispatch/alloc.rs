//! Generic handle allocation and freeing (section 4.2): every handle but the
//! environment and the utility sentinel is allocated against a parent that must
//! already be alive and, for statements and descriptors, a connection that must
//! already be `Connected`. Freeing refuses to proceed while a handle still has live
//! dependents, matching the "free children before parent" rule the ODBC API itself
//! enforces (section 4.2 "dependents").
//!
//! Every function here is handed an already tag/kind-validated handle — that check
//! is [`crate::abi::opaque`]'s job, run by the exported `SQLAllocHandle`/
//! `SQLFreeHandle` shims before a dispatch function is ever called (section 3
//! "Handle validation"). What belongs here is everything downstream: a DM-authored
//! failure is pushed onto the relevant handle's own `DiagStack` and reported as an
//! `SqlResult`/`SqlReturn`, never thrown as a Rust `Err` (section 7 "Propagation
//! policy") — a dispatch shim never throws across the ABI boundary.

use crate::handles::{
    Connection, ConnectionState, DiagStack, Descriptor, DescriptorOrigin, Encoding, Environment,
    Record, SqlResult, Statement, State,
};
use crate::loader::{FunctionTable, OdbcFn};
use crate::version::{native_error, OdbcVersion};
use odbc_sys::{Handle, HandleType, SqlReturn};
use std::mem::transmute;
use std::ptr::null_mut;
use std::sync::{Arc, Mutex};

type AllocHandleFn = unsafe extern "system" fn(HandleType, Handle, *mut Handle) -> SqlReturn;
type FreeHandleFn = unsafe extern "system" fn(HandleType, Handle) -> SqlReturn;

fn alloc_native(table: &FunctionTable, kind: HandleType, parent: Handle) -> Option<Handle> {
    let raw = table.odbc(OdbcFn::AllocHandle);
    let f: AllocHandleFn = unsafe { transmute(raw) };
    let mut handle = null_mut();
    let ret = unsafe { f(kind, parent, &mut handle) };
    matches!(ret, SqlReturn::SUCCESS | SqlReturn::SUCCESS_WITH_INFO).then_some(handle)
}

fn free_native(table: &FunctionTable, kind: HandleType, handle: Handle) {
    let raw = table.odbc(OdbcFn::FreeHandle);
    let f: FreeHandleFn = unsafe { transmute(raw) };
    unsafe {
        f(kind, handle);
    }
}

/// Builds a DM-authored diagnostic. Always pushed in ANSI: [`Record::to_encoding`]
/// re-derives the application's requested encoding at retrieval time regardless of
/// which one a record was pushed in (section 8 property 8).
fn dm_error(state: State, native_error: i32, message: impl AsRef<str>) -> Record {
    Record::dm_authored(SqlReturn::ERROR, state, native_error, message, Encoding::Ansi)
}

fn push(diagnostics: &Mutex<DiagStack>, record: Record) {
    diagnostics.lock().unwrap().push(record);
}

/// `SQLAllocHandle(SQL_HANDLE_ENV, SQL_NULL_HANDLE)`. No DM handle exists yet to
/// push a diagnostic onto on failure; section 7's push-never-throw policy only
/// applies once a handle is in scope.
pub fn dispatch_alloc_environment() -> SqlResult<Arc<Environment>> {
    match crate::registry::alloc_environment() {
        Ok(environment) => SqlResult::Success(environment),
        Err(_) => SqlResult::Error,
    }
}

/// `SQLFreeHandle(SQL_HANDLE_ENV, ...)`. Refuses while any connection allocated
/// against this environment is still alive (section 4.2 "dependents").
pub fn dispatch_free_environment(environment: &Arc<Environment>) -> SqlReturn {
    if environment.has_live_connections() {
        push(
            &environment.diagnostics,
            dm_error(
                State::sequence_error(OdbcVersion::current()),
                native_error::NOT_DISCONNECTED,
                "environment still has live connections",
            ),
        );
        return SqlReturn::ERROR;
    }
    crate::registry::free_environment(environment);
    SqlReturn::SUCCESS
}

/// `SQLAllocHandle(SQL_HANDLE_DBC, ...)`. Always succeeds against a live
/// environment: no driver is contacted until `Connect`/`DriverConnect` (section
/// 4.2 "Connection").
pub fn dispatch_alloc_connection(
    environment: &Arc<Environment>,
    encoding: Encoding,
) -> SqlResult<Arc<Connection>> {
    let connection = Arc::new(Connection::new(Arc::downgrade(environment), encoding));
    environment.register_connection(&connection);
    SqlResult::Success(connection)
}

/// `SQLFreeHandle(SQL_HANDLE_DBC, ...)`. Refuses while any statement or explicit
/// descriptor allocated against this connection is still alive.
pub fn dispatch_free_connection(connection: &Arc<Connection>) -> SqlReturn {
    if connection.has_live_children() {
        push(
            &connection.diagnostics,
            dm_error(
                State::sequence_error(OdbcVersion::current()),
                native_error::NOT_DISCONNECTED,
                "connection still has live statements or descriptors",
            ),
        );
        return SqlReturn::ERROR;
    }
    if let (Some(table), Some(native)) = (connection.table(), connection.native_handle()) {
        free_native(&table, HandleType::Dbc, native);
    }
    SqlReturn::SUCCESS
}

/// `SQLAllocHandle(SQL_HANDLE_STMT, ...)`. Requires `connection` to already be
/// `Connected` (section 4.2 "dependents" — a statement cannot outlive the driver
/// choice its connection has not yet made). Allocates the statement's two implicit
/// descriptors alongside it, matching the ODBC API's own contract.
pub fn dispatch_alloc_statement(connection: &Arc<Connection>) -> SqlResult<Arc<Statement>> {
    if connection.state() != ConnectionState::Connected {
        push(
            &connection.diagnostics,
            dm_error(
                State::sequence_error(OdbcVersion::current()),
                native_error::NOT_DISCONNECTED,
                "connection must be connected before allocating a statement",
            ),
        );
        return SqlResult::Error;
    }
    let table = connection.table().expect("Connected implies a committed table");
    let dbc = connection.native_handle().expect("Connected implies a native handle");

    let Some(native) = alloc_native(&table, HandleType::Stmt, dbc) else {
        push(
            &connection.diagnostics,
            dm_error(
                State::resource_error(OdbcVersion::current()),
                native_error::NO_MEMORY,
                "driver failed to allocate a statement handle",
            ),
        );
        return SqlResult::Error;
    };

    let statement = Arc::new(Statement::new(Arc::downgrade(connection), native));
    connection.register_statement(&statement);

    if let (Some(param_native), Some(row_native)) = (
        alloc_native(&table, HandleType::Desc, dbc),
        alloc_native(&table, HandleType::Desc, dbc),
    ) {
        let weak_connection = Arc::downgrade(connection);
        let param = Arc::new(Descriptor::new(weak_connection.clone(), param_native, DescriptorOrigin::Implicit));
        let row = Arc::new(Descriptor::new(weak_connection, row_native, DescriptorOrigin::Implicit));
        connection.register_descriptor(&param);
        connection.register_descriptor(&row);
        statement.set_implicit_descriptors(param, row);
    }

    SqlResult::Success(statement)
}

/// `SQLFreeHandle(SQL_HANDLE_STMT, ...)`. Frees the statement's own two implicit
/// descriptors first; they are never reachable through [`dispatch_free_descriptor`]
/// (section 3/4.2 "implicit descriptors are not explicitly freeable").
pub fn dispatch_free_statement(statement: &Arc<Statement>) -> SqlReturn {
    let Some(connection) = statement.connection.upgrade() else {
        return SqlReturn::INVALID_HANDLE;
    };
    let Some(table) = connection.table() else {
        return SqlReturn::INVALID_HANDLE;
    };
    if let Some(desc) = statement.implicit_param_descriptor() {
        free_native(&table, HandleType::Desc, desc.native_handle());
    }
    if let Some(desc) = statement.implicit_row_descriptor() {
        free_native(&table, HandleType::Desc, desc.native_handle());
    }
    free_native(&table, HandleType::Stmt, statement.native_handle());
    SqlReturn::SUCCESS
}

/// `SQLAllocHandle(SQL_HANDLE_DESC, ...)` against a connection directly: always
/// explicit (section 4.2 "Descriptor").
pub fn dispatch_alloc_descriptor(connection: &Arc<Connection>) -> SqlResult<Arc<Descriptor>> {
    if connection.state() != ConnectionState::Connected {
        push(
            &connection.diagnostics,
            dm_error(
                State::sequence_error(OdbcVersion::current()),
                native_error::NOT_DISCONNECTED,
                "connection must be connected before allocating a descriptor",
            ),
        );
        return SqlResult::Error;
    }
    let table = connection.table().expect("Connected implies a committed table");
    let dbc = connection.native_handle().expect("Connected implies a native handle");

    let Some(native) = alloc_native(&table, HandleType::Desc, dbc) else {
        push(
            &connection.diagnostics,
            dm_error(
                State::resource_error(OdbcVersion::current()),
                native_error::NO_MEMORY,
                "driver failed to allocate a descriptor handle",
            ),
        );
        return SqlResult::Error;
    };

    let descriptor = Arc::new(Descriptor::new(Arc::downgrade(connection), native, DescriptorOrigin::Explicit));
    connection.register_descriptor(&descriptor);
    SqlResult::Success(descriptor)
}

/// `SQLFreeHandle(SQL_HANDLE_DESC, ...)`. Rejects an implicit descriptor outright:
/// freeing it here would race [`dispatch_free_statement`]'s own implicit-descriptor
/// cleanup and double-free the driver-native handle (section 3/4.2 "implicit
/// descriptors are not explicitly freeable").
pub fn dispatch_free_descriptor(descriptor: &Arc<Descriptor>) -> SqlReturn {
    if descriptor.origin == DescriptorOrigin::Implicit {
        push(
            &descriptor.diagnostics,
            dm_error(
                State::invalid_descriptor_use(OdbcVersion::current()),
                native_error::INVALID_ARG,
                "cannot explicitly free an automatically allocated descriptor",
            ),
        );
        return SqlReturn::ERROR;
    }
    let Some(connection) = descriptor.connection.upgrade() else {
        return SqlReturn::INVALID_HANDLE;
    };
    let Some(table) = connection.table() else {
        return SqlReturn::INVALID_HANDLE;
    };
    free_native(&table, HandleType::Desc, descriptor.native_handle());
    SqlReturn::SUCCESS
}
