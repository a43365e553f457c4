//! TimesTen grid-routing vendor extensions (section 4.5 "Grid routing"): these calls
//! require a connected connection and dispatch straight through whichever function
//! table the statement's connection committed to, the same table every ordinary
//! statement-scoped ODBC call on it uses.

use crate::handles::{DiagStack, Encoding, Record, SqlResult, State, Statement};
use crate::loader::OdbcFn;
use crate::version::{native_error, OdbcVersion};
use odbc_sys::{Handle, SqlReturn};
use std::mem::transmute;
use std::sync::{Arc, Mutex};

type IsRoutableFn = unsafe extern "system" fn(Handle, *mut i16) -> SqlReturn;
type MapTablesFn = unsafe extern "system" fn(Handle) -> SqlReturn;
type RouteStatementFn = unsafe extern "system" fn(Handle) -> SqlReturn;

fn push(diagnostics: &Mutex<DiagStack>, record: Record) {
    diagnostics.lock().unwrap().push(record);
}

fn dm_error(state: State, native_error: i32, message: impl AsRef<str>) -> Record {
    Record::dm_authored(SqlReturn::ERROR, state, native_error, message, Encoding::Ansi)
}

fn resolve(statement: &Arc<Statement>, entry: OdbcFn) -> Option<(crate::loader::RawSymbol, Handle)> {
    let connection = statement.connection.upgrade()?;
    let table = connection.table()?;
    Some((table.odbc(entry), statement.native_handle()))
}

/// `ttGridIsRoutable`. Reports whether the statement's currently prepared text can
/// be routed by the grid rather than executed locally.
pub fn dispatch_grid_is_routable(statement: &Arc<Statement>) -> SqlResult<bool> {
    let Some((raw, native)) = resolve(statement, OdbcFn::TtGridIsRoutable) else {
        return SqlResult::Error;
    };
    let f: IsRoutableFn = unsafe { transmute(raw) };
    let mut routable: i16 = 0;
    let ret = unsafe { f(native, &mut routable) };
    match ret {
        SqlReturn::SUCCESS => SqlResult::Success(routable != 0),
        SqlReturn::SUCCESS_WITH_INFO => SqlResult::SuccessWithInfo(routable != 0),
        _ => {
            push(
                &statement.diagnostics,
                dm_error(
                    State::resource_error(OdbcVersion::current()),
                    native_error::INVALID_ARG,
                    "driver failed to evaluate grid routability",
                ),
            );
            SqlResult::Error
        }
    }
}

/// `ttGridMapTables`. Resolves the statement's referenced tables against the grid's
/// distribution map before routing.
pub fn dispatch_grid_map_tables(statement: &Arc<Statement>) -> SqlReturn {
    let Some((raw, native)) = resolve(statement, OdbcFn::TtGridMapTables) else {
        return SqlReturn::INVALID_HANDLE;
    };
    let f: MapTablesFn = unsafe { transmute(raw) };
    unsafe { f(native) }
}

/// `ttGridRouteStatement`. Routes the statement to the grid element owning its
/// mapped tables.
pub fn dispatch_grid_route_statement(statement: &Arc<Statement>) -> SqlReturn {
    let Some((raw, native)) = resolve(statement, OdbcFn::TtGridRouteStatement) else {
        return SqlReturn::INVALID_HANDLE;
    };
    let f: RouteStatementFn = unsafe { transmute(raw) };
    unsafe { f(native) }
}
