//! `EndTran`/`Transact` dispatched at environment scope: each loaded driver commits
//! or rolls back every connection it owns independently, and the two outcomes are
//! combined by severity (section 4.3 "end-transaction fan-out").
//!
//! A known bug in one generation of the direct driver pushes an `ERROR` return with
//! an empty diagnostic stack when there is nothing to commit; `workaround_empty_diag_bug`
//! folds that case back to `Success` rather than surfacing a diagnostic-less error
//! to the application (section 9, Design Notes Open Question i).

use crate::handles::{diagnostics::NativeDiagnostics, worse, Environment, SqlResult};
use crate::loader::{FunctionTable, OdbcFn};
use odbc_sys::{CompletionType, Handle, HandleType, SqlReturn};
use std::mem::transmute;
use std::sync::Arc;

type EndTranFn = unsafe extern "system" fn(HandleType, Handle, CompletionType) -> SqlReturn;

fn end_tran_on(table: &Arc<FunctionTable>, env_handle: Handle, completion: CompletionType) -> SqlResult<()> {
    let raw = table.odbc(OdbcFn::EndTran);
    if raw.is_null() {
        return SqlResult::Success(());
    }
    let f: EndTranFn = unsafe { transmute(raw) };
    let ret = unsafe { f(HandleType::Env, env_handle, completion) };
    match ret {
        SqlReturn::ERROR => {
            let diag = NativeDiagnostics {
                table: table.clone(),
                handle_type: HandleType::Env,
                handle: env_handle,
            };
            if diag.count() == 0 {
                // Workaround for the known direct-driver bug: an ERROR with nothing to
                // report means there was nothing to commit, not a real failure.
                SqlResult::Success(())
            } else {
                SqlResult::Error
            }
        }
        other => crate::handles::ExtSqlReturn::into_sql_result(other),
    }
}

/// Fans `EndTran`/`Transact` out to every driver the environment has loaded,
/// returning the most severe of the per-driver outcomes (section 4.3).
pub fn dispatch_end_tran(environment: &Arc<Environment>, completion: CompletionType) -> SqlResult<()> {
    let mut result = SqlResult::Success(());
    if let (Some(table), Some(handle)) = (environment.direct(), environment.direct_env_handle()) {
        result = worse(result, end_tran_on(table, handle, completion));
    }
    if let (Some(table), Some(handle)) = (environment.client(), environment.client_env_handle()) {
        result = worse(result, end_tran_on(table, handle, completion));
    }
    result
}
