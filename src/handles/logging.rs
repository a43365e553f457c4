use super::diagnostics::DiagStack;
use log::{warn, Level};

/// Logs every record currently on `stack` at warn level. Mirrors the dispatch
/// shims' own diagnostic stack into the application's log, which is often the only
/// place a silently-dropped warning (`SuccessWithInfo`) is ever seen.
pub fn log_diagnostics(stack: &DiagStack) {
    if log::max_level() < Level::Warn {
        // Early return to avoid building every record just to discard it.
        return;
    }
    for record in stack.iter() {
        #[cfg(feature = "structured_logging")]
        warn!(state = record.state.as_str(), native_error = record.native_error; "{record}");
        #[cfg(not(feature = "structured_logging"))]
        warn!("{record}");
    }
}

/// Entry/exit tracing for dispatch shims, gated by the `trace_calls` feature (off by
/// default; section 7 on user-visible behavior).
#[cfg(feature = "trace_calls")]
pub fn trace_call(name: &str) {
    log::trace!("-> {name}");
}

#[cfg(feature = "trace_calls")]
pub fn trace_return(name: &str, ret: odbc_sys::SqlReturn) {
    log::trace!("<- {name} = {ret:?}");
}
