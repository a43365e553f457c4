//! The presented API (section 6): every ODBC function the DM proxies, exported
//! under its standard name with the standard ODBC calling convention. Each function
//! here is a thin shim: validate the incoming handle via [`opaque`], resolve the
//! owning connection's in-use table, then either call a `crate::dispatch` function
//! for entry points with DM-specific behavior, or forward straight through to the
//! driver for the rest (section 4.3 "Dispatch shims").

pub(crate) mod opaque;

mod connect;
mod diag;
mod handle;
mod passthrough;
mod selfserved;
mod text;
mod transact;
