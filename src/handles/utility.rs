use super::{diagnostics::DiagStack, header::HandleHeader, AnyHandle, AsHandle, HandleKind};
use crate::loader::FunctionTable;
use odbc_sys::Handle;
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy)]
struct NativeHandle(Handle);
unsafe impl Send for NativeHandle {}

/// A utility handle, allocated against the hidden sentinel direct-mode environment
/// the registry creates on first use and tears down on last free (section 4.5,
/// Design Notes Open Question ii). Only `Open`/`Close`/`Status` are ever dispatched
/// through it; the remaining administrative entry points are resolved but unused,
/// see [`crate::loader::UtilityFn::is_reserved`].
#[repr(C)]
pub struct UtilityHandle {
    pub(crate) header: HandleHeader,
    pub(crate) table: Arc<FunctionTable>,
    native: Mutex<Option<NativeHandle>>,
    pub(crate) diagnostics: Mutex<DiagStack>,
}

unsafe impl AnyHandle for UtilityHandle {
    fn kind(&self) -> HandleKind {
        self.header.kind()
    }
}

unsafe impl Send for UtilityHandle {}
unsafe impl Sync for UtilityHandle {}

impl AsHandle for UtilityHandle {
    fn native(&self) -> Option<super::diagnostics::NativeDiagnostics> {
        // Utility entry points are not addressed through the ODBC handle-type enum;
        // a utility handle has no `GetDiagRec`-retrievable native counterpart.
        None
    }
}

impl UtilityHandle {
    pub fn new(table: Arc<FunctionTable>) -> Self {
        UtilityHandle {
            header: HandleHeader::new(HandleKind::Utility),
            table,
            native: Mutex::new(None),
            diagnostics: Mutex::new(DiagStack::new()),
        }
    }

    pub fn table(&self) -> &Arc<FunctionTable> {
        &self.table
    }

    pub fn native_handle(&self) -> Option<Handle> {
        self.native.lock().unwrap().map(|h| h.0)
    }

    pub fn set_native_handle(&self, handle: Handle) {
        *self.native.lock().unwrap() = Some(NativeHandle(handle));
    }
}
