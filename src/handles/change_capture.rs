use super::{connection::Connection, diagnostics::DiagStack, header::HandleHeader, AnyHandle, HandleKind};
use std::ffi::c_void;
use std::sync::{Mutex, Weak};

#[derive(Clone, Copy)]
struct NativeHandle(*mut c_void);
unsafe impl Send for NativeHandle {}

/// A change-capture (XLA) subscription handle, opened against the direct driver's
/// capture entry points (section 4.5). At most one may exist per connection; the
/// enforcement lives on [`Connection::set_change_capture`].
#[repr(C)]
pub struct ChangeCapture {
    pub(crate) header: HandleHeader,
    pub(crate) connection: Weak<Connection>,
    native: NativeHandle,
    pub(crate) diagnostics: Mutex<DiagStack>,
}

unsafe impl AnyHandle for ChangeCapture {
    fn kind(&self) -> HandleKind {
        self.header.kind()
    }
}

unsafe impl Send for ChangeCapture {}
unsafe impl Sync for ChangeCapture {}

impl ChangeCapture {
    pub fn new(connection: Weak<Connection>, native: *mut c_void) -> Self {
        ChangeCapture {
            header: HandleHeader::new(HandleKind::ChangeCapture),
            connection,
            native: NativeHandle(native),
            diagnostics: Mutex::new(DiagStack::new()),
        }
    }

    pub fn native_handle(&self) -> *mut c_void {
        self.native.0
    }
}
