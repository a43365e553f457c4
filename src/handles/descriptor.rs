use super::{
    connection::Connection,
    diagnostics::{DiagStack, NativeDiagnostics},
    header::HandleHeader,
    AnyHandle, AsHandle, HandleKind,
};
use odbc_sys::{Handle, HandleType};
use std::sync::{Mutex, Weak};

#[derive(Clone, Copy)]
struct NativeHandle(Handle);
unsafe impl Send for NativeHandle {}

/// Whether a descriptor was allocated implicitly alongside its owning statement, or
/// explicitly by the application via `AllocHandle(SQL_HANDLE_DESC, ...)` against a
/// connection (section 4.2 "Descriptor").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorOrigin {
    Implicit,
    Explicit,
}

/// A descriptor handle. Always belongs to one connection; an implicit descriptor is
/// additionally associated with the one statement that allocated it, but the
/// association is tracked on [`super::statement::Statement`], not here, since an
/// explicit descriptor has no owning statement at all.
#[repr(C)]
pub struct Descriptor {
    pub(crate) header: HandleHeader,
    pub(crate) connection: Weak<Connection>,
    native: NativeHandle,
    pub(crate) origin: DescriptorOrigin,
    pub(crate) diagnostics: Mutex<DiagStack>,
}

unsafe impl AnyHandle for Descriptor {
    fn kind(&self) -> HandleKind {
        self.header.kind()
    }
}

unsafe impl Send for Descriptor {}
unsafe impl Sync for Descriptor {}

impl AsHandle for Descriptor {
    fn native(&self) -> Option<NativeDiagnostics> {
        let connection = self.connection.upgrade()?;
        let table = connection.table()?;
        Some(NativeDiagnostics {
            table,
            handle_type: HandleType::Desc,
            handle: self.native.0,
        })
    }
}

impl Descriptor {
    pub fn new(connection: Weak<Connection>, native: Handle, origin: DescriptorOrigin) -> Self {
        Descriptor {
            header: HandleHeader::new(HandleKind::Descriptor),
            connection,
            native: NativeHandle(native),
            origin,
            diagnostics: Mutex::new(DiagStack::new()),
        }
    }

    pub fn native_handle(&self) -> Handle {
        self.native.0
    }
}
