use super::{
    connection::Connection,
    descriptor::Descriptor,
    diagnostics::{DiagStack, NativeDiagnostics},
    header::HandleHeader,
    AnyHandle, AsHandle, HandleKind,
};
use odbc_sys::{Handle, HandleType};
use std::sync::{Arc, Mutex, Weak};

#[derive(Clone, Copy)]
struct NativeHandle(Handle);
unsafe impl Send for NativeHandle {}

/// A statement handle. Belongs to exactly one connection, from whose committed
/// function table every dispatch shim for this statement resolves its entry point
/// (section 4.2 "Statement"). Carries the two implicit descriptors (parameter and
/// row) the driver allocates alongside the statement itself.
#[repr(C)]
pub struct Statement {
    pub(crate) header: HandleHeader,
    pub(crate) connection: Weak<Connection>,
    native: NativeHandle,
    pub(crate) diagnostics: Mutex<DiagStack>,
    implicit_param_desc: Mutex<Option<Arc<Descriptor>>>,
    implicit_row_desc: Mutex<Option<Arc<Descriptor>>>,
}

unsafe impl AnyHandle for Statement {
    fn kind(&self) -> HandleKind {
        self.header.kind()
    }
}

unsafe impl Send for Statement {}
unsafe impl Sync for Statement {}

impl AsHandle for Statement {
    fn native(&self) -> Option<NativeDiagnostics> {
        let connection = self.connection.upgrade()?;
        let table = connection.table()?;
        Some(NativeDiagnostics {
            table,
            handle_type: HandleType::Stmt,
            handle: self.native.0,
        })
    }
}

impl Statement {
    pub fn new(connection: Weak<Connection>, native: Handle) -> Self {
        Statement {
            header: HandleHeader::new(HandleKind::Statement),
            connection,
            native: NativeHandle(native),
            diagnostics: Mutex::new(DiagStack::new()),
            implicit_param_desc: Mutex::new(None),
            implicit_row_desc: Mutex::new(None),
        }
    }

    pub fn native_handle(&self) -> Handle {
        self.native.0
    }

    pub fn set_implicit_descriptors(&self, param: Arc<Descriptor>, row: Arc<Descriptor>) {
        *self.implicit_param_desc.lock().unwrap() = Some(param);
        *self.implicit_row_desc.lock().unwrap() = Some(row);
    }

    pub fn implicit_param_descriptor(&self) -> Option<Arc<Descriptor>> {
        self.implicit_param_desc.lock().unwrap().clone()
    }

    pub fn implicit_row_descriptor(&self) -> Option<Arc<Descriptor>> {
        self.implicit_row_desc.lock().unwrap().clone()
    }
}
