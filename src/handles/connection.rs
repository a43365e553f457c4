use super::{
    change_capture::ChangeCapture,
    descriptor::Descriptor,
    diagnostics::{DiagStack, Encoding, NativeDiagnostics, Text},
    environment::Environment,
    header::HandleHeader,
    statement::Statement,
    AnyHandle, AsHandle, HandleKind,
};
use crate::loader::FunctionTable;
use crate::version::ConnectionType;
use odbc_sys::{Handle, HandleType};
use std::sync::{Arc, Mutex, Weak};

/// A connection's lifecycle, replacing the sentinel-null checks a single-driver
/// wrapper would use with an explicit sum type (Design Notes section 9): a
/// connection is either freshly allocated and undecided, or has committed to
/// exactly one driver (section 4.2 "Connection").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Allocated, not yet connected. Neither driver has been contacted.
    Alloc,
    /// Connected. Exactly one of direct/client was chosen; see
    /// [`Connection::table`]/[`Connection::native_handle`].
    Connected,
}

#[derive(Clone, Copy)]
struct NativeHandle(Handle);
unsafe impl Send for NativeHandle {}

/// A connection handle. Before `Connect`/`DriverConnect` succeeds it carries no
/// driver-native handle at all; the connect dispatch shim (section 4.3) is the only
/// place that allocates one, tries it, and either commits it here or frees it and
/// tries the other driver.
#[repr(C)]
pub struct Connection {
    pub(crate) header: HandleHeader,
    pub(crate) environment: Weak<Environment>,
    state: Mutex<ConnectionState>,
    table: Mutex<Option<Arc<FunctionTable>>>,
    native: Mutex<Option<NativeHandle>>,
    connection_type: Mutex<ConnectionType>,
    connection_name: Mutex<Text>,
    server_name: Mutex<Text>,
    pub(crate) diagnostics: Mutex<DiagStack>,
    statements: Mutex<Vec<Weak<Statement>>>,
    descriptors: Mutex<Vec<Weak<Descriptor>>>,
    change_capture: Mutex<Option<Arc<ChangeCapture>>>,
}

unsafe impl AnyHandle for Connection {
    fn kind(&self) -> HandleKind {
        self.header.kind()
    }
}

unsafe impl Send for Connection {}
unsafe impl Sync for Connection {}

impl AsHandle for Connection {
    fn native(&self) -> Option<NativeDiagnostics> {
        let table = self.table.lock().unwrap().clone()?;
        let handle = self.native.lock().unwrap().as_ref()?.0;
        Some(NativeDiagnostics {
            table,
            handle_type: HandleType::Dbc,
            handle,
        })
    }
}

impl Connection {
    pub fn new(environment: Weak<Environment>, encoding: Encoding) -> Self {
        let empty = || match encoding {
            Encoding::Ansi => Text::ansi(""),
            Encoding::Utf16 => Text::utf16(""),
        };
        Connection {
            header: HandleHeader::new(HandleKind::Connection),
            environment,
            state: Mutex::new(ConnectionState::Alloc),
            table: Mutex::new(None),
            native: Mutex::new(None),
            connection_type: Mutex::new(ConnectionType::None),
            connection_name: Mutex::new(empty()),
            server_name: Mutex::new(empty()),
            diagnostics: Mutex::new(DiagStack::new()),
            statements: Mutex::new(Vec::new()),
            descriptors: Mutex::new(Vec::new()),
            change_capture: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap()
    }

    pub fn connection_type(&self) -> ConnectionType {
        *self.connection_type.lock().unwrap()
    }

    /// Commits this connection to `table`/`native`, recording which kind of driver
    /// won the connect decision rule (section 4.3). Called exactly once, by
    /// whichever attempt succeeds.
    pub fn commit(
        &self,
        table: Arc<FunctionTable>,
        native: Handle,
        connection_type: ConnectionType,
        connection_name: Text,
        server_name: Text,
    ) {
        *self.table.lock().unwrap() = Some(table);
        *self.native.lock().unwrap() = Some(NativeHandle(native));
        *self.connection_type.lock().unwrap() = connection_type;
        *self.connection_name.lock().unwrap() = connection_name;
        *self.server_name.lock().unwrap() = server_name;
        *self.state.lock().unwrap() = ConnectionState::Connected;
    }

    pub fn table(&self) -> Option<Arc<FunctionTable>> {
        self.table.lock().unwrap().clone()
    }

    pub fn native_handle(&self) -> Option<Handle> {
        self.native.lock().unwrap().as_ref().map(|h| h.0)
    }

    pub fn connection_name(&self) -> Text {
        self.connection_name.lock().unwrap().clone()
    }

    pub fn server_name(&self) -> Text {
        self.server_name.lock().unwrap().clone()
    }

    pub fn register_statement(&self, statement: &Arc<Statement>) {
        self.statements.lock().unwrap().push(Arc::downgrade(statement));
    }

    pub fn register_descriptor(&self, descriptor: &Arc<Descriptor>) {
        self.descriptors.lock().unwrap().push(Arc::downgrade(descriptor));
    }

    /// `true` if any statement or explicit descriptor allocated against this
    /// connection is still alive. Consulted before allowing `Disconnect`
    /// (section 4.2 "dependents").
    pub fn has_live_children(&self) -> bool {
        let mut statements = self.statements.lock().unwrap();
        statements.retain(|s| s.strong_count() > 0);
        let mut descriptors = self.descriptors.lock().unwrap();
        descriptors.retain(|d| d.strong_count() > 0);
        !statements.is_empty() || !descriptors.is_empty()
    }

    pub fn change_capture(&self) -> Option<Arc<ChangeCapture>> {
        self.change_capture.lock().unwrap().clone()
    }

    /// Installs the change-capture handle for this connection. Fails the "at most
    /// one per connection" invariant if one is already registered (section 4.5).
    pub fn set_change_capture(&self, handle: Arc<ChangeCapture>) -> Result<(), ()> {
        let mut slot = self.change_capture.lock().unwrap();
        if slot.is_some() {
            return Err(());
        }
        *slot = Some(handle);
        Ok(())
    }

    pub fn clear_change_capture(&self) {
        *self.change_capture.lock().unwrap() = None;
    }

    /// Reverts to `Alloc` after a successful `Disconnect`, clearing the committed
    /// table/native handle/driver choice so a later `Connect`/`DriverConnect` may
    /// commit to either driver again.
    pub fn reset(&self) {
        *self.table.lock().unwrap() = None;
        *self.native.lock().unwrap() = None;
        *self.connection_type.lock().unwrap() = ConnectionType::None;
        *self.state.lock().unwrap() = ConnectionState::Alloc;
    }
}
