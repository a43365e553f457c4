use super::HandleKind;

/// Implemented by every DM handle type. `kind` identifies what the handle claims to
/// be; it backs the tag check the allocation layer runs before trusting a raw
/// application-supplied pointer enough to cast and dereference it (section 3
/// "Handle validation"). Object-safe, so the allocation/free dispatch shims can work
/// generically over "some handle" without knowing which kind up front.
///
/// # Safety
///
/// `kind` must match the concrete type being handed back to the application: a
/// caller that gets `HandleKind::Connection` from this trait is relying on being
/// able to downcast to `Connection` without further checks.
pub unsafe trait AnyHandle: Send + Sync {
    fn kind(&self) -> HandleKind;
}
