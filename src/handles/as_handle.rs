use super::diagnostics::NativeDiagnostics;

/// A DM handle that may currently have a driver-native counterpart to report
/// diagnostics against. `None` means the handle has not yet committed to a driver
/// (section 4.2 "Alloc state") or, for the utility handle, never has one of its own.
pub trait AsHandle {
    fn native(&self) -> Option<NativeDiagnostics>;
}
