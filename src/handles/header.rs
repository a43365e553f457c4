//! The structure tag every DM handle carries as its literal first field (section 3
//! "Handle validation", testable property 1). `#[repr(C)]` on every handle struct
//! guarantees the tag sits at offset zero regardless of the concrete type behind an
//! opaque application-supplied pointer, so [`crate::abi::opaque`] can read it before
//! trusting the pointer enough to cast it to `Arc<T>`.

use super::HandleKind;
use std::sync::atomic::{AtomicU32, Ordering};

/// Arbitrary sentinel distinguishing a live DM handle from arbitrary memory. Chosen
/// to be unlikely to occur by accident; it is not a security boundary, only a
/// defense against a stale or foreign pointer being dereferenced as a handle.
const TAG_MAGIC: u32 = 0x5454_444D;

/// Zero once a handle has been freed, so a pointer retained past `SQLFreeHandle` (or
/// the equivalent free shim) fails validation instead of dereferencing freed memory
/// a second time (section 3: "freeing zeros the tag so stale pointers are
/// rejected").
pub struct HandleHeader {
    tag: AtomicU32,
    kind: HandleKind,
}

impl HandleHeader {
    pub fn new(kind: HandleKind) -> Self {
        HandleHeader {
            tag: AtomicU32::new(TAG_MAGIC),
            kind,
        }
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn is_live(&self) -> bool {
        self.tag.load(Ordering::Acquire) == TAG_MAGIC
    }

    pub fn invalidate(&self) {
        self.tag.store(0, Ordering::Release);
    }
}
