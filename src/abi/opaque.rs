//! The only place a raw `Handle` crossing the ODBC ABI boundary is trusted enough to
//! become an `Arc<T>` (section 3 "Handle validation", testable property 1). Every
//! exported entry point in [`crate::abi`] goes through [`validated`] or [`take`]
//! before touching anything else about the handle it was given.

use crate::handles::{AnyHandle, HandleHeader, HandleKind};
use odbc_sys::Handle;
use std::sync::Arc;

/// Converts an owned handle object into the opaque pointer handed back to the
/// application. The `Arc`'s strong reference is leaked into the pointer; it is only
/// reclaimed by a matching [`take`].
pub fn into_handle<T: AnyHandle>(arc: Arc<T>) -> Handle {
    Arc::into_raw(arc) as *mut T as Handle
}

/// Reads the handle's tag and kind without disturbing its lifetime, rejecting a
/// null pointer, a zeroed (freed) tag, or a kind that does not match `expected`
/// before the pointer is cast to `T` at all. On success, borrows the application's
/// own reference (incrementing the strong count) rather than consuming it, mirroring
/// `Weak::upgrade`: every non-freeing shim uses this.
///
/// # Safety
///
/// `handle`, if non-null and tag-valid, must actually have been produced by
/// [`into_handle::<T>`] (or still be alive via a clone of that same `Arc<T>`) for
/// the kind it claims: validation checks the tag and the declared kind, not the
/// concrete type, so calling this with the wrong `T` for a given `HandleKind` is
/// still unsound.
pub unsafe fn validated<T: AnyHandle>(handle: Handle, expected: HandleKind) -> Option<Arc<T>> {
    if handle.is_null() {
        return None;
    }
    let header = unsafe { &*(handle as *const HandleHeader) };
    if !header.is_live() || header.kind() != expected {
        return None;
    }
    unsafe {
        Arc::increment_strong_count(handle as *const T);
        Some(Arc::from_raw(handle as *const T))
    }
}

/// Invalidates the tag and reclaims the [`into_handle`] reference for a handle a
/// caller has already validated (via a live [`validated`] borrow) and confirmed may
/// be freed. Used by free shims whose dispatch function itself decides, while
/// looking at a borrowed `Arc`, whether the free may proceed (e.g. a "still has
/// dependents" rejection) — [`take`] cannot be used there since it would invalidate
/// the tag unconditionally, before that decision is known.
///
/// # Safety
///
/// `handle` must currently be a live, validated handle of kind `T` with no other use
/// of it (or of the `HandleHeader` read through it) outstanding afterward.
pub unsafe fn release<T: AnyHandle>(handle: Handle) {
    let header = unsafe { &*(handle as *const HandleHeader) };
    header.invalidate();
    drop(unsafe { Arc::from_raw(handle as *const T) });
}

/// Validates like [`validated`], then zeros the tag and reclaims the reference
/// `into_handle` originally leaked (section 3: "freeing zeros the tag"). Used
/// exactly once per handle, by whichever shim is the handle's free operation.
/// Dropping the returned `Arc` releases the driver manager's own ownership of the
/// handle object; any `Weak` references elsewhere simply stop upgrading.
///
/// # Safety
///
/// Same obligations as [`validated`].
pub unsafe fn take<T: AnyHandle>(handle: Handle, expected: HandleKind) -> Option<Arc<T>> {
    if handle.is_null() {
        return None;
    }
    let header = unsafe { &*(handle as *const HandleHeader) };
    if !header.is_live() || header.kind() != expected {
        return None;
    }
    header.invalidate();
    Some(unsafe { Arc::from_raw(handle as *const T) })
}
