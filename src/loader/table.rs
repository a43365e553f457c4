use super::{
    capture_fns::{CaptureFn, CAPTURE_FN_COUNT},
    odbc_fns::{OdbcFn, ODBC_FN_COUNT},
    utility_fns::{UtilityFn, UTILITY_FN_COUNT},
    Kind,
};
use crate::error::DmError;
use libloading::Library;
use std::ffi::c_void;

/// A function pointer resolved from a driver library, type-erased. Dispatch shims
/// transmute this to the correctly typed `unsafe extern "C" fn(...)` for the entry
/// point at hand; the table's only job is to keep it resolved and keep the owning
/// [`Library`] alive for as long as the pointer is used.
pub type RawSymbol = *const c_void;

/// A resolved, immutable table of driver entry points, see section 4.1. One table is
/// built per loaded library; environments and connections hold `Arc` references to
/// the tables they use so the library is never unloaded while a handle still needs it.
pub struct FunctionTable {
    kind: Kind,
    library_path: String,
    // Kept so the resolved symbols below remain valid. Never read directly after
    // `load` returns a table: section 4.1 says tables are immutable once built.
    _library: Library,
    odbc: Box<[RawSymbol; ODBC_FN_COUNT]>,
    capture: Option<Box<[RawSymbol; CAPTURE_FN_COUNT]>>,
    utility: Option<Box<[RawSymbol; UTILITY_FN_COUNT]>>,
}

impl std::fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTable")
            .field("kind", &self.kind)
            .field("library_path", &self.library_path)
            .field("has_capture", &self.capture.is_some())
            .field("has_utility", &self.utility.is_some())
            .finish_non_exhaustive()
    }
}

unsafe fn resolve(library: &Library, name: &str) -> Result<RawSymbol, DmError> {
    let mut owned = Vec::with_capacity(name.len() + 1);
    owned.extend_from_slice(name.as_bytes());
    owned.push(0);
    match unsafe { library.get::<unsafe extern "C" fn()>(&owned) } {
        Ok(symbol) => Ok(*symbol as RawSymbol),
        Err(_) => Err(DmError::LibraryLoad {
            library: name.to_owned(),
            reason: format!("missing required entry point '{name}'"),
        }),
    }
}

impl FunctionTable {
    /// Opens `path` and resolves every entry point required for `kind`. On any
    /// missing symbol the library is closed and a [`DmError::LibraryLoad`] is
    /// returned; section 4.1's "all or nothing" contract for a single table.
    pub fn load(kind: Kind, path: &str) -> Result<Self, DmError> {
        let library = unsafe { Library::new(path) }.map_err(|e| DmError::LibraryLoad {
            library: path.to_owned(),
            reason: e.to_string(),
        })?;

        let mut odbc: Box<[RawSymbol; ODBC_FN_COUNT]> = Box::new([std::ptr::null(); ODBC_FN_COUNT]);
        for entry in OdbcFn::ALL {
            odbc[entry.position()] = unsafe { resolve(&library, entry.symbol_name())? };
        }

        // The direct driver carries the change-capture list, see section 4.1.
        let capture = if kind == Kind::Direct {
            let mut table: Box<[RawSymbol; CAPTURE_FN_COUNT]> =
                Box::new([std::ptr::null(); CAPTURE_FN_COUNT]);
            for entry in CaptureFn::ALL {
                table[entry.position()] = unsafe { resolve(&library, entry.symbol_name())? };
            }
            Some(table)
        } else {
            None
        };

        let utility = if kind == Kind::Utility {
            let mut table: Box<[RawSymbol; UTILITY_FN_COUNT]> =
                Box::new([std::ptr::null(); UTILITY_FN_COUNT]);
            for entry in UtilityFn::ALL {
                table[entry.position()] = unsafe { resolve(&library, entry.symbol_name())? };
            }
            Some(table)
        } else {
            None
        };

        Ok(FunctionTable {
            kind,
            library_path: path.to_owned(),
            _library: library,
            odbc,
            capture,
            utility,
        })
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn library_path(&self) -> &str {
        &self.library_path
    }

    /// Raw pointer to the resolved ODBC entry point. Callers transmute to the
    /// signature appropriate for `entry` before invoking it.
    pub fn odbc(&self, entry: OdbcFn) -> RawSymbol {
        self.odbc[entry.position()]
    }

    pub fn capture(&self, entry: CaptureFn) -> Option<RawSymbol> {
        self.capture.as_ref().map(|table| table[entry.position()])
    }

    pub fn has_capture(&self) -> bool {
        self.capture.is_some()
    }

    pub fn utility(&self, entry: UtilityFn) -> Option<RawSymbol> {
        self.utility.as_ref().map(|table| table[entry.position()])
    }

    pub fn has_utility(&self) -> bool {
        self.utility.is_some()
    }
}

// Driver calls never race on the table itself: it is immutable after `load`. The
// `Library` handle is `Send + Sync` on every platform `libloading` supports function
// pointer resolution on.
unsafe impl Send for FunctionTable {}
unsafe impl Sync for FunctionTable {}
