//! Dynamic-loader layer, see section 4.1. Translates a library kind into a resolved
//! [`FunctionTable`] and back. Three well-known library names are probed at first use;
//! the DM honors no environment variables of its own (section 6).

pub mod capture_fns;
pub mod odbc_fns;
mod table;
pub mod utility_fns;

pub use capture_fns::CaptureFn;
pub use odbc_fns::OdbcFn;
pub use table::{FunctionTable, RawSymbol};
pub use utility_fns::UtilityFn;

/// Which of the three libraries a table was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// In-process data store access.
    Direct,
    /// Network client to a TimesTen server.
    Client,
    /// Administrative/utility operations, section 4.5.
    Utility,
}

impl Kind {
    /// The well-known shared-library name probed for this kind. The host operating
    /// system's shared-library search path determines resolution; ttdrvmgr does not
    /// consult any environment variable of its own (section 6).
    pub fn library_name(self) -> &'static str {
        #[cfg(target_os = "windows")]
        {
            match self {
                Kind::Direct => "ttdirect.dll",
                Kind::Client => "ttclient.dll",
                Kind::Utility => "ttutility.dll",
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            match self {
                Kind::Direct => "libttdirect.so",
                Kind::Client => "libttclient.so",
                Kind::Utility => "libttutility.so",
            }
        }
    }
}

/// Attempts to load the function table for `kind`. Load failure is reported, not
/// fatal: a caller unable to load one of the two application-facing drivers
/// (`Direct`/`Client`) proceeds with whichever did load, per section 4.1's failure
/// semantics.
pub fn load(kind: Kind) -> Result<FunctionTable, crate::error::DmError> {
    FunctionTable::load(kind, kind.library_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_names_are_distinct() {
        let names = [
            Kind::Direct.library_name(),
            Kind::Client.library_name(),
            Kind::Utility.library_name(),
        ];
        assert_eq!(names[0] == names[1], false);
        assert_eq!(names[0] == names[2], false);
        assert_eq!(names[1] == names[2], false);
    }
}
