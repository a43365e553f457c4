//! The utility entry point list. Resolved from the utility library, see section 4.1 and
//! section 4.5. Several of these are reserved but unused: the underlying utility library's
//! headers list them but condition their bodies out for this platform/version
//! combination, see open question (ii) in section 9. ttdrvmgr still resolves the symbol (a
//! missing symbol fails the whole table, per section 4.1) but never calls through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum UtilityFn {
    Open,
    Close,
    Status,
    DataStoreStatus,
    TableSize,
    RamPolicy,
    RamGrow,
    CkptBlocking,
    CkptFuzzy,
    LogHolds,
    XactIdRollback,
    DataStoreBackup,
    DataStoreRestore,
    DestroyDataStore,
}

impl UtilityFn {
    pub const ALL: &'static [UtilityFn] = &[
        UtilityFn::Open,
        UtilityFn::Close,
        UtilityFn::Status,
        UtilityFn::DataStoreStatus,
        UtilityFn::TableSize,
        UtilityFn::RamPolicy,
        UtilityFn::RamGrow,
        UtilityFn::CkptBlocking,
        UtilityFn::CkptFuzzy,
        UtilityFn::LogHolds,
        UtilityFn::XactIdRollback,
        UtilityFn::DataStoreBackup,
        UtilityFn::DataStoreRestore,
        UtilityFn::DestroyDataStore,
    ];

    /// Entry points the dispatch layer actually exercises. The remainder are resolved
    /// (so a load with a missing symbol still fails per section 4.1) but reserved, see the
    /// module docs.
    pub fn is_reserved(self) -> bool {
        !matches!(self, UtilityFn::Open | UtilityFn::Close | UtilityFn::Status)
    }

    pub fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).expect("UtilityFn::ALL is exhaustive")
    }

    pub fn symbol_name(self) -> &'static str {
        match self {
            UtilityFn::Open => "ttUtilOpen",
            UtilityFn::Close => "ttUtilClose",
            UtilityFn::Status => "ttUtilStatus",
            UtilityFn::DataStoreStatus => "ttUtilDataStoreStatus",
            UtilityFn::TableSize => "ttUtilTableSize",
            UtilityFn::RamPolicy => "ttUtilRamPolicy",
            UtilityFn::RamGrow => "ttUtilRamGrow",
            UtilityFn::CkptBlocking => "ttUtilCkptBlocking",
            UtilityFn::CkptFuzzy => "ttUtilCkptFuzzy",
            UtilityFn::LogHolds => "ttUtilLogHolds",
            UtilityFn::XactIdRollback => "ttUtilXactIdRollback",
            UtilityFn::DataStoreBackup => "ttUtilDataStoreBackup",
            UtilityFn::DataStoreRestore => "ttUtilDataStoreRestore",
            UtilityFn::DestroyDataStore => "ttUtilDestroyDataStore",
        }
    }
}

pub const UTILITY_FN_COUNT: usize = UtilityFn::ALL.len();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_unique_and_dense() {
        let mut seen: Vec<usize> = UtilityFn::ALL.iter().map(|f| f.position()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..UTILITY_FN_COUNT).collect::<Vec<_>>());
    }
}
