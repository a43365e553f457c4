//! The change-capture (XLA) entry point list. Carried by the direct driver library
//! alongside the ODBC list, see section 4.1 and section 4.5.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CaptureFn {
    Open,
    PersistentOpen,
    Close,
    Unregister,
    NextUpdate,
    NextUpdateWait,
    Acknowledge,
    Status,
    TableStatus,
    TableByName,
    ColumnByName,
    ColumnType,
    NewUpdateDesc,
    DeleteUpdateDesc,
    GenerateSql,
}

impl CaptureFn {
    pub const ALL: &'static [CaptureFn] = &[
        CaptureFn::Open,
        CaptureFn::PersistentOpen,
        CaptureFn::Close,
        CaptureFn::Unregister,
        CaptureFn::NextUpdate,
        CaptureFn::NextUpdateWait,
        CaptureFn::Acknowledge,
        CaptureFn::Status,
        CaptureFn::TableStatus,
        CaptureFn::TableByName,
        CaptureFn::ColumnByName,
        CaptureFn::ColumnType,
        CaptureFn::NewUpdateDesc,
        CaptureFn::DeleteUpdateDesc,
        CaptureFn::GenerateSql,
    ];

    pub fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).expect("CaptureFn::ALL is exhaustive")
    }

    pub fn symbol_name(self) -> &'static str {
        match self {
            CaptureFn::Open => "ttXlaOpen",
            CaptureFn::PersistentOpen => "ttXlaPersistentOpen",
            CaptureFn::Close => "ttXlaClose",
            CaptureFn::Unregister => "ttXlaUnregister",
            CaptureFn::NextUpdate => "ttXlaNextUpdate",
            CaptureFn::NextUpdateWait => "ttXlaNextUpdateWait",
            CaptureFn::Acknowledge => "ttXlaAcknowledge",
            CaptureFn::Status => "ttXlaStatus",
            CaptureFn::TableStatus => "ttXlaTableStatus",
            CaptureFn::TableByName => "ttXlaTableByName",
            CaptureFn::ColumnByName => "ttXlaColumnByName",
            CaptureFn::ColumnType => "ttXlaColumnType",
            CaptureFn::NewUpdateDesc => "ttXlaNewUpdateDesc",
            CaptureFn::DeleteUpdateDesc => "ttXlaDeleteUpdateDesc",
            CaptureFn::GenerateSql => "ttXlaGenerateSQL",
        }
    }
}

pub const CAPTURE_FN_COUNT: usize = CaptureFn::ALL.len();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_unique_and_dense() {
        let mut seen: Vec<usize> = CaptureFn::ALL.iter().map(|f| f.position()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..CAPTURE_FN_COUNT).collect::<Vec<_>>());
    }
}
