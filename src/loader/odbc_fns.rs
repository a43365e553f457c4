//! The ordered list of standard (plus a handful of TimesTen grid-routing) ODBC entry
//! points resolved from a driver library. Position in [`OdbcFn::ALL`] is the contract
//! between this module and the dispatch layer: a shim addresses its entry by
//! [`OdbcFn::position`], never by name, so the two must stay in lockstep.

/// One resolvable ODBC (or TimesTen grid-routing) entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum OdbcFn {
    AllocHandle,
    FreeHandle,
    ConnectW,
    Connect,
    DriverConnectW,
    DriverConnect,
    BrowseConnectW,
    BrowseConnect,
    Disconnect,
    ExecDirectW,
    ExecDirect,
    PrepareW,
    Prepare,
    Execute,
    Fetch,
    FetchScroll,
    BindCol,
    BindParameter,
    GetData,
    NumResultCols,
    DescribeColW,
    DescribeCol,
    ColAttributeW,
    ColAttribute,
    RowCount,
    GetDiagRecW,
    GetDiagRec,
    GetDiagFieldW,
    GetDiagField,
    SetEnvAttr,
    GetEnvAttr,
    SetConnectAttrW,
    SetConnectAttr,
    GetConnectAttrW,
    GetConnectAttr,
    SetConnectOption,
    GetConnectOption,
    SetStmtAttrW,
    SetStmtAttr,
    GetStmtAttrW,
    GetStmtAttr,
    SetDescFieldW,
    SetDescField,
    GetDescFieldW,
    GetDescField,
    SetDescRec,
    GetDescRec,
    CopyDesc,
    EndTran,
    Transact,
    Cancel,
    CancelHandle,
    FreeStmt,
    CloseCursor,
    GetInfoW,
    GetInfo,
    GetFunctions,
    GetTypeInfoW,
    GetTypeInfo,
    ColumnsW,
    Columns,
    TablesW,
    Tables,
    StatisticsW,
    Statistics,
    SpecialColumnsW,
    SpecialColumns,
    PrimaryKeysW,
    PrimaryKeys,
    ForeignKeysW,
    ForeignKeys,
    ProceduresW,
    Procedures,
    ProcedureColumnsW,
    ProcedureColumns,
    TablePrivilegesW,
    TablePrivileges,
    ColumnPrivilegesW,
    ColumnPrivileges,
    MoreResults,
    ParamData,
    PutData,
    BulkOperations,
    SetPos,
    NativeSqlW,
    NativeSql,
    DataSourcesW,
    DataSources,
    DriversW,
    Drivers,
    // TimesTen grid-routing vendor extensions. Dispatched straight through the in-use
    // function table, see section 4.5.
    TtGridIsRoutable,
    TtGridMapTables,
    TtGridRouteStatement,
}

impl OdbcFn {
    pub const ALL: &'static [OdbcFn] = &[
        OdbcFn::AllocHandle,
        OdbcFn::FreeHandle,
        OdbcFn::ConnectW,
        OdbcFn::Connect,
        OdbcFn::DriverConnectW,
        OdbcFn::DriverConnect,
        OdbcFn::BrowseConnectW,
        OdbcFn::BrowseConnect,
        OdbcFn::Disconnect,
        OdbcFn::ExecDirectW,
        OdbcFn::ExecDirect,
        OdbcFn::PrepareW,
        OdbcFn::Prepare,
        OdbcFn::Execute,
        OdbcFn::Fetch,
        OdbcFn::FetchScroll,
        OdbcFn::BindCol,
        OdbcFn::BindParameter,
        OdbcFn::GetData,
        OdbcFn::NumResultCols,
        OdbcFn::DescribeColW,
        OdbcFn::DescribeCol,
        OdbcFn::ColAttributeW,
        OdbcFn::ColAttribute,
        OdbcFn::RowCount,
        OdbcFn::GetDiagRecW,
        OdbcFn::GetDiagRec,
        OdbcFn::GetDiagFieldW,
        OdbcFn::GetDiagField,
        OdbcFn::SetEnvAttr,
        OdbcFn::GetEnvAttr,
        OdbcFn::SetConnectAttrW,
        OdbcFn::SetConnectAttr,
        OdbcFn::GetConnectAttrW,
        OdbcFn::GetConnectAttr,
        OdbcFn::SetConnectOption,
        OdbcFn::GetConnectOption,
        OdbcFn::SetStmtAttrW,
        OdbcFn::SetStmtAttr,
        OdbcFn::GetStmtAttrW,
        OdbcFn::GetStmtAttr,
        OdbcFn::SetDescFieldW,
        OdbcFn::SetDescField,
        OdbcFn::GetDescFieldW,
        OdbcFn::GetDescField,
        OdbcFn::SetDescRec,
        OdbcFn::GetDescRec,
        OdbcFn::CopyDesc,
        OdbcFn::EndTran,
        OdbcFn::Transact,
        OdbcFn::Cancel,
        OdbcFn::CancelHandle,
        OdbcFn::FreeStmt,
        OdbcFn::CloseCursor,
        OdbcFn::GetInfoW,
        OdbcFn::GetInfo,
        OdbcFn::GetFunctions,
        OdbcFn::GetTypeInfoW,
        OdbcFn::GetTypeInfo,
        OdbcFn::ColumnsW,
        OdbcFn::Columns,
        OdbcFn::TablesW,
        OdbcFn::Tables,
        OdbcFn::StatisticsW,
        OdbcFn::Statistics,
        OdbcFn::SpecialColumnsW,
        OdbcFn::SpecialColumns,
        OdbcFn::PrimaryKeysW,
        OdbcFn::PrimaryKeys,
        OdbcFn::ForeignKeysW,
        OdbcFn::ForeignKeys,
        OdbcFn::ProceduresW,
        OdbcFn::Procedures,
        OdbcFn::ProcedureColumnsW,
        OdbcFn::ProcedureColumns,
        OdbcFn::TablePrivilegesW,
        OdbcFn::TablePrivileges,
        OdbcFn::ColumnPrivilegesW,
        OdbcFn::ColumnPrivileges,
        OdbcFn::MoreResults,
        OdbcFn::ParamData,
        OdbcFn::PutData,
        OdbcFn::BulkOperations,
        OdbcFn::SetPos,
        OdbcFn::NativeSqlW,
        OdbcFn::NativeSql,
        OdbcFn::DataSourcesW,
        OdbcFn::DataSources,
        OdbcFn::DriversW,
        OdbcFn::Drivers,
        OdbcFn::TtGridIsRoutable,
        OdbcFn::TtGridMapTables,
        OdbcFn::TtGridRouteStatement,
    ];

    /// Position in the fixed, positional symbol list. Shims index by this, not by name.
    pub fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).expect("OdbcFn::ALL is exhaustive")
    }

    pub fn symbol_name(self) -> &'static str {
        match self {
            OdbcFn::AllocHandle => "SQLAllocHandle",
            OdbcFn::FreeHandle => "SQLFreeHandle",
            OdbcFn::ConnectW => "SQLConnectW",
            OdbcFn::Connect => "SQLConnect",
            OdbcFn::DriverConnectW => "SQLDriverConnectW",
            OdbcFn::DriverConnect => "SQLDriverConnect",
            OdbcFn::BrowseConnectW => "SQLBrowseConnectW",
            OdbcFn::BrowseConnect => "SQLBrowseConnect",
            OdbcFn::Disconnect => "SQLDisconnect",
            OdbcFn::ExecDirectW => "SQLExecDirectW",
            OdbcFn::ExecDirect => "SQLExecDirect",
            OdbcFn::PrepareW => "SQLPrepareW",
            OdbcFn::Prepare => "SQLPrepare",
            OdbcFn::Execute => "SQLExecute",
            OdbcFn::Fetch => "SQLFetch",
            OdbcFn::FetchScroll => "SQLFetchScroll",
            OdbcFn::BindCol => "SQLBindCol",
            OdbcFn::BindParameter => "SQLBindParameter",
            OdbcFn::GetData => "SQLGetData",
            OdbcFn::NumResultCols => "SQLNumResultCols",
            OdbcFn::DescribeColW => "SQLDescribeColW",
            OdbcFn::DescribeCol => "SQLDescribeCol",
            OdbcFn::ColAttributeW => "SQLColAttributeW",
            OdbcFn::ColAttribute => "SQLColAttribute",
            OdbcFn::RowCount => "SQLRowCount",
            OdbcFn::GetDiagRecW => "SQLGetDiagRecW",
            OdbcFn::GetDiagRec => "SQLGetDiagRec",
            OdbcFn::GetDiagFieldW => "SQLGetDiagFieldW",
            OdbcFn::GetDiagField => "SQLGetDiagField",
            OdbcFn::SetEnvAttr => "SQLSetEnvAttr",
            OdbcFn::GetEnvAttr => "SQLGetEnvAttr",
            OdbcFn::SetConnectAttrW => "SQLSetConnectAttrW",
            OdbcFn::SetConnectAttr => "SQLSetConnectAttr",
            OdbcFn::GetConnectAttrW => "SQLGetConnectAttrW",
            OdbcFn::GetConnectAttr => "SQLGetConnectAttr",
            OdbcFn::SetConnectOption => "SQLSetConnectOption",
            OdbcFn::GetConnectOption => "SQLGetConnectOption",
            OdbcFn::SetStmtAttrW => "SQLSetStmtAttrW",
            OdbcFn::SetStmtAttr => "SQLSetStmtAttr",
            OdbcFn::GetStmtAttrW => "SQLGetStmtAttrW",
            OdbcFn::GetStmtAttr => "SQLGetStmtAttr",
            OdbcFn::SetDescFieldW => "SQLSetDescFieldW",
            OdbcFn::SetDescField => "SQLSetDescField",
            OdbcFn::GetDescFieldW => "SQLGetDescFieldW",
            OdbcFn::GetDescField => "SQLGetDescField",
            OdbcFn::SetDescRec => "SQLSetDescRec",
            OdbcFn::GetDescRec => "SQLGetDescRec",
            OdbcFn::CopyDesc => "SQLCopyDesc",
            OdbcFn::EndTran => "SQLEndTran",
            OdbcFn::Transact => "SQLTransact",
            OdbcFn::Cancel => "SQLCancel",
            OdbcFn::CancelHandle => "SQLCancelHandle",
            OdbcFn::FreeStmt => "SQLFreeStmt",
            OdbcFn::CloseCursor => "SQLCloseCursor",
            OdbcFn::GetInfoW => "SQLGetInfoW",
            OdbcFn::GetInfo => "SQLGetInfo",
            OdbcFn::GetFunctions => "SQLGetFunctions",
            OdbcFn::GetTypeInfoW => "SQLGetTypeInfoW",
            OdbcFn::GetTypeInfo => "SQLGetTypeInfo",
            OdbcFn::ColumnsW => "SQLColumnsW",
            OdbcFn::Columns => "SQLColumns",
            OdbcFn::TablesW => "SQLTablesW",
            OdbcFn::Tables => "SQLTables",
            OdbcFn::StatisticsW => "SQLStatisticsW",
            OdbcFn::Statistics => "SQLStatistics",
            OdbcFn::SpecialColumnsW => "SQLSpecialColumnsW",
            OdbcFn::SpecialColumns => "SQLSpecialColumns",
            OdbcFn::PrimaryKeysW => "SQLPrimaryKeysW",
            OdbcFn::PrimaryKeys => "SQLPrimaryKeys",
            OdbcFn::ForeignKeysW => "SQLForeignKeysW",
            OdbcFn::ForeignKeys => "SQLForeignKeys",
            OdbcFn::ProceduresW => "SQLProceduresW",
            OdbcFn::Procedures => "SQLProcedures",
            OdbcFn::ProcedureColumnsW => "SQLProcedureColumnsW",
            OdbcFn::ProcedureColumns => "SQLProcedureColumns",
            OdbcFn::TablePrivilegesW => "SQLTablePrivilegesW",
            OdbcFn::TablePrivileges => "SQLTablePrivileges",
            OdbcFn::ColumnPrivilegesW => "SQLColumnPrivilegesW",
            OdbcFn::ColumnPrivileges => "SQLColumnPrivileges",
            OdbcFn::MoreResults => "SQLMoreResults",
            OdbcFn::ParamData => "SQLParamData",
            OdbcFn::PutData => "SQLPutData",
            OdbcFn::BulkOperations => "SQLBulkOperations",
            OdbcFn::SetPos => "SQLSetPos",
            OdbcFn::NativeSqlW => "SQLNativeSqlW",
            OdbcFn::NativeSql => "SQLNativeSql",
            OdbcFn::DataSourcesW => "SQLDataSourcesW",
            OdbcFn::DataSources => "SQLDataSources",
            OdbcFn::DriversW => "SQLDriversW",
            OdbcFn::Drivers => "SQLDrivers",
            OdbcFn::TtGridIsRoutable => "ttGridIsRoutable",
            OdbcFn::TtGridMapTables => "ttGridMapTables",
            OdbcFn::TtGridRouteStatement => "ttGridRouteStatement",
        }
    }
}

pub const ODBC_FN_COUNT: usize = OdbcFn::ALL.len();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_unique_and_dense() {
        let mut seen: Vec<usize> = OdbcFn::ALL.iter().map(|f| f.position()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..ODBC_FN_COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn every_entry_has_a_name() {
        for f in OdbcFn::ALL {
            assert!(!f.symbol_name().is_empty());
        }
    }
}
