//! Generated per-entry-point pass-through shims (section 4.3): these entry points
//! have no DM-specific behavior beyond validation and driver selection, so each one
//! is a macro-generated: resolve the owning connection's committed table, transmute
//! the resolved symbol to the entry's native signature, forward the call.

use crate::abi::opaque;
use crate::handles::{Connection, Descriptor, Environment, HandleKind, Statement};
use crate::loader::{FunctionTable, OdbcFn};
use odbc_sys::{Handle, HandleType, SqlReturn};
use std::ffi::c_void;
use std::mem::transmute;
use std::sync::Arc;

unsafe fn resolve_statement(handle: Handle) -> Option<(Arc<FunctionTable>, Handle)> {
    let statement = unsafe { opaque::validated::<Statement>(handle, HandleKind::Statement) }?;
    let connection = statement.connection.upgrade()?;
    let table = connection.table()?;
    Some((table, statement.native_handle()))
}

unsafe fn resolve_descriptor(handle: Handle) -> Option<(Arc<FunctionTable>, Handle)> {
    let descriptor = unsafe { opaque::validated::<Descriptor>(handle, HandleKind::Descriptor) }?;
    let connection = descriptor.connection.upgrade()?;
    let table = connection.table()?;
    Some((table, descriptor.native_handle()))
}

/// Picks whichever function table an environment loaded, client preferred, matching
/// the driver-selection order of section 4.3's connect decision rule.
unsafe fn resolve_environment(handle: Handle) -> Option<(Arc<FunctionTable>, Handle)> {
    let environment = unsafe { opaque::validated::<Environment>(handle, HandleKind::Environment) }?;
    if let (Some(table), Some(native)) = (environment.client(), environment.client_env_handle()) {
        return Some((table.clone(), native));
    }
    if let (Some(table), Some(native)) = (environment.direct(), environment.direct_env_handle()) {
        return Some((table.clone(), native));
    }
    None
}

macro_rules! passthrough {
    ($name:ident, $resolver:ident, $entry:expr, ($($arg:ident : $ty:ty),* $(,)?)) => {
        #[unsafe(no_mangle)]
        pub unsafe extern "system" fn $name(handle: Handle, $($arg: $ty),*) -> SqlReturn {
            let Some((table, native)) = (unsafe { $resolver(handle) }) else {
                return SqlReturn::INVALID_HANDLE;
            };
            type ForwardFn = unsafe extern "system" fn(Handle, $($ty),*) -> SqlReturn;
            let f: ForwardFn = unsafe { transmute(table.odbc($entry)) };
            unsafe { f(native, $($arg),*) }
        }
    };
}

passthrough!(SQLExecute, resolve_statement, OdbcFn::Execute, ());
passthrough!(SQLFetch, resolve_statement, OdbcFn::Fetch, ());
passthrough!(
    SQLBindCol,
    resolve_statement,
    OdbcFn::BindCol,
    (column_number: u16, target_type: i16, target_value: *mut c_void, buffer_length: isize, length_or_indicator: *mut isize)
);
passthrough!(
    SQLPrepare,
    resolve_statement,
    OdbcFn::Prepare,
    (statement_text: *const u8, text_length: i32)
);
passthrough!(
    SQLPrepareW,
    resolve_statement,
    OdbcFn::PrepareW,
    (statement_text: *const u16, text_length: i32)
);
passthrough!(
    SQLGetData,
    resolve_statement,
    OdbcFn::GetData,
    (column_number: u16, target_type: i16, target_value: *mut c_void, buffer_length: isize, length_or_indicator: *mut isize)
);
passthrough!(
    SQLNumResultCols,
    resolve_statement,
    OdbcFn::NumResultCols,
    (column_count: *mut i16)
);
passthrough!(
    SQLDescribeCol,
    resolve_statement,
    OdbcFn::DescribeCol,
    (
        column_number: u16,
        column_name: *mut u8,
        buffer_length: i16,
        name_length: *mut i16,
        data_type: *mut i16,
        column_size: *mut usize,
        decimal_digits: *mut i16,
        nullable: *mut i16
    )
);
passthrough!(
    SQLDescribeColW,
    resolve_statement,
    OdbcFn::DescribeColW,
    (
        column_number: u16,
        column_name: *mut u16,
        buffer_length: i16,
        name_length: *mut i16,
        data_type: *mut i16,
        column_size: *mut usize,
        decimal_digits: *mut i16,
        nullable: *mut i16
    )
);
passthrough!(
    SQLColAttribute,
    resolve_statement,
    OdbcFn::ColAttribute,
    (
        column_number: u16,
        field_identifier: u16,
        character_attribute: *mut c_void,
        buffer_length: i16,
        string_length: *mut i16,
        numeric_attribute: *mut isize
    )
);
passthrough!(
    SQLColAttributeW,
    resolve_statement,
    OdbcFn::ColAttributeW,
    (
        column_number: u16,
        field_identifier: u16,
        character_attribute: *mut c_void,
        buffer_length: i16,
        string_length: *mut i16,
        numeric_attribute: *mut isize
    )
);
passthrough!(SQLRowCount, resolve_statement, OdbcFn::RowCount, (row_count: *mut isize));
passthrough!(SQLCancel, resolve_statement, OdbcFn::Cancel, ());
passthrough!(SQLFreeStmt, resolve_statement, OdbcFn::FreeStmt, (option: u16));
passthrough!(SQLCloseCursor, resolve_statement, OdbcFn::CloseCursor, ());
passthrough!(
    SQLSetStmtAttr,
    resolve_statement,
    OdbcFn::SetStmtAttr,
    (attribute: i32, value: *mut c_void, string_length: i32)
);
passthrough!(
    SQLSetStmtAttrW,
    resolve_statement,
    OdbcFn::SetStmtAttrW,
    (attribute: i32, value: *mut c_void, string_length: i32)
);
passthrough!(
    SQLGetStmtAttr,
    resolve_statement,
    OdbcFn::GetStmtAttr,
    (attribute: i32, value: *mut c_void, buffer_length: i32, string_length: *mut i32)
);
passthrough!(
    SQLGetStmtAttrW,
    resolve_statement,
    OdbcFn::GetStmtAttrW,
    (attribute: i32, value: *mut c_void, buffer_length: i32, string_length: *mut i32)
);
passthrough!(
    SQLExecDirect,
    resolve_statement,
    OdbcFn::ExecDirect,
    (statement_text: *const u8, text_length: i32)
);
passthrough!(
    SQLExecDirectW,
    resolve_statement,
    OdbcFn::ExecDirectW,
    (statement_text: *const u16, text_length: i32)
);
passthrough!(
    SQLFetchScroll,
    resolve_statement,
    OdbcFn::FetchScroll,
    (fetch_orientation: i16, fetch_offset: isize)
);
passthrough!(
    SQLBindParameter,
    resolve_statement,
    OdbcFn::BindParameter,
    (
        parameter_number: u16,
        input_output_type: i16,
        value_type: i16,
        parameter_type: i16,
        column_size: usize,
        decimal_digits: i16,
        parameter_value: *mut c_void,
        buffer_length: isize,
        str_len_or_ind: *mut isize
    )
);
passthrough!(SQLMoreResults, resolve_statement, OdbcFn::MoreResults, ());
passthrough!(SQLParamData, resolve_statement, OdbcFn::ParamData, (value: *mut *mut c_void));
passthrough!(
    SQLPutData,
    resolve_statement,
    OdbcFn::PutData,
    (data: *mut c_void, str_len_or_ind: isize)
);
passthrough!(SQLBulkOperations, resolve_statement, OdbcFn::BulkOperations, (operation: u16));
passthrough!(
    SQLSetPos,
    resolve_statement,
    OdbcFn::SetPos,
    (row_number: usize, operation: u16, lock_type: u16)
);
passthrough!(
    SQLNativeSql,
    resolve_statement,
    OdbcFn::NativeSql,
    (
        in_statement_text: *const u8,
        in_text_length: i32,
        out_statement_text: *mut u8,
        buffer_length: i32,
        out_text_length: *mut i32
    )
);
passthrough!(
    SQLNativeSqlW,
    resolve_statement,
    OdbcFn::NativeSqlW,
    (
        in_statement_text: *const u16,
        in_text_length: i32,
        out_statement_text: *mut u16,
        buffer_length: i32,
        out_text_length: *mut i32
    )
);
passthrough!(SQLGetTypeInfo, resolve_statement, OdbcFn::GetTypeInfo, (data_type: i16));
passthrough!(SQLGetTypeInfoW, resolve_statement, OdbcFn::GetTypeInfoW, (data_type: i16));
passthrough!(
    SQLGetFunctions,
    resolve_statement,
    OdbcFn::GetFunctions,
    (function_id: u16, supported: *mut u16)
);

// Catalog functions: all statement-scoped, four to six name/length argument pairs.

passthrough!(
    SQLColumns,
    resolve_statement,
    OdbcFn::Columns,
    (
        catalog_name: *const u8, name_length1: i16,
        schema_name: *const u8, name_length2: i16,
        table_name: *const u8, name_length3: i16,
        column_name: *const u8, name_length4: i16
    )
);
passthrough!(
    SQLColumnsW,
    resolve_statement,
    OdbcFn::ColumnsW,
    (
        catalog_name: *const u16, name_length1: i16,
        schema_name: *const u16, name_length2: i16,
        table_name: *const u16, name_length3: i16,
        column_name: *const u16, name_length4: i16
    )
);
passthrough!(
    SQLTables,
    resolve_statement,
    OdbcFn::Tables,
    (
        catalog_name: *const u8, name_length1: i16,
        schema_name: *const u8, name_length2: i16,
        table_name: *const u8, name_length3: i16,
        table_type: *const u8, name_length4: i16
    )
);
passthrough!(
    SQLTablesW,
    resolve_statement,
    OdbcFn::TablesW,
    (
        catalog_name: *const u16, name_length1: i16,
        schema_name: *const u16, name_length2: i16,
        table_name: *const u16, name_length3: i16,
        table_type: *const u16, name_length4: i16
    )
);
passthrough!(
    SQLStatistics,
    resolve_statement,
    OdbcFn::Statistics,
    (
        catalog_name: *const u8, name_length1: i16,
        schema_name: *const u8, name_length2: i16,
        table_name: *const u8, name_length3: i16,
        unique: i16, reserved: i16
    )
);
passthrough!(
    SQLStatisticsW,
    resolve_statement,
    OdbcFn::StatisticsW,
    (
        catalog_name: *const u16, name_length1: i16,
        schema_name: *const u16, name_length2: i16,
        table_name: *const u16, name_length3: i16,
        unique: i16, reserved: i16
    )
);
passthrough!(
    SQLSpecialColumns,
    resolve_statement,
    OdbcFn::SpecialColumns,
    (
        identifier_type: i16,
        catalog_name: *const u8, name_length1: i16,
        schema_name: *const u8, name_length2: i16,
        table_name: *const u8, name_length3: i16,
        scope: i16, nullable: i16
    )
);
passthrough!(
    SQLSpecialColumnsW,
    resolve_statement,
    OdbcFn::SpecialColumnsW,
    (
        identifier_type: i16,
        catalog_name: *const u16, name_length1: i16,
        schema_name: *const u16, name_length2: i16,
        table_name: *const u16, name_length3: i16,
        scope: i16, nullable: i16
    )
);
passthrough!(
    SQLPrimaryKeys,
    resolve_statement,
    OdbcFn::PrimaryKeys,
    (
        catalog_name: *const u8, name_length1: i16,
        schema_name: *const u8, name_length2: i16,
        table_name: *const u8, name_length3: i16
    )
);
passthrough!(
    SQLPrimaryKeysW,
    resolve_statement,
    OdbcFn::PrimaryKeysW,
    (
        catalog_name: *const u16, name_length1: i16,
        schema_name: *const u16, name_length2: i16,
        table_name: *const u16, name_length3: i16
    )
);
passthrough!(
    SQLForeignKeys,
    resolve_statement,
    OdbcFn::ForeignKeys,
    (
        pk_catalog_name: *const u8, pk_name_length1: i16,
        pk_schema_name: *const u8, pk_name_length2: i16,
        pk_table_name: *const u8, pk_name_length3: i16,
        fk_catalog_name: *const u8, fk_name_length1: i16,
        fk_schema_name: *const u8, fk_name_length2: i16,
        fk_table_name: *const u8, fk_name_length3: i16
    )
);
passthrough!(
    SQLForeignKeysW,
    resolve_statement,
    OdbcFn::ForeignKeysW,
    (
        pk_catalog_name: *const u16, pk_name_length1: i16,
        pk_schema_name: *const u16, pk_name_length2: i16,
        pk_table_name: *const u16, pk_name_length3: i16,
        fk_catalog_name: *const u16, fk_name_length1: i16,
        fk_schema_name: *const u16, fk_name_length2: i16,
        fk_table_name: *const u16, fk_name_length3: i16
    )
);
passthrough!(
    SQLProcedures,
    resolve_statement,
    OdbcFn::Procedures,
    (
        catalog_name: *const u8, name_length1: i16,
        schema_name: *const u8, name_length2: i16,
        proc_name: *const u8, name_length3: i16
    )
);
passthrough!(
    SQLProceduresW,
    resolve_statement,
    OdbcFn::ProceduresW,
    (
        catalog_name: *const u16, name_length1: i16,
        schema_name: *const u16, name_length2: i16,
        proc_name: *const u16, name_length3: i16
    )
);
passthrough!(
    SQLProcedureColumns,
    resolve_statement,
    OdbcFn::ProcedureColumns,
    (
        catalog_name: *const u8, name_length1: i16,
        schema_name: *const u8, name_length2: i16,
        proc_name: *const u8, name_length3: i16,
        column_name: *const u8, name_length4: i16
    )
);
passthrough!(
    SQLProcedureColumnsW,
    resolve_statement,
    OdbcFn::ProcedureColumnsW,
    (
        catalog_name: *const u16, name_length1: i16,
        schema_name: *const u16, name_length2: i16,
        proc_name: *const u16, name_length3: i16,
        column_name: *const u16, name_length4: i16
    )
);
passthrough!(
    SQLTablePrivileges,
    resolve_statement,
    OdbcFn::TablePrivileges,
    (
        catalog_name: *const u8, name_length1: i16,
        schema_name: *const u8, name_length2: i16,
        table_name: *const u8, name_length3: i16
    )
);
passthrough!(
    SQLTablePrivilegesW,
    resolve_statement,
    OdbcFn::TablePrivilegesW,
    (
        catalog_name: *const u16, name_length1: i16,
        schema_name: *const u16, name_length2: i16,
        table_name: *const u16, name_length3: i16
    )
);
passthrough!(
    SQLColumnPrivileges,
    resolve_statement,
    OdbcFn::ColumnPrivileges,
    (
        catalog_name: *const u8, name_length1: i16,
        schema_name: *const u8, name_length2: i16,
        table_name: *const u8, name_length3: i16,
        column_name: *const u8, name_length4: i16
    )
);
passthrough!(
    SQLColumnPrivilegesW,
    resolve_statement,
    OdbcFn::ColumnPrivilegesW,
    (
        catalog_name: *const u16, name_length1: i16,
        schema_name: *const u16, name_length2: i16,
        table_name: *const u16, name_length3: i16,
        column_name: *const u16, name_length4: i16
    )
);

// Descriptor-scoped shims.

passthrough!(
    SQLSetDescField,
    resolve_descriptor,
    OdbcFn::SetDescField,
    (record_number: i16, field_identifier: i16, value: *mut c_void, buffer_length: i32)
);
passthrough!(
    SQLSetDescFieldW,
    resolve_descriptor,
    OdbcFn::SetDescFieldW,
    (record_number: i16, field_identifier: i16, value: *mut c_void, buffer_length: i32)
);
passthrough!(
    SQLGetDescField,
    resolve_descriptor,
    OdbcFn::GetDescField,
    (record_number: i16, field_identifier: i16, value: *mut c_void, buffer_length: i32, string_length: *mut i32)
);
passthrough!(
    SQLGetDescFieldW,
    resolve_descriptor,
    OdbcFn::GetDescFieldW,
    (record_number: i16, field_identifier: i16, value: *mut c_void, buffer_length: i32, string_length: *mut i32)
);
passthrough!(
    SQLSetDescRec,
    resolve_descriptor,
    OdbcFn::SetDescRec,
    (
        record_number: i16,
        data_type: i16,
        sub_type: i16,
        length: isize,
        precision: i16,
        scale: i16,
        data: *mut c_void,
        string_length: *mut isize,
        indicator: *mut isize
    )
);
passthrough!(
    SQLGetDescRec,
    resolve_descriptor,
    OdbcFn::GetDescRec,
    (
        record_number: i16,
        name: *mut u8,
        buffer_length: i16,
        string_length: *mut i16,
        data_type: *mut i16,
        sub_type: *mut i16,
        length: *mut isize,
        precision: *mut i16,
        scale: *mut i16,
        nullable: *mut i16
    )
);

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLCopyDesc(source_descriptor_handle: Handle, target_descriptor_handle: Handle) -> SqlReturn {
    let Some((table, target_native)) = (unsafe { resolve_descriptor(target_descriptor_handle) }) else {
        return SqlReturn::INVALID_HANDLE;
    };
    let Some((_, source_native)) = (unsafe { resolve_descriptor(source_descriptor_handle) }) else {
        return SqlReturn::INVALID_HANDLE;
    };
    type CopyDescFn = unsafe extern "system" fn(Handle, Handle) -> SqlReturn;
    let f: CopyDescFn = unsafe { transmute(table.odbc(OdbcFn::CopyDesc)) };
    unsafe { f(source_native, target_native) }
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn SQLCancelHandle(handle_type: HandleType, handle: Handle) -> SqlReturn {
    match handle_type {
        HandleType::Stmt => {
            let Some((table, native)) = (unsafe { resolve_statement(handle) }) else {
                return SqlReturn::INVALID_HANDLE;
            };
            type CancelHandleFn = unsafe extern "system" fn(HandleType, Handle) -> SqlReturn;
            let f: CancelHandleFn = unsafe { transmute(table.odbc(OdbcFn::CancelHandle)) };
            unsafe { f(HandleType::Stmt, native) }
        }
        HandleType::Dbc => {
            let Some(connection) =
                (unsafe { opaque::validated::<Connection>(handle, HandleKind::Connection) })
            else {
                return SqlReturn::INVALID_HANDLE;
            };
            let Some(table) = connection.table() else { return SqlReturn::ERROR };
            let Some(native) = connection.native_handle() else { return SqlReturn::ERROR };
            type CancelHandleFn = unsafe extern "system" fn(HandleType, Handle) -> SqlReturn;
            let f: CancelHandleFn = unsafe { transmute(table.odbc(OdbcFn::CancelHandle)) };
            unsafe { f(HandleType::Dbc, native) }
        }
        _ => SqlReturn::ERROR,
    }
}

// Environment-scoped enumeration, client table preferred (section 4.3 driver order).

passthrough!(
    SQLDataSources,
    resolve_environment,
    OdbcFn::DataSources,
    (
        direction: u16,
        server_name: *mut u8, buffer_length1: i16, name_length1: *mut i16,
        description: *mut u8, buffer_length2: i16, name_length2: *mut i16
    )
);
passthrough!(
    SQLDataSourcesW,
    resolve_environment,
    OdbcFn::DataSourcesW,
    (
        direction: u16,
        server_name: *mut u16, buffer_length1: i16, name_length1: *mut i16,
        description: *mut u16, buffer_length2: i16, name_length2: *mut i16
    )
);
passthrough!(
    SQLDrivers,
    resolve_environment,
    OdbcFn::Drivers,
    (
        direction: u16,
        driver_description: *mut u8, buffer_length1: i16, description_length: *mut i16,
        driver_attributes: *mut u8, buffer_length2: i16, attributes_length: *mut i16
    )
);
passthrough!(
    SQLDriversW,
    resolve_environment,
    OdbcFn::DriversW,
    (
        direction: u16,
        driver_description: *mut u16, buffer_length1: i16, description_length: *mut i16,
        driver_attributes: *mut u16, buffer_length2: i16, attributes_length: *mut i16
    )
);
