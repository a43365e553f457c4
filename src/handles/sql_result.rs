use odbc_sys::SqlReturn;

/// Outcome of a driver call or a fan-out across drivers. Variants are ordered by
/// severity for the purposes of [`worse`]: `Success < NoData < SuccessWithInfo <
/// Error < InvalidHandle` (section 4.3 "end-transaction fan-out").
#[derive(Debug, Clone)]
pub enum SqlResult<T> {
    Success(T),
    SuccessWithInfo(T),
    NoData,
    Error,
    InvalidHandle,
}

impl<T> SqlResult<T> {
    fn severity(&self) -> u8 {
        match self {
            SqlResult::Success(_) => 0,
            SqlResult::NoData => 1,
            SqlResult::SuccessWithInfo(_) => 2,
            SqlResult::Error => 3,
            SqlResult::InvalidHandle => 4,
        }
    }

    pub fn is_err(&self) -> bool {
        matches!(self, SqlResult::Error | SqlResult::InvalidHandle)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SqlResult<U> {
        match self {
            SqlResult::Success(v) => SqlResult::Success(f(v)),
            SqlResult::SuccessWithInfo(v) => SqlResult::SuccessWithInfo(f(v)),
            SqlResult::NoData => SqlResult::NoData,
            SqlResult::Error => SqlResult::Error,
            SqlResult::InvalidHandle => SqlResult::InvalidHandle,
        }
    }

    pub fn on_success(self, f: impl FnOnce(T) -> T) -> Self {
        match self {
            SqlResult::Success(v) => SqlResult::Success(f(v)),
            SqlResult::SuccessWithInfo(v) => SqlResult::SuccessWithInfo(f(v)),
            other => other,
        }
    }
}

impl SqlResult<()> {
    pub fn to_sql_return(&self) -> SqlReturn {
        match self {
            SqlResult::Success(()) => SqlReturn::SUCCESS,
            SqlResult::SuccessWithInfo(()) => SqlReturn::SUCCESS_WITH_INFO,
            SqlResult::NoData => SqlReturn::NO_DATA,
            SqlResult::Error => SqlReturn::ERROR,
            SqlResult::InvalidHandle => SqlReturn::INVALID_HANDLE,
        }
    }
}

/// Translates a raw driver return code into an [`SqlResult`]. Unrecognized codes are
/// folded into `Error` rather than panicking: an ABI boundary is not the place to
/// trust a third-party driver to only ever return documented values.
pub trait ExtSqlReturn {
    fn into_sql_result(self) -> SqlResult<()>;
}

impl ExtSqlReturn for SqlReturn {
    fn into_sql_result(self) -> SqlResult<()> {
        match self {
            SqlReturn::SUCCESS => SqlResult::Success(()),
            SqlReturn::SUCCESS_WITH_INFO => SqlResult::SuccessWithInfo(()),
            SqlReturn::NO_DATA => SqlResult::NoData,
            SqlReturn::INVALID_HANDLE => SqlResult::InvalidHandle,
            _ => SqlResult::Error,
        }
    }
}

/// Picks the more severe of two fan-out results, keeping the value of whichever one
/// wins. Used to combine the direct and client table's responses to a single
/// environment-scoped `EndTran`/`Transact` call (section 4.3).
pub fn worse<T>(a: SqlResult<T>, b: SqlResult<T>) -> SqlResult<T> {
    if b.severity() >= a.severity() {
        b
    } else {
        a
    }
}
