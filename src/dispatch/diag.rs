//! `GetDiagRec`/`GetDiagField` retrieval, section 4.4: the DM's own stack is
//! presented first, in FIFO order, and once it is exhausted the driver-native stack
//! for whichever table the handle has committed to is presented starting where the
//! DM's own stack left off. Neither stack is consulted more than once per call; the
//! merge is purely a matter of index arithmetic, not an eager concatenation, so a
//! handle with a deep driver-side stack never pays for records the application never
//! asks for.

use crate::handles::{
    diagnostics::{DiagStack, Encoding},
    AsHandle, Record,
};
use odbc_sys::SqlReturn;
use std::sync::Mutex;

/// Retrieves the `rec_number`'th diagnostic record (one-based) for a handle,
/// merging the DM's own stack with the driver-native one (section 4.4 point 6,
/// "Retrieve by index"). `rec_number` beyond both stacks' combined length yields
/// `None`, which the dispatch boundary reports as `SQL_NO_DATA`.
pub fn dispatch_get_diag_rec(
    handle: &dyn AsHandle,
    dm_stack: &Mutex<DiagStack>,
    rec_number: i16,
    encoding: Encoding,
) -> Option<Record> {
    assert!(rec_number > 0);
    let dm_stack = dm_stack.lock().unwrap();
    let dm_len = dm_stack.len();
    let index = (rec_number - 1) as usize;
    if index < dm_len {
        return dm_stack.get(index).map(|r| r.to_encoding(encoding));
    }
    drop(dm_stack);

    let native = handle.native()?;
    let native_index = (index - dm_len) as i16 + 1;
    native.record(native_index, encoding)
}

/// Combined record count across both stacks, for `GetDiagField(SQL_DIAG_NUMBER)`
/// (section 4.4 point 6).
pub fn dispatch_diag_count(handle: &dyn AsHandle, dm_stack: &Mutex<DiagStack>) -> i16 {
    let dm_len = dm_stack.lock().unwrap().len() as i16;
    let native_len = handle.native().map(|n| n.count()).unwrap_or(0);
    dm_len + native_len
}

/// `GetDiagField(SQL_DIAG_RETURNCODE)`: the return code associated with the most
/// recent call on this handle, taken from the DM stack's leading record if the DM
/// pushed anything, otherwise from the first driver-native record, otherwise
/// `SQL_SUCCESS` (an empty stack reports success, section 4.4).
pub fn dispatch_leading_return_code(handle: &dyn AsHandle, dm_stack: &Mutex<DiagStack>) -> SqlReturn {
    if let Some(code) = dm_stack.lock().unwrap().leading_return_code() {
        return code;
    }
    match handle.native() {
        Some(native) => native
            .record(1, Encoding::Ansi)
            .map(|r| r.return_code)
            .unwrap_or(SqlReturn::SUCCESS),
        None => SqlReturn::SUCCESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handles::diagnostics::{NativeDiagnostics, State, Text};
    use crate::version::OdbcVersion;

    struct NoNativeHandle;
    impl AsHandle for NoNativeHandle {
        fn native(&self) -> Option<NativeDiagnostics> {
            None
        }
    }

    #[test]
    fn dm_only_stack_serves_every_record_by_index() {
        let mut stack = DiagStack::new();
        stack.push(Record::dm_authored(
            SqlReturn::ERROR,
            State::sequence_error(OdbcVersion::V3),
            0,
            "first",
            Encoding::Ansi,
        ));
        stack.push(Record::dm_authored(
            SqlReturn::ERROR,
            State::argument_error(OdbcVersion::V3),
            0,
            "second",
            Encoding::Ansi,
        ));
        let stack = Mutex::new(stack);
        let handle = NoNativeHandle;

        let first = dispatch_get_diag_rec(&handle, &stack, 1, Encoding::Ansi).unwrap();
        assert_eq!(first.message.to_string_lossy(), "first");
        let second = dispatch_get_diag_rec(&handle, &stack, 2, Encoding::Ansi).unwrap();
        assert_eq!(second.message.to_string_lossy(), "second");
        assert!(dispatch_get_diag_rec(&handle, &stack, 3, Encoding::Ansi).is_none());
        assert_eq!(dispatch_diag_count(&handle, &stack), 2);
    }

    #[test]
    fn empty_stack_with_no_native_handle_reports_success() {
        let stack = Mutex::new(DiagStack::new());
        let handle = NoNativeHandle;
        assert_eq!(dispatch_leading_return_code(&handle, &stack), SqlReturn::SUCCESS);
        assert_eq!(dispatch_diag_count(&handle, &stack), 0);
    }

    #[test]
    fn retrieval_encoding_is_independent_of_push_encoding() {
        let mut stack = DiagStack::new();
        stack.push(Record::dm_authored(
            SqlReturn::ERROR,
            State::argument_error(OdbcVersion::V3),
            0,
            "bad argument",
            Encoding::Utf16,
        ));
        let stack = Mutex::new(stack);
        let handle = NoNativeHandle;

        let as_ansi = dispatch_get_diag_rec(&handle, &stack, 1, Encoding::Ansi).unwrap();
        assert_eq!(as_ansi.message, Text::ansi("bad argument"));

        let as_wide = dispatch_get_diag_rec(&handle, &stack, 1, Encoding::Utf16).unwrap();
        assert_eq!(as_wide.message, Text::utf16("bad argument"));
    }
}
