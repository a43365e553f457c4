//! Per-handle diagnostic record stacks and their merge with driver-native
//! diagnostics, see section 4.4.

use crate::loader::{FunctionTable, OdbcFn};
use crate::version::OdbcVersion;
use odbc_sys::{Handle, HandleType, SqlReturn, SQLSTATE_SIZE};
use std::collections::VecDeque;
use std::ffi::c_void;
use std::fmt;
use std::sync::Arc;

/// Which text encoding a diagnostic record's string fields were pushed in. The
/// encoding is authoritative: fields are stored verbatim in the encoding the pusher
/// used, and converted only at retrieval time (section 4.4 "Encoding").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ansi,
    Utf16,
}

/// Text stored exactly as its pusher observed it. Conversion between the two
/// encodings is purely byte/code-unit level (ASCII-range assumption, section 9);
/// non-ASCII text does not round-trip perfectly through the other encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Text {
    Ansi(Vec<u8>),
    Utf16(Vec<u16>),
}

impl Text {
    pub fn ansi(s: impl AsRef<str>) -> Self {
        Text::Ansi(s.as_ref().bytes().collect())
    }

    pub fn utf16(s: impl AsRef<str>) -> Self {
        Text::Utf16(s.as_ref().encode_utf16().collect())
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            Text::Ansi(_) => Encoding::Ansi,
            Text::Utf16(_) => Encoding::Utf16,
        }
    }

    /// Number of bytes the full, untruncated text occupies, as reported by
    /// `GetDiagField(MESSAGE_TEXT)`'s length output even when the supplied buffer
    /// is too small (section 4.4 "Buffer handling").
    pub fn byte_len(&self) -> usize {
        match self {
            Text::Ansi(bytes) => bytes.len(),
            Text::Utf16(units) => units.len() * 2,
        }
    }

    pub fn to_ansi(&self) -> Vec<u8> {
        match self {
            Text::Ansi(bytes) => bytes.clone(),
            Text::Utf16(units) => units
                .iter()
                .map(|&u| if u < 0x100 { u as u8 } else { b'?' })
                .collect(),
        }
    }

    pub fn to_utf16(&self) -> Vec<u16> {
        match self {
            Text::Utf16(units) => units.clone(),
            Text::Ansi(bytes) => bytes.iter().map(|&b| b as u16).collect(),
        }
    }

    pub fn to_encoding(&self, encoding: Encoding) -> Text {
        match encoding {
            Encoding::Ansi => Text::Ansi(self.to_ansi()),
            Encoding::Utf16 => Text::Utf16(self.to_utf16()),
        }
    }

    pub fn to_string_lossy(&self) -> String {
        match self {
            Text::Ansi(bytes) => bytes.iter().map(|&b| b as char).collect(),
            Text::Utf16(units) => String::from_utf16_lossy(units),
        }
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_lossy())
    }
}

/// A five-character SQLSTATE, always stored as ASCII regardless of the record's
/// encoding (section 3 "Diagnostic record").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State(pub [u8; SQLSTATE_SIZE]);

impl State {
    pub const fn new(code: &[u8; SQLSTATE_SIZE]) -> Self {
        State(*code)
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("?????")
    }

    /// "Can't connect to this DSN" signal of section 4.3's connect decision rule,
    /// matched against both ODBC versions' state codes with native error zero.
    pub fn is_cannot_connect_to_dsn(&self, native_error: i32) -> bool {
        native_error == 0
            && matches!(self.as_str(), "08001" | "IM002" | "S1000" | "HY000")
    }

    /// DM argument error state code, version-dependent (ODBC-2 `S1090`, ODBC-3
    /// `HY090`): "invalid string or buffer length".
    pub fn argument_error(version: OdbcVersion) -> Self {
        match version {
            OdbcVersion::V2 => State(*b"S1090"),
            OdbcVersion::V3 => State(*b"HY090"),
        }
    }

    /// DM sequence error state code (function sequence error).
    pub fn sequence_error(version: OdbcVersion) -> Self {
        match version {
            OdbcVersion::V2 => State(*b"S1010"),
            OdbcVersion::V3 => State(*b"HY010"),
        }
    }

    /// DM resource (allocation) error state code.
    pub fn resource_error(version: OdbcVersion) -> Self {
        match version {
            OdbcVersion::V2 => State(*b"S1001"),
            OdbcVersion::V3 => State(*b"HY001"),
        }
    }

    /// DM library-load error state code: "specified driver could not be loaded".
    pub const fn library_load_error() -> Self {
        State(*b"IM003")
    }

    /// Invalid-attribute state code, used for wrong-owner driver-handle queries
    /// (section 8 scenario C).
    pub const fn invalid_attribute() -> Self {
        State(*b"HY092")
    }

    /// Invalid use of an automatically allocated descriptor: rejects an explicit
    /// free of a statement's implicit descriptor (section 3/4.2 "implicit
    /// descriptors are not explicitly freeable").
    pub fn invalid_descriptor_use(version: OdbcVersion) -> Self {
        match version {
            OdbcVersion::V2 => State(*b"S1017"),
            OdbcVersion::V3 => State(*b"HY017"),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic record, DM-authored or copied from a drained driver stack
/// (section 3 "Diagnostic record").
#[derive(Debug, Clone)]
pub struct Record {
    pub state: State,
    pub native_error: i32,
    pub message: Text,
    pub class_origin: &'static str,
    pub subclass_origin: &'static str,
    pub connection_name: Text,
    pub server_name: Text,
    /// The return code this record corresponds to; the first record's value wins
    /// for `GetDiagField(RETURNCODE)` (section 4.4).
    pub return_code: SqlReturn,
}

impl Record {
    /// Builds a DM-authored record. `connection_name`/`server_name` are typically
    /// empty for environment/connection-allocation errors and populated once a
    /// connection exists, matching the cached attribution fields on `Connection`.
    pub fn dm_authored(
        return_code: SqlReturn,
        state: State,
        native_error: i32,
        message: impl AsRef<str>,
        encoding: Encoding,
    ) -> Self {
        let (message, connection_name, server_name) = match encoding {
            Encoding::Ansi => (Text::ansi(message), Text::ansi(""), Text::ansi("")),
            Encoding::Utf16 => (Text::utf16(message), Text::utf16(""), Text::utf16("")),
        };
        Record {
            state,
            native_error,
            message,
            class_origin: "ISO 9075",
            subclass_origin: "ODBC 3.0",
            connection_name,
            server_name,
            return_code,
        }
    }

    /// Re-encodes every text field to `encoding`, leaving the state code and native
    /// error untouched (section 8 property 8: retrieval encoding is independent of
    /// push encoding — `GetDiagRec` always answers ANSI, `GetDiagRecW` always
    /// answers UTF-16, regardless of which one pushed the record).
    pub fn to_encoding(&self, encoding: Encoding) -> Self {
        Record {
            state: self.state,
            native_error: self.native_error,
            message: self.message.to_encoding(encoding),
            class_origin: self.class_origin,
            subclass_origin: self.subclass_origin,
            connection_name: self.connection_name.to_encoding(encoding),
            server_name: self.server_name.to_encoding(encoding),
            return_code: self.return_code,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "State: {}, Native error: {}, Message: {}",
            self.state, self.native_error, self.message
        )
    }
}

/// FIFO diagnostic stack owned by exactly one DM handle. Append is always at the
/// tail (preserves detection order); pop is from the head (section 3).
#[derive(Debug, Default)]
pub struct DiagStack {
    records: VecDeque<Record>,
}

impl DiagStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push_back(record);
    }

    pub fn pop_front(&mut self) -> Option<Record> {
        self.records.pop_front()
    }

    /// Clears the stack. Every non-diagnostic dispatch shim calls this first
    /// (section 4.3 "Validation"): previous errors never shadow the current call.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Zero-based record access; `GetDiagRec`'s one-based index is translated at the
    /// dispatch boundary (section 4.4 "Retrieve by index").
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// The return code reported by `GetDiagField(RETURNCODE)` when the DM stack is
    /// non-empty: the first record's return code wins (section 4.4).
    pub fn leading_return_code(&self) -> Option<SqlReturn> {
        self.records.front().map(|r| r.return_code)
    }

    /// Captures the current records so they can be restored later, without
    /// disturbing the stack itself. Used around driver-side probe calls a dispatch
    /// shim issues on its own behalf (e.g. the post-connect name capture of section
    /// 4.3) so the probe's own diagnostics never leak into the application-visible
    /// stack for the call that triggered it.
    pub fn snapshot(&self) -> Vec<Record> {
        self.records.iter().cloned().collect()
    }

    /// Replaces the stack's contents with a previously taken [`snapshot`](Self::snapshot).
    pub fn restore(&mut self, snapshot: Vec<Record>) {
        self.records = snapshot.into();
    }
}

/// A live driver-native handle bound to the function table that produced it. Used to
/// drain a driver's own diagnostic stack (section 4.4 "Push") and to retrieve
/// records by index when the DM stack is exhausted (section 4.4 "Retrieve by
/// index"). Owns a clone of the table's `Arc` rather than borrowing it, so it can be
/// returned from a `Mutex`-guarded handle without tying up the guard.
#[derive(Clone)]
pub struct NativeDiagnostics {
    pub table: Arc<FunctionTable>,
    pub handle_type: HandleType,
    pub handle: Handle,
}

type GetDiagRecAnsi = unsafe extern "system" fn(
    HandleType,
    Handle,
    i16,
    *mut u8,
    *mut i32,
    *mut u8,
    i16,
    *mut i16,
) -> SqlReturn;

type GetDiagRecWide = unsafe extern "system" fn(
    HandleType,
    Handle,
    i16,
    *mut u16,
    *mut i32,
    *mut u16,
    i16,
    *mut i16,
) -> SqlReturn;

impl NativeDiagnostics {
    fn fn_ansi(&self) -> GetDiagRecAnsi {
        let raw = self.table.odbc(OdbcFn::GetDiagRec);
        debug_assert!(!raw.is_null());
        unsafe { std::mem::transmute::<*const c_void, GetDiagRecAnsi>(raw) }
    }

    fn fn_wide(&self) -> GetDiagRecWide {
        let raw = self.table.odbc(OdbcFn::GetDiagRecW);
        debug_assert!(!raw.is_null());
        unsafe { std::mem::transmute::<*const c_void, GetDiagRecWide>(raw) }
    }

    /// Retrieves record number `rec_number` (one-based, as the ODBC C API numbers
    /// them) in the encoding `GetDiagRec`/`GetDiagRecW` promises (ANSI or UTF-16,
    /// independent of how the driver itself stored the text, per section 4.4 point
    /// 8). Returns `None` once `rec_number` exceeds the driver's own record count.
    pub fn record(&self, rec_number: i16, encoding: Encoding) -> Option<Record> {
        assert!(rec_number > 0);
        const PROBE_LEN: usize = 1024;
        let (state_bytes, native_error, message, ret) = match encoding {
            Encoding::Ansi => {
                let mut state = [0u8; SQLSTATE_SIZE + 1];
                let mut native_error = 0;
                let mut buf = vec![0u8; PROBE_LEN];
                let mut text_length: i16 = 0;
                let ret = unsafe {
                    (self.fn_ansi())(
                        self.handle_type,
                        self.handle,
                        rec_number,
                        state.as_mut_ptr(),
                        &mut native_error,
                        buf.as_mut_ptr(),
                        buf.len() as i16,
                        &mut text_length,
                    )
                };
                buf.truncate(text_length.max(0) as usize);
                (state_to_ascii(&state), native_error, Text::Ansi(buf), ret)
            }
            Encoding::Utf16 => {
                let mut state = [0u16; SQLSTATE_SIZE + 1];
                let mut native_error = 0;
                let mut buf = vec![0u16; PROBE_LEN];
                let mut text_length: i16 = 0;
                let ret = unsafe {
                    (self.fn_wide())(
                        self.handle_type,
                        self.handle,
                        rec_number,
                        state.as_mut_ptr(),
                        &mut native_error,
                        buf.as_mut_ptr(),
                        buf.len() as i16,
                        &mut text_length,
                    )
                };
                buf.truncate(text_length.max(0) as usize);
                let mut ascii = [0u8; SQLSTATE_SIZE];
                for (dst, src) in ascii.iter_mut().zip(state.iter().take(SQLSTATE_SIZE)) {
                    *dst = *src as u8;
                }
                (ascii, native_error, Text::Utf16(buf), ret)
            }
        };
        match ret {
            SqlReturn::SUCCESS | SqlReturn::SUCCESS_WITH_INFO => Some(Record {
                state: State(state_bytes),
                native_error,
                message,
                class_origin: "ISO 9075",
                subclass_origin: "ODBC 3.0",
                connection_name: match encoding {
                    Encoding::Ansi => Text::ansi(""),
                    Encoding::Utf16 => Text::utf16(""),
                },
                server_name: match encoding {
                    Encoding::Ansi => Text::ansi(""),
                    Encoding::Utf16 => Text::utf16(""),
                },
                return_code: ret,
            }),
            _ => None,
        }
    }

    /// Number of diagnostic records currently held by the driver for this handle,
    /// found by probing `record` until it returns `None` (section 4.4 point 6).
    pub fn count(&self) -> i16 {
        let mut n = 0i16;
        while self.record(n + 1, Encoding::Ansi).is_some() {
            n += 1;
        }
        n
    }

    /// Copies every record currently on the driver's stack into `stack`, in the
    /// encoding requested, preserving order. Used by the connect-time retry path to
    /// survive the intermediate driver-handle free (section 4.4 "Push").
    pub fn drain_into(&self, stack: &mut DiagStack, encoding: Encoding) {
        let mut rec_number = 1;
        while let Some(record) = self.record(rec_number, encoding) {
            stack.push(record);
            rec_number += 1;
        }
    }
}

fn state_to_ascii(buf: &[u8; SQLSTATE_SIZE + 1]) -> [u8; SQLSTATE_SIZE] {
    let mut out = [0u8; SQLSTATE_SIZE];
    out.copy_from_slice(&buf[..SQLSTATE_SIZE]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_round_trips_ansi_utf16_ansi() {
        let original = Text::ansi("HY000 connection failed");
        let round_tripped = original.to_utf16();
        let back = Text::Utf16(round_tripped).to_ansi();
        assert_eq!(back, original.to_ansi());
    }

    #[test]
    fn ascii_round_trips_utf16_ansi_utf16() {
        let original = Text::utf16("driver not capable");
        let back = Text::Ansi(original.to_ansi()).to_utf16();
        assert_eq!(back, original.to_utf16());
    }

    #[test]
    fn fifo_preserves_detection_order() {
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
        assert_eq!(stack.get(0).unwrap().message.to_string_lossy(), "first");
        assert_eq!(stack.get(1).unwrap().message.to_string_lossy(), "second");
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn clearing_empties_the_stack() {
        let mut stack = DiagStack::new();
        stack.push(Record::dm_authored(
            SqlReturn::ERROR,
            State::resource_error(OdbcVersion::V3),
            0,
            "oom",
            Encoding::Ansi,
        ));
        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn cannot_connect_signal_matches_both_odbc_versions() {
        assert!(State::new(b"08001").is_cannot_connect_to_dsn(0));
        assert!(State::new(b"IM002").is_cannot_connect_to_dsn(0));
        assert!(State::new(b"S1000").is_cannot_connect_to_dsn(0));
        assert!(State::new(b"HY000").is_cannot_connect_to_dsn(0));
        assert!(!State::new(b"HY000").is_cannot_connect_to_dsn(1));
        assert!(!State::new(b"42000").is_cannot_connect_to_dsn(0));
    }

    #[test]
    fn leading_return_code_is_first_records() {
        let mut stack = DiagStack::new();
        assert!(stack.leading_return_code().is_none());
        stack.push(Record::dm_authored(
            SqlReturn::SUCCESS_WITH_INFO,
            State::sequence_error(OdbcVersion::V3),
            0,
            "warn",
            Encoding::Ansi,
        ));
        stack.push(Record::dm_authored(
            SqlReturn::ERROR,
            State::argument_error(OdbcVersion::V3),
            0,
            "err",
            Encoding::Ansi,
        ));
        assert_eq!(stack.leading_return_code(), Some(SqlReturn::SUCCESS_WITH_INFO));
    }
}
