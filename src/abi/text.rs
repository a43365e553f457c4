//! Reads an ODBC C-API string argument: a pointer plus a `SmallInt` length that may
//! be `SQL_NTS` (the caller left the string null-terminated instead of passing its
//! length).

use crate::handles::{ansi_slice_to_utf8, utf16_slice_to_utf8};
use odbc_sys::SqlReturn;

unsafe fn ansi_len(ptr: *const u8, declared: i16) -> usize {
    if declared >= 0 {
        return declared as usize;
    }
    let mut len = 0usize;
    unsafe {
        while *ptr.add(len) != 0 {
            len += 1;
        }
    }
    len
}

unsafe fn wide_len(ptr: *const u16, declared: i16) -> usize {
    if declared >= 0 {
        return declared as usize;
    }
    let mut len = 0usize;
    unsafe {
        while *ptr.add(len) != 0 {
            len += 1;
        }
    }
    len
}

/// # Safety
/// `ptr` must be valid for `declared` bytes, or null-terminated within a reasonable
/// bound if `declared` is `SQL_NTS` (negative).
pub unsafe fn ansi_str(ptr: *const u8, declared: i16) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let len = unsafe { ansi_len(ptr, declared) };
    let slice = unsafe { std::slice::from_raw_parts(ptr, len) };
    ansi_slice_to_utf8(slice)
}

/// # Safety
/// Same obligations as [`ansi_str`], for UTF-16 code units.
pub unsafe fn wide_str(ptr: *const u16, declared: i16) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let len = unsafe { wide_len(ptr, declared) };
    let slice = unsafe { std::slice::from_raw_parts(ptr, len) };
    utf16_slice_to_utf8(slice)
}

/// Writes `bytes` (already in the target encoding, no terminator) into a
/// caller-supplied buffer, null-terminating and truncating to fit if necessary; the
/// full untruncated length is always reported through `out_len`, and truncation is
/// reported as `SUCCESS_WITH_INFO` (section 4.4 "Buffer handling").
///
/// # Safety
/// `buf` must be valid for `buf_len` bytes when non-null; `out_len` must be valid
/// for one write when non-null.
pub unsafe fn write_ansi(buf: *mut u8, buf_len: i16, out_len: *mut i16, bytes: &[u8]) -> SqlReturn {
    unsafe {
        if !out_len.is_null() {
            *out_len = bytes.len() as i16;
        }
    }
    if buf.is_null() || buf_len <= 0 {
        return if bytes.is_empty() { SqlReturn::SUCCESS } else { SqlReturn::SUCCESS_WITH_INFO };
    }
    let capacity = (buf_len as usize).saturating_sub(1);
    let copy_len = bytes.len().min(capacity);
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf, copy_len);
        *buf.add(copy_len) = 0;
    }
    if copy_len < bytes.len() {
        SqlReturn::SUCCESS_WITH_INFO
    } else {
        SqlReturn::SUCCESS
    }
}

/// Wide-character counterpart of [`write_ansi`], operating on UTF-16 code units.
///
/// # Safety
/// Same obligations as [`write_ansi`].
pub unsafe fn write_wide(buf: *mut u16, buf_len: i16, out_len: *mut i16, units: &[u16]) -> SqlReturn {
    unsafe {
        if !out_len.is_null() {
            *out_len = units.len() as i16;
        }
    }
    if buf.is_null() || buf_len <= 0 {
        return if units.is_empty() { SqlReturn::SUCCESS } else { SqlReturn::SUCCESS_WITH_INFO };
    }
    let capacity = (buf_len as usize).saturating_sub(1);
    let copy_len = units.len().min(capacity);
    unsafe {
        std::ptr::copy_nonoverlapping(units.as_ptr(), buf, copy_len);
        *buf.add(copy_len) = 0;
    }
    if copy_len < units.len() {
        SqlReturn::SUCCESS_WITH_INFO
    } else {
        SqlReturn::SUCCESS
    }
}
