//! Runtime ANSI/UTF-16 conversions. Unlike a single-driver wrapper, which can pick
//! one text width at compile time via a Cargo feature, the driver manager must speak
//! both in the same process: an application is free to call `SQLConnect` on one
//! environment and `SQLConnectW` on another, or even interleave the two on the same
//! handle (section 4.4 "Encoding").

use widestring::U16Str;

pub fn ansi_slice_to_utf8(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf).into_owned()
}

pub fn utf16_slice_to_utf8(buf: &[u16]) -> String {
    U16Str::from_slice(buf).to_string_lossy()
}

pub fn utf8_to_ansi(text: &str) -> Vec<u8> {
    text.bytes().collect()
}

pub fn utf8_to_utf16(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi_round_trips_through_utf8() {
        assert_eq!(ansi_slice_to_utf8(&utf8_to_ansi("driver")), "driver");
    }

    #[test]
    fn utf16_round_trips_through_utf8() {
        assert_eq!(utf16_slice_to_utf8(&utf8_to_utf16("driver")), "driver");
    }
}
