//! Constants recovered from the original TimesTen Driver Manager header
//! (`ttdrvmgr.h`) that the distilled specification left as "a bitmask" or "a native
//! error code". See SPEC_FULL.md section C.

/// The DM's own declared version, returned by `GetInfo` as an ASCII string (section
/// 6) and encoded as an integer by `GetEnvAttr(DM_VERSION)`.
pub const DM_VERSION_STRING: &str = "1.0.0";
pub const DM_VERSION_INTEGER: u32 = 1_00_00;

/// `GetEnvAttr` attribute identifiers the DM answers itself, without calling either
/// driver (section 4.3 "self-served requests").
pub const SQL_ATTR_TTDM_VERSION: i32 = 20000;
pub const SQL_ATTR_TTDM_CAPABILITIES: i32 = 20001;

/// `GetConnectAttr`/`GetConnectOption` extension, see section 6.
pub const TTDM_CONNECTION_TYPE: i32 = SQL_CONNECT_OPT_DRVR_START + 3000;
/// Matches ODBC's `SQL_CONNECT_OPT_DRVR_START`, the start of the driver-reserved
/// connect-option range.
const SQL_CONNECT_OPT_DRVR_START: i32 = 1000;

/// Bits of the capability bitmask returned by `GetEnvAttr(CAPABILITIES)`.
pub mod capability {
    pub const CLIENT: u32 = 0x01;
    pub const DIRECT: u32 = 0x02;
    pub const CHANGE_CAPTURE: u32 = 0x04;
    pub const ROUTING: u32 = 0x08;
    pub const UTILITY: u32 = 0x10;
}

/// Values returned by the connection-type self-served request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ConnectionType {
    None = 0,
    Direct = 1,
    Client = 2,
}

/// DM-authored native error codes, see section 7 and `ttdrvmgr.h`.
pub mod native_error {
    pub const NO_MEMORY: i32 = 90000;
    pub const DRIVER_LOAD: i32 = 90001;
    pub const NOT_DISCONNECTED: i32 = 90002;
    pub const INVALID_ARG: i32 = 90003;
}

/// The ODBC version family the DM declares to the application and the drivers, see
/// the `odbc_version_2`/`odbc_version_3_80` Cargo features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OdbcVersion {
    V2,
    V3,
}

impl OdbcVersion {
    pub const fn current() -> Self {
        if cfg!(feature = "odbc_version_2") {
            OdbcVersion::V2
        } else {
            OdbcVersion::V3
        }
    }

    /// State-code prefix used for DM-authored argument/sequence errors (section 7):
    /// ODBC 2 uses `S1...`, ODBC 3 uses `HY...`.
    pub fn state_prefix(self) -> &'static str {
        match self {
            OdbcVersion::V2 => "S1",
            OdbcVersion::V3 => "HY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_type_values_match_header() {
        assert_eq!(ConnectionType::None as i32, 0);
        assert_eq!(ConnectionType::Direct as i32, 1);
        assert_eq!(ConnectionType::Client as i32, 2);
    }

    #[test]
    fn capability_bits_are_distinct_powers_of_two() {
        let bits = [
            capability::CLIENT,
            capability::DIRECT,
            capability::CHANGE_CAPTURE,
            capability::ROUTING,
            capability::UTILITY,
        ];
        for (i, a) in bits.iter().enumerate() {
            assert_eq!(a.count_ones(), 1);
            for b in &bits[i + 1..] {
                assert_eq!(a & b, 0);
            }
        }
    }
}
