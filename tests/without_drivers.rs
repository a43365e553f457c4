//! Exercises the parts of ttdrvmgr that are deterministic even with neither the
//! direct nor the client TimesTen library installed on the test machine: the
//! registry's failure path, the self-served constants, and the pure-logic pieces
//! of the handle layer. A real end-to-end run against live `libttdirect`/
//! `libttclient` belongs in a separate, environment-gated suite this crate does
//! not carry (no such drivers exist in this retrieval pack or in CI).

use ttdrvmgr::{ConnectionType, DmError, HandleKind, OdbcVersion};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn allocating_an_environment_without_either_driver_fails() {
    init();
    let result = ttdrvmgr::registry::alloc_environment();
    assert!(matches!(result, Err(DmError::NoDriverAvailable)));
    assert_eq!(ttdrvmgr::registry::environment_count(), 0);
}

#[test]
fn allocating_a_utility_handle_without_the_utility_library_fails() {
    init();
    let result = ttdrvmgr::registry::alloc_utility_handle();
    assert!(result.is_err());
}

#[test]
fn handle_kind_maps_to_the_odbc_handle_type_it_stands_in_for() {
    use odbc_sys::HandleType;

    assert_eq!(HandleKind::Environment.native_handle_type(), Some(HandleType::Env));
    assert_eq!(HandleKind::Connection.native_handle_type(), Some(HandleType::Dbc));
    assert_eq!(HandleKind::Statement.native_handle_type(), Some(HandleType::Stmt));
    assert_eq!(HandleKind::Descriptor.native_handle_type(), Some(HandleType::Desc));
    assert_eq!(HandleKind::ChangeCapture.native_handle_type(), None);
    assert_eq!(HandleKind::Utility.native_handle_type(), None);
}

#[test]
fn connection_type_values_match_the_recovered_header_constants() {
    assert_eq!(ConnectionType::None as i32, 0);
    assert_eq!(ConnectionType::Direct as i32, 1);
    assert_eq!(ConnectionType::Client as i32, 2);
}

#[test]
fn odbc_version_resolves_from_the_crate_features() {
    // Exactly one of the two feature gates is compiled in at a time; whichever it
    // is, the declared state-code prefix must agree with it (section 7).
    match OdbcVersion::current() {
        OdbcVersion::V2 => assert_eq!(OdbcVersion::V2.state_prefix(), "S1"),
        OdbcVersion::V3 => assert_eq!(OdbcVersion::V3.state_prefix(), "HY"),
    }
}

#[test]
fn dm_error_messages_are_stable_text() {
    let err = DmError::InvalidArgument("negative buffer length".into());
    assert_eq!(
        err.to_string(),
        "invalid argument: negative buffer length"
    );
    assert_eq!(DmError::InvalidHandle.to_string(), "invalid handle");
}
