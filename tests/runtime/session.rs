//! Integration tests for Session
//!
//! Tests register naming, persistence, and evaluation against a session.

use scalc_foundation::EvalConfig;
use scalc_runtime::{Register, Session, from_bytes, load_from_file, save_to_file, to_bytes};

#[test]
fn session_is_register_storage() {
    let mut session = Session::new();
    session.assign(Register::Numeric(0), "4");
    let out = scalc_language::eval("A:=SQRT(A);BB:='r='+STR(A);BB", &mut session).unwrap();
    assert_eq!(out.text, "r=2");
    assert_eq!(session.numbers()[0], 2.0);
    assert_eq!(session.strings()[1], "r=2");
}

#[test]
fn every_register_name_parses() {
    for (i, c) in ('A'..='P').enumerate() {
        assert_eq!(Register::parse(&c.to_string()), Some(Register::Numeric(i)));
    }
    for (i, c) in ('A'..='L').enumerate() {
        assert_eq!(Register::parse(&format!("{c}{c}")), Some(Register::Text(i)));
    }
}

#[test]
fn config_survives_persistence() {
    let session = Session::with_config(EvalConfig::new().with_loop_max(3).with_trace(true));
    let restored = from_bytes(&to_bytes(&session).unwrap()).unwrap();
    assert_eq!(restored.config(), session.config());
}

#[test]
fn file_roundtrip_keeps_registers() {
    let mut session = Session::new();
    session.assign(Register::Numeric(7), "-1.5");
    session.assign(Register::Text(3), "dd");

    let path = std::env::temp_dir().join("scalc_integration_session.msgpack");
    save_to_file(&session, &path).unwrap();
    let restored = load_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(restored.numbers()[7], -1.5);
    assert_eq!(restored.strings()[3], "dd");
}

#[test]
fn truncated_file_fails_to_load() {
    let bytes = to_bytes(&Session::new()).unwrap();
    assert!(from_bytes(&bytes[..bytes.len() / 2]).is_err());
}
