//! Session serialization and deserialization using `MessagePack`.
//!
//! This module provides functions for saving and loading the register file
//! and configuration of a [`Session`] to/from files using the `MessagePack`
//! binary format.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use scalc_foundation::{Error, ErrorKind, Result};
use tracing::debug;

use crate::session::Session;

/// Serializes a session to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(session: &Session) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(session)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Deserializes a session from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn from_bytes(bytes: &[u8]) -> Result<Session> {
    rmp_serde::from_slice(bytes)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Saves a session to a file using `MessagePack` format.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to,
/// or if serialization fails.
pub fn save_to_file<P: AsRef<Path>>(session: &Session, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to create file '{}': {e}",
            path.display()
        )))
    })?;

    let mut writer = BufWriter::new(file);
    let bytes = to_bytes(session)?;

    writer.write_all(&bytes).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to write to file '{}': {e}",
            path.display()
        )))
    })?;

    writer.flush().map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to flush file '{}': {e}",
            path.display()
        )))
    })?;

    debug!(target: "scalc::session", path = %path.display(), bytes = bytes.len(), "saved");
    Ok(())
}

/// Loads a session from a `MessagePack` file.
///
/// The loaded session's load path is left at its default; callers restoring
/// into a live session should use [`Session::restore`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or if deserialization fails.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Session> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to open file '{}': {e}",
            path.display()
        )))
    })?;

    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();

    reader.read_to_end(&mut bytes).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to read file '{}': {e}",
            path.display()
        )))
    })?;

    debug!(target: "scalc::session", path = %path.display(), bytes = bytes.len(), "loaded");
    from_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Register;
    use scalc_foundation::{EvalConfig, FixedString};
    use scalc_language::Outcome;

    fn create_test_session() -> Session {
        let mut session = Session::with_config(EvalConfig::new().with_loop_max(25).with_seed(7));
        session.assign(Register::Numeric(0), "1.25");
        session.assign(Register::Numeric(15), "-3");
        session.assign(Register::Text(0), "alpha");
        session.assign(Register::Text(11), "\u{1}binary\u{7f}");
        session.record(&Outcome {
            number: 42.0,
            text: FixedString::from("42"),
        });
        session
    }

    #[test]
    fn roundtrip_bytes() {
        let session = create_test_session();

        let bytes = to_bytes(&session).expect("serialization failed");
        assert!(!bytes.is_empty());

        let restored = from_bytes(&bytes).expect("deserialization failed");

        assert_eq!(restored.numbers(), session.numbers());
        assert_eq!(restored.strings(), session.strings());
        assert_eq!(restored.previous(), session.previous());
        assert_eq!(restored.config(), session.config());
    }

    #[test]
    fn roundtrip_file() {
        let session = create_test_session();

        let temp_path = std::env::temp_dir().join("scalc_test_session.msgpack");

        save_to_file(&session, &temp_path).expect("save failed");
        let restored = load_from_file(&temp_path).expect("load failed");

        assert_eq!(restored.numbers(), session.numbers());
        assert_eq!(restored.strings()[0], "alpha");
        assert_eq!(restored.config().loop_max, 25);
        assert_eq!(restored.config().seed, 7);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn garbage_bytes_fail() {
        let err = from_bytes(&[0xc1, 0x00, 0x13]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SerializationError(_)));
    }

    #[test]
    fn load_nonexistent_file_fails() {
        let err = load_from_file("/nonexistent/path/to/session.msgpack").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::IoError(_)));
    }
}
