//! Struct archiving functionality
//!
//! Records are written as rows of a CSV file inside the session's archive
//! directory. Records must be flat structs, CSV cannot hold nested
//! sequences.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::path::Path;
use std::fs::{File, OpenOptions};
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
pub struct Archiver {
    writer: Writer<File>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file: {0}")]
    FileCreateError(std::io::Error),

    #[error("Cannot write the record: {0}")]
    WriteError(csv::Error),

    #[error("Cannot flush the archive: {0}")]
    FlushError(std::io::Error)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    ///
    /// Parent directories are created if they do not exist.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, ArchiveError> {
        let mut session_path = session.arch_root.clone();
        session_path.push(path);

        if let Some(parent) = session_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(ArchiveError::FileCreateError)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(session_path)
            .map_err(ArchiveError::FileCreateError)?;

        let writer = WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        Ok(Self { writer })
    }

    /// Serialise a record into the archive.
    ///
    /// The header row is written before the first record.
    pub fn serialise<T: Serialize>(
        &mut self, record: T
    ) -> Result<(), ArchiveError> {
        self.writer
            .serialize(record)
            .map_err(ArchiveError::WriteError)?;
        self.writer.flush().map_err(ArchiveError::FlushError)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        cycle: u64,
        pitch_deg: Option<f64>,
        arrived: bool
    }

    #[test]
    fn test_session_archive() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("util_archive_test_{}", std::process::id()));

        // The epoch can only be set once per process, so this is the only
        // test which creates a session.
        let session = Session::new_in("test_exec", dir.clone()).unwrap();
        assert!(session.arch_root.exists());
        assert!(crate::session::get_elapsed_seconds() >= 0.0);

        let mut arch = Archiver::from_path(&session, "ctrl/report.csv").unwrap();
        arch.serialise(Row { cycle: 0, pitch_deg: Some(5.0), arrived: false }).unwrap();
        arch.serialise(&Row { cycle: 1, pitch_deg: None, arrived: true }).unwrap();

        let mut path = session.arch_root.clone();
        path.push("ctrl/report.csv");
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text, "cycle,pitch_deg,arrived\n0,5.0,false\n1,,true\n");

        std::fs::remove_dir_all(dir).ok();
    }
}
