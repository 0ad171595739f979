use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::AppResult;
use crate::record::{RECORD_HEADERS, ScoreRecord};

/// Flat CSV file holding every score record
///
/// Saving is append-by-rewrite: the whole file is read, the new row pushed and
/// the whole file written back. Callers serialize access within the process.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a header-only record file when none exists
    pub fn ensure_file(&self) -> AppResult<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(RECORD_HEADERS)?;
        writer.flush()?;
        log::info!("created empty record file {}", self.path.display());
        Ok(())
    }

    /// Read every record, creating the file first if needed
    pub fn load(&self) -> AppResult<Vec<ScoreRecord>> {
        self.ensure_file()?;

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for result in reader.deserialize::<ScoreRecord>() {
            records.push(result?);
        }
        Ok(records)
    }

    /// Append one record and return the reloaded dataset
    ///
    /// The whole file is read, extended and written back, so the caller must
    /// hold the store's lock for the duration.
    ///
    /// # Arguments
    /// * `record` - The new row, already validated and stamped
    ///
    /// # Returns
    /// * A Result containing every record in the file after the write
    ///
    /// # Errors
    /// * Returns `AppError::Csv` if the existing file cannot be parsed
    /// * Returns `AppError::Csv` or `AppError::Io` if the file cannot be written
    pub fn append(&self, record: ScoreRecord) -> AppResult<Vec<ScoreRecord>> {
        let mut records = self.load()?;
        records.push(record);
        self.write_all(&records)?;
        self.load()
    }

    /// The record file exactly as stored on disk
    pub fn raw_bytes(&self) -> AppResult<Vec<u8>> {
        self.ensure_file()?;
        Ok(fs::read(&self.path)?)
    }

    /// Remove the record file. There is no backup.
    pub fn delete_all(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, records: &[ScoreRecord]) -> AppResult<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        if records.is_empty() {
            writer.write_record(RECORD_HEADERS)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
