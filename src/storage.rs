// src/storage.rs

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::models::candidate::CandidateRecord;

/// Header row of the record table, in column order.
pub const TABLE_HEADER: [&str; 8] = [
    "Answer Key Link",
    "Category",
    "Roll Number",
    "Candidate Name",
    "Venue Name",
    "Exam Date",
    "Exam Time",
    "Total Marks",
];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("record table I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("record table {path} is malformed: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("record table lock poisoned")]
    Poisoned,
}

/// Flat, append-only table of candidate records.
///
/// No lock spans `exists` followed by `append`; callers racing on the same
/// roll number may both append.
pub trait RecordTable: Send + Sync {
    /// Returns every row in insertion order.
    fn read_all(&self) -> Result<Vec<CandidateRecord>, StorageError>;

    /// Appends one row.
    fn append(&self, record: &CandidateRecord) -> Result<(), StorageError>;

    fn exists(&self, roll_number: &str) -> Result<bool, StorageError> {
        Ok(self
            .read_all()?
            .iter()
            .any(|record| record.roll_number == roll_number))
    }
}

/// Record table backed by a CSV file with a fixed header row.
#[derive(Debug, Clone)]
pub struct CsvTable {
    path: PathBuf,
}

impl CsvTable {
    /// Opens the table at `path`, writing a header-only file if none exists yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let table = Self { path: path.into() };
        let needs_header = match fs::metadata(&table.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(table.io_error(e)),
        };
        if needs_header {
            table.write_header()?;
            tracing::info!("Created record table at {}", table.path.display());
        }
        Ok(table)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_header(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let mut writer = csv::Writer::from_path(&self.path).map_err(|e| self.csv_error(e))?;
        writer
            .write_record(TABLE_HEADER)
            .map_err(|e| self.csv_error(e))?;
        writer.flush().map_err(|e| self.io_error(e))
    }

    fn reader(&self) -> Result<csv::Reader<fs::File>, StorageError> {
        csv::Reader::from_path(&self.path).map_err(|e| self.csv_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> StorageError {
        StorageError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordTable for CsvTable {
    fn read_all(&self) -> Result<Vec<CandidateRecord>, StorageError> {
        self.reader()?
            .deserialize()
            .collect::<Result<Vec<CandidateRecord>, _>>()
            .map_err(|e| self.csv_error(e))
    }

    fn append(&self, record: &CandidateRecord) -> Result<(), StorageError> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(record).map_err(|e| self.csv_error(e))?;
        writer.flush().map_err(|e| self.io_error(e))
    }

    fn exists(&self, roll_number: &str) -> Result<bool, StorageError> {
        for row in self.reader()?.deserialize::<CandidateRecord>() {
            if row.map_err(|e| self.csv_error(e))?.roll_number == roll_number {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// In-memory record table.
#[derive(Debug, Default)]
pub struct MemoryTable {
    rows: Mutex<Vec<CandidateRecord>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<CandidateRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

impl RecordTable for MemoryTable {
    fn read_all(&self) -> Result<Vec<CandidateRecord>, StorageError> {
        Ok(self.rows.lock().map_err(|_| StorageError::Poisoned)?.clone())
    }

    fn append(&self, record: &CandidateRecord) -> Result<(), StorageError> {
        self.rows
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(roll_number: &str, total_marks: f64) -> CandidateRecord {
        CandidateRecord {
            source_link: "https://example.com/key?id=1".to_string(),
            category: "General".to_string(),
            roll_number: roll_number.to_string(),
            candidate_name: "Asha, K".to_string(),
            venue_name: "Venue Name not found".to_string(),
            exam_date: "12/03/2024".to_string(),
            exam_time: "9:00 AM - 10:00 AM".to_string(),
            total_marks,
        }
    }

    fn temp_table_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("scorecard_{}", uuid::Uuid::new_v4()))
            .join("data.csv")
    }

    #[test]
    fn open_writes_header_only_file() {
        let path = temp_table_path();
        let table = CsvTable::open(&path).unwrap();

        let contents = fs::read_to_string(table.path()).unwrap();
        assert_eq!(
            contents.trim_end(),
            "Answer Key Link,Category,Roll Number,Candidate Name,Venue Name,Exam Date,Exam Time,Total Marks"
        );
        assert!(table.read_all().unwrap().is_empty());
        assert!(!table.exists("1001").unwrap());
    }

    #[test]
    fn csv_rows_survive_reopen() {
        let path = temp_table_path();
        let table = CsvTable::open(&path).unwrap();
        table.append(&record("1001", 115.0)).unwrap();
        table.append(&record("1002", 97.5)).unwrap();

        // Reopening must not truncate or duplicate the header.
        let reopened = CsvTable::open(&path).unwrap();
        let rows = reopened.read_all().unwrap();
        assert_eq!(rows, vec![record("1001", 115.0), record("1002", 97.5)]);
        assert!(reopened.exists("1002").unwrap());
        assert!(!reopened.exists("1003").unwrap());
    }

    #[test]
    fn malformed_marks_surface_as_csv_error() {
        let path = temp_table_path();
        let table = CsvTable::open(&path).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        std::io::Write::write_all(&mut file, b"l,G,1,n,v,d,t,abc\n").unwrap();

        assert!(matches!(table.read_all(), Err(StorageError::Csv { .. })));
    }

    #[test]
    fn memory_table_keeps_insertion_order() {
        let table = MemoryTable::new();
        table.append(&record("b", 1.0)).unwrap();
        table.append(&record("a", 2.0)).unwrap();

        let rolls: Vec<_> = table
            .read_all()
            .unwrap()
            .into_iter()
            .map(|r| r.roll_number)
            .collect();
        assert_eq!(rolls, ["b", "a"]);
        assert!(table.exists("a").unwrap());
    }
}
