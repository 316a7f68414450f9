use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, error};
use rusqlite::{ffi, params, Connection, Row};

use crate::error::StorageError;
use crate::models::{LearningRecord, RecordFields};

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_COLUMNS: &str = r#"
    SELECT Serial_no, Date, Time_From, Time_To, Topic, Type_of_Learning,
           Duration_min, Focus_Level, Difficulty, Energy_Level,
           Distraction_Level, Completion_Percentage, Learning_Mode, Completion_Rate
    FROM learning_data
"#;

/// CRUD access to the `learning_data` table.
///
/// Every operation opens its own connection and drops it before returning, so
/// no two calls share a transaction. A `fetch_by_key` followed by `update` is
/// not atomic; this store assumes one interactive user.
pub struct RecordStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl RecordStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        Ok(Self {
            path,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        })
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        let conn = Connection::open(&self.path).map_err(|source| {
            error!("Failed to open {}: {}", self.path.display(), source);
            StorageError::Open {
                path: self.path.clone(),
                source,
            }
        })?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }

    pub fn init(&self) -> Result<(), StorageError> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS learning_data (
                Serial_no INTEGER PRIMARY KEY,
                Date TEXT NOT NULL,
                Time_From TEXT NOT NULL,
                Time_To TEXT NOT NULL,
                Topic TEXT NOT NULL,
                Type_of_Learning TEXT NOT NULL,
                Duration_min INTEGER NOT NULL,
                Focus_Level INTEGER NOT NULL,
                Difficulty INTEGER NOT NULL,
                Energy_Level INTEGER NOT NULL,
                Distraction_Level INTEGER NOT NULL,
                Completion_Percentage REAL NOT NULL,
                Learning_Mode TEXT NOT NULL,
                Completion_Rate REAL NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_learning_topic ON learning_data(Topic);
            "#,
        )?;
        debug!("Initialized learning_data at {}", self.path.display());
        Ok(())
    }

    pub fn fetch_all(&self) -> Result<Vec<LearningRecord>, StorageError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY Serial_no", SELECT_COLUMNS))?;

        let rows = stmt.query_map([], row_to_record)?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Fetched {} records", records.len());
        Ok(records)
    }

    pub fn fetch_by_key(&self, serial_no: i64) -> Result<Option<LearningRecord>, StorageError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("{} WHERE Serial_no = ?1", SELECT_COLUMNS))?;

        match stmt.query_row(params![serial_no], row_to_record) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                debug!("No record with Serial_no {}", serial_no);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fails with `DuplicateKey` if the serial number is taken; the table is left untouched.
    pub fn insert(&self, record: &LearningRecord) -> Result<(), StorageError> {
        let conn = self.connect()?;
        let result = conn.execute(
            r#"
            INSERT INTO learning_data (
                Serial_no, Date, Time_From, Time_To, Topic, Type_of_Learning,
                Duration_min, Focus_Level, Difficulty, Energy_Level,
                Distraction_Level, Completion_Percentage, Learning_Mode, Completion_Rate
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                record.serial_no,
                record.date,
                record.time_from,
                record.time_to,
                record.topic,
                record.type_of_learning,
                record.duration_min,
                record.focus_level,
                record.difficulty,
                record.energy_level,
                record.distraction_level,
                record.completion_percentage,
                record.learning_mode,
                record.completion_rate,
            ],
        );

        match result {
            Ok(_) => {
                debug!("Inserted record {}", record.serial_no);
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Err(StorageError::DuplicateKey(record.serial_no))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces every non-key column. Returns the number of rows changed, which is
    /// zero when no record has this serial number.
    pub fn update(&self, serial_no: i64, fields: &RecordFields) -> Result<usize, StorageError> {
        let conn = self.connect()?;
        let rows = conn.execute(
            r#"
            UPDATE learning_data
            SET Date = ?1, Time_From = ?2, Time_To = ?3, Topic = ?4, Type_of_Learning = ?5,
                Duration_min = ?6, Focus_Level = ?7, Difficulty = ?8, Energy_Level = ?9,
                Distraction_Level = ?10, Completion_Percentage = ?11, Learning_Mode = ?12,
                Completion_Rate = ?13
            WHERE Serial_no = ?14
            "#,
            params![
                fields.date,
                fields.time_from,
                fields.time_to,
                fields.topic,
                fields.type_of_learning,
                fields.duration_min,
                fields.focus_level,
                fields.difficulty,
                fields.energy_level,
                fields.distraction_level,
                fields.completion_percentage,
                fields.learning_mode,
                fields.completion_rate,
                serial_no,
            ],
        )?;
        debug!("Updated record {} ({} rows)", serial_no, rows);
        Ok(rows)
    }

    /// Returns the number of rows removed; a missing key is not an error.
    pub fn delete(&self, serial_no: i64) -> Result<usize, StorageError> {
        let conn = self.connect()?;
        let rows = conn.execute(
            "DELETE FROM learning_data WHERE Serial_no = ?1",
            params![serial_no],
        )?;
        debug!("Deleted record {} ({} rows)", serial_no, rows);
        Ok(rows)
    }
}

fn row_to_record(row: &Row) -> rusqlite::Result<LearningRecord> {
    Ok(LearningRecord {
        serial_no: row.get(0)?,
        date: row.get(1)?,
        time_from: row.get(2)?,
        time_to: row.get(3)?,
        topic: row.get(4)?,
        type_of_learning: row.get(5)?,
        duration_min: row.get(6)?,
        focus_level: row.get(7)?,
        difficulty: row.get(8)?,
        energy_level: row.get(9)?,
        distraction_level: row.get(10)?,
        completion_percentage: row.get(11)?,
        learning_mode: row.get(12)?,
        completion_rate: row.get(13)?,
    })
}

#[cfg(test)]
pub(crate) fn temp_store() -> (tempfile::TempDir, RecordStore) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = RecordStore::open(dir.path().join("studylog.db")).expect("Failed to open store");
    store.init().expect("Failed to initialize store");
    (dir, store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_record;

    mod init_tests {
        use super::*;

        #[test]
        fn init_creates_table() {
            let (_dir, store) = temp_store();
            let conn = store.connect().unwrap();
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM learning_data", [], |row| row.get(0))
                .expect("learning_data table should exist");
            assert_eq!(count, 0);
        }

        #[test]
        fn init_is_idempotent() {
            let (_dir, store) = temp_store();
            store.insert(&sample_record(1)).unwrap();

            store.init().expect("Re-init should succeed");

            assert_eq!(store.fetch_all().unwrap().len(), 1);
        }

        #[test]
        fn open_creates_parent_directory() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join("deeper").join("log.db");
            let store = RecordStore::open(&path).unwrap();
            store.init().unwrap();
            assert!(path.exists());
        }

        #[test]
        fn fetch_without_table_is_storage_error() {
            let dir = tempfile::tempdir().unwrap();
            let store = RecordStore::open(dir.path().join("empty.db")).unwrap();
            assert!(matches!(store.fetch_all(), Err(StorageError::Query(_))));
        }

        #[test]
        fn directory_as_database_is_query_error() {
            let dir = tempfile::tempdir().unwrap();
            let store = RecordStore::open(dir.path()).unwrap();
            assert!(matches!(store.fetch_all(), Err(StorageError::Query(_))));
        }

        #[test]
        fn parent_under_a_file_is_io_error() {
            let dir = tempfile::tempdir().unwrap();
            let file = dir.path().join("plain");
            std::fs::write(&file, b"not a directory").unwrap();

            let result = RecordStore::open(file.join("sub").join("log.db"));

            assert!(matches!(result, Err(StorageError::Io { .. })));
        }
    }

    mod fetch_tests {
        use super::*;

        #[test]
        fn fetch_all_empty() {
            let (_dir, store) = temp_store();
            assert!(store.fetch_all().unwrap().is_empty());
        }

        #[test]
        fn fetch_all_returns_every_record_by_serial() {
            let (_dir, store) = temp_store();
            store.insert(&sample_record(3)).unwrap();
            store.insert(&sample_record(1)).unwrap();
            store.insert(&sample_record(2)).unwrap();

            let serials: Vec<i64> = store
                .fetch_all()
                .unwrap()
                .iter()
                .map(|r| r.serial_no)
                .collect();
            assert_eq!(serials, vec![1, 2, 3]);
        }

        #[test]
        fn fetch_by_key_not_found() {
            let (_dir, store) = temp_store();
            assert!(store.fetch_by_key(999).unwrap().is_none());
        }
    }

    mod insert_tests {
        use super::*;

        #[test]
        fn insert_then_fetch_by_key_returns_same_record() {
            let (_dir, store) = temp_store();
            let mut record = sample_record(10);
            record.time_to = chrono::NaiveTime::from_hms_opt(10, 15, 42).unwrap();
            record.completion_rate = 66.5;

            store.insert(&record).unwrap();

            assert_eq!(store.fetch_by_key(10).unwrap(), Some(record));
        }

        #[test]
        fn insert_duplicate_key_fails_without_changing_state() {
            let (_dir, store) = temp_store();
            store.insert(&sample_record(1)).unwrap();

            let mut duplicate = sample_record(1);
            duplicate.topic = "History".to_string();
            let result = store.insert(&duplicate);

            assert!(matches!(result, Err(StorageError::DuplicateKey(1))));
            let kept = store.fetch_by_key(1).unwrap().unwrap();
            assert_eq!(kept.topic, "Math");
            assert_eq!(store.fetch_all().unwrap().len(), 1);
        }

        #[test]
        fn not_null_violation_is_not_reported_as_duplicate() {
            let (_dir, store) = temp_store();
            let mut record = sample_record(5);
            // SQLite stores NaN as NULL, which trips NOT NULL
            record.completion_rate = f64::NAN;

            let result = store.insert(&record);

            assert!(matches!(result, Err(StorageError::Query(_))));
            assert!(store.fetch_all().unwrap().is_empty());
        }
    }

    mod update_tests {
        use super::*;

        #[test]
        fn update_replaces_non_key_fields() {
            let (_dir, store) = temp_store();
            store.insert(&sample_record(5)).unwrap();

            let mut fields = sample_record(5).fields();
            fields.topic = "Physics".to_string();
            fields.duration_min = 45;
            fields.learning_mode = "Offline".to_string();
            fields.completion_rate = 99.0;

            let rows = store.update(5, &fields).unwrap();
            assert_eq!(rows, 1);

            let updated = store.fetch_by_key(5).unwrap().unwrap();
            assert_eq!(updated, LearningRecord::from_parts(5, fields));
        }

        #[test]
        fn update_leaves_other_records_alone() {
            let (_dir, store) = temp_store();
            store.insert(&sample_record(1)).unwrap();
            store.insert(&sample_record(2)).unwrap();

            let mut fields = sample_record(1).fields();
            fields.topic = "Chemistry".to_string();
            store.update(1, &fields).unwrap();

            assert_eq!(store.fetch_by_key(2).unwrap(), Some(sample_record(2)));
        }

        #[test]
        fn update_missing_key_is_silent_no_op() {
            let (_dir, store) = temp_store();
            store.insert(&sample_record(1)).unwrap();
            let before = store.fetch_all().unwrap();

            let rows = store.update(42, &sample_record(42).fields()).unwrap();

            assert_eq!(rows, 0);
            assert_eq!(store.fetch_all().unwrap(), before);
            assert!(store.fetch_by_key(42).unwrap().is_none());
        }
    }

    mod delete_tests {
        use super::*;

        #[test]
        fn delete_then_fetch_returns_none() {
            let (_dir, store) = temp_store();
            store.insert(&sample_record(8)).unwrap();

            assert_eq!(store.delete(8).unwrap(), 1);
            assert!(store.fetch_by_key(8).unwrap().is_none());
        }

        #[test]
        fn delete_missing_key_is_silent_no_op() {
            let (_dir, store) = temp_store();
            store.insert(&sample_record(1)).unwrap();
            let before = store.fetch_all().unwrap();

            assert_eq!(store.delete(77).unwrap(), 0);
            assert_eq!(store.fetch_all().unwrap(), before);
        }

        #[test]
        fn deleted_key_can_be_reused() {
            let (_dir, store) = temp_store();
            store.insert(&sample_record(1)).unwrap();
            store.delete(1).unwrap();
            store.insert(&sample_record(1)).unwrap();
            assert!(store.fetch_by_key(1).unwrap().is_some());
        }
    }
}
