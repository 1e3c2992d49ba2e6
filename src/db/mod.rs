// Detection log - SQLite connection, migrations, append-only queries.
//
// The store is deliberately narrow: detections can be appended and read
// back, never updated or deleted. Persistence is decoupled from delivery;
// a failed append is logged by the scheduler and never blocks the callback.

use rusqlite::{params, Connection};
use std::path::Path;

use crate::detect::ChordDetection;
use crate::error::Result;

/// One persisted detection, as read back from the log.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRecord {
    pub id: i64,
    pub source_id: String,
    pub chord: String,
    pub confidence: f64,
    /// Media-clock timestamp of the analyzed frame (seconds).
    pub timestamp: f64,
    /// Detection method tag ("local" or "backend").
    pub method: String,
    /// Wall-clock time the row was inserted.
    pub detected_at: Option<String>,
}

/// Append-only SQLite log of accepted detections.
pub struct DetectionStore {
    conn: Connection,
}

impl DetectionStore {
    /// Open (or create) a store at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = DetectionStore { conn };
        store.run_migrations()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = DetectionStore { conn };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migration_001 = include_str!("migrations/001_init.sql");
        self.conn.execute_batch(migration_001)?;
        Ok(())
    }

    /// Append one detection for a source. Returns the new row id.
    pub fn append(&self, source_id: &str, detection: &ChordDetection) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO detections (source_id, chord, confidence, timestamp, method)
             VALUES (?, ?, ?, ?, ?)",
            params![
                source_id,
                detection.chord,
                detection.confidence as f64,
                detection.timestamp,
                detection.method.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All detections for a source, ordered by frame timestamp.
    pub fn detections_for_source(&self, source_id: &str) -> Result<Vec<DetectionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, source_id, chord, confidence, timestamp, method, detected_at
             FROM detections WHERE source_id = ?
             ORDER BY timestamp, id",
        )?;

        let records = stmt.query_map([source_id], |row| {
            Ok(DetectionRecord {
                id: row.get(0)?,
                source_id: row.get(1)?,
                chord: row.get(2)?,
                confidence: row.get(3)?,
                timestamp: row.get(4)?,
                method: row.get(5)?,
                detected_at: row.get(6)?,
            })
        })?;

        Ok(records.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Count detections for a source.
    pub fn count_detections(&self, source_id: &str) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM detections WHERE source_id = ?",
            [source_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::DetectionMethod;

    fn detection(chord: &str, timestamp: f64) -> ChordDetection {
        ChordDetection {
            chord: chord.to_string(),
            confidence: 0.8,
            timestamp,
            method: DetectionMethod::Local,
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let store = DetectionStore::new_in_memory().unwrap();
        let id = store.append("deck-a", &detection("C", 1.5)).unwrap();
        assert!(id > 0);

        let records = store.detections_for_source("deck-a").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chord, "C");
        assert_eq!(records[0].timestamp, 1.5);
        assert_eq!(records[0].method, "local");
        assert!((records[0].confidence - 0.8).abs() < 1e-6);
        assert!(records[0].detected_at.is_some());
    }

    #[test]
    fn test_records_ordered_by_timestamp() {
        let store = DetectionStore::new_in_memory().unwrap();
        store.append("deck-a", &detection("G", 3.0)).unwrap();
        store.append("deck-a", &detection("C", 1.0)).unwrap();
        store.append("deck-a", &detection("Am", 2.0)).unwrap();

        let chords: Vec<String> = store
            .detections_for_source("deck-a")
            .unwrap()
            .into_iter()
            .map(|r| r.chord)
            .collect();
        assert_eq!(chords, ["C", "Am", "G"]);
    }

    #[test]
    fn test_sources_are_isolated() {
        let store = DetectionStore::new_in_memory().unwrap();
        store.append("deck-a", &detection("C", 1.0)).unwrap();
        store.append("deck-b", &detection("Em", 1.0)).unwrap();

        assert_eq!(store.count_detections("deck-a").unwrap(), 1);
        assert_eq!(store.count_detections("deck-b").unwrap(), 1);
        assert_eq!(store.count_detections("deck-c").unwrap(), 0);
        assert_eq!(
            store.detections_for_source("deck-b").unwrap()[0].chord,
            "Em"
        );
    }

    #[test]
    fn test_on_disk_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detections.db");

        {
            let store = DetectionStore::new(&path).unwrap();
            store.append("deck-a", &detection("F", 4.2)).unwrap();
        }

        let store = DetectionStore::new(&path).unwrap();
        let records = store.detections_for_source("deck-a").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chord, "F");
    }

    #[test]
    fn test_backend_method_tag_round_trips() {
        let store = DetectionStore::new_in_memory().unwrap();
        let d = ChordDetection {
            chord: "Dm".to_string(),
            confidence: 0.6,
            timestamp: 9.0,
            method: DetectionMethod::Backend,
        };
        store.append("deck-a", &d).unwrap();
        assert_eq!(
            store.detections_for_source("deck-a").unwrap()[0].method,
            "backend"
        );
    }
}
