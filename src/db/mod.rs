mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StreetError};
use crate::models::*;

// The pair is bound as JSON text encoded by serde_json. Binding REALs would let
// SQLite render them with 15 significant digits.
const APPEND_POINT_SQL: &str =
    "UPDATE streets SET geometry = json_insert(geometry, '$[#]', json(?1))
     WHERE id = ?2";

// SQLite has no array-prepend primitive, so the new pair is spliced in front of
// the minified array text. Still a single statement against the row.
const PREPEND_POINT_SQL: &str =
    "UPDATE streets SET geometry = json(
         '[' || json(?1) ||
         CASE WHEN json_array_length(geometry) = 0 THEN ']'
              ELSE ',' || substr(json(geometry), 2)
         END)
     WHERE id = ?2";

/// Example streets inserted by `street seed`.
const EXAMPLE_STREETS: &[(&str, i64, [[f64; 2]; 2])] = &[
    ("Example 1", 150, [[-122.333056, 47.609722], [-122.123889, 47.669444]]),
    ("Example 2", 300, [[-122.431297, 37.773972], [48.7801, 9.1815]]),
    ("Example 3", 250, [[85.6522352, 25.983223], [80.2321312, 25.563213]]),
];

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> anyhow::Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "street-service")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("streets.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> anyhow::Result<()> {
        let conn = self.lock();
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }

    // ============================================================
    // Street CRUD
    // ============================================================

    pub fn create_street(&self, input: CreateStreetInput) -> Result<Street> {
        validate_name(&input.name)?;
        let geometry = input.coordinates();
        validate_geometry(&geometry)?;

        let conn = self.lock();
        conn.execute(
            "INSERT INTO streets (name, capacity, geometry) VALUES (?1, ?2, ?3)",
            params![&input.name, input.capacity, encode_geometry(&geometry)?],
        )?;
        let id = conn.last_insert_rowid();

        tracing::info!("Created street '{}' with id {}", input.name, id);

        Ok(Street {
            id,
            name: input.name,
            capacity: input.capacity,
            geometry,
        })
    }

    pub fn get_street(&self, id: i64) -> Result<Option<Street>> {
        let conn = self.lock();
        let row = conn
            .query_row(
                "SELECT id, name, capacity, geometry FROM streets WHERE id = ?1",
                [id],
                StreetRow::from_row,
            )
            .optional()?;

        row.map(StreetRow::into_street).transpose()
    }

    pub fn list_streets(&self) -> Result<Vec<Street>> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT id, name, capacity, geometry FROM streets ORDER BY id")?;

        let rows = stmt
            .query_map([], StreetRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(StreetRow::into_street).collect()
    }

    pub fn delete_street(&self, id: i64) -> Result<bool> {
        let conn = self.lock();
        let rows = conn.execute("DELETE FROM streets WHERE id = ?1", [id])?;
        if rows > 0 {
            tracing::info!("Deleted street {}", id);
        }
        Ok(rows > 0)
    }

    /// Insert the example streets into an empty table. Returns how many were added.
    pub fn seed_examples(&self) -> Result<usize> {
        let existing: i64 = self
            .lock()
            .query_row("SELECT COUNT(*) FROM streets", [], |row| row.get(0))?;
        if existing > 0 {
            tracing::info!("Streets table already has {} rows, skipping seed", existing);
            return Ok(0);
        }

        for (name, capacity, geometry) in EXAMPLE_STREETS {
            self.create_street(CreateStreetInput {
                name: name.to_string(),
                capacity: *capacity,
                geometry: geometry.to_vec(),
            })?;
        }
        Ok(EXAMPLE_STREETS.len())
    }

    // ============================================================
    // Operations used by the insertion strategies
    // ============================================================

    /// Load a street snapshot, failing if the id is invalid or unknown.
    pub fn fetch_street(&self, id: i64) -> Result<Street> {
        if id <= 0 {
            tracing::warn!("Invalid street id {}", id);
            return Err(StreetError::InvalidId(id));
        }

        self.get_street(id)?.ok_or_else(|| {
            tracing::warn!("Street {} not found", id);
            StreetError::NotFound(id)
        })
    }

    /// Overwrite the stored name, capacity and geometry with `street`.
    pub fn replace_street(&self, street: &Street) -> Result<()> {
        street.validate()?;
        let geometry = encode_geometry(&street.geometry)?;

        let conn = self.lock();
        let rows = conn.execute(
            "UPDATE streets SET name = ?1, capacity = ?2, geometry = ?3 WHERE id = ?4",
            params![&street.name, street.capacity, geometry, street.id],
        )?;

        if rows == 0 {
            tracing::warn!("Street {} disappeared before it could be replaced", street.id);
            return Err(StreetError::NotFound(street.id));
        }
        Ok(())
    }

    /// Add a point to the stored geometry in one UPDATE, without reading the row
    /// first. Returns the number of rows affected.
    pub fn add_point_atomic(&self, x: f64, y: f64, id: i64, add_to_end: bool) -> Result<usize> {
        let sql = if add_to_end {
            APPEND_POINT_SQL
        } else {
            PREPEND_POINT_SQL
        };

        let pair = serde_json::to_string(&[x, y])?;

        let conn = self.lock();
        let rows = conn.execute(sql, params![pair, id])?;
        Ok(rows)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

struct StreetRow {
    id: i64,
    name: String,
    capacity: i64,
    geometry: String,
}

impl StreetRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            capacity: row.get(2)?,
            geometry: row.get(3)?,
        })
    }

    fn into_street(self) -> Result<Street> {
        Ok(Street {
            id: self.id,
            name: self.name,
            capacity: self.capacity,
            geometry: decode_geometry(&self.geometry)?,
        })
    }
}

fn encode_geometry(geometry: &[Coordinate]) -> Result<String> {
    let pairs: Vec<[f64; 2]> = geometry.iter().copied().map(Into::into).collect();
    Ok(serde_json::to_string(&pairs)?)
}

fn decode_geometry(s: &str) -> Result<Vec<Coordinate>> {
    let pairs: Vec<[f64; 2]> = serde_json::from_str(s)?;
    Ok(pairs.into_iter().map(Coordinate::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Database {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn raw_geometry(db: &Database, id: i64) -> String {
        db.lock()
            .query_row("SELECT geometry FROM streets WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .unwrap()
    }

    #[test]
    fn geometry_is_stored_as_pairs() {
        let db = setup();
        let street = db
            .create_street(CreateStreetInput {
                name: "Main".to_string(),
                capacity: 1,
                geometry: vec![[0.0, 0.0], [1.5, -2.0]],
            })
            .unwrap();

        assert_eq!(raw_geometry(&db, street.id), "[[0.0,0.0],[1.5,-2.0]]");
    }

    #[test]
    fn prepend_on_empty_geometry_yields_single_pair() {
        let db = setup();
        let street = db
            .create_street(CreateStreetInput {
                name: "Empty".to_string(),
                capacity: 0,
                geometry: vec![],
            })
            .unwrap();

        let rows = db.add_point_atomic(3.0, 4.0, street.id, false).unwrap();
        assert_eq!(rows, 1);

        let stored = db.get_street(street.id).unwrap().unwrap();
        assert_eq!(stored.geometry, vec![Coordinate::new(3.0, 4.0)]);
    }

    #[test]
    fn atomic_insert_keeps_full_precision() {
        let db = setup();
        let street = db
            .create_street(CreateStreetInput {
                name: "Precise".to_string(),
                capacity: 0,
                geometry: vec![[0.0, 0.0]],
            })
            .unwrap();

        db.add_point_atomic(0.1 + 0.2, 1.0 / 3.0, street.id, true).unwrap();
        db.add_point_atomic(f64::MAX, -f64::MAX, street.id, false).unwrap();

        assert_eq!(
            db.get_street(street.id).unwrap().unwrap().geometry,
            vec![
                Coordinate::new(f64::MAX, -f64::MAX),
                Coordinate::new(0.0, 0.0),
                Coordinate::new(0.1 + 0.2, 1.0 / 3.0)
            ]
        );
    }

    #[test]
    fn append_on_missing_row_affects_nothing() {
        let db = setup();
        assert_eq!(db.add_point_atomic(1.0, 1.0, 99, true).unwrap(), 0);
    }

    #[test]
    fn decode_rejects_malformed_geometry() {
        assert!(matches!(
            decode_geometry("[[1.0]]"),
            Err(StreetError::Serialization(_))
        ));
    }
}
