use rusqlite::Connection;

pub const SECTORS_TABLE: &str = "sectors";
pub const PROJECTS_TABLE: &str = "projects";

const CREATE_TABLES: &str = r#"
    CREATE TABLE IF NOT EXISTS sectors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sector_name TEXT
    );
    CREATE TABLE IF NOT EXISTS projects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT,
        feature_img_url TEXT,
        summary_short TEXT,
        intro_short TEXT,
        impact TEXT,
        original_source_url TEXT,
        sector_id INTEGER REFERENCES sectors(id)
    );
    CREATE INDEX IF NOT EXISTS projects_sector_id_idx ON projects(sector_id);
"#;

// Children first so the foreign key never dangles mid-drop.
const DROP_TABLES: &str = r#"
    DROP TABLE IF EXISTS projects;
    DROP TABLE IF EXISTS sectors;
"#;

pub fn sync(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_TABLES)
}

pub fn sync_force(conn: &Connection) -> rusqlite::Result<()> {
    log::warn!("Dropping and recreating {SECTORS_TABLE} and {PROJECTS_TABLE}");
    conn.execute_batch(DROP_TABLES)?;
    sync(conn)
}

/// Points the AUTOINCREMENT counter of `table` at its current `MAX(id)`, so the
/// next insert continues after explicitly-numbered rows.
pub fn reset_sequence(conn: &Connection, table: &str) -> rusqlite::Result<i64> {
    let max_id: i64 = conn.query_row(
        &format!("SELECT COALESCE(MAX(id), 0) FROM {table}"),
        [],
        |row| row.get(0),
    )?;
    conn.execute("DELETE FROM sqlite_sequence WHERE name = ?1", [table])?;
    conn.execute(
        "INSERT INTO sqlite_sequence (name, seq) VALUES (?1, ?2)",
        rusqlite::params![table, max_id],
    )?;
    Ok(max_id)
}
