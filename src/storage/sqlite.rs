use rusqlite::{functions::FunctionFlags, params, Connection, OptionalExtension};
use std::path::Path;

use super::{
    schema,
    traits::{Project, ProjectFields, Sector, Storage, StorageRead, StorageWrite},
    StoreError,
};

const PROJECT_SELECT: &str = r#"
    SELECT p.id, p.title, p.feature_img_url, p.summary_short, p.intro_short, p.impact,
           p.original_source_url, p.sector_id, s.id, s.sector_name
    FROM projects p
    LEFT JOIN sectors s ON s.id = p.sector_id
"#;

#[derive(Clone)]
pub struct SqliteStorage {
    pub path: String,
}

fn map_project_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    let sector = match row.get::<_, Option<i64>>(8)? {
        Some(id) => Some(Sector {
            id,
            sector_name: row.get(9)?,
        }),
        None => None,
    };
    Ok(Project {
        id: row.get(0)?,
        title: row.get(1)?,
        feature_img_url: row.get(2)?,
        summary_short: row.get(3)?,
        intro_short: row.get(4)?,
        impact: row.get(5)?,
        original_source_url: row.get(6)?,
        sector_id: row.get(7)?,
        sector,
    })
}

fn map_sector_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Sector> {
    Ok(Sector {
        id: row.get(0)?,
        sector_name: row.get(1)?,
    })
}

/// Registers `fold(text)`, a Unicode lowercase. SQLite's own `lower()` only
/// folds ASCII.
fn register_fold(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
    )
}

/// Escapes LIKE wildcards so the pattern matches as a literal substring.
fn like_literal(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    for ch in pattern.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn db_list_projects(conn: &Connection) -> rusqlite::Result<Vec<Project>> {
    let mut stmt = conn.prepare(&format!("{PROJECT_SELECT} ORDER BY p.id"))?;
    let rows = stmt
        .query_map([], map_project_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_load_project(conn: &Connection, id: i64) -> rusqlite::Result<Option<Project>> {
    conn.query_row(
        &format!("{PROJECT_SELECT} WHERE p.id = ?1"),
        params![id],
        map_project_row,
    )
    .optional()
}

fn db_list_projects_by_sector_name(
    conn: &Connection,
    pattern: &str,
) -> rusqlite::Result<Vec<Project>> {
    let mut stmt = conn.prepare(&format!(
        r#"{PROJECT_SELECT}
        WHERE fold(s.sector_name) LIKE '%' || fold(?1) || '%' ESCAPE '\'
        ORDER BY p.id"#
    ))?;
    let rows = stmt
        .query_map(params![like_literal(pattern)], map_project_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_list_sectors(conn: &Connection) -> rusqlite::Result<Vec<Sector>> {
    let mut stmt = conn.prepare("SELECT id, sector_name FROM sectors ORDER BY id")?;
    let rows = stmt
        .query_map([], map_sector_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_insert_project(conn: &Connection, fields: &ProjectFields) -> rusqlite::Result<i64> {
    conn.execute(
        r#"
        INSERT INTO projects (
            title, feature_img_url, summary_short, intro_short, impact,
            original_source_url, sector_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            fields.title,
            fields.feature_img_url,
            fields.summary_short,
            fields.intro_short,
            fields.impact,
            fields.original_source_url,
            fields.sector_id
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn db_update_project(conn: &Connection, id: i64, fields: &ProjectFields) -> rusqlite::Result<usize> {
    conn.execute(
        r#"
        UPDATE projects
        SET title = COALESCE(?1, title),
            feature_img_url = COALESCE(?2, feature_img_url),
            summary_short = COALESCE(?3, summary_short),
            intro_short = COALESCE(?4, intro_short),
            impact = COALESCE(?5, impact),
            original_source_url = COALESCE(?6, original_source_url),
            sector_id = COALESCE(?7, sector_id)
        WHERE id = ?8
        "#,
        params![
            fields.title,
            fields.feature_img_url,
            fields.summary_short,
            fields.intro_short,
            fields.impact,
            fields.original_source_url,
            fields.sector_id,
            id
        ],
    )
}

fn db_delete_project(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM projects WHERE id = ?1", params![id])
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    /// Drops and recreates both tables. Only the seed command calls this.
    pub fn sync_force(&self) -> Result<(), StoreError> {
        Ok(self.with_conn(schema::sync_force)?)
    }

    /// Inserts fixture rows with their ids preserved, then moves both
    /// AUTOINCREMENT counters to the highest loaded id. Runs in one transaction.
    pub fn bulk_load(
        &self,
        sectors: &[Sector],
        projects: &[(i64, ProjectFields)],
    ) -> Result<(), StoreError> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        {
            let mut insert_sector =
                tx.prepare("INSERT INTO sectors (id, sector_name) VALUES (?1, ?2)")?;
            for sector in sectors {
                insert_sector.execute(params![sector.id, sector.sector_name])?;
            }

            let mut insert_project = tx.prepare(
                r#"
                INSERT INTO projects (
                    id, title, feature_img_url, summary_short, intro_short, impact,
                    original_source_url, sector_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;
            for (id, fields) in projects {
                insert_project.execute(params![
                    id,
                    fields.title,
                    fields.feature_img_url,
                    fields.summary_short,
                    fields.intro_short,
                    fields.impact,
                    fields.original_source_url,
                    fields.sector_id
                ])?;
            }

            let sectors_seq = schema::reset_sequence(&tx, schema::SECTORS_TABLE)?;
            let projects_seq = schema::reset_sequence(&tx, schema::PROJECTS_TABLE)?;
            log::debug!("Sequences reset: sectors={sectors_seq} projects={projects_seq}");
        }
        tx.commit()?;
        Ok(())
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(std::time::Duration::from_millis(500))?;
        register_fold(&conn)?;
        Ok(conn)
    }

    fn with_conn<F, T>(&self, f: F) -> rusqlite::Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.open()?;
        f(&conn)
    }
}

impl StorageRead for SqliteStorage {
    fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.with_conn(db_list_projects)?)
    }

    fn load_project(&self, id: i64) -> Result<Option<Project>, StoreError> {
        Ok(self.with_conn(|conn| db_load_project(conn, id))?)
    }

    fn list_projects_by_sector_name(&self, pattern: &str) -> Result<Vec<Project>, StoreError> {
        Ok(self.with_conn(|conn| db_list_projects_by_sector_name(conn, pattern))?)
    }

    fn list_sectors(&self) -> Result<Vec<Sector>, StoreError> {
        Ok(self.with_conn(db_list_sectors)?)
    }
}

impl StorageWrite for SqliteStorage {
    fn insert_project(&self, fields: &ProjectFields) -> Result<i64, StoreError> {
        Ok(self.with_conn(|conn| db_insert_project(conn, fields))?)
    }

    fn update_project(&self, id: i64, fields: &ProjectFields) -> Result<usize, StoreError> {
        Ok(self.with_conn(|conn| db_update_project(conn, id, fields))?)
    }

    fn delete_project(&self, id: i64) -> Result<usize, StoreError> {
        Ok(self.with_conn(|conn| db_delete_project(conn, id))?)
    }
}

impl Storage for SqliteStorage {
    fn sync(&self) -> Result<(), StoreError> {
        Ok(self.with_conn(schema::sync)?)
    }
}
