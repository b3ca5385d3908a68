use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::storage::{ProjectFields, Sector, SqliteStorage};

#[derive(Debug, Deserialize)]
struct ProjectRecord {
    id: i64,
    #[serde(flatten)]
    fields: ProjectFields,
}

#[derive(Debug, PartialEq, Eq)]
pub struct SeedSummary {
    pub sectors: usize,
    pub projects: usize,
}

/// Destructively reloads the store from the two fixture files.
///
/// Both files are parsed before anything is dropped, so a malformed fixture
/// leaves the existing data in place.
pub fn run(storage: &SqliteStorage, sectors_path: &Path, projects_path: &Path) -> Result<SeedSummary> {
    let sectors: Vec<Sector> = read_json(sectors_path)?;
    let projects: Vec<ProjectRecord> = read_json(projects_path)?;
    let projects: Vec<(i64, ProjectFields)> =
        projects.into_iter().map(|p| (p.id, p.fields)).collect();

    storage.sync_force().context("recreating schema")?;
    storage
        .bulk_load(&sectors, &projects)
        .context("loading fixtures")?;

    log::info!("-----");
    log::info!("data inserted successfully");
    Ok(SeedSummary {
        sectors: sectors.len(),
        projects: projects.len(),
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Storage, StorageRead, StorageWrite};
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn seed_replaces_data_and_continues_ids() {
        let dir = TempDir::new().unwrap();
        let storage = SqliteStorage::new(dir.path().join("solutions.sqlite"));
        storage.sync().unwrap();
        storage
            .insert_project(&ProjectFields {
                title: Some("Stale".to_string()),
                ..ProjectFields::default()
            })
            .unwrap();

        let sectors = write(
            &dir,
            "sectors.json",
            r#"[{"id": 1, "sector_name": "Energy"}, {"id": 4, "sector_name": "Transportation"}]"#,
        );
        let projects = write(
            &dir,
            "projects.json",
            r#"[
                {"id": 3, "title": "Solar Grid", "impact": "Large", "sector_id": 1},
                {"id": 9, "title": "Electric Buses", "sector_id": 4}
            ]"#,
        );

        let summary = run(&storage, &sectors, &projects).unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                sectors: 2,
                projects: 2
            }
        );

        let loaded = storage.list_projects().unwrap();
        let ids: Vec<_> = loaded.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 9]);
        assert_eq!(loaded[0].impact.as_deref(), Some("Large"));
        assert_eq!(loaded[1].sector_name(), Some("Transportation"));

        let next = storage.insert_project(&ProjectFields::default()).unwrap();
        assert_eq!(next, 10);
    }

    #[test]
    fn malformed_fixture_keeps_existing_data() {
        let dir = TempDir::new().unwrap();
        let storage = SqliteStorage::new(dir.path().join("solutions.sqlite"));
        storage.sync().unwrap();
        storage.insert_project(&ProjectFields::default()).unwrap();

        let sectors = write(&dir, "sectors.json", "[]");
        let projects = write(&dir, "projects.json", "{not json");

        let err = run(&storage, &sectors, &projects).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
        assert_eq!(storage.list_projects().unwrap().len(), 1);
    }

    #[test]
    fn missing_fixture_is_reported() {
        let dir = TempDir::new().unwrap();
        let storage = SqliteStorage::new(dir.path().join("solutions.sqlite"));

        let err = run(
            &storage,
            &dir.path().join("nope.json"),
            &dir.path().join("nope.json"),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("reading"));
    }

    #[test]
    fn bundled_fixtures_are_consistent() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let sectors: Vec<Sector> = read_json(&root.join("data/sectorData.json")).unwrap();
        let projects: Vec<ProjectRecord> = read_json(&root.join("data/projectData.json")).unwrap();

        assert!(!sectors.is_empty());
        assert!(!projects.is_empty());
        for project in &projects {
            let sector_id = project.fields.sector_id.expect("fixture project has a sector");
            assert!(
                sectors.iter().any(|s| s.id == sector_id),
                "project {} references unknown sector {}",
                project.id,
                sector_id
            );
        }
    }
}
