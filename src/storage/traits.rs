use serde::Deserialize;

use super::StoreError;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Sector {
    pub id: i64,
    pub sector_name: Option<String>,
}

/// A project row with its sector eager-loaded through `sector_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    pub title: Option<String>,
    pub feature_img_url: Option<String>,
    pub summary_short: Option<String>,
    pub intro_short: Option<String>,
    pub impact: Option<String>,
    pub original_source_url: Option<String>,
    pub sector_id: Option<i64>,
    pub sector: Option<Sector>,
}

impl Project {
    pub fn sector_name(&self) -> Option<&str> {
        self.sector.as_ref().and_then(|s| s.sector_name.as_deref())
    }
}

/// Writable project columns. `None` means the field was not supplied: inserts
/// store NULL, updates leave the column untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectFields {
    pub title: Option<String>,
    pub feature_img_url: Option<String>,
    pub summary_short: Option<String>,
    pub intro_short: Option<String>,
    pub impact: Option<String>,
    pub original_source_url: Option<String>,
    pub sector_id: Option<i64>,
}

pub trait StorageRead {
    fn list_projects(&self) -> Result<Vec<Project>, StoreError>;
    fn load_project(&self, id: i64) -> Result<Option<Project>, StoreError>;
    fn list_projects_by_sector_name(&self, pattern: &str) -> Result<Vec<Project>, StoreError>;
    fn list_sectors(&self) -> Result<Vec<Sector>, StoreError>;
}

pub trait StorageWrite {
    /// Returns the id assigned to the new row.
    fn insert_project(&self, fields: &ProjectFields) -> Result<i64, StoreError>;
    /// Returns the number of rows matched by `id`.
    fn update_project(&self, id: i64, fields: &ProjectFields) -> Result<usize, StoreError>;
    /// Returns the number of rows removed.
    fn delete_project(&self, id: i64) -> Result<usize, StoreError>;
}

pub trait Storage: StorageRead + StorageWrite {
    /// Creates missing tables. Never drops data.
    fn sync(&self) -> Result<(), StoreError>;
}
