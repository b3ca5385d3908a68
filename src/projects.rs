use crate::storage::{Project, ProjectFields, Sector, Storage, StoreError};

/// Async facade over a blocking [`Storage`]. Every operation runs exactly one
/// store call on tokio's blocking pool and reports misses as `NotFound`.
#[derive(Clone)]
pub struct Projects<S> {
    storage: S,
}

impl<S: Storage + Clone + Send + Sync + 'static> Projects<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn initialize_store(&self) -> Result<(), StoreError> {
        self.run(|s| s.sync()).await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        self.run(|s| s.list_projects()).await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project, StoreError> {
        self.run(move |s| s.load_project(id))
            .await?
            .ok_or_else(|| StoreError::NotFound("Unable to find requested project".to_string()))
    }

    pub async fn list_projects_by_sector_name(
        &self,
        pattern: &str,
    ) -> Result<Vec<Project>, StoreError> {
        let pattern = pattern.to_owned();
        let projects = self
            .run(move |s| s.list_projects_by_sector_name(&pattern))
            .await?;
        if projects.is_empty() {
            return Err(StoreError::NotFound(
                "Unable to find requested projects".to_string(),
            ));
        }
        Ok(projects)
    }

    pub async fn list_sectors(&self) -> Result<Vec<Sector>, StoreError> {
        self.run(|s| s.list_sectors()).await
    }

    pub async fn create_project(&self, fields: ProjectFields) -> Result<i64, StoreError> {
        let id = self.run(move |s| s.insert_project(&fields)).await?;
        log::info!("➕ Created project {id}");
        Ok(id)
    }

    pub async fn update_project(&self, id: i64, fields: ProjectFields) -> Result<(), StoreError> {
        let matched = self.run(move |s| s.update_project(id, &fields)).await?;
        if matched == 0 {
            return Err(StoreError::NotFound("No project updated".to_string()));
        }
        log::info!("✏️ Updated project {id}");
        Ok(())
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), StoreError> {
        let deleted = self.run(move |s| s.delete_project(id)).await?;
        if deleted == 0 {
            return Err(StoreError::NotFound("No project deleted".to_string()));
        }
        log::info!("🗑️ Deleted project {id}");
        Ok(())
    }

    async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T, StoreError> + Send + 'static,
    {
        let storage = self.storage.clone();
        tokio::task::spawn_blocking(move || f(&storage))
            .await
            .map_err(|err| StoreError::Task(err.to_string()))?
    }
}
