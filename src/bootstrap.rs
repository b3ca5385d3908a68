use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::projects::Projects;
use crate::storage::{Storage, StoreError};

/// One-time schema initialization shared by every request.
///
/// The first caller runs the sync; callers arriving while it is in flight wait
/// for that same attempt. A failed attempt leaves the cell empty, so the next
/// caller tries again.
#[derive(Clone)]
pub struct Bootstrap<S> {
    projects: Projects<S>,
    ready: Arc<OnceCell<()>>,
}

impl<S: Storage + Clone + Send + Sync + 'static> Bootstrap<S> {
    pub fn new(projects: Projects<S>) -> Self {
        Self {
            projects,
            ready: Arc::new(OnceCell::new()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    pub async fn ensure_ready(&self) -> Result<(), StoreError> {
        self.ready
            .get_or_try_init(|| async {
                log::info!("🗄️ Synchronizing schema");
                self.projects.initialize_store().await.map_err(|err| {
                    log::error!("Unable to initialize store: {err}");
                    StoreError::Initialization(err.to_string())
                })?;
                log::info!("✅ Schema ready");
                Ok::<(), StoreError>(())
            })
            .await
            .map(|_| ())
    }
}
