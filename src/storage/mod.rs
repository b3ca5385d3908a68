mod error;
mod schema;
pub mod sqlite;
pub mod traits;

pub use error::StoreError;
pub use sqlite::SqliteStorage;
pub use traits::{Project, ProjectFields, Sector, Storage, StorageRead, StorageWrite};
