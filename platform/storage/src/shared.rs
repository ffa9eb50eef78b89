use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::{ContentId, ContentStore, HttpContentStore, StorageError, StorageSettings, UploadFile};

/// Builds the content store on first use.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ContentStore>, StorageError>;
}

#[async_trait]
impl Connector for StorageSettings {
    async fn connect(&self) -> Result<Arc<dyn ContentStore>, StorageError> {
        let store = HttpContentStore::connect(self.clone()).await?;
        Ok(Arc::new(store))
    }
}

struct Preconnected(Arc<dyn ContentStore>);

#[async_trait]
impl Connector for Preconnected {
    async fn connect(&self) -> Result<Arc<dyn ContentStore>, StorageError> {
        Ok(self.0.clone())
    }
}

/// Process-wide content store, constructed once and reused.
///
/// Concurrent first callers wait on the same in-flight construction. A failed
/// construction leaves the cell empty so a later upload tries again.
#[derive(Clone)]
pub struct SharedContentStore {
    connector: Arc<dyn Connector>,
    cell: Arc<OnceCell<Arc<dyn ContentStore>>>,
}

impl SharedContentStore {
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self {
            connector: Arc::new(connector),
            cell: Arc::new(OnceCell::new()),
        }
    }

    pub fn ready(store: Arc<dyn ContentStore>) -> Self {
        Self {
            connector: Arc::new(Preconnected(store.clone())),
            cell: Arc::new(OnceCell::from(store)),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get(&self) -> Result<Arc<dyn ContentStore>, StorageError> {
        self.cell
            .get_or_try_init(|| self.connector.connect())
            .await
            .cloned()
    }

    pub async fn upload(&self, file: UploadFile) -> Result<ContentId, StorageError> {
        self.get().await?.upload(file).await
    }
}
