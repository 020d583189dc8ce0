use std::sync::Arc;

use crate::application::interfaces::VectorStore;
use crate::domain::{DomainError, FileProfile};

/// Fetches a single persisted [`FileProfile`] by path, as consumed by the
/// `file_profile` tool.
pub struct FileProfileUseCase {
    store: Arc<dyn VectorStore>,
}

impl FileProfileUseCase {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, path: &str) -> Result<Option<FileProfile>, DomainError> {
        self.store.get_file_profile(path).await
    }
}
