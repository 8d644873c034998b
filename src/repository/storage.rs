use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::RepositoryError;

/// The flat documents the bot persists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Document {
    Config,
    Submissions,
    Pins,
}

impl Document {
    pub fn file_name(&self) -> &'static str {
        match self {
            Document::Config => "config.json",
            Document::Submissions => "submissions.json",
            Document::Pins => "pins.json",
        }
    }
}

/// Raw document storage. Serialization is handled by the store actor.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Returns `None` if the document has never been written.
    async fn read(&self, document: Document) -> Result<Option<String>, RepositoryError>;

    async fn write(&self, document: Document, contents: String) -> Result<(), RepositoryError>;
}

/// Stores every document as a JSON file in one directory.
#[derive(Debug)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub async fn open(dir: impl AsRef<Path>) -> Result<JsonFileStorage, RepositoryError> {
        let dir = dir.as_ref().to_path_buf();

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| RepositoryError::Io {
                path: dir.clone(),
                source,
            })?;

        Ok(JsonFileStorage { dir })
    }

    fn path(&self, document: Document) -> PathBuf {
        self.dir.join(document.file_name())
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn read(&self, document: Document) -> Result<Option<String>, RepositoryError> {
        let path = self.path(document);

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet", path.display());
                Ok(None)
            }
            Err(source) => Err(RepositoryError::Io { path, source }),
        }
    }

    async fn write(&self, document: Document, contents: String) -> Result<(), RepositoryError> {
        let path = self.path(document);

        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| RepositoryError::Io { path, source })
    }
}

/// Keeps documents in memory only.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: Mutex<HashMap<Document, String>>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }

    pub async fn contents(&self, document: Document) -> Option<String> {
        self.documents.lock().await.get(&document).cloned()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self, document: Document) -> Result<Option<String>, RepositoryError> {
        Ok(self.contents(document).await)
    }

    async fn write(&self, document: Document, contents: String) -> Result<(), RepositoryError> {
        self.documents.lock().await.insert(document, contents);
        Ok(())
    }
}
