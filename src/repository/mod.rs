mod board_repository;
mod config_repository;
mod documents;
mod storage;
mod store_actor;
mod submission_repository;

use std::path::PathBuf;

use crate::actors::ActorError;

pub use board_repository::BoardRepository;
pub use config_repository::ConfigRepository;
pub use storage::{Document, JsonFileStorage, MemoryStorage, Storage};
pub use store_actor::{StoreActor, StoreHandle};
pub use submission_repository::SubmissionRepository;

#[derive(thiserror::Error, Debug)]
pub enum RepositoryError {
    #[error("could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid: {source}", document.file_name())]
    Json {
        document: Document,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Actor(#[from] ActorError),
    #[error("the store replied with an unexpected message")]
    UnexpectedReply,
}
