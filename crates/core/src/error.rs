use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to read store file {path}: {source}", path = path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse store file {path}: {source}", path = path.display())]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialise store: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to create store directory: {0}")]
    StoreDirCreation(std::io::Error),
    #[error("failed to write temporary store file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to replace store file {path}: {source}", path = path.display())]
    FilePersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bot not found: {0}")]
    BotNotFound(String),
}

pub type IntakeResult<T> = std::result::Result<T, IntakeError>;
