use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreStoreError {
    #[error("Score file IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Score file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Score store unavailable: {0}")]
    Unavailable(String),
}
