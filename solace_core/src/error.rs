use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no data directory on this platform")]
    NoDataDir,
    #[error("config io failed")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid json")]
    Json(#[from] serde_json::Error),
}
