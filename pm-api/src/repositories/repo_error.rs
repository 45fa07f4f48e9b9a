use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed cache entry '{key}': {message}")]
    Malformed { key: String, message: String },
}
