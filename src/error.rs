use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Fetch errors (transient; absorbed at the monitor boundary)
    #[error("http request failed: {0}")]
    Http(String),

    #[error("source markup did not match expected format: {0}")]
    Parse(String),

    // Push errors (per-subscriber; cause removal from the broadcast set)
    #[error("subscriber channel closed")]
    SubscriberClosed,

    #[error("subscriber channel full")]
    SubscriberBusy,

    // System errors
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
