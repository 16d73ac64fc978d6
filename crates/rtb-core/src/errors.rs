/// Core error type for the broadcaster.
///
/// Adapter crates should map their specific errors into this type so the
/// dispatcher core can handle failures consistently. Per-send rejections are
/// *not* errors: they travel as `gateway::types::Rejection`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
