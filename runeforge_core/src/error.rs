use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Socket index {0} is out of range (max {max})", max = crate::overrides::MAX_SOCKETS)]
    SocketIndexOutOfRange(usize),

    #[error("Catalog fetch failed: {0}")]
    Catalog(anyhow::Error),

    #[error("Impact evaluation failed: {0}")]
    Impact(anyhow::Error),

    #[error("Relay channel closed")]
    ChannelClosed,

    #[error("Malformed relay frame: {0}")]
    Frame(#[from] serde_json::Error),
}
