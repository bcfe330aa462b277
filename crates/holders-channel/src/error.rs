/// Errors produced by the message channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// A share event payload is not a decimal integer.
    #[error("malformed share identifier in payload: {0:?}")]
    MalformedIdentifier(String),

    /// Exchange names must be non-empty.
    #[error("invalid exchange name: {0:?}")]
    InvalidExchange(String),

    /// The broker connection has been closed.
    #[error("channel is closed")]
    Closed,

    /// The broker cannot be reached.
    #[error("broker unavailable: {0}")]
    Unavailable(String),
}

/// Convenience alias used throughout the channel crate.
pub type ChannelResult<T> = std::result::Result<T, ChannelError>;
