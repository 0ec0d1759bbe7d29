//! Error taxonomy for the handshake driver.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type DriveResult<T> = Result<T, StatemError>;

/// Errors the driver can surface.
///
/// [`StatemError::WouldBlock`] is the only transient variant: it never
/// latches [`crate::FlowState::Error`]. Every other variant is fatal and
/// sticky for the lifetime of the connection.
#[derive(Debug, Error)]
pub enum StatemError {
    /// The record layer reported that a read or write would block. The
    /// caller should retry with the same arguments once I/O is ready.
    #[error("operation would block")]
    WouldBlock,

    /// An impossible sub-state was reached, an allocation failed, or
    /// transcript-hash setup failed.
    #[error("internal error: {0}")]
    InternalError(&'static str),

    /// The negotiated version does not meet the configured security-policy
    /// minimum.
    #[error("protocol version too low")]
    VersionTooLow,

    /// Secure renegotiation was not advertised and unsafe legacy
    /// renegotiation is not permitted by policy.
    #[error("unsafe legacy renegotiation disabled")]
    UnsafeLegacyRenegotiationDisabled,

    /// The peer's message type is not one the current handshake state
    /// permits.
    #[error("unexpected message")]
    UnexpectedMessage,

    /// The peer's declared message size exceeds `max_message_size()`.
    #[error("excessive message size")]
    ExcessiveMessageSize,

    /// A `transition`/`process_message`/`post_process_message`/
    /// `construct_message`/`pre_work`/`post_work` callback reported a
    /// failure the driver does not otherwise classify.
    #[error("handshake vtable callback failed: {0}")]
    Vtable(Box<dyn std::error::Error + Send + Sync>),
}

impl StatemError {
    /// True for the sole transient variant; every other variant is fatal
    /// and must latch [`crate::FlowState::Error`].
    #[must_use]
    pub const fn is_would_block(&self) -> bool {
        matches!(self, Self::WouldBlock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn would_block_is_not_fatal() {
        assert!(StatemError::WouldBlock.is_would_block());
        assert!(!StatemError::VersionTooLow.is_would_block());
        assert!(!StatemError::InternalError("x").is_would_block());
    }

    #[test]
    fn messages_are_stable() {
        assert_eq!(
            StatemError::UnexpectedMessage.to_string(),
            "unexpected message"
        );
        assert_eq!(
            StatemError::ExcessiveMessageSize.to_string(),
            "excessive message size"
        );
    }
}
