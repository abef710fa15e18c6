/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding, accepting, or the WebSocket handshake failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The handshake came from an origin the policy doesn't allow.
    #[error("origin not allowed: {0}")]
    OriginRejected(String),

    /// An allowed-origins setting named no origins.
    #[error("invalid origin policy {0:?}: no origins listed")]
    InvalidOriginPolicy(String),
}
