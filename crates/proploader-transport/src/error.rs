use std::net::SocketAddr;
use std::time::Duration;

/// Errors that can occur at the transport boundary.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind a local datagram endpoint.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to associate a datagram endpoint with a remote address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Host network interfaces could not be enumerated.
    #[error("failed to enumerate network interfaces: {0}")]
    Interfaces(std::io::Error),

    /// An I/O error occurred on the link.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking operation did not complete in time.
    #[error("transport timed out after {0:?}")]
    Timeout(Duration),

    /// The link has not been opened or was already closed.
    #[error("transport not connected")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, TransportError>;
