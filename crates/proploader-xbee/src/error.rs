use crate::param::XbeeParam;

/// Errors from the XBee discovery and configuration protocol.
#[derive(Debug, thiserror::Error)]
pub enum XbeeError {
    /// A socket operation failed.
    #[error("transport error: {0}")]
    Transport(#[from] proploader_transport::TransportError),

    /// The packet is too short for its fixed fields.
    #[error("packet too short ({len} bytes, need {min})")]
    Truncated { len: usize, min: usize },

    /// The reply header fails the correlation check.
    #[error("reply header mismatch ({number1:#06x} ^ {number2:#06x} != 0x4242)")]
    ProtocolMismatch { number1: u16, number2: u16 },

    /// The bridge answered with a non-zero status.
    #[error("bridge returned status {status:#04x}")]
    Status { status: u8 },

    /// Fewer bytes were sent than the request holds.
    #[error("short write ({written} of {expected} bytes)")]
    ShortWrite { written: usize, expected: usize },

    /// Attempted to write a parameter the bridge only reports.
    #[error("parameter {0} is read-only")]
    ReadOnly(XbeeParam),

    /// `connect` was called on a client that already holds sockets.
    #[error("already connected")]
    AlreadyConnected,

    /// The client has no open sockets.
    #[error("not connected")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, XbeeError>;
