use crate::session::LoaderState;

/// Why the target's handshake reply was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandshakeFailure {
    /// Fewer bytes arrived than the reply and version need.
    #[error("handshake reply truncated ({received} of {expected} bytes)")]
    Truncated { received: usize, expected: usize },

    /// The reply arrived but does not continue the handshake sequence.
    #[error("handshake reply does not match")]
    Mismatch,
}

/// Errors that can end a boot session.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The serial link failed.
    #[error("transport error: {0}")]
    Transport(#[from] proploader_transport::TransportError),

    /// The image could not be assembled.
    #[error("image error: {0}")]
    Image(#[from] proploader_image::ImageError),

    /// The target did not answer with the expected handshake.
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(HandshakeFailure),

    /// The target answered with an unsupported hardware version.
    #[error("unsupported hardware version {found} (expected {expected})")]
    VersionMismatch { found: u8, expected: u8 },

    /// The target rejected the transferred image.
    #[error("target rejected image checksum (code {code:#04x})")]
    ChecksumNack { code: u8 },

    /// Fewer bytes were written than the packet holds.
    #[error("short write in {state:?}: {written} of {expected} bytes")]
    ShortWrite {
        state: LoaderState,
        written: usize,
        expected: usize,
    },
}

pub type Result<T> = std::result::Result<T, LoaderError>;
