use std::path::PathBuf;

/// Errors that can occur while assembling a flat image.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// The input file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A segment targets co-processor memory, which has no flat placement.
    #[error("segment at {address:#010x} targets co-processor memory")]
    UnsupportedImage { address: u32 },

    /// The input is structurally invalid.
    #[error("malformed image: {0}")]
    Malformed(String),

    /// The assembled image does not fit the target's 16-bit header fields.
    #[error("image too large ({size} bytes, max {max})")]
    TooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, ImageError>;
