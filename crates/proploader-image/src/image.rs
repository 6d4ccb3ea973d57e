use bytes::Bytes;

/// How an image was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// A Spin binary used as-is.
    Binary,
    /// ELF segments relocated into a flat buffer.
    Relocated,
}

/// A flat hub-memory image ready to encode and send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    bytes: Bytes,
    source: ImageSource,
}

impl Image {
    pub fn new(bytes: impl Into<Bytes>, source: ImageSource) -> Self {
        Self {
            bytes: bytes.into(),
            source,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length in 32-bit longs, rounded up. This is what the length field carries.
    pub fn len_in_longs(&self) -> u32 {
        self.bytes.len().div_ceil(4) as u32
    }

    pub fn source(&self) -> ImageSource {
        self.source
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}
