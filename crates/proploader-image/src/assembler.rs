use std::path::Path;

use tracing::debug;

use crate::elf::{is_elf, load_segments};
use crate::error::{ImageError, Result};
use crate::image::{Image, ImageSource};
use crate::relocate::relocate;

/// Turn raw file contents into a flat image.
///
/// ELF input is relocated; anything else is taken as a Spin binary verbatim.
pub fn assemble(bytes: Vec<u8>) -> Result<Image> {
    if bytes.is_empty() {
        return Err(ImageError::Malformed("image is empty".to_string()));
    }

    if is_elf(&bytes) {
        debug!(len = bytes.len(), "assembling ELF image");
        let segments = load_segments(&bytes)?;
        return relocate(&segments);
    }

    debug!(len = bytes.len(), "using Spin binary verbatim");
    Ok(Image::new(bytes, ImageSource::Binary))
}

/// Read `path` and [`assemble`] it.
pub fn assemble_file(path: impl AsRef<Path>) -> Result<Image> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    assemble(bytes)
}
