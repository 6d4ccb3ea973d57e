use tracing::debug;

use crate::elf::Segment;
use crate::error::{ImageError, Result};
use crate::image::{Image, ImageSource};
use crate::spin::{apply_checksum, SpinHeader, SPIN_HEADER_SIZE, STACK_MARKERS_SIZE};

/// Start of the region holding co-processor (cog) driver images.
///
/// Code linked here is copied into a cog at run time and has no place in the
/// flat hub image.
pub const COG_IMAGE_BASE: u32 = 0xC000_0000;

// dataCursor = imageSize + 12 must still fit the 16-bit header field.
const MAX_RELOCATED_SIZE: usize = u16::MAX as usize - STACK_MARKERS_SIZE as usize - 4;

/// Lay `segments` out as one flat image and fix up its Spin header.
///
/// Each segment is copied to `address - lowest_address`; gaps are zero. After
/// the copy `varBase` is set to the image size, `dataBase` 8 bytes past it for
/// the stack markers, `dataCursor` 4 bytes past that, and the checksum is
/// recomputed over the result.
pub fn relocate(segments: &[Segment<'_>]) -> Result<Image> {
    if let Some(cog) = segments.iter().find(|s| s.address >= COG_IMAGE_BASE) {
        return Err(ImageError::UnsupportedImage {
            address: cog.address,
        });
    }

    let start = segments
        .iter()
        .map(|s| s.address)
        .min()
        .ok_or_else(|| ImageError::Malformed("no loadable segments".to_string()))?;
    let end = segments.iter().map(Segment::end).max().unwrap_or(u64::from(start));
    let size = (end - u64::from(start)) as usize;

    if size < SPIN_HEADER_SIZE {
        return Err(ImageError::Malformed(format!(
            "relocated image of {size} bytes cannot hold a Spin header"
        )));
    }
    if size > MAX_RELOCATED_SIZE {
        return Err(ImageError::TooLarge {
            size,
            max: MAX_RELOCATED_SIZE,
        });
    }

    let mut image = vec![0u8; size];
    for segment in segments {
        let offset = (segment.address - start) as usize;
        image[offset..offset + segment.data.len()].copy_from_slice(segment.data);
    }

    let mut header = SpinHeader::from_bytes(&image)?;
    header.var_base = size as u16;
    header.data_base = header.var_base + STACK_MARKERS_SIZE;
    header.data_cursor = header.data_base + 4;
    header.write_into(&mut image)?;
    apply_checksum(&mut image)?;

    debug!(
        start = format_args!("{start:#010x}"),
        size,
        segments = segments.len(),
        "relocated image"
    );
    Ok(Image::new(image, ImageSource::Relocated))
}
