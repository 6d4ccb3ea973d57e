use crate::error::{ImageError, Result};

/// Size of the Spin header at the start of every image.
pub const SPIN_HEADER_SIZE: usize = 16;

/// Byte sum, mod 256, that the boot ROM expects of a whole image.
pub const SPIN_TARGET_CHECKSUM: u8 = 0x14;

/// Bytes reserved past the image for the initial stack markers.
pub(crate) const STACK_MARKERS_SIZE: u16 = 8;

const CLOCK_FREQ: usize = 0;
const CLOCK_MODE: usize = 4;
const CHECKSUM: usize = 5;
const PROG_BASE: usize = 6;
const VAR_BASE: usize = 8;
const DATA_BASE: usize = 10;
const PROG_CURSOR: usize = 12;
const DATA_CURSOR: usize = 14;

/// Spin object header.
///
/// Wire format (little-endian):
/// ```text
/// ┌──────────┬──────┬──────┬───────┬───────┬───────┬───────┬───────┐
/// │ clkfreq  │ mode │ sum  │ pbase │ vbase │ dbase │ pcurr │ dcurr │
/// │ (4B)     │ (1B) │ (1B) │ (2B)  │ (2B)  │ (2B)  │ (2B)  │ (2B)  │
/// └──────────┴──────┴──────┴───────┴───────┴───────┴───────┴───────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpinHeader {
    pub clock_freq: u32,
    pub clock_mode: u8,
    pub checksum: u8,
    pub prog_base: u16,
    pub var_base: u16,
    pub data_base: u16,
    pub prog_cursor: u16,
    pub data_cursor: u16,
}

impl SpinHeader {
    /// Parse the header from the start of `image`.
    pub fn from_bytes(image: &[u8]) -> Result<Self> {
        let raw = image.get(..SPIN_HEADER_SIZE).ok_or_else(|| {
            ImageError::Malformed(format!(
                "image of {} bytes is shorter than the {SPIN_HEADER_SIZE}-byte Spin header",
                image.len()
            ))
        })?;
        let u16_at = |offset: usize| u16::from_le_bytes([raw[offset], raw[offset + 1]]);

        Ok(Self {
            clock_freq: u32::from_le_bytes([
                raw[CLOCK_FREQ],
                raw[CLOCK_FREQ + 1],
                raw[CLOCK_FREQ + 2],
                raw[CLOCK_FREQ + 3],
            ]),
            clock_mode: raw[CLOCK_MODE],
            checksum: raw[CHECKSUM],
            prog_base: u16_at(PROG_BASE),
            var_base: u16_at(VAR_BASE),
            data_base: u16_at(DATA_BASE),
            prog_cursor: u16_at(PROG_CURSOR),
            data_cursor: u16_at(DATA_CURSOR),
        })
    }

    /// Serialize the header.
    pub fn to_bytes(&self) -> [u8; SPIN_HEADER_SIZE] {
        let mut out = [0u8; SPIN_HEADER_SIZE];
        out[CLOCK_FREQ..CLOCK_FREQ + 4].copy_from_slice(&self.clock_freq.to_le_bytes());
        out[CLOCK_MODE] = self.clock_mode;
        out[CHECKSUM] = self.checksum;
        out[PROG_BASE..PROG_BASE + 2].copy_from_slice(&self.prog_base.to_le_bytes());
        out[VAR_BASE..VAR_BASE + 2].copy_from_slice(&self.var_base.to_le_bytes());
        out[DATA_BASE..DATA_BASE + 2].copy_from_slice(&self.data_base.to_le_bytes());
        out[PROG_CURSOR..PROG_CURSOR + 2].copy_from_slice(&self.prog_cursor.to_le_bytes());
        out[DATA_CURSOR..DATA_CURSOR + 2].copy_from_slice(&self.data_cursor.to_le_bytes());
        out
    }

    /// Overwrite the start of `image` with this header.
    pub fn write_into(&self, image: &mut [u8]) -> Result<()> {
        let image_len = image.len();
        let dst = image.get_mut(..SPIN_HEADER_SIZE).ok_or_else(|| {
            ImageError::Malformed(format!(
                "image of {} bytes cannot hold a Spin header",
                image_len
            ))
        })?;
        dst.copy_from_slice(&self.to_bytes());
        Ok(())
    }
}

/// Unsigned byte sum of `bytes`, mod 256.
pub fn byte_sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Set the header checksum so the whole image sums to [`SPIN_TARGET_CHECKSUM`].
pub fn apply_checksum(image: &mut [u8]) -> Result<()> {
    if image.len() < SPIN_HEADER_SIZE {
        return Err(ImageError::Malformed(format!(
            "image of {} bytes cannot hold a Spin header",
            image.len()
        )));
    }
    image[CHECKSUM] = 0;
    image[CHECKSUM] = SPIN_TARGET_CHECKSUM.wrapping_sub(byte_sum(image));
    Ok(())
}
