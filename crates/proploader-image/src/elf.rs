//! Just enough ELF32 to find loadable segments.
//!
//! Only little-endian 32-bit files are accepted, and only `PT_LOAD` program
//! headers with file contents are returned. Sections, symbols and relocations
//! are never looked at.

use tracing::debug;

use crate::error::{ImageError, Result};

const MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];
const CLASS_32: u8 = 1;
const DATA_LE: u8 = 1;

const EI_CLASS: usize = 4;
const EI_DATA: usize = 5;
const E_PHOFF: usize = 28;
const E_PHENTSIZE: usize = 42;
const E_PHNUM: usize = 44;
const FILE_HEADER_SIZE: usize = 52;

const P_TYPE: usize = 0;
const P_OFFSET: usize = 4;
const P_PADDR: usize = 12;
const P_FILESZ: usize = 16;
const PROGRAM_HEADER_SIZE: usize = 32;

const PT_LOAD: u32 = 1;

/// A loadable segment and the physical address it belongs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub address: u32,
    pub data: &'a [u8],
}

impl Segment<'_> {
    /// One past the last address this segment covers.
    pub fn end(&self) -> u64 {
        u64::from(self.address) + self.data.len() as u64
    }
}

/// Whether `bytes` starts with the ELF magic.
pub fn is_elf(bytes: &[u8]) -> bool {
    bytes.starts_with(&MAGIC)
}

/// Collect the loadable segments of an ELF32 little-endian file.
pub fn load_segments(bytes: &[u8]) -> Result<Vec<Segment<'_>>> {
    if !is_elf(bytes) {
        return Err(ImageError::Malformed("missing ELF magic".to_string()));
    }
    if bytes.len() < FILE_HEADER_SIZE {
        return Err(ImageError::Malformed(format!(
            "ELF header truncated ({} bytes)",
            bytes.len()
        )));
    }
    if bytes[EI_CLASS] != CLASS_32 || bytes[EI_DATA] != DATA_LE {
        return Err(ImageError::Malformed(
            "only 32-bit little-endian ELF files are supported".to_string(),
        ));
    }

    let phoff = read_u32(bytes, E_PHOFF)? as usize;
    let phentsize = usize::from(read_u16(bytes, E_PHENTSIZE)?);
    let phnum = usize::from(read_u16(bytes, E_PHNUM)?);
    if phnum > 0 && phentsize < PROGRAM_HEADER_SIZE {
        return Err(ImageError::Malformed(format!(
            "program header entry size {phentsize} is too small"
        )));
    }

    let mut segments = Vec::with_capacity(phnum);
    for index in 0..phnum {
        let header = index
            .checked_mul(phentsize)
            .and_then(|rel| phoff.checked_add(rel))
            .and_then(|base| span(bytes, base, PROGRAM_HEADER_SIZE))
            .ok_or_else(|| ImageError::Malformed(format!("program header {index} out of bounds")))?;

        let p_type = read_u32(header, P_TYPE)?;
        let offset = read_u32(header, P_OFFSET)? as usize;
        let address = read_u32(header, P_PADDR)?;
        let filesz = read_u32(header, P_FILESZ)? as usize;
        if p_type != PT_LOAD || filesz == 0 {
            continue;
        }

        let data = span(bytes, offset, filesz).ok_or_else(|| {
            ImageError::Malformed(format!(
                "segment {index} ({filesz} bytes at offset {offset}) out of bounds"
            ))
        })?;
        debug!(index, address = format_args!("{address:#010x}"), len = filesz, "found loadable segment");
        segments.push(Segment { address, data });
    }

    Ok(segments)
}

// `len` bytes at `start`, or `None` if the range overflows or runs past the end.
fn span(bytes: &[u8], start: usize, len: usize) -> Option<&[u8]> {
    bytes.get(start..start.checked_add(len)?)
}

fn read_u16(bytes: &[u8], offset: usize) -> Result<u16> {
    span(bytes, offset, 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or_else(|| ImageError::Malformed(format!("read past end at offset {offset}")))
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    span(bytes, offset, 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| ImageError::Malformed(format!("read past end at offset {offset}")))
}

/// Build a minimal ELF32 file from `(type, paddr, data)` program entries.
#[cfg(test)]
pub(crate) fn build_elf(entries: &[(u32, u32, &[u8])]) -> Vec<u8> {
    let phoff = FILE_HEADER_SIZE;
    let data_start = phoff + entries.len() * PROGRAM_HEADER_SIZE;

    let mut out = vec![0u8; data_start];
    out[..4].copy_from_slice(&MAGIC);
    out[EI_CLASS] = CLASS_32;
    out[EI_DATA] = DATA_LE;
    out[E_PHOFF..E_PHOFF + 4].copy_from_slice(&(phoff as u32).to_le_bytes());
    out[E_PHENTSIZE..E_PHENTSIZE + 2].copy_from_slice(&(PROGRAM_HEADER_SIZE as u16).to_le_bytes());
    out[E_PHNUM..E_PHNUM + 2].copy_from_slice(&(entries.len() as u16).to_le_bytes());

    for (index, (p_type, paddr, data)) in entries.iter().enumerate() {
        let offset = out.len() as u32;
        out.extend_from_slice(data);
        let base = phoff + index * PROGRAM_HEADER_SIZE;
        out[base + P_TYPE..base + P_TYPE + 4].copy_from_slice(&p_type.to_le_bytes());
        out[base + P_OFFSET..base + P_OFFSET + 4].copy_from_slice(&offset.to_le_bytes());
        out[base + 8..base + 12].copy_from_slice(&paddr.to_le_bytes());
        out[base + P_PADDR..base + P_PADDR + 4].copy_from_slice(&paddr.to_le_bytes());
        out[base + P_FILESZ..base + P_FILESZ + 4].copy_from_slice(&(data.len() as u32).to_le_bytes());
        out[base + 20..base + 24].copy_from_slice(&(data.len() as u32).to_le_bytes());
    }
    out
}
