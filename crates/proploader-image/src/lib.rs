//! Flat memory images for the Propeller loader.
//!
//! The boot ROM only understands one contiguous hub-memory image that starts
//! with a Spin header. Two inputs produce one:
//! - a Spin binary, used verbatim
//! - an ELF executable, whose loadable segments are relocated into a flat
//!   buffer and whose Spin header is fixed up afterwards
//!
//! [`assemble`] sniffs the input and picks the path.

pub mod assembler;
pub mod elf;
pub mod error;
pub mod image;
pub mod relocate;
pub mod spin;

pub use assembler::{assemble, assemble_file};
pub use elf::{is_elf, load_segments, Segment};
pub use error::{ImageError, Result};
pub use image::{Image, ImageSource};
pub use relocate::{relocate, COG_IMAGE_BASE};
pub use spin::{apply_checksum, byte_sum, SpinHeader, SPIN_HEADER_SIZE, SPIN_TARGET_CHECKSUM};
