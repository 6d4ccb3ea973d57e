use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::command::{LoaderCommand, COMMAND_SIZE, ENCODED_ZERO};
use crate::encoder::encode_into;
use crate::handshake::TX_HANDSHAKE;

/// Number of symbols in the image length field.
pub const LENGTH_FIELD_SIZE: usize = 11;

// OR'd into the last length symbol to end the field.
const FINAL_SYMBOL_MARKER: u8 = 0x60;

/// Image length in 32-bit longs, rounded up.
pub fn len_in_longs(image_len: usize) -> u32 {
    image_len.div_ceil(4) as u32
}

/// Encode a long count as the boot ROM's length field.
///
/// Three bits per symbol, least significant first. Bits land at symbol bit
/// positions 0, 2 and 4 so each one becomes its own pulse.
///
/// ```text
/// symbol = 0x92 | b0 | (b1 << 2) | (b2 << 4)     (| 0x60 on the last symbol)
/// ```
pub fn encode_length_field(longs: u32) -> [u8; LENGTH_FIELD_SIZE] {
    let mut field = [0u8; LENGTH_FIELD_SIZE];
    let mut remaining = longs;
    for (i, symbol) in field.iter_mut().enumerate() {
        let marker = if i == LENGTH_FIELD_SIZE - 1 {
            FINAL_SYMBOL_MARKER
        } else {
            0
        };
        let bits = (remaining & 0x07) as u8;
        *symbol = ENCODED_ZERO | marker | (bits & 1) | ((bits & 2) << 2) | ((bits & 4) << 4);
        remaining >>= 3;
    }
    field
}

/// Build the single packet that carries a whole boot session.
///
/// ```text
/// ┌──────────────┬──────────────┬────────────────┬─────────────────┐
/// │ TX handshake │ Command      │ Length field   │ Encoded image   │
/// │ (198B)       │ (11B)        │ (11 symbols)   │ (variable)      │
/// └──────────────┴──────────────┴────────────────┴─────────────────┘
/// ```
///
/// The image is zero-padded to a whole number of longs so the payload matches
/// the length field. Padding leaves the byte-sum checksum unchanged.
pub fn build_loader_packet(image: &[u8], command: LoaderCommand) -> Bytes {
    let longs = len_in_longs(image.len());
    let padded_len = longs as usize * 4;
    let mut packet =
        BytesMut::with_capacity(TX_HANDSHAKE.len() + COMMAND_SIZE + LENGTH_FIELD_SIZE + padded_len * 3);
    packet.put_slice(&TX_HANDSHAKE);
    packet.put_slice(command.encoded());
    packet.put_slice(&encode_length_field(longs));
    if padded_len == image.len() {
        encode_into(image, &mut packet);
    } else {
        let mut padded = image.to_vec();
        padded.resize(padded_len, 0);
        encode_into(&padded, &mut packet);
    }
    trace!(image_len = image.len(), packet_len = packet.len(), %command, "built loader packet");
    packet.freeze()
}

/// Build a packet that only handshakes and then shuts the target down.
pub fn build_identify_packet() -> Bytes {
    let mut packet = BytesMut::with_capacity(TX_HANDSHAKE.len() + COMMAND_SIZE);
    packet.put_slice(&TX_HANDSHAKE);
    packet.put_slice(LoaderCommand::Shutdown.encoded());
    packet.freeze()
}
