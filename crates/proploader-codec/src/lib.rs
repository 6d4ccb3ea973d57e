//! Wire encoding for the Propeller serial boot protocol.
//!
//! After reset the target has no idea what baud rate the host is using. Every
//! byte the host sends is therefore shaped so that its low pulses carry the
//! data: a one-bit-time pulse is a `1`, a two-bit-time pulse is a `0`. The
//! target reads the pulse widths and never needs a shared clock.
//!
//! This crate is pure data and pure functions:
//! - [`encoder`]: the table-driven bit encoder
//! - [`handshake`]: the LFSR handshake streams and reply validation
//! - [`command`]: the four boot commands
//! - [`packet`]: the length field and complete outbound packets

pub mod command;
pub mod encoder;
pub mod handshake;
pub mod packet;

#[cfg(test)]
pub(crate) mod pulse;

pub use command::{LoaderCommand, COMMAND_SIZE, ENCODED_ZERO};
pub use encoder::{encode, encode_into, lookup, EncodingEntry, ENCODING_TABLE, MAX_SYMBOL_BITS};
pub use handshake::{
    extract_version, verify_received_handshake, EXPECTED_VERSION, HANDSHAKE_REPLY_SIZE,
    RX_HANDSHAKE, TX_HANDSHAKE, VERSION_SIZE,
};
pub use packet::{
    build_identify_packet, build_loader_packet, encode_length_field, len_in_longs,
    LENGTH_FIELD_SIZE,
};
