use bytes::{BufMut, Bytes, BytesMut};

/// Widest bit group a single encoded byte can carry.
pub const MAX_SYMBOL_BITS: usize = 5;

/// One cell of the encoding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingEntry {
    /// Byte to put on the wire.
    pub encoded: u8,
    /// Input bits that byte actually carries. Zero marks an unused cell.
    pub bits_consumed: u8,
}

const fn e(encoded: u8, bits_consumed: u8) -> EncodingEntry {
    EncodingEntry {
        encoded,
        bits_consumed,
    }
}

const UNUSED: EncodingEntry = e(0, 0);

/// Encoding table indexed by `[bits][width - 1]`.
///
/// `bits` is the next `width` input bits, least significant first. For a given
/// width only the first `2^width` rows are populated. A cell may consume fewer
/// bits than requested when a shorter prefix already fits one pulse train; the
/// cursor advances by `bits_consumed`, and the next lookup starts from there.
pub static ENCODING_TABLE: [[EncodingEntry; MAX_SYMBOL_BITS]; 32] = [
    //             1-bit         2-bit         3-bit         4-bit         5-bit
    /* %00000 */ [e(0xFE, 1), e(0xF2, 2), e(0x92, 3), e(0x92, 3), e(0x92, 3)],
    /* %00001 */ [e(0xFF, 1), e(0xF9, 2), e(0xC9, 3), e(0xC9, 3), e(0xC9, 3)],
    /* %00010 */ [UNUSED, e(0xFA, 2), e(0xCA, 3), e(0xCA, 3), e(0xCA, 3)],
    /* %00011 */ [UNUSED, e(0xFD, 2), e(0xE5, 3), e(0x25, 4), e(0x25, 4)],
    /* %00100 */ [UNUSED, UNUSED, e(0xD2, 3), e(0xD2, 3), e(0xD2, 3)],
    /* %00101 */ [UNUSED, UNUSED, e(0xE9, 3), e(0x29, 4), e(0x29, 4)],
    /* %00110 */ [UNUSED, UNUSED, e(0xEA, 3), e(0x2A, 4), e(0x2A, 4)],
    /* %00111 */ [UNUSED, UNUSED, e(0xFA, 3), e(0x95, 4), e(0x95, 4)],
    /* %01000 */ [UNUSED, UNUSED, UNUSED, e(0x92, 3), e(0x92, 3)],
    /* %01001 */ [UNUSED, UNUSED, UNUSED, e(0x49, 4), e(0x49, 4)],
    /* %01010 */ [UNUSED, UNUSED, UNUSED, e(0x4A, 4), e(0x4A, 4)],
    /* %01011 */ [UNUSED, UNUSED, UNUSED, e(0xA5, 4), e(0xA5, 4)],
    /* %01100 */ [UNUSED, UNUSED, UNUSED, e(0x52, 4), e(0x52, 4)],
    /* %01101 */ [UNUSED, UNUSED, UNUSED, e(0xA9, 4), e(0xA9, 4)],
    /* %01110 */ [UNUSED, UNUSED, UNUSED, e(0xAA, 4), e(0xAA, 4)],
    /* %01111 */ [UNUSED, UNUSED, UNUSED, e(0xD5, 4), e(0xD5, 4)],
    /* %10000 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0x92, 3)],
    /* %10001 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0xC9, 3)],
    /* %10010 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0xCA, 3)],
    /* %10011 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0x25, 4)],
    /* %10100 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0xD2, 3)],
    /* %10101 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0x29, 4)],
    /* %10110 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0x2A, 4)],
    /* %10111 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0x95, 4)],
    /* %11000 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0x92, 3)],
    /* %11001 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0x49, 4)],
    /* %11010 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0x4A, 4)],
    /* %11011 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0xA5, 4)],
    /* %11100 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0x52, 4)],
    /* %11101 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0xA9, 4)],
    /* %11110 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0xAA, 4)],
    /* %11111 */ [UNUSED, UNUSED, UNUSED, UNUSED, e(0x55, 5)],
];

/// Look up the cell for `bits` taken `width` at a time.
///
/// Returns `None` for a width outside `1..=5` or `bits` that do not fit in it.
pub fn lookup(bits: u8, width: usize) -> Option<EncodingEntry> {
    if !(1..=MAX_SYMBOL_BITS).contains(&width) || usize::from(bits) >= 1 << width {
        return None;
    }
    Some(ENCODING_TABLE[usize::from(bits)][width - 1])
}

/// Encode `input` as a stream of self-clocking bytes.
pub fn encode(input: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(input.len() * 8 / 3 + 1);
    encode_into(input, &mut out);
    out.freeze()
}

/// Encode `input`, appending the encoded bytes to `dst`.
///
/// The input is consumed as one bit stream, bit 0 of byte 0 first. Each step
/// looks at up to five remaining bits and advances by however many the chosen
/// cell consumes.
pub fn encode_into(input: &[u8], dst: &mut BytesMut) {
    let bit_count = input.len() * 8;
    let mut next_bit = 0usize;

    while next_bit < bit_count {
        let width = (bit_count - next_bit).min(MAX_SYMBOL_BITS);
        let bits = extract_bits(input, next_bit, width);
        let entry = ENCODING_TABLE[usize::from(bits)][width - 1];
        dst.put_u8(entry.encoded);
        next_bit += usize::from(entry.bits_consumed);
    }
}

// Bits past the end of `input` read as zero and are masked off.
fn extract_bits(input: &[u8], start: usize, width: usize) -> u8 {
    let byte = start / 8;
    let shift = start % 8;
    let low = u16::from(input[byte]);
    let high = input.get(byte + 1).copied().map_or(0, u16::from);
    let window = (low | (high << 8)) >> shift;
    (window & ((1 << width) - 1)) as u8
}
