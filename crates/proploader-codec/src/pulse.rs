//! Test-side model of how the target reads pulse widths off the line.

/// Decode encoded bytes the way the target does.
///
/// Each byte is framed as a start bit, eight data bits LSB first, and a stop
/// bit. A low run of one bit time is a `1`; a low run of two is a `0`.
pub(crate) fn decode_pulses(encoded: &[u8]) -> Vec<u8> {
    let mut bits = Vec::new();
    for &byte in encoded {
        let mut line = [1u8; 10];
        line[0] = 0;
        for (i, slot) in line[1..9].iter_mut().enumerate() {
            *slot = (byte >> i) & 1;
        }

        let mut i = 0;
        while i < line.len() {
            if line[i] == 0 {
                let start = i;
                while line[i] == 0 {
                    i += 1;
                }
                bits.push(if i - start == 1 { 1 } else { 0 });
            } else {
                i += 1;
            }
        }
    }
    bits
}

/// Flatten bytes into bits, bit 0 of byte 0 first.
pub(crate) fn bits_of(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|&b| (0..8).map(move |i| (b >> i) & 1))
        .collect()
}

/// Low bit of each step of the handshake LFSR seeded with `'P'`.
pub(crate) fn lfsr_bits(count: usize) -> Vec<u8> {
    let mut lfsr = b'P';
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(lfsr & 0x01);
        let feedback = ((lfsr >> 7) ^ (lfsr >> 5) ^ (lfsr >> 4) ^ (lfsr >> 1)) & 1;
        lfsr = ((lfsr << 1) & 0xFE) | feedback;
    }
    out
}
