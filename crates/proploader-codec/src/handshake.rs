//! The handshake that opens every boot session.
//!
//! Both directions are windows onto one bit stream: the low bit of an 8-bit
//! LFSR seeded with `'P'`. The host transmits the first 250 bits, the target
//! answers with the next 250. The stream only repeats after 255 steps, so a
//! correct reply proves the target is alive, decoding the host's timing, and
//! running the expected boot ROM.
//!
//! Both sequences are fixed tables. The reply table is derived from the
//! transmit table and must change only together with it.

/// Number of bytes carrying the target's version reply.
pub const VERSION_SIZE: usize = 4;

/// Bytes expected back from the target: handshake reply plus version.
pub const HANDSHAKE_REPLY_SIZE: usize = RX_HANDSHAKE.len() + VERSION_SIZE;

/// The only hardware version this loader talks to.
pub const EXPECTED_VERSION: u8 = 1;

/// Host-transmitted handshake stream.
///
/// Layout: one byte holding the `1`/`0` timing template and the first two
/// handshake bits, 68 bytes with the remaining 248 handshake bits, 125 bytes of
/// timing templates that clock out the target's 250-bit reply, and 4 bytes of
/// timing templates that clock out its version.
#[rustfmt::skip]
pub static TX_HANDSHAKE: [u8; 198] = [
    0x49,
    0xAA, 0x52, 0xA5, 0xAA, 0x25, 0xAA, 0xD2, 0xCA, 0x52, 0x25, 0xD2, 0xD2, 0xD2, 0xAA, 0x49, 0x92,
    0xC9, 0x2A, 0xA5, 0x25, 0x4A, 0x49, 0x49, 0x2A, 0x25, 0x49, 0xA5, 0x4A, 0xAA, 0x2A, 0xA9, 0xCA,
    0xAA, 0x55, 0x52, 0xAA, 0xA9, 0x29, 0x92, 0x92, 0x29, 0x25, 0x2A, 0xAA, 0x92, 0x92, 0x55, 0xCA,
    0x4A, 0xCA, 0xCA, 0x92, 0xCA, 0x92, 0x95, 0x55, 0xA9, 0x92, 0x2A, 0xD2, 0x52, 0x92, 0x52, 0xCA,
    0xD2, 0xCA, 0x2A, 0xFF,
    // reply timing templates
    0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29,
    0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29,
    0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29,
    0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29,
    0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29,
    0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29,
    0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29,
    0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29, 0x29,
    // version timing templates
    0x29, 0x29, 0x29, 0x29,
];

/// Reply expected from the target, two LFSR bits per byte (bits 0 and 5).
#[rustfmt::skip]
pub static RX_HANDSHAKE: [u8; 125] = [
    0xEE, 0xCE, 0xCE, 0xCF, 0xEF, 0xCF, 0xEE, 0xEF, 0xCF, 0xCF, 0xEF, 0xEF, 0xCF, 0xCE, 0xEF, 0xCF,
    0xEE, 0xEE, 0xCE, 0xEE, 0xEF, 0xCF, 0xCE, 0xEE, 0xCE, 0xCF, 0xEE, 0xEE, 0xEF, 0xCF, 0xEE, 0xCE,
    0xEE, 0xCE, 0xEE, 0xCF, 0xEF, 0xEE, 0xEF, 0xCE, 0xEE, 0xEE, 0xCF, 0xEE, 0xCF, 0xEE, 0xEE, 0xCF,
    0xEF, 0xCE, 0xCF, 0xEE, 0xEF, 0xEE, 0xEE, 0xEE, 0xEE, 0xEF, 0xEE, 0xCF, 0xCF, 0xEF, 0xEE, 0xCE,
    0xEF, 0xEF, 0xEF, 0xEF, 0xCE, 0xEF, 0xEE, 0xEF, 0xCF, 0xEF, 0xCF, 0xCF, 0xCE, 0xCE, 0xCE, 0xCF,
    0xCF, 0xEF, 0xCE, 0xEE, 0xCF, 0xEE, 0xEF, 0xCE, 0xCE, 0xCE, 0xEF, 0xEF, 0xCF, 0xCF, 0xEE, 0xEE,
    0xEE, 0xCE, 0xCF, 0xCE, 0xCE, 0xCF, 0xCE, 0xEE, 0xEF, 0xEE, 0xEF, 0xEF, 0xCF, 0xEF, 0xCE, 0xCE,
    0xEF, 0xCE, 0xEE, 0xCE, 0xEF, 0xCE, 0xCE, 0xEE, 0xCF, 0xCF, 0xCE, 0xCF, 0xCF,
];

/// Check that `buf` starts with the expected handshake reply.
///
/// Any difference, or a buffer too short to hold the reply, fails. There is
/// no resynchronisation.
pub fn verify_received_handshake(buf: &[u8]) -> bool {
    buf.get(..RX_HANDSHAKE.len())
        .is_some_and(|reply| reply == RX_HANDSHAKE.as_slice())
}

/// Fold `count` reply bytes starting at `offset` into a version number.
///
/// Each byte answers two timing templates: bit 0 carries the first bit and
/// bit 5 the second. Bytes arrive least significant pair first.
pub fn extract_version(buf: &[u8], offset: usize, count: usize) -> u8 {
    buf.iter()
        .skip(offset)
        .take(count)
        .fold(0u8, |version, &byte| {
            ((version >> 2) & 0x3F) | ((byte & 0x01) << 6) | ((byte & 0x20) << 2)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pulse::{decode_pulses, lfsr_bits};

    const VERSION_ONE: [u8; VERSION_SIZE] = [0xCF, 0xCE, 0xCE, 0xCE];

    fn good_reply() -> Vec<u8> {
        let mut reply = RX_HANDSHAKE.to_vec();
        reply.extend_from_slice(&VERSION_ONE);
        reply
    }

    #[test]
    fn transmit_stream_carries_first_250_lfsr_bits() {
        let decoded = decode_pulses(&TX_HANDSHAKE[..69]);
        assert_eq!(decoded.len(), 252);
        assert_eq!(&decoded[..2], &[1, 0], "timing template");
        assert_eq!(&decoded[2..], lfsr_bits(250).as_slice());
    }

    #[test]
    fn transmit_stream_ends_with_reply_templates() {
        let templates = decode_pulses(&TX_HANDSHAKE[69..]);
        assert_eq!(templates.len(), 2 * 2 * HANDSHAKE_REPLY_SIZE);
        assert!(templates.chunks(2).all(|pair| pair == [1, 0]));
    }

    #[test]
    fn template_blocks_follow_the_handshake_bits() {
        let (reply, version) = TX_HANDSHAKE[69..].split_at(RX_HANDSHAKE.len());
        assert_eq!(TX_HANDSHAKE[68], 0xFF);
        assert!(reply.iter().all(|&b| b == 0x29));
        assert_eq!(version, [0x29; VERSION_SIZE]);
    }

    #[test]
    fn reply_continues_the_same_lfsr_stream() {
        let stream = lfsr_bits(500);
        let reply: Vec<u8> = RX_HANDSHAKE
            .iter()
            .flat_map(|&b| [b & 0x01, (b >> 5) & 0x01])
            .collect();
        assert_eq!(reply.as_slice(), &stream[250..]);
        assert!(RX_HANDSHAKE.iter().all(|&b| b & !0x21 == 0xCE));
    }

    #[test]
    fn accepts_known_good_reply() {
        assert!(verify_received_handshake(&good_reply()));
        assert!(verify_received_handshake(&RX_HANDSHAKE));
    }

    #[test]
    fn rejects_every_single_byte_mutation() {
        let reply = good_reply();
        for i in 0..RX_HANDSHAKE.len() {
            let mut mutated = reply.clone();
            mutated[i] ^= 0x01;
            assert!(!verify_received_handshake(&mutated), "mutation at {i}");
        }
    }

    #[test]
    fn rejects_truncated_reply() {
        assert!(!verify_received_handshake(&RX_HANDSHAKE[..100]));
        assert!(!verify_received_handshake(&[]));
    }

    #[test]
    fn version_trailer_decodes_to_one() {
        let reply = good_reply();
        assert_eq!(
            extract_version(&reply, RX_HANDSHAKE.len(), VERSION_SIZE),
            EXPECTED_VERSION
        );
    }

    #[test]
    fn version_uses_bits_zero_and_five() {
        assert_eq!(extract_version(&[0xEF, 0xCE, 0xCE, 0xCE], 0, 4), 0x03);
        assert_eq!(extract_version(&[0xCE, 0xCE, 0xCE, 0xEF], 0, 4), 0xC0);
        assert_eq!(extract_version(&[0xCE; 4], 0, 4), 0x00);
    }

    #[test]
    fn version_ignores_bytes_past_the_buffer() {
        assert_eq!(extract_version(&VERSION_ONE[..1], 0, VERSION_SIZE), 0x40);
    }
}
