use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, XbeeError};
use crate::param::XbeeParam;

/// Header: number1 (2) + number2 (2) + packet ID + pad + command ID + options.
pub const HEADER_SIZE: usize = 8;

/// Request: header + frame ID + config options + AT command (2).
pub const REQUEST_SIZE: usize = HEADER_SIZE + 4;

/// Smallest valid reply: header + frame ID + AT command (2) + status.
pub const REPLY_MIN_SIZE: usize = HEADER_SIZE + 4;

/// `number1 ^ number2` for every valid packet.
pub const XOR_KEY: u16 = 0x4242;

/// Command ID of a remote AT command.
pub const REMOTE_AT_COMMAND: u8 = 0x02;

const FRAME_ID: u8 = 0x01;

/// Config option asking the bridge to apply a change immediately.
const APPLY_CHANGES: u8 = 0x02;

/// The fixed header every config packet starts with.
///
/// ```text
/// ┌──────────┬──────────┬──────────┬─────────┬───────────┬─────────┐
/// │ number1  │ number2  │ packetID │ encPad  │ commandID │ options │
/// │ (2B BE)  │ (2B BE)  │ (1B)     │ (1B)    │ (1B)      │ (1B)    │
/// └──────────┴──────────┴──────────┴─────────┴───────────┴─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigHeader {
    pub number1: u16,
    pub number2: u16,
    pub packet_id: u8,
    pub encryption_pad: u8,
    pub command_id: u8,
    pub command_options: u8,
}

impl ConfigHeader {
    /// A remote AT command header correlated by `number1`.
    pub fn new(number1: u16) -> Self {
        Self {
            number1,
            number2: number1 ^ XOR_KEY,
            packet_id: 0,
            encryption_pad: 0,
            command_id: REMOTE_AT_COMMAND,
            command_options: 0,
        }
    }

    pub fn is_correlated(&self) -> bool {
        self.number1 ^ self.number2 == XOR_KEY
    }

    pub fn write_into(&self, dst: &mut BytesMut) {
        dst.put_u16(self.number1);
        dst.put_u16(self.number2);
        dst.put_u8(self.packet_id);
        dst.put_u8(self.encryption_pad);
        dst.put_u8(self.command_id);
        dst.put_u8(self.command_options);
    }

    /// Read a header from the front of `src`. `src` must hold `HEADER_SIZE` bytes.
    fn read_from(src: &mut &[u8]) -> Self {
        Self {
            number1: src.get_u16(),
            number2: src.get_u16(),
            packet_id: src.get_u8(),
            encryption_pad: src.get_u8(),
            command_id: src.get_u8(),
            command_options: src.get_u8(),
        }
    }
}

impl Default for ConfigHeader {
    fn default() -> Self {
        Self::new(0)
    }
}

/// A get or set request for one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRequest {
    pub header: ConfigHeader,
    pub frame_id: u8,
    pub config_options: u8,
    pub at_command: [u8; 2],
    /// Value to write; `None` reads the parameter.
    pub value: Option<u32>,
}

impl ConfigRequest {
    pub fn get(param: XbeeParam) -> Self {
        Self::with_command(param.at_command(), None)
    }

    pub fn set(param: XbeeParam, value: u32) -> Self {
        Self::with_command(param.at_command(), Some(value))
    }

    fn with_command(at_command: [u8; 2], value: Option<u32>) -> Self {
        Self {
            header: ConfigHeader::default(),
            frame_id: FRAME_ID,
            config_options: APPLY_CHANGES,
            at_command,
            value,
        }
    }

    pub fn wire_size(&self) -> usize {
        REQUEST_SIZE + if self.value.is_some() { 4 } else { 0 }
    }

    /// Serialize; a set request carries its value as 4 bytes big-endian.
    pub fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        self.header.write_into(&mut dst);
        dst.put_u8(self.frame_id);
        dst.put_u8(self.config_options);
        dst.put_slice(&self.at_command);
        if let Some(value) = self.value {
            dst.put_u32(value);
        }
        dst.freeze()
    }

    /// Parse a request as the bridge sees it.
    ///
    /// A set request must carry a full 4-byte value after the AT command.
    pub fn from_bytes(src: &[u8]) -> Result<Self> {
        if src.len() < REQUEST_SIZE {
            return Err(XbeeError::Truncated {
                len: src.len(),
                min: REQUEST_SIZE,
            });
        }
        let mut cursor = src;
        let header = ConfigHeader::read_from(&mut cursor);
        let frame_id = cursor.get_u8();
        let config_options = cursor.get_u8();
        let at_command = [cursor.get_u8(), cursor.get_u8()];
        let value = match cursor.remaining() {
            0 => None,
            n if n >= 4 => Some(cursor.get_u32()),
            _ => {
                return Err(XbeeError::Truncated {
                    len: src.len(),
                    min: REQUEST_SIZE + 4,
                })
            }
        };
        Ok(Self {
            header,
            frame_id,
            config_options,
            at_command,
            value,
        })
    }
}

/// The bridge's answer to a [`ConfigRequest`].
///
/// ```text
/// ┌──────────────┬─────────┬───────────┬────────┬──────────────────────┐
/// │ Header (8B)  │ frameID │ AT (2B)   │ status │ value (BE, any size) │
/// └──────────────┴─────────┴───────────┴────────┴──────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigReply {
    pub header: ConfigHeader,
    pub frame_id: u8,
    pub at_command: [u8; 2],
    pub status: u8,
    pub payload: Bytes,
}

impl ConfigReply {
    /// A successful reply to `request` carrying `payload`.
    pub fn ok(request: &ConfigRequest, payload: impl Into<Bytes>) -> Self {
        Self {
            header: request.header,
            frame_id: request.frame_id,
            at_command: request.at_command,
            status: 0,
            payload: payload.into(),
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(REPLY_MIN_SIZE + self.payload.len());
        self.header.write_into(&mut dst);
        dst.put_u8(self.frame_id);
        dst.put_slice(&self.at_command);
        dst.put_u8(self.status);
        dst.put_slice(&self.payload);
        dst.freeze()
    }

    /// Split a datagram into its fields. Only the length is checked here.
    pub fn from_bytes(src: &[u8]) -> Result<Self> {
        if src.len() < REPLY_MIN_SIZE {
            return Err(XbeeError::Truncated {
                len: src.len(),
                min: REPLY_MIN_SIZE,
            });
        }
        let mut cursor = src;
        let header = ConfigHeader::read_from(&mut cursor);
        let frame_id = cursor.get_u8();
        let at_command = [cursor.get_u8(), cursor.get_u8()];
        let status = cursor.get_u8();
        Ok(Self {
            header,
            frame_id,
            at_command,
            status,
            payload: Bytes::copy_from_slice(cursor),
        })
    }

    /// Parse and reject replies that fail correlation or report an error.
    pub fn parse_valid(src: &[u8]) -> Result<Self> {
        let reply = Self::from_bytes(src)?;
        reply.validate()?;
        Ok(reply)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.header.is_correlated() {
            return Err(XbeeError::ProtocolMismatch {
                number1: self.header.number1,
                number2: self.header.number2,
            });
        }
        if self.status != 0 {
            return Err(XbeeError::Status {
                status: self.status,
            });
        }
        Ok(())
    }

    /// The payload read as a big-endian integer. Only the low 32 bits of a
    /// wider payload survive; an empty payload is zero.
    pub fn value(&self) -> u32 {
        self.payload
            .iter()
            .fold(0u32, |value, &byte| (value << 8) | u32::from(byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_request_is_correlated() {
        for &param in XbeeParam::all() {
            let bytes = ConfigRequest::get(param).to_bytes();
            let number1 = u16::from_be_bytes([bytes[0], bytes[1]]);
            let number2 = u16::from_be_bytes([bytes[2], bytes[3]]);
            assert_eq!(number1 ^ number2, XOR_KEY, "{param}");
        }
        for number1 in [0x0000, 0x1234, 0xFFFF] {
            assert!(ConfigHeader::new(number1).is_correlated());
        }
    }

    #[test]
    fn get_request_layout() {
        let bytes = ConfigRequest::get(XbeeParam::IpAddr).to_bytes();
        assert_eq!(
            bytes.as_ref(),
            &[0x00, 0x00, 0x42, 0x42, 0x00, 0x00, 0x02, 0x00, 0x01, 0x02, b'M', b'Y']
        );
    }

    #[test]
    fn set_request_appends_big_endian_value() {
        let bytes = ConfigRequest::set(XbeeParam::SerialBaud, 0x0000_0007).to_bytes();
        assert_eq!(bytes.len(), REQUEST_SIZE + 4);
        assert_eq!(&bytes[10..12], b"BD");
        assert_eq!(&bytes[12..], &[0x00, 0x00, 0x00, 0x07]);
    }

    #[test]
    fn request_parses_back() {
        let request = ConfigRequest::set(XbeeParam::Io2Timer, 0x0102_0304);
        let parsed = ConfigRequest::from_bytes(&request.to_bytes()).expect("request should parse");
        assert_eq!(parsed, request);

        let mut trailing = ConfigRequest::get(XbeeParam::Ssid).to_bytes().to_vec();
        trailing.push(0xAA);
        assert!(ConfigRequest::from_bytes(&trailing).is_err());
    }

    #[test]
    fn reply_value_is_big_endian_of_any_width() {
        let request = ConfigRequest::get(XbeeParam::IpAddr);
        let reply = ConfigReply::ok(&request, vec![192, 168, 1, 50]);
        let parsed = ConfigReply::parse_valid(&reply.to_bytes()).expect("reply should be valid");
        assert_eq!(parsed.value(), 0xC0A8_0132);
        assert_eq!(parsed.at_command, *b"MY");

        let short = ConfigReply::ok(&request, vec![0x12, 0x34]);
        assert_eq!(short.value(), 0x1234);
        assert_eq!(ConfigReply::ok(&request, Vec::new()).value(), 0);
    }

    #[test]
    fn reply_shorter_than_header_is_rejected() {
        let err = ConfigReply::from_bytes(&[0x00; 11]).unwrap_err();
        assert!(matches!(err, XbeeError::Truncated { len: 11, min: 12 }));
    }

    #[test]
    fn uncorrelated_reply_is_protocol_mismatch() {
        let mut bytes = ConfigReply::ok(&ConfigRequest::get(XbeeParam::IpAddr), vec![1])
            .to_bytes()
            .to_vec();
        bytes[3] ^= 0x01;
        let err = ConfigReply::parse_valid(&bytes).unwrap_err();
        assert!(matches!(
            err,
            XbeeError::ProtocolMismatch {
                number1: 0x0000,
                number2: 0x4243
            }
        ));
    }

    #[test]
    fn nonzero_status_is_rejected() {
        let mut reply = ConfigReply::ok(&ConfigRequest::get(XbeeParam::NodeId), Vec::new());
        reply.status = 0x02;
        let err = ConfigReply::parse_valid(&reply.to_bytes()).unwrap_err();
        assert!(matches!(err, XbeeError::Status { status: 0x02 }));
    }
}
