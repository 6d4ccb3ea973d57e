use proploader_transport::{UdpEndpoint, MAX_DATAGRAM_SIZE};
use tracing::debug;

use crate::error::{Result, XbeeError};
use crate::packet::{ConfigReply, ConfigRequest};
use crate::param::XbeeParam;

/// A connected datagram link to one bridge's application service.
///
/// `recv` blocks until one datagram arrives or the link's read timeout
/// expires.
pub trait ControlLink {
    fn send(&self, buf: &[u8]) -> proploader_transport::Result<usize>;

    fn recv(&self, buf: &mut [u8]) -> proploader_transport::Result<usize>;
}

impl ControlLink for UdpEndpoint {
    fn send(&self, buf: &[u8]) -> proploader_transport::Result<usize> {
        UdpEndpoint::send(self, buf)
    }

    fn recv(&self, buf: &mut [u8]) -> proploader_transport::Result<usize> {
        UdpEndpoint::recv(self, buf)
    }
}

impl<L: ControlLink + ?Sized> ControlLink for &L {
    fn send(&self, buf: &[u8]) -> proploader_transport::Result<usize> {
        (**self).send(buf)
    }

    fn recv(&self, buf: &mut [u8]) -> proploader_transport::Result<usize> {
        (**self).recv(buf)
    }
}

/// Reads and writes bridge parameters, one request and one reply at a time.
#[derive(Debug)]
pub struct ConfigChannel<L> {
    link: L,
}

impl<L: ControlLink> ConfigChannel<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    /// Read `param`. The bridge decides how many bytes the value takes.
    pub fn get(&self, param: XbeeParam) -> Result<u32> {
        let reply = self.exchange(&ConfigRequest::get(param))?;
        let value = reply.value();
        debug!(%param, value, "read bridge parameter");
        Ok(value)
    }

    /// Write `value` to `param`.
    pub fn set(&self, param: XbeeParam, value: u32) -> Result<()> {
        if !param.is_writable() {
            return Err(XbeeError::ReadOnly(param));
        }
        self.exchange(&ConfigRequest::set(param, value))?;
        debug!(%param, value, "wrote bridge parameter");
        Ok(())
    }

    pub fn into_inner(self) -> L {
        self.link
    }

    fn exchange(&self, request: &ConfigRequest) -> Result<ConfigReply> {
        let bytes = request.to_bytes();
        let written = self.link.send(&bytes)?;
        if written != bytes.len() {
            return Err(XbeeError::ShortWrite {
                written,
                expected: bytes.len(),
            });
        }

        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        let n = self.link.recv(&mut buf)?;
        ConfigReply::parse_valid(&buf[..n])
    }
}
