use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::ifaddrs::interface_addresses;
use crate::traits::{DatagramSocket, InterfaceAddr, Network};

/// Largest datagram the bridge protocol ever produces or accepts.
pub const MAX_DATAGRAM_SIZE: usize = 2048;

// Socket timeouts of zero are rejected by the OS.
const MIN_TIMEOUT: Duration = Duration::from_millis(1);

/// A blocking UDP endpoint.
#[derive(Debug)]
pub struct UdpEndpoint {
    socket: UdpSocket,
}

impl UdpEndpoint {
    /// Bind to `addr`.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        debug!(%addr, "bound datagram endpoint");
        Ok(Self { socket })
    }

    /// Bind an ephemeral port on all interfaces with broadcast enabled.
    pub fn open_broadcast() -> Result<Self> {
        let endpoint = Self::bind(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)))?;
        endpoint.socket.set_broadcast(true)?;
        Ok(endpoint)
    }

    /// Bind an ephemeral port and associate it with `remote`.
    pub fn connect(remote: SocketAddr) -> Result<Self> {
        let endpoint = Self::bind(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)))?;
        endpoint
            .socket
            .connect(remote)
            .map_err(|source| TransportError::Connect {
                addr: remote,
                source,
            })?;
        debug!(%remote, "connected datagram endpoint");
        Ok(endpoint)
    }

    /// Set the read timeout used by [`recv`](Self::recv) and [`recv_from`](DatagramSocket::recv_from).
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket
            .set_read_timeout(timeout.map(|t| t.max(MIN_TIMEOUT)))
            .map_err(Into::into)
    }

    /// Send on a connected endpoint.
    pub fn send(&self, buf: &[u8]) -> Result<usize> {
        Ok(self.socket.send(buf)?)
    }

    /// Receive on a connected endpoint, honoring the read timeout.
    pub fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        match self.socket.recv(buf) {
            Ok(n) => Ok(n),
            Err(err) if is_timeout(&err) => Err(TransportError::Timeout(
                self.socket.read_timeout()?.unwrap_or_default(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Local address of this endpoint.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

impl DatagramSocket for UdpEndpoint {
    fn send_to(&self, buf: &[u8], addr: SocketAddrV4) -> Result<usize> {
        Ok(self.socket.send_to(buf, addr)?)
    }

    fn poll_readable(&self, timeout: Duration) -> Result<bool> {
        let previous = self.socket.read_timeout()?;
        self.socket.set_read_timeout(Some(timeout.max(MIN_TIMEOUT)))?;
        let mut probe = [0u8; MAX_DATAGRAM_SIZE];
        let outcome = match self.socket.peek_from(&mut probe) {
            Ok(_) => Ok(true),
            Err(err) if is_timeout(&err) => Ok(false),
            Err(err) => Err(err.into()),
        };
        self.socket.set_read_timeout(previous)?;
        outcome
    }

    fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        Ok(self.socket.recv_from(buf)?)
    }
}

fn is_timeout(err: &std::io::Error) -> bool {
    err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut
}

/// The host's real network stack.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNetwork;

impl Network for SystemNetwork {
    type Socket = UdpEndpoint;

    fn interfaces(&self, max: usize) -> Result<Vec<InterfaceAddr>> {
        interface_addresses(max)
    }

    fn open_broadcast(&self) -> Result<UdpEndpoint> {
        UdpEndpoint::open_broadcast()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_any() -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0))
    }

    #[test]
    fn send_to_and_recv_from_roundtrip() {
        let left = UdpEndpoint::bind(loopback_any()).expect("left should bind");
        let right = UdpEndpoint::bind(loopback_any()).expect("right should bind");
        let SocketAddr::V4(right_addr) = right.local_addr().expect("local addr") else {
            panic!("expected an IPv4 address");
        };

        left.send_to(b"MY", right_addr).expect("send should succeed");

        assert!(right
            .poll_readable(Duration::from_secs(2))
            .expect("poll should succeed"));
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        let (n, from) = right.recv_from(&mut buf).expect("recv should succeed");
        assert_eq!(&buf[..n], b"MY");
        assert_eq!(from, left.local_addr().expect("local addr"));
    }

    #[test]
    fn poll_readable_times_out_when_idle() {
        let endpoint = UdpEndpoint::bind(loopback_any()).expect("endpoint should bind");
        let readable = endpoint
            .poll_readable(Duration::from_millis(20))
            .expect("poll should succeed");
        assert!(!readable);
    }

    #[test]
    fn poll_readable_accepts_zero_timeout() {
        let endpoint = UdpEndpoint::bind(loopback_any()).expect("endpoint should bind");
        assert!(!endpoint
            .poll_readable(Duration::ZERO)
            .expect("poll should succeed"));
    }

    #[test]
    fn connected_recv_reports_timeout() {
        let server = UdpEndpoint::bind(loopback_any()).expect("server should bind");
        let client = UdpEndpoint::connect(server.local_addr().expect("local addr"))
            .expect("client should connect");
        client
            .set_read_timeout(Some(Duration::from_millis(20)))
            .expect("timeout should apply");

        let mut buf = [0u8; 16];
        let result = client.recv(&mut buf);
        assert!(matches!(result, Err(TransportError::Timeout(_))));
    }

    #[test]
    fn connected_send_reaches_peer() {
        let server = UdpEndpoint::bind(loopback_any()).expect("server should bind");
        let client = UdpEndpoint::connect(server.local_addr().expect("local addr"))
            .expect("client should connect");

        client.send(b"hello").expect("send should succeed");
        let mut buf = [0u8; 16];
        let (n, _) = server.recv_from(&mut buf).expect("recv should succeed");
        assert_eq!(&buf[..n], b"hello");
    }
}
