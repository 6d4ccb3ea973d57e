use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use crate::error::Result;

/// A serial link to a Propeller target.
///
/// Implementations own the physical details: opening the port, pulsing the
/// reset line, and pacing the transfer to the configured baud rate. The loader
/// drives a single `Connection` strictly sequentially for the duration of one
/// load and never shares it.
pub trait Connection {
    /// Pulse the target's reset line.
    fn reset(&mut self) -> Result<()>;

    /// Transmit `data`, returning the number of bytes written.
    fn send(&mut self, data: &[u8]) -> Result<usize>;

    /// Block for up to `timeout` collecting `len` bytes.
    ///
    /// Returns whatever arrived before the deadline. A short buffer signals a
    /// timeout; it is not an error at this layer.
    fn receive_exact(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>>;

    /// Wait long enough for `packet_size` bytes to finish leaving the host.
    fn await_transfer_settle(&mut self, packet_size: usize) -> Result<()>;

    /// Wait for the target's checksum verdict on a `packet_size`-byte transfer.
    ///
    /// Returns `0` when the target accepted the image, any other value otherwise.
    fn await_checksum_ack(&mut self, packet_size: usize) -> Result<u8>;
}

impl<C: Connection + ?Sized> Connection for &mut C {
    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn send(&mut self, data: &[u8]) -> Result<usize> {
        (**self).send(data)
    }

    fn receive_exact(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>> {
        (**self).receive_exact(len, timeout)
    }

    fn await_transfer_settle(&mut self, packet_size: usize) -> Result<()> {
        (**self).await_transfer_settle(packet_size)
    }

    fn await_checksum_ack(&mut self, packet_size: usize) -> Result<u8> {
        (**self).await_checksum_ack(packet_size)
    }
}

/// A broadcast-capable datagram endpoint. Closed on drop.
pub trait DatagramSocket {
    /// Send one datagram to `addr`.
    fn send_to(&self, buf: &[u8], addr: SocketAddrV4) -> Result<usize>;

    /// Wait up to `timeout` for a datagram to become readable.
    fn poll_readable(&self, timeout: Duration) -> Result<bool>;

    /// Receive one datagram into `buf`.
    fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)>;
}

/// An IPv4 address assigned to a host interface, with its broadcast address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceAddr {
    pub addr: Ipv4Addr,
    pub broadcast: Ipv4Addr,
}

/// Host networking as seen by device discovery.
pub trait Network {
    type Socket: DatagramSocket;

    /// List up to `max` broadcast-capable IPv4 interfaces.
    fn interfaces(&self, max: usize) -> Result<Vec<InterfaceAddr>>;

    /// Open a fresh broadcast-capable endpoint.
    fn open_broadcast(&self) -> Result<Self::Socket>;
}
