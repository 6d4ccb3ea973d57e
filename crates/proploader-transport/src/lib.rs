//! Transport capabilities for the Propeller loader.
//!
//! The loader and the XBee protocol never open devices themselves. They are
//! written against the capabilities defined here:
//! - [`Connection`] for the serial link to the target (reset, send, timed receive)
//! - [`DatagramSocket`] and [`Network`] for the UDP side of a Wi-Fi serial bridge
//!
//! [`UdpEndpoint`] and [`SystemNetwork`] are the std-backed implementations of
//! the datagram side.

pub mod error;
pub mod ifaddrs;
pub mod traits;
pub mod udp;

pub use error::{Result, TransportError};
pub use ifaddrs::{broadcast_address, interface_addresses};
pub use traits::{Connection, DatagramSocket, InterfaceAddr, Network};
pub use udp::{SystemNetwork, UdpEndpoint, MAX_DATAGRAM_SIZE};
