//! Reaching a Propeller through an XBee Wi-Fi serial bridge.
//!
//! The bridge speaks a small request/reply protocol over UDP on its
//! application service port. This crate covers:
//! - [`packet`]: the config request/reply wire format
//! - [`param`]: the AT parameters a bridge exposes
//! - [`discovery`]: finding bridges on every local broadcast network
//! - [`channel`]: reading and writing one parameter over a control link
//! - [`client`]: the connected app-service and serial-service sockets

pub mod channel;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod packet;
pub mod param;

pub use channel::{ConfigChannel, ControlLink};
pub use client::XbeeClient;
pub use config::XbeeConfig;
pub use discovery::{discover, discover_on_interface, DeviceAddress};
pub use error::{Result, XbeeError};
pub use packet::{
    ConfigHeader, ConfigReply, ConfigRequest, HEADER_SIZE, REPLY_MIN_SIZE, REQUEST_SIZE, XOR_KEY,
};
pub use param::{Access, XbeeParam};
