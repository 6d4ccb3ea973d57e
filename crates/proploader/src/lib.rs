//! Host-side loader for Propeller microcontrollers.
//!
//! Loads a flat image into a Propeller over a serial link, and finds and
//! configures the XBee Wi-Fi bridges that carry that link over the network.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial and datagram capabilities, UDP endpoint, interfaces
//! - [`codec`]: boot protocol encoder, handshake and packet builders
//! - [`image`]: Spin binaries and ELF relocation into flat images
//! - [`loader`]: the boot session state machine
//! - [`xbee`]: bridge discovery and configuration (behind `xbee` feature)
//! - [`config`]: JSON configuration document
//! - [`logging`]: log settings, and subscriber setup behind `logging` feature

pub mod config;
pub mod logging;

/// Re-export transport types.
pub mod transport {
    pub use proploader_transport::*;
}

/// Re-export codec types.
pub mod codec {
    pub use proploader_codec::*;
}

/// Re-export image types.
pub mod image {
    pub use proploader_image::*;
}

/// Re-export loader types.
pub mod loader {
    pub use proploader_loader::*;
}

/// Re-export XBee types (requires `xbee` feature).
#[cfg(feature = "xbee")]
pub mod xbee {
    pub use proploader_xbee::*;
}

pub use config::{Config, ConfigError};
