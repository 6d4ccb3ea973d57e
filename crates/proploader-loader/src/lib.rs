//! Boot sessions against a Propeller target.
//!
//! A session resets the target, sends one packet holding the handshake, the
//! boot command and the encoded image, checks the target's handshake reply and
//! hardware version, then waits for its checksum verdict. Every stage either
//! advances or fails the whole attempt; retrying is up to the caller.

pub mod config;
pub mod error;
pub mod loader;
pub mod session;

pub use config::LoaderConfig;
pub use error::{HandshakeFailure, LoaderError, Result};
pub use loader::{identify, load, load_file};
pub use session::{LoadReport, LoadRequest, LoaderSession, LoaderState};

pub use proploader_codec::LoaderCommand;
