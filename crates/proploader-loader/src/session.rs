use bytes::Bytes;
use proploader_codec::{
    build_identify_packet, build_loader_packet, extract_version, verify_received_handshake,
    LoaderCommand, EXPECTED_VERSION, HANDSHAKE_REPLY_SIZE, RX_HANDSHAKE, VERSION_SIZE,
};
use proploader_image::Image;
use proploader_transport::Connection;
use tracing::{debug, info};

use crate::config::LoaderConfig;
use crate::error::{HandshakeFailure, LoaderError, Result};

/// Where a boot session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Resetting,
    Sending,
    AwaitingHandshake,
    AwaitingChecksum,
    Done,
    Failed,
}

impl LoaderState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoaderState::Done | LoaderState::Failed)
    }
}

/// What a session is asked to do.
#[derive(Debug, Clone)]
pub enum LoadRequest {
    /// Send an image with a boot command, then wait for the checksum verdict.
    Load { image: Bytes, command: LoaderCommand },
    /// Handshake, read the version and shut the target down.
    Identify,
}

impl LoadRequest {
    pub fn load(image: &Image, command: LoaderCommand) -> Self {
        LoadRequest::Load {
            image: image.clone().into_bytes(),
            command,
        }
    }
}

/// Outcome of a session that reached [`LoaderState::Done`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Hardware version the target reported.
    pub version: u8,
    /// Size of the packet that went on the wire.
    pub packet_len: usize,
    /// Command sent, `None` for an identify session.
    pub command: Option<LoaderCommand>,
}

/// One boot attempt over one connection.
///
/// ```text
/// Idle -> Resetting -> Sending -> AwaitingHandshake -> AwaitingChecksum -> Done
///                 \          \                  \                    \
///                  `----------`------------------`--------------------`-> Failed
/// ```
///
/// Each call to [`step`](Self::step) performs exactly one transition. A
/// session is single use; once it is `Done` or `Failed`, further steps do
/// nothing. Identify sessions skip `AwaitingChecksum`.
pub struct LoaderSession<C> {
    conn: C,
    config: LoaderConfig,
    request: LoadRequest,
    state: LoaderState,
    packet: Bytes,
    version: Option<u8>,
}

impl<C: Connection> LoaderSession<C> {
    pub fn new(conn: C, request: LoadRequest, config: LoaderConfig) -> Self {
        Self {
            conn,
            config,
            request,
            state: LoaderState::Idle,
            packet: Bytes::new(),
            version: None,
        }
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// Version read during the handshake, once known.
    pub fn version(&self) -> Option<u8> {
        self.version
    }

    /// Packet built for this session; empty until `Resetting` has run.
    pub fn packet(&self) -> &[u8] {
        &self.packet
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn into_connection(self) -> C {
        self.conn
    }

    /// Perform one transition and return the new state.
    ///
    /// On error the session moves to [`LoaderState::Failed`].
    pub fn step(&mut self) -> Result<LoaderState> {
        let from = self.state;
        let outcome = match from {
            LoaderState::Idle => self.reset(),
            LoaderState::Resetting => self.send_packet(),
            LoaderState::Sending => self.await_transfer(),
            LoaderState::AwaitingHandshake => self.check_handshake(),
            LoaderState::AwaitingChecksum => self.check_checksum(),
            LoaderState::Done | LoaderState::Failed => return Ok(from),
        };

        match outcome {
            Ok(to) => {
                debug!(?from, ?to, "loader state transition");
                self.state = to;
                Ok(to)
            }
            Err(err) => {
                debug!(?from, error = %err, "loader session failed");
                self.state = LoaderState::Failed;
                Err(err)
            }
        }
    }

    /// Drive the session to completion.
    pub fn run(mut self) -> Result<LoadReport> {
        while !self.state.is_terminal() {
            self.step()?;
        }

        let report = LoadReport {
            version: self.version.unwrap_or(EXPECTED_VERSION),
            packet_len: self.packet.len(),
            command: match &self.request {
                LoadRequest::Load { command, .. } => Some(*command),
                LoadRequest::Identify => None,
            },
        };
        info!(
            version = report.version,
            packet_len = report.packet_len,
            command = ?report.command,
            "boot session complete"
        );
        Ok(report)
    }

    fn reset(&mut self) -> Result<LoaderState> {
        self.conn.reset()?;
        Ok(LoaderState::Resetting)
    }

    fn send_packet(&mut self) -> Result<LoaderState> {
        self.packet = match &self.request {
            LoadRequest::Load { image, command } => build_loader_packet(image, *command),
            LoadRequest::Identify => build_identify_packet(),
        };

        let written = self.conn.send(&self.packet)?;
        if written != self.packet.len() {
            return Err(LoaderError::ShortWrite {
                state: self.state,
                written,
                expected: self.packet.len(),
            });
        }
        Ok(LoaderState::Sending)
    }

    fn await_transfer(&mut self) -> Result<LoaderState> {
        self.conn.await_transfer_settle(self.packet.len())?;
        Ok(LoaderState::AwaitingHandshake)
    }

    fn check_handshake(&mut self) -> Result<LoaderState> {
        let reply = self
            .conn
            .receive_exact(HANDSHAKE_REPLY_SIZE, self.config.handshake_timeout())?;

        if reply.len() < HANDSHAKE_REPLY_SIZE {
            return Err(LoaderError::ProtocolMismatch(HandshakeFailure::Truncated {
                received: reply.len(),
                expected: HANDSHAKE_REPLY_SIZE,
            }));
        }
        if !verify_received_handshake(&reply) {
            return Err(LoaderError::ProtocolMismatch(HandshakeFailure::Mismatch));
        }

        let version = extract_version(&reply, RX_HANDSHAKE.len(), VERSION_SIZE);
        if version != EXPECTED_VERSION {
            return Err(LoaderError::VersionMismatch {
                found: version,
                expected: EXPECTED_VERSION,
            });
        }
        self.version = Some(version);

        match self.request {
            LoadRequest::Load { .. } => Ok(LoaderState::AwaitingChecksum),
            LoadRequest::Identify => Ok(LoaderState::Done),
        }
    }

    fn check_checksum(&mut self) -> Result<LoaderState> {
        match self.conn.await_checksum_ack(self.packet.len())? {
            0 => Ok(LoaderState::Done),
            code => Err(LoaderError::ChecksumNack { code }),
        }
    }
}
