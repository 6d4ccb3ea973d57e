use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Instant;

use proploader_transport::{DatagramSocket, InterfaceAddr, Network, MAX_DATAGRAM_SIZE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::XbeeConfig;
use crate::error::{Result, XbeeError};
use crate::packet::{ConfigReply, ConfigRequest};
use crate::param::XbeeParam;

/// A bridge found on the network, tagged with the host interface that heard it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceAddress {
    pub host_interface: Ipv4Addr,
    pub device: Ipv4Addr,
}

/// Find bridges on every broadcast-capable interface.
///
/// Each interface gets its own socket and its own `discover_timeout` window.
/// An interface whose socket cannot be opened or whose query cannot be sent
/// is skipped. Results are concatenated in interface order, capped at
/// `max_results`.
///
/// Fails only when the host's interfaces cannot be listed.
pub fn discover<N: Network>(network: &N, config: &XbeeConfig) -> Result<Vec<DeviceAddress>> {
    let interfaces = network.interfaces(config.max_interfaces)?;
    debug!(count = interfaces.len(), "probing interfaces");

    let mut found = Vec::new();
    for iface in &interfaces {
        let remaining = config.max_results.saturating_sub(found.len());
        if remaining == 0 {
            break;
        }

        let socket = match network.open_broadcast() {
            Ok(socket) => socket,
            Err(err) => {
                warn!(interface = %iface.addr, error = %err, "skipping interface, cannot open socket");
                continue;
            }
        };
        match discover_on_interface(&socket, iface, config, remaining) {
            Ok(devices) => found.extend(devices),
            Err(err) => {
                warn!(interface = %iface.addr, error = %err, "skipping interface, query failed");
            }
        }
    }

    info!(count = found.len(), "discovery complete");
    Ok(found)
}

/// Broadcast one `MY` query from `socket` and collect up to `max` answers.
///
/// Stops at the first reply that fails validation, or the first poll or
/// receive error, and keeps what was already gathered. A bridge that answers
/// twice is recorded once. Only a failed send is an error.
pub fn discover_on_interface<S: DatagramSocket>(
    socket: &S,
    iface: &InterfaceAddr,
    config: &XbeeConfig,
    max: usize,
) -> Result<Vec<DeviceAddress>> {
    let query = ConfigRequest::get(XbeeParam::IpAddr).to_bytes();
    let target = SocketAddrV4::new(iface.broadcast, config.app_service_port);
    let written = socket.send_to(&query, target)?;
    if written != query.len() {
        return Err(XbeeError::ShortWrite {
            written,
            expected: query.len(),
        });
    }
    debug!(interface = %iface.addr, %target, "sent discovery query");

    let deadline = Instant::now() + config.discover_timeout();
    let mut devices: Vec<DeviceAddress> = Vec::new();
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];

    while devices.len() < max {
        let wait = deadline.saturating_duration_since(Instant::now());
        if wait.is_zero() {
            break;
        }
        match socket.poll_readable(wait) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                warn!(interface = %iface.addr, error = %err, "discovery poll failed");
                break;
            }
        }

        let (n, from) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(err) => {
                warn!(interface = %iface.addr, error = %err, "discovery receive failed");
                break;
            }
        };
        let reply = match ConfigReply::parse_valid(&buf[..n]) {
            Ok(reply) => reply,
            Err(err) => {
                warn!(interface = %iface.addr, %from, error = %err, "malformed discovery reply");
                break;
            }
        };

        let device = DeviceAddress {
            host_interface: iface.addr,
            device: Ipv4Addr::from(reply.value()),
        };
        if devices.contains(&device) {
            continue;
        }
        debug!(interface = %iface.addr, device = %device.device, "bridge answered");
        devices.push(device);
    }

    Ok(devices)
}
