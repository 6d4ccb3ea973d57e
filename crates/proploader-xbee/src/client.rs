use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use proploader_transport::{DatagramSocket, UdpEndpoint};
use tracing::{debug, info};

use crate::channel::ConfigChannel;
use crate::config::XbeeConfig;
use crate::discovery::DeviceAddress;
use crate::error::{Result, XbeeError};
use crate::param::XbeeParam;

/// A connection to one bridge.
///
/// Holds two sockets while connected: one associated with the bridge's
/// application service for config traffic, and one bound to the local
/// serial-service port where the bridge forwards the target's serial output.
/// Both are closed by [`disconnect`](Self::disconnect) or on drop.
#[derive(Debug)]
pub struct XbeeClient {
    config: XbeeConfig,
    sockets: Option<Sockets>,
}

#[derive(Debug)]
struct Sockets {
    device: Ipv4Addr,
    app: UdpEndpoint,
    serial: UdpEndpoint,
}

impl XbeeClient {
    pub fn new(config: XbeeConfig) -> Self {
        Self {
            config,
            sockets: None,
        }
    }

    pub fn config(&self) -> &XbeeConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.sockets.is_some()
    }

    /// Address of the connected bridge.
    pub fn device(&self) -> Option<Ipv4Addr> {
        self.sockets.as_ref().map(|s| s.device)
    }

    /// Open both sockets for `address`.
    ///
    /// Fails with [`XbeeError::AlreadyConnected`] if sockets are already open.
    /// If the serial port cannot be bound, the app socket is closed again.
    pub fn connect(&mut self, address: &DeviceAddress) -> Result<()> {
        if self.sockets.is_some() {
            return Err(XbeeError::AlreadyConnected);
        }

        let remote = SocketAddr::V4(SocketAddrV4::new(address.device, self.config.app_service_port));
        let app = UdpEndpoint::connect(remote)?;
        app.set_read_timeout(Some(self.config.reply_timeout()))?;

        let local = SocketAddr::V4(SocketAddrV4::new(
            Ipv4Addr::UNSPECIFIED,
            self.config.serial_service_port,
        ));
        let serial = UdpEndpoint::bind(local)?;
        serial.set_read_timeout(Some(self.config.reply_timeout()))?;

        info!(device = %address.device, "connected to bridge");
        self.sockets = Some(Sockets {
            device: address.device,
            app,
            serial,
        });
        Ok(())
    }

    /// Close both sockets. Does nothing when not connected.
    pub fn disconnect(&mut self) {
        if let Some(sockets) = self.sockets.take() {
            debug!(device = %sockets.device, "disconnected from bridge");
        }
    }

    /// Config access over the app-service socket.
    pub fn channel(&self) -> Result<ConfigChannel<&UdpEndpoint>> {
        Ok(ConfigChannel::new(&self.sockets()?.app))
    }

    pub fn get(&self, param: XbeeParam) -> Result<u32> {
        self.channel()?.get(param)
    }

    pub fn set(&self, param: XbeeParam, value: u32) -> Result<()> {
        self.channel()?.set(param, value)
    }

    /// Send raw bytes to the app service.
    pub fn send_app_data(&self, data: &[u8]) -> Result<usize> {
        Ok(self.sockets()?.app.send(data)?)
    }

    /// Receive one datagram from the app service.
    pub fn receive_app_data(&self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.sockets()?.app.recv(buf)?)
    }

    /// Receive one datagram of forwarded serial data.
    pub fn receive_serial_data(&self, buf: &mut [u8]) -> Result<usize> {
        let (n, _) = self.sockets()?.serial.recv_from(buf)?;
        Ok(n)
    }

    /// Local address of the serial-service socket.
    pub fn serial_local_addr(&self) -> Result<SocketAddr> {
        Ok(self.sockets()?.serial.local_addr()?)
    }

    fn sockets(&self) -> Result<&Sockets> {
        self.sockets.as_ref().ok_or(XbeeError::NotConnected)
    }
}

impl Drop for XbeeClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use proploader_transport::{TransportError, MAX_DATAGRAM_SIZE};

    use super::*;
    use crate::packet::{ConfigReply, ConfigRequest};

    fn loopback_any() -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0))
    }

    /// A fake bridge on loopback answering `requests` config packets.
    fn spawn_bridge(
        requests: usize,
        payload: Vec<u8>,
    ) -> (u16, thread::JoinHandle<Vec<ConfigRequest>>) {
        let bridge = UdpEndpoint::bind(loopback_any()).expect("bridge should bind");
        let port = bridge.local_addr().expect("local addr").port();
        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            let mut buf = [0u8; MAX_DATAGRAM_SIZE];
            for _ in 0..requests {
                let (n, from) = bridge.recv_from(&mut buf).expect("bridge should receive");
                let request = ConfigRequest::from_bytes(&buf[..n]).expect("request should parse");
                let reply = ConfigReply::ok(&request, payload.clone());
                let SocketAddr::V4(from) = from else {
                    panic!("expected an IPv4 peer");
                };
                bridge
                    .send_to(&reply.to_bytes(), from)
                    .expect("bridge should reply");
                seen.push(request);
            }
            seen
        });
        (port, handle)
    }

    fn loopback_config(app_port: u16) -> XbeeConfig {
        XbeeConfig {
            app_service_port: app_port,
            serial_service_port: 0,
            reply_timeout_ms: 2000,
            ..XbeeConfig::default()
        }
    }

    fn loopback_device() -> DeviceAddress {
        DeviceAddress {
            host_interface: Ipv4Addr::LOCALHOST,
            device: Ipv4Addr::LOCALHOST,
        }
    }

    #[test]
    fn get_and_set_over_loopback() {
        let (port, bridge) = spawn_bridge(2, vec![0x00, 0x07]);
        let mut client = XbeeClient::new(loopback_config(port));
        client
            .connect(&loopback_device())
            .expect("connect should succeed");

        assert_eq!(client.get(XbeeParam::SerialBaud).expect("get should succeed"), 7);
        client
            .set(XbeeParam::SerialBaud, 7)
            .expect("set should succeed");

        let seen = bridge.join().expect("bridge thread should finish");
        assert_eq!(seen[0].at_command, *b"BD");
        assert_eq!(seen[0].value, None);
        assert_eq!(seen[1].value, Some(7));
    }

    #[test]
    fn second_connect_is_rejected() {
        let (port, _bridge) = spawn_bridge(0, Vec::new());
        let mut client = XbeeClient::new(loopback_config(port));
        client
            .connect(&loopback_device())
            .expect("connect should succeed");

        let err = client.connect(&loopback_device()).unwrap_err();
        assert!(matches!(err, XbeeError::AlreadyConnected));
        assert!(client.is_connected());
    }

    #[test]
    fn disconnect_closes_and_allows_reconnect() {
        let (port, _bridge) = spawn_bridge(0, Vec::new());
        let mut client = XbeeClient::new(loopback_config(port));
        client
            .connect(&loopback_device())
            .expect("connect should succeed");
        client.disconnect();
        assert!(!client.is_connected());
        assert!(matches!(
            client.get(XbeeParam::IpAddr),
            Err(XbeeError::NotConnected)
        ));

        client
            .connect(&loopback_device())
            .expect("reconnect should succeed");
        assert_eq!(client.device(), Some(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn operations_need_a_connection() {
        let client = XbeeClient::new(XbeeConfig::default());
        let mut buf = [0u8; 16];
        assert!(matches!(client.send_app_data(b"hi"), Err(XbeeError::NotConnected)));
        assert!(matches!(
            client.receive_serial_data(&mut buf),
            Err(XbeeError::NotConnected)
        ));
    }

    #[test]
    fn serial_data_arrives_on_serial_socket() {
        let (port, _bridge) = spawn_bridge(0, Vec::new());
        let mut client = XbeeClient::new(loopback_config(port));
        client
            .connect(&loopback_device())
            .expect("connect should succeed");

        let SocketAddr::V4(serial) = client.serial_local_addr().expect("serial addr") else {
            panic!("expected an IPv4 address");
        };
        let bridge = UdpEndpoint::bind(loopback_any()).expect("sender should bind");
        bridge
            .send_to(
                b"hello from the target",
                SocketAddrV4::new(Ipv4Addr::LOCALHOST, serial.port()),
            )
            .expect("send should succeed");

        let mut buf = [0u8; 64];
        let n = client
            .receive_serial_data(&mut buf)
            .expect("serial data should arrive");
        assert_eq!(&buf[..n], b"hello from the target");
    }

    #[test]
    fn silent_bridge_times_out() {
        let (port, _bridge) = spawn_bridge(0, Vec::new());
        let mut client = XbeeClient::new(XbeeConfig {
            reply_timeout_ms: 20,
            ..loopback_config(port)
        });
        client
            .connect(&loopback_device())
            .expect("connect should succeed");

        let mut buf = [0u8; 16];
        let result = client.receive_app_data(&mut buf);
        assert!(matches!(
            result,
            Err(XbeeError::Transport(TransportError::Timeout(_)))
        ));
    }
}
