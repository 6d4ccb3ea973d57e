use std::fmt;

/// Whether a parameter can be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// An AT parameter exposed by the bridge.
///
/// Values travel as big-endian integers of whatever width the bridge chooses.
/// String-valued parameters (`ID`, `NI`) come back packed the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XbeeParam {
    /// MAC address, high 16 bits.
    MacHigh,
    /// MAC address, low 32 bits.
    MacLow,
    Ssid,
    /// The bridge's own IPv4 address. Fixed while DHCP is enabled.
    IpAddr,
    IpMask,
    IpGateway,
    /// UDP/IP port of the serial service.
    IpPort,
    /// Destination address for serial-to-IP traffic.
    IpDestination,
    NodeId,
    /// Largest RF payload in bytes.
    MaxRfPayload,
    /// Inter-character silence, in character times, that ends a packet.
    PacketingTimeout,
    /// Mode of DIO2, the pin wired to the target's reset line.
    Io2Mode,
    /// Mode of DIO4, the serial hold pin.
    Io4Mode,
    OutputMask,
    OutputState,
    /// DIO2 state timer, in 100 ms units.
    Io2Timer,
    /// DIO4 state timer, in 100 ms units.
    Io4Timer,
    /// 0 transparent, 1 API, 2 API with escapes.
    SerialMode,
    SerialBaud,
    SerialParity,
    SerialStopBits,
    RtsFlow,
    /// Serial service protocol, 0 UDP or 1 TCP.
    SerialIp,
    FirmwareVersion,
    HardwareVersion,
    HardwareSeries,
    /// Checksum of the current configuration.
    Checksum,
}

impl XbeeParam {
    const ALL: [XbeeParam; 27] = [
        XbeeParam::MacHigh,
        XbeeParam::MacLow,
        XbeeParam::Ssid,
        XbeeParam::IpAddr,
        XbeeParam::IpMask,
        XbeeParam::IpGateway,
        XbeeParam::IpPort,
        XbeeParam::IpDestination,
        XbeeParam::NodeId,
        XbeeParam::MaxRfPayload,
        XbeeParam::PacketingTimeout,
        XbeeParam::Io2Mode,
        XbeeParam::Io4Mode,
        XbeeParam::OutputMask,
        XbeeParam::OutputState,
        XbeeParam::Io2Timer,
        XbeeParam::Io4Timer,
        XbeeParam::SerialMode,
        XbeeParam::SerialBaud,
        XbeeParam::SerialParity,
        XbeeParam::SerialStopBits,
        XbeeParam::RtsFlow,
        XbeeParam::SerialIp,
        XbeeParam::FirmwareVersion,
        XbeeParam::HardwareVersion,
        XbeeParam::HardwareSeries,
        XbeeParam::Checksum,
    ];

    /// Every parameter, in table order.
    pub fn all() -> &'static [XbeeParam] {
        &Self::ALL
    }

    /// The two-character AT command for this parameter.
    pub fn mnemonic(self) -> &'static str {
        match self {
            XbeeParam::MacHigh => "SH",
            XbeeParam::MacLow => "SL",
            XbeeParam::Ssid => "ID",
            XbeeParam::IpAddr => "MY",
            XbeeParam::IpMask => "MK",
            XbeeParam::IpGateway => "GW",
            XbeeParam::IpPort => "C0",
            XbeeParam::IpDestination => "DL",
            XbeeParam::NodeId => "NI",
            XbeeParam::MaxRfPayload => "NP",
            XbeeParam::PacketingTimeout => "RO",
            XbeeParam::Io2Mode => "D2",
            XbeeParam::Io4Mode => "D4",
            XbeeParam::OutputMask => "OM",
            XbeeParam::OutputState => "IO",
            XbeeParam::Io2Timer => "T2",
            XbeeParam::Io4Timer => "T4",
            XbeeParam::SerialMode => "AP",
            XbeeParam::SerialBaud => "BD",
            XbeeParam::SerialParity => "NB",
            XbeeParam::SerialStopBits => "SB",
            XbeeParam::RtsFlow => "D6",
            XbeeParam::SerialIp => "IP",
            XbeeParam::FirmwareVersion => "VR",
            XbeeParam::HardwareVersion => "HV",
            XbeeParam::HardwareSeries => "HS",
            XbeeParam::Checksum => "CK",
        }
    }

    /// The mnemonic as the two bytes that go on the wire.
    pub fn at_command(self) -> [u8; 2] {
        let bytes = self.mnemonic().as_bytes();
        [bytes[0], bytes[1]]
    }

    pub fn access(self) -> Access {
        match self {
            XbeeParam::MacHigh
            | XbeeParam::MacLow
            | XbeeParam::MaxRfPayload
            | XbeeParam::FirmwareVersion
            | XbeeParam::HardwareVersion
            | XbeeParam::HardwareSeries
            | XbeeParam::Checksum => Access::ReadOnly,
            _ => Access::ReadWrite,
        }
    }

    pub fn is_writable(self) -> bool {
        self.access() == Access::ReadWrite
    }

    /// Look up a parameter by its AT command, ignoring ASCII case.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|param| param.mnemonic().eq_ignore_ascii_case(mnemonic))
    }
}

impl fmt::Display for XbeeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
