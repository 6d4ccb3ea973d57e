/// Encoded form of three zero bits. Padding in commands and the length field.
pub const ENCODED_ZERO: u8 = 0x92;

/// Size of an encoded boot command.
pub const COMMAND_SIZE: usize = 11;

/// What the target does after a successful handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderCommand {
    /// Stop without loading anything.
    Shutdown,
    /// Load the image into RAM and run it.
    LoadRunRam,
    /// Load into RAM, program EEPROM, then stop.
    LoadProgramShutdown,
    /// Load into RAM, program EEPROM, then run.
    LoadProgramRun,
}

const SHUTDOWN: [u8; COMMAND_SIZE] = [0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0xF2];
const LOAD_RUN: [u8; COMMAND_SIZE] = [0xC9, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0xF2];
const PROGRAM_SHUTDOWN: [u8; COMMAND_SIZE] = [0xCA, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0xF2];
const PROGRAM_RUN: [u8; COMMAND_SIZE] = [0x25, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0x92, 0xFE];

impl LoaderCommand {
    /// All commands, in boot ROM code order.
    pub const ALL: [LoaderCommand; 4] = [
        LoaderCommand::Shutdown,
        LoaderCommand::LoadRunRam,
        LoaderCommand::LoadProgramShutdown,
        LoaderCommand::LoadProgramRun,
    ];

    /// Boot ROM command code.
    pub fn code(self) -> u32 {
        match self {
            LoaderCommand::Shutdown => 0,
            LoaderCommand::LoadRunRam => 1,
            LoaderCommand::LoadProgramShutdown => 2,
            LoaderCommand::LoadProgramRun => 3,
        }
    }

    /// The command as it goes on the wire.
    pub fn encoded(self) -> &'static [u8; COMMAND_SIZE] {
        match self {
            LoaderCommand::Shutdown => &SHUTDOWN,
            LoaderCommand::LoadRunRam => &LOAD_RUN,
            LoaderCommand::LoadProgramShutdown => &PROGRAM_SHUTDOWN,
            LoaderCommand::LoadProgramRun => &PROGRAM_RUN,
        }
    }

    /// Whether the target reads a length field and image after this command.
    pub fn carries_image(self) -> bool {
        !matches!(self, LoaderCommand::Shutdown)
    }
}

impl std::fmt::Display for LoaderCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LoaderCommand::Shutdown => "shutdown",
            LoaderCommand::LoadRunRam => "load-run",
            LoaderCommand::LoadProgramShutdown => "program-shutdown",
            LoaderCommand::LoadProgramRun => "program-run",
        };
        f.write_str(name)
    }
}
