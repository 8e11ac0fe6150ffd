//! ACPI Embedded Controller transport
//!
//! The EC exposes a 256-byte register file through a two-port interface:
//! a status/command port (0x66 by default) and a data port (0x62). Each
//! transfer is a short handshake gated on the status register's IBF/OBF
//! bits, the same scheme as the i8042 keyboard controller.
//!
//! # References
//!
//! - ACPI Specification, section 12.2 "Embedded Controller Interface"

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::register_bitfields;

use crate::arch::x86_64::PortIo;
use crate::arch::x86_64::port_regs::{PortAliased8, PortReadWrite8};
use crate::config::BridgeConfig;

register_bitfields![u8,
    /// EC status register (read from the command port)
    pub EcStatus [
        /// Output buffer full - data available on the data port
        OBF OFFSET(0) NUMBITS(1) [],
        /// Input buffer full - controller busy, don't write yet
        IBF OFFSET(1) NUMBITS(1) [],
        /// Last byte written was a command
        CMD OFFSET(3) NUMBITS(1) [],
        /// Burst mode enabled
        BURST OFFSET(4) NUMBITS(1) [],
        /// SCI event pending
        SCI_EVT OFFSET(5) NUMBITS(1) [],
    ],
];

/// EC commands (written to the command port)
mod cmd {
    /// Read a register
    pub const READ: u8 = 0x80;
    /// Write a register
    pub const WRITE: u8 = 0x81;
}

/// Status value of an undecoded port
const STATUS_FLOATING: u8 = 0xFF;

/// Error type for EC transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcError {
    /// Nothing decodes the command port
    NotPresent,
    /// The controller did not complete a handshake step in time
    Timeout,
}

impl core::fmt::Display for EcError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotPresent => write!(f, "embedded controller not present"),
            Self::Timeout => write!(f, "embedded controller timed out"),
        }
    }
}

/// Byte-level register access to an embedded controller
pub trait EmbeddedController {
    /// Read the register at `offset`
    fn read(&self, offset: u8) -> Result<u8, EcError>;

    /// Write `value` to the register at `offset`
    fn write(&self, offset: u8, value: u8) -> Result<(), EcError>;
}

/// EC reached through the standard ACPI port pair
pub struct AcpiEc<'a> {
    /// Data port - register address and data bytes
    data: PortReadWrite8<'a, ()>,
    /// Status register (read) / Command register (write)
    status_cmd: PortAliased8<'a, EcStatus::Register, ()>,
    /// Polling budget per handshake step
    timeout: u32,
}

impl<'a> AcpiEc<'a> {
    /// Create an EC transport on the ports named by `config`
    pub fn new(io: &'a dyn PortIo, config: &BridgeConfig) -> Self {
        Self {
            data: PortReadWrite8::new(io, config.ec_data_port),
            status_cmd: PortAliased8::new(io, config.ec_command_port),
            timeout: config.ec_timeout_iterations,
        }
    }

    fn check_present(&self) -> Result<(), EcError> {
        if self.status_cmd.get() == STATUS_FLOATING {
            log::debug!("ec: status port {:#x} floats", self.status_cmd.port());
            return Err(EcError::NotPresent);
        }
        Ok(())
    }

    /// Wait for the controller to consume the last byte written
    fn wait_input_ready(&self) -> Result<(), EcError> {
        for _ in 0..self.timeout {
            if !self.status_cmd.is_set(EcStatus::IBF) {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(EcError::Timeout)
    }

    /// Wait for the controller to present a result byte
    fn wait_output_ready(&self) -> Result<(), EcError> {
        for _ in 0..self.timeout {
            if self.status_cmd.is_set(EcStatus::OBF) {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(EcError::Timeout)
    }

    fn send_command(&self, command: u8) -> Result<(), EcError> {
        self.wait_input_ready()?;
        self.status_cmd.set(command);
        Ok(())
    }

    fn send_data(&self, byte: u8) -> Result<(), EcError> {
        self.wait_input_ready()?;
        self.data.set(byte);
        Ok(())
    }
}

impl EmbeddedController for AcpiEc<'_> {
    fn read(&self, offset: u8) -> Result<u8, EcError> {
        self.check_present()?;
        self.send_command(cmd::READ)?;
        self.send_data(offset)?;
        self.wait_output_ready()?;
        Ok(self.data.get())
    }

    fn write(&self, offset: u8, value: u8) -> Result<(), EcError> {
        self.check_present()?;
        self.send_command(cmd::WRITE)?;
        self.send_data(offset)?;
        self.send_data(value)?;
        self.wait_input_ready()
    }
}
