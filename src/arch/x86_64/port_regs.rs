//! Port-Mapped I/O Register Types
//!
//! This module provides tock-registers compatible types for x86 port I/O,
//! enabling type-safe access with named bitfields. Unlike raw port access,
//! each register borrows a [`PortIo`] backend, so the same register
//! definitions drive real hardware and test stubs alike.
//!
//! # Example
//!
//! ```ignore
//! use tock_registers::register_bitfields;
//! use fwdt::arch::x86_64::port_regs::PortReadOnly8;
//!
//! register_bitfields![u8,
//!     Status [
//!         OUTPUT_FULL OFFSET(0) NUMBITS(1) [],
//!         INPUT_FULL  OFFSET(1) NUMBITS(1) [],
//!     ],
//! ];
//!
//! let status = PortReadOnly8::<Status::Register>::new(&ports, 0x66);
//! if status.is_set(Status::OUTPUT_FULL) {
//!     // Data is available
//! }
//! ```

use core::marker::PhantomData;

use tock_registers::RegisterLongName;
use tock_registers::interfaces::{Readable, Writeable};

use super::io::PortIo;

/// Read-only 8-bit port register
pub struct PortReadOnly8<'a, R: RegisterLongName> {
    io: &'a dyn PortIo,
    port: u16,
    _reg: PhantomData<R>,
}

impl<'a, R: RegisterLongName> PortReadOnly8<'a, R> {
    /// Create a read-only register at `port` on the given backend
    pub const fn new(io: &'a dyn PortIo, port: u16) -> Self {
        Self {
            io,
            port,
            _reg: PhantomData,
        }
    }

    /// Get the I/O port address
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl<R: RegisterLongName> Readable for PortReadOnly8<'_, R> {
    type T = u8;
    type R = R;

    #[inline]
    fn get(&self) -> u8 {
        self.io.inb(self.port)
    }
}

/// Read-write 8-bit port register
pub struct PortReadWrite8<'a, R: RegisterLongName> {
    io: &'a dyn PortIo,
    port: u16,
    _reg: PhantomData<R>,
}

impl<'a, R: RegisterLongName> PortReadWrite8<'a, R> {
    /// Create a read-write register at `port` on the given backend
    pub const fn new(io: &'a dyn PortIo, port: u16) -> Self {
        Self {
            io,
            port,
            _reg: PhantomData,
        }
    }

    /// Get the I/O port address
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl<R: RegisterLongName> Readable for PortReadWrite8<'_, R> {
    type T = u8;
    type R = R;

    #[inline]
    fn get(&self) -> u8 {
        self.io.inb(self.port)
    }
}

impl<R: RegisterLongName> Writeable for PortReadWrite8<'_, R> {
    type T = u8;
    type R = R;

    #[inline]
    fn set(&self, value: u8) {
        self.io.outb(self.port, value)
    }
}

/// Aliased 8-bit port register with different read and write semantics
///
/// Used for registers where reading and writing have different meanings,
/// such as the embedded controller port 0x66 (Status when read, Command
/// when written).
pub struct PortAliased8<'a, R: RegisterLongName, W: RegisterLongName> {
    io: &'a dyn PortIo,
    port: u16,
    _read: PhantomData<R>,
    _write: PhantomData<W>,
}

impl<'a, R: RegisterLongName, W: RegisterLongName> PortAliased8<'a, R, W> {
    /// Create an aliased register at `port` on the given backend
    pub const fn new(io: &'a dyn PortIo, port: u16) -> Self {
        Self {
            io,
            port,
            _read: PhantomData,
            _write: PhantomData,
        }
    }

    /// Get the I/O port address
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl<R: RegisterLongName, W: RegisterLongName> Readable for PortAliased8<'_, R, W> {
    type T = u8;
    type R = R;

    #[inline]
    fn get(&self) -> u8 {
        self.io.inb(self.port)
    }
}

impl<R: RegisterLongName, W: RegisterLongName> Writeable for PortAliased8<'_, R, W> {
    type T = u8;
    type R = W;

    #[inline]
    fn set(&self, value: u8) {
        self.io.outb(self.port, value)
    }
}
