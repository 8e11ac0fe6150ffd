//! x86 I/O Port Access
//!
//! Every port access in the crate goes through the [`PortIo`] trait so that
//! register protocols can be exercised against a stub instead of real
//! hardware. [`HardwarePorts`] is the implementation that issues the actual
//! `in`/`out` instructions.

/// Byte and word I/O port access
pub trait PortIo {
    /// Read a byte from an I/O port
    fn inb(&self, port: u16) -> u8;

    /// Read a word (16-bit) from an I/O port
    fn inw(&self, port: u16) -> u16;

    /// Write a byte to an I/O port
    fn outb(&self, port: u16, value: u8);

    /// Write a word (16-bit) to an I/O port
    fn outw(&self, port: u16, value: u16);
}

/// Port I/O through the processor's `in`/`out` instructions
///
/// On targets without port-mapped I/O, reads float high and writes are
/// dropped, the same values an unpopulated ISA port returns.
#[derive(Debug)]
pub struct HardwarePorts {
    _private: (),
}

impl HardwarePorts {
    /// Create the hardware port backend
    ///
    /// # Safety
    ///
    /// Port I/O can have side effects on any device in the system. The caller
    /// must be running at an I/O privilege level that permits `in`/`out` and
    /// must accept that every port written through the bridge is reached.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(target_arch = "x86_64")]
impl PortIo for HardwarePorts {
    #[inline]
    fn inb(&self, port: u16) -> u8 {
        let mut p: ::x86_64::instructions::port::Port<u8> =
            ::x86_64::instructions::port::Port::new(port);
        // Safety: privilege and side effects are accepted at construction
        unsafe { p.read() }
    }

    #[inline]
    fn inw(&self, port: u16) -> u16 {
        let mut p: ::x86_64::instructions::port::Port<u16> =
            ::x86_64::instructions::port::Port::new(port);
        unsafe { p.read() }
    }

    #[inline]
    fn outb(&self, port: u16, value: u8) {
        let mut p: ::x86_64::instructions::port::Port<u8> =
            ::x86_64::instructions::port::Port::new(port);
        unsafe { p.write(value) }
    }

    #[inline]
    fn outw(&self, port: u16, value: u16) {
        let mut p: ::x86_64::instructions::port::Port<u16> =
            ::x86_64::instructions::port::Port::new(port);
        unsafe { p.write(value) }
    }
}

#[cfg(not(target_arch = "x86_64"))]
impl PortIo for HardwarePorts {
    fn inb(&self, _port: u16) -> u8 {
        0xFF
    }

    fn inw(&self, _port: u16) -> u16 {
        0xFFFF
    }

    fn outb(&self, _port: u16, _value: u8) {}

    fn outw(&self, _port: u16, _value: u16) {}
}
