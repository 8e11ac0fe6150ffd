//! 16550 UART diagnostic sink
//!
//! Transmit-only view of a 16550-compatible UART, used as the default
//! destination for bridge log lines. The port is assumed to have been
//! programmed (baud rate, line control) by whatever ran before us; this
//! driver only checks that something answers and then pushes bytes.

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::register_bitfields;

use crate::arch::x86_64::PortIo;
use crate::arch::x86_64::port_regs::{PortReadOnly8, PortReadWrite8};
use crate::logger::DiagnosticSink;

/// Standard COM1 port address
pub const COM1: u16 = 0x3F8;

/// Serial port register offsets
mod registers {
    pub const DATA: u16 = 0; // Transmit holding register (write)
    pub const LSR: u16 = 5; // Line Status Register
    pub const SCRATCH: u16 = 7; // Scratch register
}

register_bitfields![u8,
    /// Line Status Register bits
    pub Lsr [
        /// Transmit holding register empty
        TX_EMPTY OFFSET(5) NUMBITS(1) [],
    ],
];

/// Maximum iterations to wait for TX ready (prevents infinite loop on missing hardware)
const TX_TIMEOUT_ITERATIONS: u32 = 100_000;

/// Diagnostic sink writing lines to a 16550 UART
pub struct SerialSink {
    ports: &'static (dyn PortIo + Sync),
    base: u16,
    /// Cleared when the UART stops draining its transmit buffer
    functional: AtomicBool,
    /// Keeps lines from interleaving
    lock: Mutex<()>,
}

impl SerialSink {
    /// Create a sink for the UART at `base` and probe it
    pub fn new(ports: &'static (dyn PortIo + Sync), base: u16) -> Self {
        let sink = Self {
            ports,
            base,
            functional: AtomicBool::new(false),
            lock: Mutex::new(()),
        };
        let present = sink.detect();
        sink.functional.store(present, Ordering::Relaxed);
        sink
    }

    /// Whether the UART answered the probe and is still draining
    pub fn is_functional(&self) -> bool {
        self.functional.load(Ordering::Relaxed)
    }

    /// Scratch register test plus a floating-LSR check
    fn detect(&self) -> bool {
        let scratch = PortReadWrite8::<()>::new(self.ports, self.base + registers::SCRATCH);
        for pattern in [0x55, 0xAA] {
            scratch.set(pattern);
            if scratch.get() != pattern {
                return false;
            }
        }
        self.lsr().get() != 0xFF
    }

    fn lsr(&self) -> PortReadOnly8<'static, Lsr::Register> {
        PortReadOnly8::new(self.ports, self.base + registers::LSR)
    }

    fn write_byte(&self, byte: u8) {
        if !self.is_functional() {
            return;
        }

        let lsr = self.lsr();
        let mut timeout = TX_TIMEOUT_ITERATIONS;
        while !lsr.is_set(Lsr::TX_EMPTY) {
            timeout -= 1;
            if timeout == 0 {
                // Serial port not responding, mark as non-functional
                self.functional.store(false, Ordering::Relaxed);
                return;
            }
            core::hint::spin_loop();
        }

        self.ports.outb(self.base + registers::DATA, byte);
    }
}

struct LineWriter<'a>(&'a SerialSink);

impl Write for LineWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.0.write_byte(b'\r');
            }
            self.0.write_byte(byte);
        }
        Ok(())
    }
}

impl DiagnosticSink for SerialSink {
    fn write_line(&self, args: fmt::Arguments<'_>) {
        let _guard = self.lock.lock();
        let mut writer = LineWriter(self);
        let _ = writer.write_fmt(args);
        let _ = writer.write_str("\n");
    }
}
