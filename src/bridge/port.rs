//! I/O port endpoints
//!
//! The byte and word endpoint pairs behave the same apart from the access
//! width, so both go through the same functions with a [`PortWidth`].

use spin::Mutex;

use super::{Page, page};
use crate::arch::x86_64::PortIo;
use crate::parse::parse_hex_permissive;

/// Access width of a port endpoint pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortWidth {
    Byte,
    Word,
}

impl PortWidth {
    const fn mask(self) -> u64 {
        match self {
            Self::Byte => 0xFF,
            Self::Word => 0xFFFF,
        }
    }
}

pub fn show_address(selector: &Mutex<u16>) -> Page {
    page(format_args!("0x{:04x}", *selector.lock()))
}

pub fn store_address(selector: &Mutex<u16>, input: &str) {
    *selector.lock() = (parse_hex_permissive(input) & 0xFFFF) as u16;
}

pub fn show_data(ports: &dyn PortIo, selector: &Mutex<u16>, width: PortWidth) -> Page {
    let port = *selector.lock();
    match width {
        PortWidth::Byte => page(format_args!("0x{:02x}", ports.inb(port))),
        PortWidth::Word => page(format_args!("0x{:04x}", ports.inw(port))),
    }
}

pub fn store_data(ports: &dyn PortIo, selector: &Mutex<u16>, width: PortWidth, input: &str) {
    let port = *selector.lock();
    let value = parse_hex_permissive(input) & width.mask();
    log::debug!("io: {:#06x} <- {:#x}", port, value);
    match width {
        PortWidth::Byte => ports.outb(port, value as u8),
        PortWidth::Word => ports.outw(port, value as u16),
    }
}
