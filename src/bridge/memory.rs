//! Physical memory endpoints
//!
//! Each data access maps a fresh window at the selected address, touches
//! the dword at its start and drops the mapping again. Nothing is cached
//! between calls.

use spin::Mutex;

use super::{Page, page};
use crate::drivers::mmio::{MappedWindow, PhysMapper};
use crate::error::Result;
use crate::parse::parse_hex_permissive;

pub fn show_address(selector: &Mutex<u32>) -> Page {
    page(format_args!("0x{:08x}", *selector.lock()))
}

pub fn store_address(selector: &Mutex<u32>, input: &str) {
    *selector.lock() = (parse_hex_permissive(input) & 0xFFFF_FFFF) as u32;
}

pub fn show_data(mapper: &dyn PhysMapper, selector: &Mutex<u32>, window: usize) -> Result<Page> {
    let address = *selector.lock();
    let region = MappedWindow::map(mapper, address as u64, window)?;
    Ok(page(format_args!("0x{:08x}", region.read32(0))))
}

pub fn store_data(
    mapper: &dyn PhysMapper,
    selector: &Mutex<u32>,
    window: usize,
    input: &str,
) -> Result<()> {
    let address = *selector.lock();
    let value = (parse_hex_permissive(input) & 0xFFFF_FFFF) as u32;
    let region = MappedWindow::map(mapper, address as u64, window)?;
    log::debug!("mem: {:#010x} <- {:#010x}", address, value);
    region.write32(0, value);
    Ok(())
}
