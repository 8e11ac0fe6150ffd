//! PCI configuration endpoints
//!
//! The device is looked up by id on every data access. A missing device
//! fails a read but a write to it is dropped and still reported as done.

use spin::Mutex;

use super::{Page, page};
use crate::drivers::pci::PciBus;
use crate::error::{BridgeError, Result};
use crate::parse::parse_hex_permissive;
use crate::state::PciSelector;

pub fn show_id(selector: &Mutex<PciSelector>) -> Page {
    page(format_args!("0x{:08x}", selector.lock().hardware_id()))
}

pub fn store_id(selector: &Mutex<PciSelector>, input: &str) {
    let id = (parse_hex_permissive(input) & 0xFFFF_FFFF) as u32;
    selector.lock().set_hardware_id(id);
}

pub fn show_reg(selector: &Mutex<PciSelector>) -> Page {
    page(format_args!("0x{:02x}", selector.lock().reg_offset))
}

pub fn store_reg(selector: &Mutex<PciSelector>, input: &str) {
    selector.lock().reg_offset = (parse_hex_permissive(input) & 0xFF) as u8;
}

pub fn show_data(bus: &dyn PciBus, selector: &Mutex<PciSelector>) -> Result<Page> {
    let sel = *selector.lock();
    let Some(addr) = bus.find_device(sel.vendor_id, sel.device_id) else {
        log::info!("pci device [{:x}:{:x}] is not found", sel.vendor_id, sel.device_id);
        return Err(BridgeError::TargetAbsent);
    };
    let value = bus.read_config_u32(addr, sel.reg_offset);
    Ok(page(format_args!("0x{:08x}", value)))
}

pub fn store_data(bus: &dyn PciBus, selector: &Mutex<PciSelector>, input: &str) {
    let sel = *selector.lock();
    let value = (parse_hex_permissive(input) & 0xFFFF_FFFF) as u32;
    match bus.find_device(sel.vendor_id, sel.device_id) {
        Some(addr) => bus.write_config_u32(addr, sel.reg_offset, value),
        None => log::info!(
            "pci device [{:x}:{:x}] is not found, write dropped",
            sel.vendor_id,
            sel.device_id
        ),
    }
}
