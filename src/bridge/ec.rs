//! Embedded controller endpoints
//!
//! Only published when a controller was discovered at attach. Transfer
//! failures are reported to the caller, unlike the PCI write path.

use spin::Mutex;

use super::{Page, page};
use crate::acpi::method::invoke_query_method;
use crate::acpi::{AcpiHandle, AcpiNamespace};
use crate::drivers::ec::EmbeddedController;
use crate::error::{BridgeError, Result};
use crate::parse::parse_hex_permissive;

pub fn show_address(selector: &Mutex<usize>) -> Page {
    page(format_args!("0x{:02x}", *selector.lock()))
}

pub fn store_address(selector: &Mutex<usize>, input: &str) {
    *selector.lock() = parse_hex_permissive(input) as usize;
}

pub fn show_data(ec: &dyn EmbeddedController, selector: &Mutex<usize>) -> Result<Page> {
    let offset = *selector.lock() as u8;
    let value = ec.read(offset).map_err(|err| {
        log::info!("ec: read of {:#04x} failed: {}", offset, err);
        BridgeError::TransportFailure
    })?;
    Ok(page(format_args!("0x{:02x}", value)))
}

pub fn store_data(ec: &dyn EmbeddedController, selector: &Mutex<usize>, input: &str) -> Result<()> {
    let offset = *selector.lock() as u8;
    let value = parse_hex_permissive(input) as u8;
    ec.write(offset, value).map_err(|err| {
        log::info!("ec: write of {:#04x} failed: {}", offset, err);
        BridgeError::TransportFailure
    })
}

pub fn store_qmethod(
    ns: &dyn AcpiNamespace,
    controller: Option<AcpiHandle>,
    input: &str,
) -> Result<()> {
    let controller = controller.ok_or(BridgeError::TargetAbsent)?;
    let query = (parse_hex_permissive(input) & 0xFF) as u8;
    invoke_query_method(ns, controller, query);
    Ok(())
}
