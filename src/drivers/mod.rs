//! Hardware drivers for fwdt
//!
//! Access primitives the bridge endpoints are built on: physical memory
//! windows, PCI configuration space, the ACPI embedded controller and a
//! serial port for diagnostics.

pub mod ec;
pub mod mmio;
pub mod pci;
pub mod serial;
