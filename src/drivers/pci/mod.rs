//! PCI device lookup and configuration space access
//!
//! The bridge addresses PCI functions by vendor/device id rather than by
//! location, so this module resolves an id pair to the first matching
//! Bus:Device.Function (subsystem and class are not considered) and then
//! reads or writes configuration dwords there.

pub mod access;

use access::PciAccess;

/// Invalid vendor ID (no device present)
const INVALID_VENDOR_ID: u16 = 0xFFFF;

/// Header type register offset (bits 23:16 of dword 0x0C)
const HEADER_TYPE_OFFSET: u8 = 0x0C;
const HEADER_TYPE_MULTI_FUNCTION: u8 = 0x80;

/// PCI device location (Bus:Device.Function)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciAddress {
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

impl PciAddress {
    pub const fn new(bus: u8, device: u8, function: u8) -> Self {
        Self {
            bus,
            device,
            function,
        }
    }

    /// Calculate legacy CAM address for a register
    fn cam_address(&self, offset: u8) -> u32 {
        let mut addr = 1u32 << 31; // Enable bit
        addr |= (self.bus as u32) << 16;
        addr |= (self.device as u32) << 11;
        addr |= (self.function as u32) << 8;
        addr |= (offset as u32) & 0xFC; // Must be 4-byte aligned
        addr
    }
}

impl core::fmt::Display for PciAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02x}:{:02x}.{}", self.bus, self.device, self.function)
    }
}

/// PCI bus services needed by the configuration endpoints
pub trait PciBus {
    /// Find the first function with the given ids, any subsystem, any class
    fn find_device(&self, vendor_id: u16, device_id: u16) -> Option<PciAddress>;

    /// Read a configuration dword
    fn read_config_u32(&self, addr: PciAddress, offset: u8) -> u32;

    /// Write a configuration dword
    fn write_config_u32(&self, addr: PciAddress, offset: u8, value: u32);
}

/// PCI bus backed by a configuration access mechanism
///
/// Lookups walk every bus/device and, for multi-function devices, every
/// function, stopping at the first match. Nothing is cached; a device that
/// appears or disappears between calls is seen as it is now.
pub struct PciConfigSpace<A: PciAccess> {
    access: A,
}

impl<A: PciAccess> PciConfigSpace<A> {
    pub const fn new(access: A) -> Self {
        Self { access }
    }

    /// Vendor and device id of a function, `None` if nothing answers
    fn ids(&self, addr: PciAddress) -> Option<(u16, u16)> {
        let data = self.access.read32(addr, 0x00);
        let vendor_id = (data & 0xFFFF) as u16;
        if vendor_id == INVALID_VENDOR_ID {
            return None;
        }
        Some((vendor_id, (data >> 16) as u16))
    }

    fn is_multi_function(&self, addr: PciAddress) -> bool {
        let header_type = (self.access.read32(addr, HEADER_TYPE_OFFSET) >> 16) as u8;
        header_type & HEADER_TYPE_MULTI_FUNCTION != 0
    }
}

impl<A: PciAccess> PciBus for PciConfigSpace<A> {
    fn find_device(&self, vendor_id: u16, device_id: u16) -> Option<PciAddress> {
        for bus in 0..=255u8 {
            for device in 0..32u8 {
                let addr = PciAddress::new(bus, device, 0);
                let Some(ids) = self.ids(addr) else {
                    continue;
                };
                if ids == (vendor_id, device_id) {
                    return Some(addr);
                }

                if !self.is_multi_function(addr) {
                    continue;
                }
                for function in 1..8u8 {
                    let addr = PciAddress::new(bus, device, function);
                    if self.ids(addr) == Some((vendor_id, device_id)) {
                        return Some(addr);
                    }
                }
            }
        }
        None
    }

    fn read_config_u32(&self, addr: PciAddress, offset: u8) -> u32 {
        self.access.read32(addr, offset)
    }

    fn write_config_u32(&self, addr: PciAddress, offset: u8, value: u32) {
        log::debug!(
            "pci: {} [{:#04x}] <- {:#010x} via {}",
            addr,
            offset,
            value,
            self.access.name()
        );
        self.access.write32(addr, offset, value)
    }
}
