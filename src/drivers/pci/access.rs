//! Configuration space access mechanisms
//!
//! Two ways to reach a function's configuration registers:
//!
//! - legacy CAM: write the target to the 0xCF8 address port, then move the
//!   dword through the 0xCFC data port. Two port accesses per dword, so the
//!   pair is done under a lock.
//! - ECAM: every function owns a 4 KiB page of an MMIO window reported by
//!   the MCFG table. A single load or store, no shared index register.
//!
//! Register offsets are 8-bit, so only the first 256 bytes are ever
//! addressed through either mechanism.

use spin::Mutex;

use super::PciAddress;
use crate::drivers::mmio::MmioRegion;

/// Dword access to the first 256 bytes of a function's configuration space
pub trait PciAccess {
    fn read32(&self, addr: PciAddress, offset: u8) -> u32;

    fn write32(&self, addr: PciAddress, offset: u8, value: u32);

    /// Mechanism name for log lines
    fn name(&self) -> &'static str;
}

// ============================================================================
// Legacy CAM (0xCF8 / 0xCFC)
// ============================================================================

const CAM_ADDRESS_PORT: u16 = 0xCF8;
const CAM_DATA_PORT: u16 = 0xCFC;

/// Value read back when nothing decodes the access
const NO_RESPONSE: u32 = 0xFFFF_FFFF;

/// Configuration access through the 0xCF8/0xCFC port pair
pub struct IoCamAccess {
    /// Held across the address write and the data transfer
    index: Mutex<()>,
}

impl IoCamAccess {
    pub const fn new() -> Self {
        Self {
            index: Mutex::new(()),
        }
    }
}

impl Default for IoCamAccess {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "x86_64")]
impl PciAccess for IoCamAccess {
    fn read32(&self, addr: PciAddress, offset: u8) -> u32 {
        use ::x86_64::instructions::port::{Port, PortWriteOnly};

        let _index = self.index.lock();
        let mut select: PortWriteOnly<u32> = PortWriteOnly::new(CAM_ADDRESS_PORT);
        let mut data: Port<u32> = Port::new(CAM_DATA_PORT);
        // Safety: the index/data pair belongs to the host bridge and is only
        // touched with the index lock held
        unsafe {
            select.write(addr.cam_address(offset));
            data.read()
        }
    }

    fn write32(&self, addr: PciAddress, offset: u8, value: u32) {
        use ::x86_64::instructions::port::{Port, PortWriteOnly};

        let _index = self.index.lock();
        let mut select: PortWriteOnly<u32> = PortWriteOnly::new(CAM_ADDRESS_PORT);
        let mut data: Port<u32> = Port::new(CAM_DATA_PORT);
        unsafe {
            select.write(addr.cam_address(offset));
            data.write(value);
        }
    }

    fn name(&self) -> &'static str {
        "Legacy I/O CAM"
    }
}

#[cfg(not(target_arch = "x86_64"))]
impl PciAccess for IoCamAccess {
    fn read32(&self, _addr: PciAddress, _offset: u8) -> u32 {
        NO_RESPONSE
    }

    fn write32(&self, _addr: PciAddress, _offset: u8, _value: u32) {}

    fn name(&self) -> &'static str {
        "Legacy I/O CAM"
    }
}

// ============================================================================
// ECAM (memory mapped)
// ============================================================================

/// Configuration access through an identity-mapped ECAM window
pub struct EcamAccess {
    base: u64,
}

impl EcamAccess {
    /// # Safety
    ///
    /// `base` must be the identity-mapped start of an ECAM region covering
    /// every bus that will be addressed through this instance.
    pub const unsafe fn new(base: u64) -> Self {
        Self { base }
    }

    /// Bus in bits 27:20, device 19:15, function 14:12, register 11:0
    fn ecam_address(&self, addr: PciAddress, offset: u8) -> u64 {
        let function_page = ((addr.bus as u64) << 20)
            | ((addr.device as u64) << 15)
            | ((addr.function as u64) << 12);
        self.base | function_page | (offset & 0xFC) as u64
    }

    fn register(&self, addr: PciAddress, offset: u8) -> Option<MmioRegion> {
        // Safety: the ECAM window is vouched for at construction
        unsafe { MmioRegion::new(self.ecam_address(addr, offset), 4) }
    }
}

impl PciAccess for EcamAccess {
    fn read32(&self, addr: PciAddress, offset: u8) -> u32 {
        self.register(addr, offset)
            .map_or(NO_RESPONSE, |reg| reg.read32(0))
    }

    fn write32(&self, addr: PciAddress, offset: u8, value: u32) {
        if let Some(reg) = self.register(addr, offset) {
            reg.write32(0, value);
        }
    }

    fn name(&self) -> &'static str {
        "PCIe ECAM"
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Whichever mechanism the platform supports
pub enum AnyPciAccess {
    IoCam(IoCamAccess),
    Ecam(EcamAccess),
}

impl AnyPciAccess {
    fn inner(&self) -> &dyn PciAccess {
        match self {
            Self::IoCam(cam) => cam,
            Self::Ecam(ecam) => ecam,
        }
    }
}

impl PciAccess for AnyPciAccess {
    fn read32(&self, addr: PciAddress, offset: u8) -> u32 {
        self.inner().read32(addr, offset)
    }

    fn write32(&self, addr: PciAddress, offset: u8, value: u32) {
        self.inner().write32(addr, offset, value)
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }
}

/// Pick ECAM when the platform knows an MCFG base, legacy CAM otherwise
///
/// # Safety
///
/// A provided `ecam_base` must satisfy [`EcamAccess::new`].
pub unsafe fn create_access(ecam_base: Option<u64>) -> AnyPciAccess {
    let access = match ecam_base {
        Some(base) => AnyPciAccess::Ecam(unsafe { EcamAccess::new(base) }),
        None => AnyPciAccess::IoCam(IoCamAccess::new()),
    };
    match ecam_base {
        Some(base) => log::info!("pci: {} at {:#x}", access.name(), base),
        None => log::info!("pci: {} (0xCF8/0xCFC)", access.name()),
    }
    access
}
