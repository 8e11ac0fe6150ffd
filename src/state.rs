//! Bridge state
//!
//! All mutable state of the bridge lives in one [`BridgeState`] owned by the
//! dispatcher, instead of a static per backend. Each selector has its own
//! lock: backends never call into each other, so there is no lock ordering
//! to worry about, and a slow EC transfer only holds the EC offset.
//!
//! # Architecture
//!
//! ```text
//! BridgeState
//!   |
//!   +-- selectors: Selectors
//!   |     +-- iob / iow port, memory address
//!   |     +-- pci {vendor, device, register}
//!   |     +-- ec offset
//!   |     +-- method path (invoke + query)
//!   |
//!   +-- handles: Handles
//!         +-- controller (discovered at attach)
//!         +-- video {path, handle} (set by the agent)
//! ```
//!
//! Every value starts at zero / empty; reading a selector before it was ever
//! written is not an error.

use spin::Mutex;

use crate::acpi::AcpiHandle;
use crate::acpi::path::AcpiPath;

/// PCI function key plus the configuration register offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PciSelector {
    pub vendor_id: u16,
    pub device_id: u16,
    pub reg_offset: u8,
}

impl PciSelector {
    pub const fn new() -> Self {
        Self {
            vendor_id: 0,
            device_id: 0,
            reg_offset: 0,
        }
    }

    /// Composite id as written: device in the high half, vendor in the low
    pub const fn hardware_id(&self) -> u32 {
        ((self.device_id as u32) << 16) | self.vendor_id as u32
    }

    /// Split a composite id into vendor (low half) and device (high half)
    pub fn set_hardware_id(&mut self, id: u32) {
        self.device_id = (id >> 16) as u16;
        self.vendor_id = (id & 0xFFFF) as u16;
    }
}

/// Display output selected for brightness control
///
/// `handle` is only ever written together with `path`, after the path
/// resolved; a failed selection leaves both as they were.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoSelector {
    pub path: AcpiPath,
    pub handle: Option<AcpiHandle>,
}

impl VideoSelector {
    pub const fn new() -> Self {
        Self {
            path: AcpiPath::new(),
            handle: None,
        }
    }
}

/// Per-backend address selections
pub struct Selectors {
    /// Port for the byte-wide I/O endpoints
    pub iob_port: Mutex<u16>,
    /// Port for the word-wide I/O endpoints
    pub iow_port: Mutex<u16>,
    /// Physical address for the memory endpoints
    pub mem_address: Mutex<u32>,
    pub pci: Mutex<PciSelector>,
    /// EC register offset, stored wide and used as a byte
    pub ec_offset: Mutex<usize>,
    /// Path shared by the firmware invoke and query endpoints
    pub method_path: Mutex<AcpiPath>,
}

impl Selectors {
    pub const fn new() -> Self {
        Self {
            iob_port: Mutex::new(0),
            iow_port: Mutex::new(0),
            mem_address: Mutex::new(0),
            pci: Mutex::new(PciSelector::new()),
            ec_offset: Mutex::new(0),
            method_path: Mutex::new(AcpiPath::new()),
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self::new()
    }
}

/// Firmware object handles held across endpoint calls
pub struct Handles {
    /// Embedded controller found at attach; `None` means no EC endpoints
    pub controller: Mutex<Option<AcpiHandle>>,
    pub video: Mutex<VideoSelector>,
}

impl Handles {
    pub const fn new() -> Self {
        Self {
            controller: Mutex::new(None),
            video: Mutex::new(VideoSelector::new()),
        }
    }

    /// Forget both handles (detach)
    pub fn clear(&self) {
        *self.controller.lock() = None;
        *self.video.lock() = VideoSelector::new();
    }
}

impl Default for Handles {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the dispatcher mutates
#[derive(Default)]
pub struct BridgeState {
    pub selectors: Selectors,
    pub handles: Handles,
}

impl BridgeState {
    pub const fn new() -> Self {
        Self {
            selectors: Selectors::new(),
            handles: Handles::new(),
        }
    }
}
