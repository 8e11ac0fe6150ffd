//! Endpoint table
//!
//! Every endpoint the bridge can publish, its name and permission mode, and
//! the builder that decides which of them an attach registers.

use heapless::Vec;

/// Upper bound on the number of published endpoints
pub const MAX_ENDPOINTS: usize = 16;

/// Permission mode of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Owner read/write, world read
    ReadWrite,
    /// Owner write only
    WriteOnly,
}

impl Mode {
    /// Unix permission bits as handed to the registration service
    pub const fn bits(self) -> u16 {
        match self {
            Self::ReadWrite => 0o644,
            Self::WriteOnly => 0o200,
        }
    }

    pub const fn readable(self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

/// A published endpoint
///
/// Address endpoints select what the matching data endpoint operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointId {
    IobAddress,
    IobData,
    IowAddress,
    IowData,
    MemAddress,
    MemData,
    PciId,
    PciReg,
    PciData,
    EcAddress,
    EcData,
    EcQmethod,
    AcpiMethod,
    AcpiQuery,
    VideoDevice,
    VideoBrightness,
}

/// Endpoints registered on every attach, in registration order
pub const UNCONDITIONAL: [EndpointId; 13] = [
    EndpointId::IobAddress,
    EndpointId::IobData,
    EndpointId::IowAddress,
    EndpointId::IowData,
    EndpointId::MemAddress,
    EndpointId::MemData,
    EndpointId::PciId,
    EndpointId::PciReg,
    EndpointId::PciData,
    EndpointId::AcpiMethod,
    EndpointId::AcpiQuery,
    EndpointId::VideoDevice,
    EndpointId::VideoBrightness,
];

/// Endpoints registered only when an embedded controller was discovered
pub const EMBEDDED_CONTROLLER: [EndpointId; 3] = [
    EndpointId::EcAddress,
    EndpointId::EcData,
    EndpointId::EcQmethod,
];

impl EndpointId {
    pub const fn name(self) -> &'static str {
        match self {
            Self::IobAddress => "iob_address",
            Self::IobData => "iob_data",
            Self::IowAddress => "iow_address",
            Self::IowData => "iow_data",
            Self::MemAddress => "mem_address",
            Self::MemData => "mem_data",
            Self::PciId => "pci_id",
            Self::PciReg => "pci_reg",
            Self::PciData => "pci_data",
            Self::EcAddress => "ec_addr",
            Self::EcData => "ec_data",
            Self::EcQmethod => "ec_qmethod",
            Self::AcpiMethod => "acpi_method",
            Self::AcpiQuery => "acpi_query",
            Self::VideoDevice => "video_device",
            Self::VideoBrightness => "video_brightness",
        }
    }

    pub const fn mode(self) -> Mode {
        match self {
            Self::EcQmethod | Self::AcpiMethod | Self::VideoDevice => Mode::WriteOnly,
            _ => Mode::ReadWrite,
        }
    }

    /// Whether this endpoint needs a discovered embedded controller
    pub const fn is_ec(self) -> bool {
        matches!(self, Self::EcAddress | Self::EcData | Self::EcQmethod)
    }

    /// Look an endpoint up by its published name
    pub fn from_name(name: &str) -> Option<Self> {
        UNCONDITIONAL
            .iter()
            .chain(EMBEDDED_CONTROLLER.iter())
            .copied()
            .find(|id| id.name() == name)
    }
}

impl core::fmt::Display for EndpointId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// The full endpoint list for one attach, computed before anything is
/// registered
pub fn build_endpoint_set(ec_present: bool) -> Vec<EndpointId, MAX_ENDPOINTS> {
    let mut set = Vec::new();
    // Both lists together are exactly MAX_ENDPOINTS long
    let _ = set.extend_from_slice(&UNCONDITIONAL);
    if ec_present {
        let _ = set.extend_from_slice(&EMBEDDED_CONTROLLER);
    }
    set
}
