//! ACPI namespace access
//!
//! The bridge does not interpret AML itself; it drives whatever interpreter
//! the platform provides through the [`AcpiNamespace`] trait. Everything here
//! is about naming objects, evaluating methods and finding devices.
//!
//! # Architecture
//!
//! ```text
//! agent writes "_SB.PCI0.LPCB.EC0._Q42"
//!   |
//!   v
//! path::AcpiPath::normalize  -> "\_SB.PCI0.LPCB.EC0._Q42"
//!   |
//!   v
//! AcpiNamespace::get_handle  -> Option<AcpiHandle>
//!   |
//!   v
//! AcpiNamespace::evaluate    -> Result<AcpiObject, AcpiStatus>
//! ```

pub mod method;
pub mod path;
pub mod video;

use alloc::string::String;
use alloc::vec::Vec;

/// Hardware id of an ACPI embedded controller
pub const EC_HID: &str = "PNP0C09";

/// Opaque reference to a namespace object
///
/// Only meaningful to the [`AcpiNamespace`] that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AcpiHandle(usize);

impl AcpiHandle {
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> usize {
        self.0
    }
}

/// Value returned by a method evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcpiObject {
    Integer(u64),
    String(String),
    Buffer(Vec<u8>),
    Package(Vec<AcpiObject>),
}

impl AcpiObject {
    /// The integer value, if this is an Integer
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

/// Interpreter status for a failed lookup or evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcpiStatus {
    /// No object with that name
    NotFound,
    /// The object returned something other than what was asked for
    Type,
    /// The interpreter aborted the method (raw AE_* code)
    Aml(u32),
}

impl core::fmt::Display for AcpiStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "AE_NOT_FOUND"),
            Self::Type => write!(f, "AE_TYPE"),
            Self::Aml(code) => write!(f, "AE_AML ({:#x})", code),
        }
    }
}

/// Returned by a walk visitor to continue or stop the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    Stop,
}

/// The platform's ACPI interpreter
pub trait AcpiNamespace {
    /// Resolve an absolute path (`\` rooted) to a handle
    fn get_handle(&self, path: &str) -> Option<AcpiHandle>;

    /// Evaluate `name` with integer arguments
    ///
    /// With a `scope`, `name` is a relative name under that object (for
    /// instance `_BQC` under a display output). Without one, `name` is an
    /// absolute path.
    fn evaluate(
        &self,
        scope: Option<AcpiHandle>,
        name: &str,
        args: &[u64],
    ) -> Result<AcpiObject, AcpiStatus>;

    /// Visit devices whose `_HID` matches `hid`, in namespace order,
    /// until the visitor returns [`WalkControl::Stop`]
    fn walk_devices(&self, hid: &str, visit: &mut dyn FnMut(AcpiHandle) -> WalkControl);

    /// Evaluate `name` and require an Integer result
    fn evaluate_integer(
        &self,
        scope: Option<AcpiHandle>,
        name: &str,
        args: &[u64],
    ) -> Result<u64, AcpiStatus> {
        self.evaluate(scope, name, args)?
            .as_integer()
            .ok_or(AcpiStatus::Type)
    }
}

/// Find the embedded controller device
///
/// The walk stops at the first `PNP0C09` device; a second controller, if
/// the firmware declares one, is never visited.
pub fn find_embedded_controller(ns: &dyn AcpiNamespace) -> Option<AcpiHandle> {
    let mut found = None;
    ns.walk_devices(EC_HID, &mut |handle| {
        found = Some(handle);
        WalkControl::Stop
    });

    match found {
        Some(handle) => log::info!("acpi: embedded controller found ({:#x})", handle.raw()),
        None => log::info!("acpi: no embedded controller"),
    }
    found
}
