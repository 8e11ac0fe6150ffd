//! Endpoint dispatcher
//!
//! [`Bridge`] owns the selector state and routes the agent's text reads
//! (`show`) and writes (`store`) to the backend behind each endpoint.
//!
//! # Architecture
//!
//! ```text
//! agent                 Bridge                         Platform
//!   |  store(IobAddress, "3f8")                            |
//!   |------------------> selectors.iob_port = 0x3f8        |
//!   |  store(IobData, "41")                                |
//!   |------------------> port::store_data ------------> ports.outb(0x3f8, 0x41)
//!   |  show(IobData)                                       |
//!   |------------------> port::show_data -------------> ports.inb(0x3f8)
//!   |<------------------ "0x41\n"                          |
//! ```
//!
//! Reads return a short text page ending in a newline; writes return the
//! number of input bytes consumed, which is always all of them.

pub mod endpoint;
pub mod lifecycle;

mod ec;
mod memory;
mod pci;
mod port;

use core::fmt::{self, Write};

use heapless::{String, Vec};

use crate::acpi::{AcpiHandle, AcpiNamespace, method, video};
use crate::arch::x86_64::PortIo;
use crate::config::BridgeConfig;
use crate::drivers::ec::EmbeddedController;
use crate::drivers::mmio::PhysMapper;
use crate::drivers::pci::PciBus;
use crate::error::{BridgeError, Result};
use crate::state::BridgeState;
use endpoint::{EndpointId, MAX_ENDPOINTS};
use lifecycle::LifecycleState;
use port::PortWidth;

/// Capacity of a read page
pub const PAGE_SIZE: usize = 32;

/// Text returned by a read endpoint
pub type Page = String<PAGE_SIZE>;

/// Format one value followed by a newline
///
/// Every value the endpoints print is far shorter than a page.
fn page(args: fmt::Arguments<'_>) -> Page {
    let mut out = Page::new();
    let _ = out.write_fmt(args);
    let _ = out.push('\n');
    out
}

/// Hardware and firmware services the endpoints operate on
#[derive(Clone, Copy)]
pub struct Platform<'a> {
    pub ports: &'a dyn PortIo,
    pub memory: &'a dyn PhysMapper,
    pub pci: &'a dyn PciBus,
    pub ec: &'a dyn EmbeddedController,
    pub acpi: &'a dyn AcpiNamespace,
}

/// The firmware debug bridge
pub struct Bridge<'a> {
    platform: Platform<'a>,
    config: BridgeConfig,
    state: BridgeState,
    lifecycle: LifecycleState,
    registered: Vec<EndpointId, MAX_ENDPOINTS>,
}

impl<'a> Bridge<'a> {
    /// Create a detached bridge with every selector at zero
    ///
    /// Also applies the configured log level.
    pub fn new(platform: Platform<'a>, config: BridgeConfig) -> Self {
        crate::logger::set_level(config.log_level);
        Self {
            platform,
            config,
            state: BridgeState::new(),
            lifecycle: LifecycleState::Detached,
            registered: Vec::new(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.lifecycle
    }

    /// Endpoints currently published, in registration order
    pub fn endpoints(&self) -> &[EndpointId] {
        &self.registered
    }

    /// Embedded controller found at the last attach
    pub fn controller(&self) -> Option<AcpiHandle> {
        *self.state.handles.controller.lock()
    }

    fn check_registered(&self, id: EndpointId) -> Result<()> {
        if self.registered.contains(&id) {
            Ok(())
        } else {
            Err(BridgeError::NoSuchEndpoint)
        }
    }

    /// Read endpoint `id`
    pub fn show(&self, id: EndpointId) -> Result<Page> {
        self.check_registered(id)?;
        if !id.mode().readable() {
            return Err(BridgeError::NotReadable);
        }

        let p = &self.platform;
        let sel = &self.state.selectors;
        match id {
            EndpointId::IobAddress => Ok(port::show_address(&sel.iob_port)),
            EndpointId::IobData => Ok(port::show_data(p.ports, &sel.iob_port, PortWidth::Byte)),
            EndpointId::IowAddress => Ok(port::show_address(&sel.iow_port)),
            EndpointId::IowData => Ok(port::show_data(p.ports, &sel.iow_port, PortWidth::Word)),
            EndpointId::MemAddress => Ok(memory::show_address(&sel.mem_address)),
            EndpointId::MemData => {
                memory::show_data(p.memory, &sel.mem_address, self.config.memory_window)
            }
            EndpointId::PciId => Ok(pci::show_id(&sel.pci)),
            EndpointId::PciReg => Ok(pci::show_reg(&sel.pci)),
            EndpointId::PciData => pci::show_data(p.pci, &sel.pci),
            EndpointId::EcAddress => Ok(ec::show_address(&sel.ec_offset)),
            EndpointId::EcData => ec::show_data(p.ec, &sel.ec_offset),
            EndpointId::AcpiQuery => {
                let value = method::read_query(p.acpi, &sel.method_path)?;
                Ok(page(format_args!("0x{:x}", value)))
            }
            EndpointId::VideoBrightness => {
                let level = video::read_brightness(p.acpi, &self.state.handles.video)?;
                Ok(page(format_args!("{}", level)))
            }
            EndpointId::EcQmethod | EndpointId::AcpiMethod | EndpointId::VideoDevice => {
                Err(BridgeError::NotReadable)
            }
        }
    }

    /// Write `input` to endpoint `id`, returning the bytes consumed
    pub fn store(&self, id: EndpointId, input: &str) -> Result<usize> {
        self.check_registered(id)?;

        let p = &self.platform;
        let sel = &self.state.selectors;
        match id {
            EndpointId::IobAddress => port::store_address(&sel.iob_port, input),
            EndpointId::IobData => port::store_data(p.ports, &sel.iob_port, PortWidth::Byte, input),
            EndpointId::IowAddress => port::store_address(&sel.iow_port, input),
            EndpointId::IowData => port::store_data(p.ports, &sel.iow_port, PortWidth::Word, input),
            EndpointId::MemAddress => memory::store_address(&sel.mem_address, input),
            EndpointId::MemData => {
                memory::store_data(p.memory, &sel.mem_address, self.config.memory_window, input)?
            }
            EndpointId::PciId => pci::store_id(&sel.pci, input),
            EndpointId::PciReg => pci::store_reg(&sel.pci, input),
            EndpointId::PciData => pci::store_data(p.pci, &sel.pci, input),
            EndpointId::EcAddress => ec::store_address(&sel.ec_offset, input),
            EndpointId::EcData => ec::store_data(p.ec, &sel.ec_offset, input)?,
            EndpointId::EcQmethod => ec::store_qmethod(p.acpi, self.controller(), input)?,
            EndpointId::AcpiMethod => method::invoke(p.acpi, &sel.method_path, input),
            EndpointId::AcpiQuery => method::select_query_path(p.acpi, &sel.method_path, input),
            EndpointId::VideoDevice => {
                video::set_device_path(p.acpi, &self.state.handles.video, input)
            }
            EndpointId::VideoBrightness => {
                video::write_brightness(p.acpi, &self.state.handles.video, input)
            }
        }
        Ok(input.len())
    }
}
