//! Attach / detach
//!
//! # Architecture
//!
//! ```text
//! Detached --attach--> Attaching --ok--> Attached --detach--> Detaching --> Detached
//!                          |
//!                          +--registration failed (unwound)--> Detached
//! ```
//!
//! The endpoint list is computed in full (controller discovery included)
//! before the first registration call. If the registry refuses one, every
//! endpoint registered before it is removed again, newest first, so the
//! agent never sees a partial set.

use super::Bridge;
use super::endpoint::{EndpointId, build_endpoint_set};
use crate::acpi::find_embedded_controller;
use crate::error::{BridgeError, Result};

/// Publishes endpoints to the controlling agent
pub trait EndpointRegistry {
    /// Publish `id`; the error is the registry's failure code
    fn create(&mut self, id: EndpointId) -> core::result::Result<(), i32>;

    /// Withdraw a previously published `id`
    fn remove(&mut self, id: EndpointId);
}

/// Where the bridge is in its attach/detach cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Detached,
    Attaching,
    Attached,
    Detaching,
}

/// Register `set` in order, removing what was registered if one fails
fn register_all(
    registry: &mut dyn EndpointRegistry,
    set: &[EndpointId],
) -> core::result::Result<(), i32> {
    for (index, id) in set.iter().enumerate() {
        if let Err(code) = registry.create(*id) {
            log::warn!("fwdt: cannot register {} ({}), unwinding", id, code);
            for done in set[..index].iter().rev() {
                registry.remove(*done);
            }
            return Err(code);
        }
    }
    Ok(())
}

impl Bridge<'_> {
    /// Discover the controller and publish the endpoint set
    pub fn attach(&mut self, registry: &mut dyn EndpointRegistry) -> Result<()> {
        if self.lifecycle != LifecycleState::Detached {
            log::warn!("fwdt: attach while {:?}", self.lifecycle);
            return Err(BridgeError::InvalidState);
        }
        self.lifecycle = LifecycleState::Attaching;

        let controller = find_embedded_controller(self.platform.acpi);
        let set = build_endpoint_set(controller.is_some());

        if let Err(code) = register_all(registry, &set) {
            self.state.handles.clear();
            self.lifecycle = LifecycleState::Detached;
            return Err(BridgeError::Registration(code));
        }

        *self.state.handles.controller.lock() = controller;
        self.registered = set;
        self.lifecycle = LifecycleState::Attached;
        log::info!("fwdt: attached, {} endpoints", self.registered.len());
        Ok(())
    }

    /// Withdraw every published endpoint and forget the firmware handles
    ///
    /// Calling this when already detached does nothing.
    pub fn detach(&mut self, registry: &mut dyn EndpointRegistry) {
        if self.lifecycle == LifecycleState::Detached {
            log::debug!("fwdt: already detached");
            return;
        }
        self.lifecycle = LifecycleState::Detaching;

        for id in self.registered.iter().rev() {
            registry.remove(*id);
        }
        self.registered.clear();
        self.state.handles.clear();

        self.lifecycle = LifecycleState::Detached;
        log::info!("fwdt: detached");
    }
}
