//! fwdt - firmware debug bridge
//!
//! This library exposes low-level hardware and firmware primitives (I/O
//! ports, physical memory, PCI configuration space, embedded controller
//! registers and ACPI methods) to a controlling agent as a small set of
//! named text endpoints. Each backend has an address endpoint that selects
//! a target and a data endpoint that operates on it.
//!
//! The host supplies the platform services through the traits in
//! [`bridge::Platform`] and publishes endpoints through
//! [`bridge::lifecycle::EndpointRegistry`]; see [`Bridge`].

#![cfg_attr(not(test), no_std)]
#![allow(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod acpi;
pub mod arch;
pub mod bridge;
pub mod config;
pub mod drivers;
pub mod error;
pub mod logger;
pub mod parse;
pub mod state;

#[cfg(test)]
mod testing;

pub use bridge::{Bridge, Platform};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
