//! x86_64 architecture support
//!
//! This module contains the port I/O backend and the typed port register
//! wrappers built on top of it.

pub mod io;
pub mod port_regs;

pub use io::{HardwarePorts, PortIo};
