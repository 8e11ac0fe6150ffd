//! Bridge configuration
//!
//! Values that differ between platforms but are fixed for the lifetime of an
//! attach. Everything has a sensible PC default.

use log::LevelFilter;

/// Standard ACPI embedded controller data port
pub const EC_DATA_PORT: u16 = 0x62;

/// Standard ACPI embedded controller status/command port
pub const EC_COMMAND_PORT: u16 = 0x66;

/// Polling budget for each EC handshake step
pub const EC_TIMEOUT_ITERATIONS: u32 = 10_000;

/// Size of the window mapped for each memory access
pub const MEMORY_WINDOW_SIZE: usize = 8;

/// Runtime configuration for the bridge and its drivers
#[derive(Debug, Clone, Copy)]
pub struct BridgeConfig {
    /// EC data port (usually from the controller's `_CRS`)
    pub ec_data_port: u16,
    /// EC status/command port
    pub ec_command_port: u16,
    /// Iterations to poll IBF/OBF before giving up on a transfer
    pub ec_timeout_iterations: u32,
    /// Bytes mapped at the memory selector for each access; anything
    /// below one dword makes the memory data endpoint fail
    pub memory_window: usize,
    /// Maximum level passed to the logger
    pub log_level: LevelFilter,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            ec_data_port: EC_DATA_PORT,
            ec_command_port: EC_COMMAND_PORT,
            ec_timeout_iterations: EC_TIMEOUT_ITERATIONS,
            memory_window: MEMORY_WINDOW_SIZE,
            log_level: LevelFilter::Info,
        }
    }
}
