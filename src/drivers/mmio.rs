//! Memory-Mapped I/O (MMIO) Register Abstraction
//!
//! This module provides type-safe access to memory-mapped registers using
//! tock-registers, plus the scoped mapping discipline the memory endpoints
//! rely on: a physical window is mapped immediately before an access and
//! unmapped when the [`MappedWindow`] guard drops, on every exit path.
//!
//! # Example
//!
//! ```rust,ignore
//! use fwdt::drivers::mmio::{IdentityMapper, MappedWindow};
//!
//! let window = MappedWindow::map(&IdentityMapper, 0xFED0_0000, 8)?;
//! let value = window.read32(0x00);
//! window.write32(0x00, value | 1);
//! // unmapped here
//! ```

use core::ops::Deref;
use core::ptr::NonNull;

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, WriteOnly};

use crate::error::{BridgeError, Result};

/// A memory-mapped I/O region providing register access.
///
/// This struct wraps a base address and size, providing methods to read and
/// write registers at specific offsets. In debug builds, bounds checking is
/// performed to catch out-of-bounds accesses.
#[derive(Clone, Copy)]
pub struct MmioRegion {
    /// Virtual base address of the mapped region
    base: NonNull<u8>,
    /// Size of the region in bytes (used for bounds checking)
    #[cfg(debug_assertions)]
    size: usize,
}

// SAFETY: MmioRegion only contains a pointer to mapped device space. Whoever
// produced the mapping guarantees it stays valid until it is unmapped.
unsafe impl Send for MmioRegion {}
unsafe impl Sync for MmioRegion {}

impl MmioRegion {
    /// Create a new MMIO region from a mapped base address and size.
    ///
    /// Returns `None` for a null base.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    /// - `base` is a virtual address mapped for MMIO access
    /// - The region `[base, base + size)` is valid for the device
    /// - The region remains valid for the lifetime of this struct
    pub unsafe fn new(base: u64, #[allow(unused_variables)] size: usize) -> Option<Self> {
        let ptr = NonNull::new(base as usize as *mut u8)?;
        Some(Self {
            base: ptr,
            #[cfg(debug_assertions)]
            size,
        })
    }

    /// Get the base address of this MMIO region.
    #[inline]
    pub fn base(&self) -> u64 {
        self.base.as_ptr() as u64
    }

    /// Check if an access at the given offset and size is within bounds.
    #[cfg(debug_assertions)]
    #[inline]
    fn check_bounds(&self, offset: u64, access_size: usize) {
        let end = (offset as usize).saturating_add(access_size);
        assert!(
            end <= self.size,
            "MMIO access out of bounds: offset={:#x}, access_size={}, region_size={:#x}",
            offset,
            access_size,
            self.size
        );
    }

    /// Read a 32-bit register at the given offset.
    #[inline]
    pub fn read32(&self, offset: u64) -> u32 {
        #[cfg(debug_assertions)]
        self.check_bounds(offset, 4);

        let reg = unsafe { &*(self.base.as_ptr().add(offset as usize) as *const ReadOnly<u32>) };
        reg.get()
    }

    /// Write a 32-bit register at the given offset.
    #[inline]
    pub fn write32(&self, offset: u64, value: u32) {
        #[cfg(debug_assertions)]
        self.check_bounds(offset, 4);

        let reg = unsafe { &*(self.base.as_ptr().add(offset as usize) as *const WriteOnly<u32>) };
        reg.set(value);
    }
}

impl core::fmt::Debug for MmioRegion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        #[cfg(debug_assertions)]
        {
            f.debug_struct("MmioRegion")
                .field("base", &format_args!("{:#x}", self.base()))
                .field("size", &format_args!("{:#x}", self.size))
                .finish()
        }
        #[cfg(not(debug_assertions))]
        {
            f.debug_struct("MmioRegion")
                .field("base", &format_args!("{:#x}", self.base()))
                .finish()
        }
    }
}

/// Maps physical address ranges into the current address space
pub trait PhysMapper {
    /// Map `size` bytes at physical address `phys`
    ///
    /// Returns `None` if the range cannot be mapped.
    fn map(&self, phys: u64, size: usize) -> Option<MmioRegion>;

    /// Release a region previously returned by [`PhysMapper::map`]
    fn unmap(&self, region: MmioRegion);
}

/// Mapper for identity-mapped firmware environments
///
/// Physical and virtual addresses coincide, so mapping is a no-op. Address
/// zero is refused since it cannot be represented as a region.
#[derive(Debug)]
pub struct IdentityMapper {
    _private: (),
}

impl IdentityMapper {
    /// Create the identity mapper
    ///
    /// # Safety
    ///
    /// Every physical address the bridge is asked to touch must be reachable
    /// at the same virtual address, and touching it must be acceptable.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl PhysMapper for IdentityMapper {
    fn map(&self, phys: u64, size: usize) -> Option<MmioRegion> {
        // Safety: the identity mapping is vouched for at construction
        unsafe { MmioRegion::new(phys, size) }
    }

    fn unmap(&self, _region: MmioRegion) {}
}

/// Smallest window a [`MappedWindow`] will map: one 32-bit register
pub const MIN_WINDOW_SIZE: usize = 4;

/// A mapped physical window, unmapped on drop
pub struct MappedWindow<'a> {
    mapper: &'a dyn PhysMapper,
    region: MmioRegion,
}

impl<'a> MappedWindow<'a> {
    /// Map `size` bytes at `phys` for the lifetime of the guard
    ///
    /// Windows smaller than one dword are refused without calling the
    /// mapper, since every access through the guard is 32 bits wide.
    pub fn map(mapper: &'a dyn PhysMapper, phys: u64, size: usize) -> Result<Self> {
        if size < MIN_WINDOW_SIZE {
            log::warn!("mmio: window of {} bytes at {:#x} is too small", size, phys);
            return Err(BridgeError::MapFailed);
        }
        match mapper.map(phys, size) {
            Some(region) => Ok(Self { mapper, region }),
            None => {
                log::warn!("mmio: cannot map {:#x} (+{:#x})", phys, size);
                Err(BridgeError::MapFailed)
            }
        }
    }
}

impl Deref for MappedWindow<'_> {
    type Target = MmioRegion;

    fn deref(&self) -> &MmioRegion {
        &self.region
    }
}

impl Drop for MappedWindow<'_> {
    fn drop(&mut self) {
        self.mapper.unmap(self.region);
    }
}
