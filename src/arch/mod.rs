//! Architecture support
//!
//! Port-mapped I/O is an x86 concept, but the trait and register types are
//! compiled everywhere so the bridge and its tests are target independent.

pub mod x86_64;
