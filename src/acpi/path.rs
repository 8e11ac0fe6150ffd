//! Firmware object paths
//!
//! Paths arrive from the agent as a suffix relative to the namespace root
//! (`_SB.PCI0.GFX0.DD1F`). Normalization prepends a single root separator and
//! copies the suffix verbatim; there is no escaping and no check that the
//! result names something sensible. The only change to the caller's text is
//! dropping the line terminator a text write carries.

use core::fmt::Write;

use heapless::String;

use crate::error::{BridgeError, Result};

/// ACPI namespace root separator
pub const ROOT_SEPARATOR: char = '\\';

/// Longest normalized path, separator included
pub const MAX_PATH_LEN: usize = 256;

/// A normalized absolute firmware path
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcpiPath(String<MAX_PATH_LEN>);

impl AcpiPath {
    /// The empty path (no selection yet)
    pub const fn new() -> Self {
        Self(String::new())
    }

    /// Build `\` + `suffix`
    ///
    /// Fails with [`BridgeError::MalformedInput`] if the result does not fit.
    pub fn normalize(suffix: &str) -> Result<Self> {
        let suffix = suffix.strip_suffix('\n').unwrap_or(suffix);

        let mut path = String::new();
        path.push(ROOT_SEPARATOR)
            .and_then(|()| path.push_str(suffix))
            .map_err(|()| {
                log::warn!("acpi: path longer than {} bytes rejected", MAX_PATH_LEN);
                BridgeError::MalformedInput
            })?;
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for AcpiPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of an EC query method: `_Q` followed by two uppercase hex digits
pub fn query_method_name(query: u8) -> String<4> {
    let mut name = String::new();
    // Four bytes always fit "_Qxx"
    let _ = write!(name, "_Q{:02X}", query);
    name
}
