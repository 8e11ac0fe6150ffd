//! Firmware method invocation
//!
//! Three ways to run firmware code from the agent, deliberately different
//! in how much they report back:
//!
//! - [`invoke`]: fire-and-forget evaluation of a path. Resolution and
//!   evaluation failures go to the log only.
//! - [`select_query_path`] / [`read_query`]: store a path, then evaluate it
//!   as an integer method on every read.
//! - [`invoke_query_method`]: run an EC `_Qxx` event handler by number.

use spin::Mutex;

use super::path::{AcpiPath, query_method_name};
use super::{AcpiHandle, AcpiNamespace};
use crate::error::{BridgeError, Result};

/// Resolve `suffix` and evaluate it as a zero-argument method
///
/// Nothing is evaluated if the path does not resolve. Whatever happens,
/// the caller only learns about it from the log.
pub fn invoke(ns: &dyn AcpiNamespace, selector: &Mutex<AcpiPath>, suffix: &str) {
    let Ok(path) = AcpiPath::normalize(suffix) else {
        return;
    };
    *selector.lock() = path.clone();

    if ns.get_handle(path.as_str()).is_none() {
        log::info!("acpi: {} not found", path);
        return;
    }

    match ns.evaluate(None, path.as_str(), &[]) {
        Ok(_) => log::info!("acpi: {} executed", path),
        Err(status) => log::info!("acpi: {} failed ({})", path, status),
    }
}

/// Store `suffix` as the query path and check that it resolves
///
/// The path is stored even if it does not resolve.
pub fn select_query_path(ns: &dyn AcpiNamespace, selector: &Mutex<AcpiPath>, suffix: &str) {
    let Ok(path) = AcpiPath::normalize(suffix) else {
        return;
    };

    if ns.get_handle(path.as_str()).is_some() {
        log::debug!("acpi: query path {} resolved", path);
    } else {
        log::info!("acpi: query path {} not found", path);
    }
    *selector.lock() = path;
}

/// Evaluate the stored query path as an integer method
///
/// Evaluation is attempted whether or not the path resolved when it was
/// stored; a failed evaluation or a non-integer result is an error rather
/// than a made-up number.
pub fn read_query(ns: &dyn AcpiNamespace, selector: &Mutex<AcpiPath>) -> Result<u64> {
    let path = selector.lock().clone();
    ns.evaluate_integer(None, path.as_str(), &[]).map_err(|status| {
        log::info!("acpi: {} failed ({})", path, status);
        BridgeError::EvaluationFailure
    })
}

/// Run the EC query handler `_Qxx` for `query`
pub fn invoke_query_method(ns: &dyn AcpiNamespace, controller: AcpiHandle, query: u8) {
    let name = query_method_name(query);
    match ns.evaluate(Some(controller), name.as_str(), &[]) {
        Ok(_) => log::info!("acpi: {} executed", name),
        Err(status) => log::info!("acpi: {} failed ({})", name, status),
    }
}
