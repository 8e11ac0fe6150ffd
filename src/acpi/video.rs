//! Display output brightness
//!
//! Brightness is driven through the ACPI video extension methods of a
//! display output device selected by the agent:
//!
//! - `_BQC` - current brightness level (integer)
//! - `_BCL` - supported levels; the first two entries are the AC and battery
//!   defaults, the rest the selectable levels
//! - `_BCM` - set brightness level (one integer argument)
//!
//! # References
//!
//! - ACPI Specification, Appendix B "Video Extensions"

use spin::Mutex;

use super::path::AcpiPath;
use super::{AcpiNamespace, AcpiObject};
use crate::error::{BridgeError, Result};
use crate::parse::parse_dec_permissive;
use crate::state::VideoSelector;

/// Select the display output at `suffix`
///
/// The selection is replaced only if the path resolves. Otherwise the
/// previous path and handle stay in place and a warning is logged.
pub fn set_device_path(ns: &dyn AcpiNamespace, video: &Mutex<VideoSelector>, suffix: &str) {
    let Ok(path) = AcpiPath::normalize(suffix) else {
        return;
    };

    match ns.get_handle(path.as_str()) {
        Some(handle) => {
            log::info!("video: using {}", path);
            *video.lock() = VideoSelector {
                path,
                handle: Some(handle),
            };
        }
        None => log::warn!("video: {} not found, keeping previous device", path),
    }
}

/// Current brightness level of the selected output
pub fn read_brightness(ns: &dyn AcpiNamespace, video: &Mutex<VideoSelector>) -> Result<u64> {
    let selected = video.lock().clone();
    let Some(handle) = selected.handle else {
        log::info!("video: no display device selected");
        return Err(BridgeError::TargetAbsent);
    };

    let level = ns.evaluate_integer(Some(handle), "_BQC", &[]).map_err(|status| {
        log::info!("video: {}._BQC failed ({})", selected.path, status);
        BridgeError::EvaluationFailure
    });

    // _BCL is listed whether or not _BQC answered
    log_supported_levels(ns, &selected);
    level
}

/// Set the brightness level of the selected output from decimal text
///
/// With no output selected this only logs; evaluation failures are logged
/// too. Either way the write is reported as accepted.
pub fn write_brightness(ns: &dyn AcpiNamespace, video: &Mutex<VideoSelector>, input: &str) {
    let selected = video.lock().clone();
    let Some(handle) = selected.handle else {
        log::info!("video: no display device selected, brightness not set");
        return;
    };

    let level = parse_dec_permissive(input);
    match ns.evaluate(Some(handle), "_BCM", &[level]) {
        Ok(_) => log::info!("video: {} brightness set to {}", selected.path, level),
        Err(status) => log::info!("video: {}._BCM({}) failed ({})", selected.path, level, status),
    }
}

/// Log the `_BCL` level table; failures here never affect the caller
fn log_supported_levels(ns: &dyn AcpiNamespace, selected: &VideoSelector) {
    let Some(handle) = selected.handle else {
        return;
    };

    match ns.evaluate(Some(handle), "_BCL", &[]) {
        Ok(AcpiObject::Package(levels)) => {
            for (index, level) in levels.iter().enumerate() {
                match level.as_integer() {
                    Some(value) => log::debug!("video: _BCL[{}] = {}", index, value),
                    None => log::debug!("video: _BCL[{}] is not an integer", index),
                }
            }
        }
        Ok(_) => log::debug!("video: {}._BCL is not a package", selected.path),
        Err(status) => log::debug!("video: {}._BCL failed ({})", selected.path, status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acpi::AcpiStatus;
    use crate::testing::{Evaluation, FakeNamespace};

    const PANEL: &str = "\\_SB.PCI0.GFX0.DD1F";

    fn panel(ns: &FakeNamespace) -> crate::acpi::AcpiHandle {
        let handle = ns.add_object(PANEL);
        ns.set_method(Some(handle), "_BQC", Ok(AcpiObject::Integer(70)));
        handle
    }

    #[test]
    fn test_read_uses_selected_path() {
        let ns = FakeNamespace::new();
        let handle = panel(&ns);
        let video = Mutex::new(VideoSelector::new());

        set_device_path(&ns, &video, "_SB.PCI0.GFX0.DD1F");
        assert_eq!(ns.lookups(), vec![PANEL.to_string()]);
        assert_eq!(video.lock().path.as_str(), PANEL);

        assert_eq!(read_brightness(&ns, &video), Ok(70));
        assert_eq!(ns.evaluations()[0], Evaluation::new(Some(handle), "_BQC", &[]));
    }

    #[test]
    fn test_level_table_failure_does_not_affect_read() {
        let ns = FakeNamespace::new();
        let handle = panel(&ns);
        ns.set_method(Some(handle), "_BCL", Err(AcpiStatus::Aml(0x3003)));
        let video = Mutex::new(VideoSelector::new());

        set_device_path(&ns, &video, "_SB.PCI0.GFX0.DD1F\n");
        assert_eq!(read_brightness(&ns, &video), Ok(70));
        assert_eq!(ns.evaluations().len(), 2);
    }

    #[test]
    fn test_level_table_is_listed_when_current_level_fails() {
        let ns = FakeNamespace::new();
        let handle = ns.add_object(PANEL);
        ns.set_method(Some(handle), "_BQC", Err(AcpiStatus::Aml(0x3003)));
        ns.set_method(
            Some(handle),
            "_BCL",
            Ok(AcpiObject::Package(vec![AcpiObject::Integer(100), AcpiObject::Integer(40)])),
        );
        let video = Mutex::new(VideoSelector::new());

        set_device_path(&ns, &video, "_SB.PCI0.GFX0.DD1F");
        assert_eq!(read_brightness(&ns, &video), Err(BridgeError::EvaluationFailure));
        assert_eq!(
            ns.evaluations(),
            vec![
                Evaluation::new(Some(handle), "_BQC", &[]),
                Evaluation::new(Some(handle), "_BCL", &[]),
            ]
        );
    }

    #[test]
    fn test_read_without_device_is_absent() {
        let ns = FakeNamespace::new();
        let video = Mutex::new(VideoSelector::new());
        assert_eq!(read_brightness(&ns, &video), Err(BridgeError::TargetAbsent));
        assert!(ns.evaluations().is_empty());
    }

    #[test]
    fn test_write_without_device_evaluates_nothing() {
        let ns = FakeNamespace::new();
        let video = Mutex::new(VideoSelector::new());

        write_brightness(&ns, &video, "50\n");
        assert!(ns.evaluations().is_empty());
    }

    #[test]
    fn test_write_passes_decimal_level() {
        let ns = FakeNamespace::new();
        let handle = panel(&ns);
        let video = Mutex::new(VideoSelector::new());
        set_device_path(&ns, &video, "_SB.PCI0.GFX0.DD1F");

        write_brightness(&ns, &video, "50\n");
        assert_eq!(
            ns.evaluations(),
            vec![Evaluation::new(Some(handle), "_BCM", &[50])]
        );
    }

    #[test]
    fn test_failed_selection_keeps_previous_device() {
        let ns = FakeNamespace::new();
        let handle = panel(&ns);
        let video = Mutex::new(VideoSelector::new());

        set_device_path(&ns, &video, "_SB.PCI0.GFX0.DD1F");
        set_device_path(&ns, &video, "_SB.PCI0.GFX0.DD02");

        let selected = video.lock().clone();
        assert_eq!(selected.path.as_str(), PANEL);
        assert_eq!(selected.handle, Some(handle));
    }
}
