use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait};

#[derive(Debug, Clone)]
pub struct OutputDeviceInfo {
    pub index: usize,
    pub name: String,
    pub is_default: bool,
}

/// Output devices of the default host, in the order `--output-index` uses.
pub fn list_output_devices() -> Result<Vec<OutputDeviceInfo>> {
    let host = cpal::default_host();
    let default_out = host.default_output_device().map(|d| d.name().unwrap_or_default());

    let devices = host.output_devices().context("Failed to enumerate output devices")?;
    let out = devices
        .enumerate()
        .map(|(index, dev)| {
            let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
            let is_default = default_out.as_ref().map(|n| n == &name).unwrap_or(false);
            OutputDeviceInfo { index, name, is_default }
        })
        .collect();
    Ok(out)
}

/// Picks an output device by index, then by name substring, then the host
/// default.
pub(crate) fn pick_output_device(
    host: &cpal::Host,
    name_substr: Option<&str>,
    index: Option<usize>,
) -> Result<Option<cpal::Device>> {
    if let Some(idx) = index {
        if let Some(dev) = host.output_devices()?.nth(idx) {
            return Ok(Some(dev));
        }
        // fallthrough to name/default if index not found
    }

    if let Some(q) = name_substr {
        let qn = q.to_lowercase();
        for dev in host.output_devices()? {
            let name = dev.name().unwrap_or_default();
            if name.to_lowercase().contains(&qn) {
                return Ok(Some(dev));
            }
        }
    }

    Ok(host.default_output_device())
}
