//! Audio device listing command.

use clap::Args;
use klang_io::{AudioBackend, CpalBackend};

#[derive(Args)]
pub struct DevicesArgs {}

pub fn run(_args: DevicesArgs) -> anyhow::Result<()> {
    let backend = CpalBackend::new();
    let devices = backend.list_devices()?;

    if devices.is_empty() {
        println!("No audio output devices found.");
        return Ok(());
    }

    let default = backend.default_output_device()?;
    let default_name = default.map(|d| d.name);

    println!("Available Output Devices");
    println!("========================\n");

    for (idx, device) in devices.iter().enumerate() {
        let marker = if Some(&device.name) == default_name.as_ref() {
            " (default)"
        } else {
            ""
        };
        println!(
            "  [{}] {} ({} Hz){}",
            idx, device.name, device.default_sample_rate, marker
        );
    }

    println!();
    println!("Tip: select a device by partial name:");
    println!("  klang play --device \"USB\"");

    Ok(())
}
