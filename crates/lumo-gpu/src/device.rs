//! Platform and device enumeration.
//!
//! wgpu adapters are grouped by backend: the backend group is the
//! "platform" and the adapter's position inside its group is the
//! "device", so `-p`/`-d` indices stay stable across runs on the same
//! machine.

use tracing::debug;

/// One selectable compute device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Adapter name as reported by the driver.
    pub name: String,
    /// Discrete, integrated, virtual or CPU.
    pub device_type: wgpu::DeviceType,
    /// Driver description, when the backend reports one.
    pub driver: String,
}

/// A backend and the devices it exposes.
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    /// Backend (Vulkan, Metal, DX12, GL, ...).
    pub backend: wgpu::Backend,
    /// Devices in adapter enumeration order.
    pub devices: Vec<DeviceInfo>,
}

/// Groups all adapters by backend, preserving enumeration order.
pub(crate) fn adapters_by_platform(instance: &wgpu::Instance) -> Vec<(wgpu::Backend, Vec<wgpu::Adapter>)> {
    let mut groups: Vec<(wgpu::Backend, Vec<wgpu::Adapter>)> = Vec::new();
    for adapter in instance.enumerate_adapters(wgpu::Backends::all()) {
        let backend = adapter.get_info().backend;
        match groups.iter_mut().find(|(b, _)| *b == backend) {
            Some((_, adapters)) => adapters.push(adapter),
            None => groups.push((backend, vec![adapter])),
        }
    }
    groups
}

/// Enumerates every platform and device visible to wgpu.
pub fn enumerate() -> Vec<PlatformInfo> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let platforms: Vec<PlatformInfo> = adapters_by_platform(&instance)
        .into_iter()
        .map(|(backend, adapters)| PlatformInfo {
            backend,
            devices: adapters
                .iter()
                .map(|a| {
                    let info = a.get_info();
                    DeviceInfo {
                        name: info.name,
                        device_type: info.device_type,
                        driver: info.driver_info,
                    }
                })
                .collect(),
        })
        .collect();

    debug!(platforms = platforms.len(), "enumerated adapters");
    platforms
}

/// Returns `true` if at least one adapter exists.
pub fn is_available() -> bool {
    !enumerate().is_empty()
}

/// Renders the platform/device listing for `-l`.
pub fn describe() -> String {
    let platforms = enumerate();
    if platforms.is_empty() {
        return "No compute platforms found.\n".into();
    }

    let mut out = String::new();
    for (pi, platform) in platforms.iter().enumerate() {
        out.push_str(&format!("Platform {pi}: {:?}\n", platform.backend));
        for (di, dev) in platform.devices.iter().enumerate() {
            let driver = if dev.driver.is_empty() {
                String::new()
            } else {
                format!(" [{}]", dev.driver)
            };
            out.push_str(&format!(
                "  Device {di}: {} ({:?}){driver}\n",
                dev.name, dev.device_type
            ));
        }
    }
    out
}
