//! Adapter capability probe

use crate::{BackendType, DeviceCapabilities};

/// Map a wgpu backend onto the engine's backend enum.
pub fn backend_type(backend: wgpu::Backend, device_type: wgpu::DeviceType) -> BackendType {
    if device_type == wgpu::DeviceType::Cpu {
        return BackendType::Software;
    }
    match backend {
        wgpu::Backend::Metal => BackendType::Metal,
        wgpu::Backend::Dx12 => BackendType::DirectX12,
        wgpu::Backend::Vulkan => BackendType::Vulkan,
        wgpu::Backend::Gl => BackendType::OpenGL,
        wgpu::Backend::BrowserWebGpu => BackendType::WebGpu,
        wgpu::Backend::Empty => BackendType::Software,
    }
}

/// Probe available rendering capabilities
pub fn probe_capabilities(adapter: &wgpu::Adapter) -> DeviceCapabilities {
    let info = adapter.get_info();
    let downlevel = adapter.get_downlevel_capabilities();
    DeviceCapabilities {
        backend: backend_type(info.backend, info.device_type),
        adapter_name: info.name,
        max_texture_size: adapter.limits().max_texture_dimension_2d,
        supports_compute: downlevel
            .flags
            .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS),
        // Vertex-rate instancing is core in every wgpu backend
        supports_instancing: true,
    }
}
