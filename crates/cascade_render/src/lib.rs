//! Cascade Render System
//!
//! Instanced outline-circle renderer on wgpu. Every live body is one
//! instance of a shared unit ring; the core hands over a flat buffer of
//! instance transforms each frame.

pub mod backend;
pub mod mesh;
pub mod renderer;
pub mod window;

pub use renderer::{DrawStats, InstancedRenderer};
pub use wgpu;
pub use winit;

use thiserror::Error;

/// Rendering backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Metal (macOS, iOS)
    Metal,
    /// DirectX 12 (Windows)
    DirectX12,
    /// Vulkan (cross-platform)
    Vulkan,
    /// OpenGL / GLES (cross-platform, fallback)
    OpenGL,
    /// WebGPU in a browser
    WebGpu,
    /// CPU adapter (ultimate fallback)
    Software,
}

/// Capability probe result
#[derive(Debug, Clone)]
pub struct DeviceCapabilities {
    pub backend: BackendType,
    pub adapter_name: String,
    pub max_texture_size: u32,
    pub supports_compute: bool,
    pub supports_instancing: bool,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter found")]
    NoAdapter,

    #[error("failed to acquire device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface has no supported format")]
    UnsupportedSurface,

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

impl RenderError {
    /// Lost/outdated surfaces recover by reconfiguring; the frame is skipped.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Timeout)
        )
    }
}
