//! Window management
//!
//! Window attributes for the winit 0.30 `ApplicationHandler` flow, where the
//! window is created inside `resumed`.

use winit::{dpi::LogicalSize, window::Window, window::WindowAttributes};

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Cascade".to_string(),
            width: 1200,
            height: 800,
        }
    }
}

/// Create window attributes from config
///
/// The arena maps one world unit to one logical pixel, so the window is not
/// resizable.
pub fn window_attributes(config: &WindowConfig) -> WindowAttributes {
    Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(LogicalSize::new(config.width, config.height))
        .with_resizable(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_follow_config() {
        let attrs = window_attributes(&WindowConfig::default());
        assert_eq!(attrs.title, "Cascade");
        assert!(!attrs.resizable);
        assert!(attrs.inner_size.is_some());
    }
}
