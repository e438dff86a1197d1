// LAV VM host library
// Program image decoding and the damage-tracked screen of a LAV virtual machine

// Public modules
pub mod bus;
pub mod config;
pub mod display;
pub mod image;
pub mod screen;
pub mod screenshot;

// Re-export main types for convenience
pub use bus::MemoryMappedDevice;
pub use config::ViewerConfig;
pub use image::{ImageError, ImageHeader, ProgramImage};
pub use screen::{
    Area, ListenerError, Plane, Rotation, Screen, ScreenChangeListener, ScreenColors, ScreenError,
    ScreenRam,
};
pub use screenshot::{save_screenshot, ScreenshotError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_components() {
        // Test that all components can be instantiated
        let mut data = image::MAGIC.to_vec();
        data.resize(image::HEADER_SIZE + 1, 0);
        let _image = ProgramImage::from_bytes(data).unwrap();
        let mut screen = Screen::new();
        let _ram = screen.graph_ram().unwrap();
        let _config = ViewerConfig::default();
    }
}
