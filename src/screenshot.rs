// Screenshot functionality
//
// Captures the whole screen through the export transform and saves it as a
// PNG file.

use crate::config::ViewerConfig;
use crate::display::rgb_to_bytes;
use crate::screen::{Area, Screen, ScreenError};
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during screenshot operations
#[derive(Debug)]
pub enum ScreenshotError {
    /// I/O error
    Io(io::Error),

    /// PNG encoding error
    PngEncoding(png::EncodingError),

    /// Exporting the screen failed
    Screen(ScreenError),
}

impl std::fmt::Display for ScreenshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenshotError::Io(e) => write!(f, "I/O error: {}", e),
            ScreenshotError::PngEncoding(e) => write!(f, "PNG encoding error: {}", e),
            ScreenshotError::Screen(e) => write!(f, "Screen export error: {}", e),
        }
    }
}

impl std::error::Error for ScreenshotError {}

impl From<io::Error> for ScreenshotError {
    fn from(e: io::Error) -> Self {
        ScreenshotError::Io(e)
    }
}

impl From<png::EncodingError> for ScreenshotError {
    fn from(e: png::EncodingError) -> Self {
        ScreenshotError::PngEncoding(e)
    }
}

impl From<ScreenError> for ScreenshotError {
    fn from(e: ScreenError) -> Self {
        ScreenshotError::Screen(e)
    }
}

/// Save a screenshot of the current screen
///
/// The image uses the configured scale and rotation and the screen's
/// current colors.
///
/// # Arguments
///
/// * `screen` - The screen to capture
/// * `config` - Viewer configuration (video and screenshot settings)
/// * `name` - Base name of the file, usually the program's file stem
///
/// # Returns
///
/// Result containing the path to the saved screenshot or an error
pub fn save_screenshot(
    screen: &Screen,
    config: &ViewerConfig,
    name: &str,
) -> Result<PathBuf, ScreenshotError> {
    let scale = config.video.scale();
    let rotation = config.video.rotation()?;

    fs::create_dir_all(&config.screenshot.directory)?;
    let file_path = config
        .screenshot
        .directory
        .join(screenshot_file_name(name, config.screenshot.include_timestamp));

    let mut pixels = vec![0u32; screen.export_len(scale)];
    let full = Area::full(screen.width(), screen.height());
    screen.export_pixels(&mut pixels, full, scale, rotation)?;

    let (width, height) = screen.export_dimensions(scale, rotation);
    save_png(&file_path, &rgb_to_bytes(&pixels), width as u32, height as u32)?;

    info!("Screenshot saved to {}", file_path.display());
    Ok(file_path)
}

/// Build the file name for a screenshot
///
/// Creates names like `<name>_20240102_150405.png`, or `<name>.png` without
/// timestamp.
fn screenshot_file_name(name: &str, include_timestamp: bool) -> String {
    let name = if name.is_empty() { "screen" } else { name };
    if include_timestamp {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        format!("{}_{}.png", name, timestamp)
    } else {
        format!("{}.png", name)
    }
}

/// Save RGB data as a PNG file
///
/// # Arguments
///
/// * `path` - Path to save the PNG file
/// * `data` - RGB data (width × height × 3 bytes)
/// * `width` - Image width
/// * `height` - Image height
fn save_png(path: &Path, data: &[u8], width: u32, height: u32) -> Result<(), ScreenshotError> {
    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;

    Ok(())
}
