// Screen module - Monochrome framebuffer with damage tracking
//
// This module provides:
// - The 160×80 one-bit screen of the LAV VM (graph and buffer planes)
// - Accumulation of changed areas into a single bounding rectangle
// - Change listeners notified when the driver loop flushes damage
// - Pixel export with black/white substitution, integer scaling and
//   quarter-turn rotation
// - Graph/buffer RAM views for installing video memory into the VM

pub mod area;
pub mod export;
pub mod listener;
pub mod ram;

pub use area::Area;
pub use export::{export_dimensions, Rotation};
pub use listener::{ListenerError, ScreenChangeListener};
pub use ram::{Plane, ScreenRam, PLANE_SIZE};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// LAV screen width in pixels
pub const SCREEN_WIDTH: usize = 160;

/// LAV screen height in pixels
pub const SCREEN_HEIGHT: usize = 80;

/// Errors reported by the screen
#[derive(Debug)]
pub enum ScreenError {
    /// RAM views were requested from a screen without backing store
    UnsupportedState,

    /// The export buffer cannot hold a full scaled screen
    BufferTooSmall { required: usize, actual: usize },

    /// Export scale of zero
    InvalidScale,

    /// Rotation step outside 0-3
    InvalidRotation(u8),

    /// A change listener failed
    Listener(ListenerError),
}

impl std::fmt::Display for ScreenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenError::UnsupportedState => {
                write!(f, "Screen has no graph/buffer RAM (only 160x80 screens do)")
            }
            ScreenError::BufferTooSmall { required, actual } => write!(
                f,
                "Export buffer too small: need {} pixels, got {}",
                required, actual
            ),
            ScreenError::InvalidScale => write!(f, "Export scale must be at least 1"),
            ScreenError::InvalidRotation(steps) => {
                write!(f, "Invalid rotation step {} (expected 0-3)", steps)
            }
            ScreenError::Listener(e) => write!(f, "Screen listener failed: {}", e),
        }
    }
}

impl std::error::Error for ScreenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScreenError::Listener(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Output colors for the two pixel values
///
/// Colors are 32-bit RGB values (0xRRGGBB). A clear bit is drawn with
/// `black`, a set bit with `white`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenColors {
    pub black: u32,
    pub white: u32,
}

impl ScreenColors {
    /// Color for a pixel value
    #[inline]
    pub fn color_for(&self, set: bool) -> u32 {
        if set {
            self.white
        } else {
            self.black
        }
    }
}

impl Default for ScreenColors {
    fn default() -> Self {
        ScreenColors {
            black: 0x000000,
            white: 0xFFFFFF,
        }
    }
}

/// Damage-tracked monochrome screen
///
/// Drawing code changes pixels and reports what it touched with
/// `report_change`. The driver loop calls `notify_listeners` to hand the
/// accumulated area to every listener, which resets the damage. Renderers
/// pull pixels with `export_pixels`, usually just for the area they were
/// told about.
///
/// # Examples
///
/// ```
/// use gvm_rs::screen::{Area, Rotation, Screen};
///
/// let mut screen = Screen::new();
/// screen.set_pixel(3, 4, true);
/// assert_eq!(screen.changed_area(), Area::new(3, 4, 1, 1));
///
/// let mut rgb = vec![0u32; screen.export_len(1)];
/// screen
///     .export_pixels(&mut rgb, screen.changed_area(), 1, Rotation::None)
///     .unwrap();
/// assert_eq!(rgb[4 * 160 + 3], 0xFFFFFF);
///
/// screen.notify_listeners().unwrap();
/// assert!(screen.changed_area().is_empty());
/// ```
pub struct Screen {
    width: usize,
    height: usize,
    bytes_per_row: usize,
    colors: ScreenColors,
    changed_area: Area,
    listeners: Vec<Box<dyn ScreenChangeListener>>,
    /// Visible pixels, one bit each, MSB first
    graph: Vec<u8>,
    /// Off-screen pixels, same layout as `graph`
    buffer: Vec<u8>,
}

impl Screen {
    /// Create a blank 160×80 screen
    pub fn new() -> Self {
        Self::with_size(SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    /// Create a blank screen with a non-standard size
    ///
    /// Only 160×80 screens have graph/buffer RAM views; everything else
    /// works the same for any size.
    pub fn with_size(width: usize, height: usize) -> Self {
        let bytes_per_row = width.div_ceil(8);
        Screen {
            width,
            height,
            bytes_per_row,
            colors: ScreenColors::default(),
            changed_area: Area::EMPTY,
            listeners: Vec::new(),
            graph: vec![0; bytes_per_row * height],
            buffer: vec![0; bytes_per_row * height],
        }
    }

    /// Screen width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Screen height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Current output colors
    pub fn colors(&self) -> ScreenColors {
        self.colors
    }

    /// Set the colors used for clear and set pixels in later exports
    ///
    /// # Arguments
    /// * `black` - 0xRRGGBB color for clear pixels
    /// * `white` - 0xRRGGBB color for set pixels
    pub fn set_color(&mut self, black: u32, white: u32) {
        self.colors = ScreenColors { black, white };
    }

    /// Register a listener for all following notifications
    ///
    /// Listeners are called in registration order and cannot be removed.
    pub fn add_change_listener<L>(&mut self, listener: L)
    where
        L: ScreenChangeListener + 'static,
    {
        self.listeners.push(Box::new(listener));
        debug!("Screen change listener #{} registered", self.listeners.len());
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Area changed since the last notification
    pub fn changed_area(&self) -> Area {
        self.changed_area
    }

    /// Grow the changed area to also cover `area`
    ///
    /// Empty areas are ignored.
    pub fn report_change(&mut self, area: Area) {
        self.changed_area = self.changed_area.union(&area);
    }

    /// Hand the changed area to every listener, then reset it
    ///
    /// Listeners run synchronously in registration order and are called even
    /// when nothing changed.
    ///
    /// # Errors
    /// The first listener error stops the notification and is returned as
    /// `ScreenError::Listener`. The changed area is kept in that case.
    pub fn notify_listeners(&mut self) -> Result<(), ScreenError> {
        let area = self.changed_area;
        trace!(
            "Notifying {} screen listener(s) of {}",
            self.listeners.len(),
            area
        );

        // Listeners get `&Screen`, so they are moved out for the duration
        let mut listeners = std::mem::take(&mut self.listeners);
        let result = listeners
            .iter_mut()
            .try_for_each(|listener| listener.screen_changed(self, area));
        self.listeners = listeners;

        result.map_err(ScreenError::Listener)?;
        self.changed_area = Area::EMPTY;
        Ok(())
    }

    /// Whether the pixel at (`x`, `y`) is set
    ///
    /// Pixels outside the screen read as clear.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let (index, mask) = self.bit(x, y);
        self.graph[index] & mask != 0
    }

    /// Set or clear the pixel at (`x`, `y`)
    ///
    /// A pixel that actually changes is reported as damage. Coordinates
    /// outside the screen are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let (index, mask) = self.bit(x, y);
        let byte = &mut self.graph[index];
        let old = *byte;
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        if *byte != old {
            self.report_change(Area::new(x, y, 1, 1));
        }
    }

    /// Whether graph and buffer RAM views are available
    ///
    /// True exactly for the 160×80 screen.
    pub fn has_backing_store(&self) -> bool {
        self.width == SCREEN_WIDTH && self.height == SCREEN_HEIGHT
    }

    /// Memory view of the visible pixels (graph RAM)
    ///
    /// # Errors
    /// `ScreenError::UnsupportedState` if `has_backing_store()` is false
    pub fn graph_ram(&mut self) -> Result<ScreenRam<'_>, ScreenError> {
        self.ram_view(Plane::Graph)
    }

    /// Memory view of the off-screen buffer (buffer RAM)
    ///
    /// # Errors
    /// `ScreenError::UnsupportedState` if `has_backing_store()` is false
    pub fn buffer_ram(&mut self) -> Result<ScreenRam<'_>, ScreenError> {
        self.ram_view(Plane::Buffer)
    }

    /// Minimum export buffer length for `scale`
    pub fn export_len(&self, scale: usize) -> usize {
        scale
            .saturating_mul(scale)
            .saturating_mul(self.width)
            .saturating_mul(self.height)
    }

    /// `(columns, rows)` of the image `export_pixels` writes
    pub fn export_dimensions(&self, scale: usize, rotation: Rotation) -> (usize, usize) {
        export_dimensions(self.width, self.height, scale, rotation)
    }

    /// Write the pixels of `area` into `buffer` as RGB colors
    ///
    /// `buffer` is treated as a row-major image of `export_dimensions(scale,
    /// rotation)`. Every logical pixel inside `area` (clipped to the screen)
    /// fills a `scale`×`scale` block at its rotated position; everything
    /// outside is left as it was, so a renderer can refresh only the damaged
    /// part of a persistent buffer.
    ///
    /// # Arguments
    /// * `buffer` - Output pixels (0xRRGGBB), at least `export_len(scale)` long
    /// * `area` - Logical screen area to export
    /// * `scale` - Size of the block each logical pixel becomes (≥ 1)
    /// * `rotation` - Counter-clockwise quarter turns
    ///
    /// # Returns
    /// `buffer`, for chaining
    pub fn export_pixels<'b>(
        &self,
        buffer: &'b mut [u32],
        area: Area,
        scale: usize,
        rotation: Rotation,
    ) -> Result<&'b mut [u32], ScreenError> {
        if scale == 0 {
            return Err(ScreenError::InvalidScale);
        }
        let required = self.export_len(scale);
        if buffer.len() < required {
            return Err(ScreenError::BufferTooSmall {
                required,
                actual: buffer.len(),
            });
        }

        let area = area.clip(self.width, self.height);
        let (columns, _) = self.export_dimensions(scale, rotation);
        trace!(
            "Exporting {} at {}x scale, rotation {}",
            area,
            scale,
            rotation.steps()
        );

        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let color = self.colors.color_for(self.pixel(x, y));
                let (rx, ry) = rotation.map(x, y, self.width, self.height);
                let left = rx * scale;
                for row in ry * scale..(ry + 1) * scale {
                    let start = row * columns + left;
                    buffer[start..start + scale].fill(color);
                }
            }
        }

        Ok(buffer)
    }

    pub(crate) fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    pub(crate) fn plane(&self, plane: Plane) -> &[u8] {
        match plane {
            Plane::Graph => &self.graph,
            Plane::Buffer => &self.buffer,
        }
    }

    pub(crate) fn plane_mut(&mut self, plane: Plane) -> &mut [u8] {
        match plane {
            Plane::Graph => &mut self.graph,
            Plane::Buffer => &mut self.buffer,
        }
    }

    fn ram_view(&mut self, plane: Plane) -> Result<ScreenRam<'_>, ScreenError> {
        if !self.has_backing_store() {
            return Err(ScreenError::UnsupportedState);
        }
        Ok(ScreenRam::new(self, plane))
    }

    #[inline]
    fn bit(&self, x: usize, y: usize) -> (usize, u8) {
        (y * self.bytes_per_row + x / 8, 0x80 >> (x % 8))
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("colors", &self.colors)
            .field("changed_area", &self.changed_area)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
