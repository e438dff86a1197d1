// Display module - Turns exported screen pixels into something visible
//
// This module provides:
// - Color conversions for window frames and PNG output
// - A viewer window (winit + pixels) that refreshes only the damaged area

pub mod color;
#[cfg(feature = "viewer")]
pub mod window;

pub use color::{rgb_to_bytes, rgb_to_rgba};
#[cfg(feature = "viewer")]
pub use window::{run_viewer, ScreenWindow};
