// Screen RAM views - graph and buffer planes exposed as VM memory
//
// LAV programs may poke video memory directly. The 160×80 screen keeps its
// pixels in two 1600-byte planes with the same layout the VM expects:
//
// ```text
// byte  = y * 20 + x / 8
// bit   = 7 - x % 8          (most significant bit is the leftmost pixel)
// ```
//
// The graph plane is what is shown; the buffer plane is an off-screen page.
// Writes through the graph view are reported as damage so listeners see them
// like any other screen change.

use super::{Area, Screen};
use crate::bus::MemoryMappedDevice;
use log::warn;

/// Size of one RAM plane of the 160×80 screen in bytes
pub const PLANE_SIZE: usize = 1600;

/// Default VM address of the graph RAM view
pub const GRAPH_RAM_ADDRESS: u16 = 0x0000;

/// Default VM address of the buffer RAM view (right after graph RAM)
pub const BUFFER_RAM_ADDRESS: u16 = GRAPH_RAM_ADDRESS + PLANE_SIZE as u16;

/// Which pixel plane a view exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    /// Visible screen content
    Graph,
    /// Off-screen drawing buffer
    Buffer,
}

/// A memory view onto one of the screen's pixel planes
///
/// The view borrows the screen, so no copy of the pixels exists: reads see
/// the current content and writes land in the screen directly.
///
/// # Examples
///
/// ```
/// use gvm_rs::bus::MemoryMappedDevice;
/// use gvm_rs::screen::{Area, Screen};
///
/// let mut screen = Screen::new();
/// let mut ram = screen.graph_ram().unwrap();
/// ram.write(0, 0x80);
/// assert!(screen.pixel(0, 0));
/// assert_eq!(screen.changed_area(), Area::new(0, 0, 8, 1));
/// ```
#[derive(Debug)]
pub struct ScreenRam<'a> {
    screen: &'a mut Screen,
    plane: Plane,
    start_address: u16,
}

impl<'a> ScreenRam<'a> {
    pub(super) fn new(screen: &'a mut Screen, plane: Plane) -> Self {
        let start_address = match plane {
            Plane::Graph => GRAPH_RAM_ADDRESS,
            Plane::Buffer => BUFFER_RAM_ADDRESS,
        };
        ScreenRam {
            screen,
            plane,
            start_address,
        }
    }

    /// Install the view at a different VM address
    pub fn with_start_address(mut self, start_address: u16) -> Self {
        self.start_address = start_address;
        self
    }

    /// The plane this view exposes
    pub fn plane(&self) -> Plane {
        self.plane
    }

    /// Current content of the plane
    pub fn as_slice(&self) -> &[u8] {
        self.screen.plane(self.plane)
    }
}

impl MemoryMappedDevice for ScreenRam<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        match self.screen.plane(self.plane).get(usize::from(addr)) {
            Some(&byte) => byte,
            None => {
                warn!(
                    "{:?} RAM read at offset {:#06X} is outside the plane",
                    self.plane, addr
                );
                0
            }
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        let offset = usize::from(addr);
        let bytes_per_row = self.screen.bytes_per_row();
        let width = self.screen.width();

        let Some(byte) = self.screen.plane_mut(self.plane).get_mut(offset) else {
            warn!(
                "{:?} RAM write at offset {:#06X} is outside the plane, dropped",
                self.plane, addr
            );
            return;
        };
        if *byte == data {
            return;
        }
        *byte = data;

        if self.plane == Plane::Graph {
            let y = offset / bytes_per_row;
            let x = (offset % bytes_per_row) * 8;
            let run = (width - x).min(8);
            self.screen.report_change(Area::new(x, y, run, 1));
        }
    }

    fn start_address(&self) -> u16 {
        self.start_address
    }

    fn len(&self) -> usize {
        self.screen.plane(self.plane).len()
    }
}
