// Export transform - mapping logical pixels into a scaled, rotated buffer
//
// The output buffer is a row-major image. Without rotation it is
// (width × scale) wide and (height × scale) tall; quarter turns swap the two
// dimensions. Each logical pixel becomes a scale×scale block.

use super::{Area, ScreenError};

/// Rotation applied when exporting pixels, in counter-clockwise quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    /// No rotation
    #[default]
    None,
    /// 90° counter-clockwise
    Ccw90,
    /// 180°
    Half,
    /// 270° counter-clockwise (90° clockwise)
    Ccw270,
}

impl Rotation {
    /// Number of counter-clockwise quarter turns (0-3)
    pub fn steps(self) -> u8 {
        match self {
            Rotation::None => 0,
            Rotation::Ccw90 => 1,
            Rotation::Half => 2,
            Rotation::Ccw270 => 3,
        }
    }

    /// Whether the rotation swaps width and height
    #[inline]
    pub fn is_transposed(self) -> bool {
        matches!(self, Rotation::Ccw90 | Rotation::Ccw270)
    }

    /// Rotated logical size of a `width`×`height` screen
    #[inline]
    pub fn dimensions(self, width: usize, height: usize) -> (usize, usize) {
        if self.is_transposed() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Map logical pixel (`x`, `y`) of a `width`×`height` screen to its
    /// rotated position
    ///
    /// For a quarter turn counter-clockwise the top-left pixel ends up in the
    /// bottom-left corner of the rotated image.
    #[inline]
    pub fn map(self, x: usize, y: usize, width: usize, height: usize) -> (usize, usize) {
        match self {
            Rotation::None => (x, y),
            Rotation::Ccw90 => (y, width - 1 - x),
            Rotation::Half => (width - 1 - x, height - 1 - y),
            Rotation::Ccw270 => (height - 1 - y, x),
        }
    }

    /// Rotated position of an area already clipped to the screen
    ///
    /// The result covers exactly the rotated positions of the pixels in
    /// `area`, in logical (unscaled) units.
    pub fn map_area(self, area: Area, width: usize, height: usize) -> Area {
        if area.is_empty() {
            return Area::EMPTY;
        }
        match self {
            Rotation::None => area,
            Rotation::Ccw90 => Area::new(area.y, width - area.right(), area.height, area.width),
            Rotation::Half => Area::new(
                width - area.right(),
                height - area.bottom(),
                area.width,
                area.height,
            ),
            Rotation::Ccw270 => {
                Area::new(height - area.bottom(), area.x, area.height, area.width)
            }
        }
    }
}

impl TryFrom<u8> for Rotation {
    type Error = ScreenError;

    fn try_from(steps: u8) -> Result<Self, Self::Error> {
        match steps {
            0 => Ok(Rotation::None),
            1 => Ok(Rotation::Ccw90),
            2 => Ok(Rotation::Half),
            3 => Ok(Rotation::Ccw270),
            other => Err(ScreenError::InvalidRotation(other)),
        }
    }
}

/// Size in pixels of the exported image of a `width`×`height` screen
///
/// # Returns
/// `(columns, rows)` of the output buffer
pub fn export_dimensions(
    width: usize,
    height: usize,
    scale: usize,
    rotation: Rotation,
) -> (usize, usize) {
    let (w, h) = rotation.dimensions(width, height);
    (w * scale, h * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_steps() {
        for steps in 0..4u8 {
            assert_eq!(Rotation::try_from(steps).unwrap().steps(), steps);
        }
        assert!(matches!(
            Rotation::try_from(4),
            Err(ScreenError::InvalidRotation(4))
        ));
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(Rotation::None.dimensions(160, 80), (160, 80));
        assert_eq!(Rotation::Ccw90.dimensions(160, 80), (80, 160));
        assert_eq!(Rotation::Half.dimensions(160, 80), (160, 80));
        assert_eq!(Rotation::Ccw270.dimensions(160, 80), (80, 160));
        assert_eq!(export_dimensions(160, 80, 2, Rotation::Ccw90), (160, 320));
    }

    #[test]
    fn test_map_corners() {
        // Top-left corner of a 160x80 screen
        assert_eq!(Rotation::None.map(0, 0, 160, 80), (0, 0));
        assert_eq!(Rotation::Ccw90.map(0, 0, 160, 80), (0, 159));
        assert_eq!(Rotation::Half.map(0, 0, 160, 80), (159, 79));
        assert_eq!(Rotation::Ccw270.map(0, 0, 160, 80), (79, 0));

        // Top-right corner
        assert_eq!(Rotation::Ccw90.map(159, 0, 160, 80), (0, 0));
        assert_eq!(Rotation::Ccw270.map(159, 0, 160, 80), (79, 159));
    }

    #[test]
    fn test_map_stays_in_bounds() {
        for rotation in [
            Rotation::None,
            Rotation::Ccw90,
            Rotation::Half,
            Rotation::Ccw270,
        ] {
            let (w, h) = rotation.dimensions(7, 3);
            for y in 0..3 {
                for x in 0..7 {
                    let (rx, ry) = rotation.map(x, y, 7, 3);
                    assert!(rx < w && ry < h, "{:?} maps ({}, {}) outside", rotation, x, y);
                }
            }
        }
    }

    #[test]
    fn test_map_area_matches_pixel_mapping() {
        let area = Area::new(5, 10, 4, 3);
        for rotation in [
            Rotation::None,
            Rotation::Ccw90,
            Rotation::Half,
            Rotation::Ccw270,
        ] {
            let rotated = rotation.map_area(area, 160, 80);
            assert_eq!(rotated.width * rotated.height, 12);
            for y in area.y..area.bottom() {
                for x in area.x..area.right() {
                    let (rx, ry) = rotation.map(x, y, 160, 80);
                    assert!(rotated.contains(rx, ry), "{:?}: ({}, {})", rotation, x, y);
                }
            }
        }
        assert_eq!(Rotation::Half.map_area(Area::EMPTY, 160, 80), Area::EMPTY);
    }

    #[test]
    fn test_two_quarter_turns_make_half() {
        let (x, y) = (12, 34);
        let (ax, ay) = Rotation::Ccw90.map(x, y, 160, 80);
        // Second turn operates on the transposed 80x160 image
        let twice = Rotation::Ccw90.map(ax, ay, 80, 160);
        assert_eq!(twice, Rotation::Half.map(x, y, 160, 80));
    }
}
