// Area - axis-aligned rectangles in logical screen coordinates
//
// Damage tracking only ever needs the bounding box of everything that was
// touched, so an area is a single rectangle and merging is a bounding union.

/// A rectangle in logical screen coordinates
///
/// `x`/`y` is the top-left corner; the rectangle covers
/// `x..x + width` by `y..y + height`. An area with zero width or height is
/// empty regardless of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Area {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Area {
    /// The empty area
    pub const EMPTY: Area = Area {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    /// Create an area from its top-left corner and size
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Area {
            x,
            y,
            width,
            height,
        }
    }

    /// An area covering a whole `width`×`height` screen
    pub const fn full(width: usize, height: usize) -> Self {
        Area::new(0, 0, width, height)
    }

    /// Whether the area covers no pixels
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// One past the rightmost column
    #[inline]
    pub fn right(&self) -> usize {
        self.x.saturating_add(self.width)
    }

    /// One past the bottom row
    #[inline]
    pub fn bottom(&self) -> usize {
        self.y.saturating_add(self.height)
    }

    /// Whether the pixel at (`x`, `y`) lies inside the area
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Smallest area covering both `self` and `other`
    ///
    /// Empty areas do not contribute, so the union with an empty area is the
    /// other area unchanged.
    pub fn union(&self, other: &Area) -> Area {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }

        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Area::new(x, y, right - x, bottom - y)
    }

    /// Restrict the area to a `width`×`height` screen
    ///
    /// Returns `Area::EMPTY` when nothing is left.
    pub fn clip(&self, width: usize, height: usize) -> Area {
        let right = self.right().min(width);
        let bottom = self.bottom().min(height);
        if self.is_empty() || self.x >= right || self.y >= bottom {
            return Area::EMPTY;
        }
        Area::new(self.x, self.y, right - self.x, bottom - self.y)
    }
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "(empty)")
        } else {
            write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
        }
    }
}
