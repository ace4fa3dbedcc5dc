use crate::vector::{Vector2D, VectorExt};

use once_cell::sync::OnceCell;
use std::sync::Arc;

/// One of the four sub-quadrants of a [`Quadrant`].
///
/// Screen convention: y grows downward, so "upper" is the half with the smaller y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    UpperLeft = 0,
    UpperRight = 1,
    LowerLeft = 2,
    LowerRight = 3,
}

impl Corner {
    /// Storage order of children, also used for traversal.
    pub const ALL: [Corner; 4] = [
        Corner::UpperLeft,
        Corner::UpperRight,
        Corner::LowerLeft,
        Corner::LowerRight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Axis-aligned square region of simulation space.
///
/// The region is half-open: a point on the right or lower edge belongs to the neighbour.
/// Sub-quadrants are computed on first use and cached. Clones share the cache, so a tree
/// should start from a fresh root (see [`Quadrant::detached`]) rather than a clone of a
/// long-lived one.
#[derive(Clone, Debug)]
pub struct Quadrant {
    origin: Vector2D,
    size: f64,
    children: Arc<OnceCell<[Quadrant; 4]>>,
}

impl PartialEq for Quadrant {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin && self.size == other.size
    }
}

impl Quadrant {
    /// Creates a quadrant from its upper-left corner and side length.
    pub fn new(origin: Vector2D, size: f64) -> Self {
        Self {
            origin,
            size,
            children: Arc::new(OnceCell::new()),
        }
    }

    /// Same region with an empty subdivision cache.
    pub fn detached(&self) -> Self {
        Self::new(self.origin, self.size)
    }

    pub fn origin(&self) -> Vector2D {
        self.origin
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn center(&self) -> Vector2D {
        self.origin + Vector2D::broadcast(self.size * 0.5)
    }

    /// True iff `p` lies in `[origin, origin + size)` on both axes. NaN is never contained.
    #[inline]
    pub fn contains(&self, p: Vector2D) -> bool {
        p.x >= self.origin.x
            && p.y >= self.origin.y
            && p.x < self.origin.x + self.size
            && p.y < self.origin.y + self.size
    }

    /// Distance from the geometric center to `p`.
    #[inline]
    pub fn distance_to_center(&self, p: Vector2D) -> f64 {
        self.center().distance_to(p)
    }

    /// Which sub-quadrant a point of this quadrant falls into.
    /// Ties on the center lines go right and down, matching the half-open children.
    #[inline]
    pub fn corner_of(&self, p: Vector2D) -> Corner {
        let c = self.center();
        match (p.x >= c.x, p.y >= c.y) {
            (false, false) => Corner::UpperLeft,
            (true, false) => Corner::UpperRight,
            (false, true) => Corner::LowerLeft,
            (true, true) => Corner::LowerRight,
        }
    }

    /// The four sub-quadrants, indexed by [`Corner::index`].
    pub fn subdivide(&self) -> &[Quadrant; 4] {
        self.children
            .get_or_init(|| Corner::ALL.map(|corner| self.sub_quadrant(corner)))
    }

    pub fn child(&self, corner: Corner) -> &Quadrant {
        &self.subdivide()[corner.index()]
    }

    /// Number of sub-quadrants cached at or below this one.
    #[cfg(test)]
    pub(crate) fn cached(&self) -> usize {
        self.children
            .get()
            .map_or(0, |children| children.iter().map(|c| 1 + c.cached()).sum())
    }

    fn sub_quadrant(&self, corner: Corner) -> Quadrant {
        let half = self.size * 0.5;
        let i = corner.index();
        let offset = Vector2D::new((i & 1) as f64 * half, (i >> 1) as f64 * half);
        Quadrant::new(self.origin + offset, half)
    }
}
