use ultraviolet::DVec2;

/// Two-dimensional vector used for every position, velocity and force in the simulation.
/// Values are immutable; all arithmetic returns a new vector.
pub type Vector2D = DVec2;

/// Geometric helpers missing from `ultraviolet`.
pub trait VectorExt {
    /// Euclidean distance between two points.
    fn distance_to(self, other: Self) -> f64;
}

impl VectorExt for Vector2D {
    #[inline]
    fn distance_to(self, other: Self) -> f64 {
        (self - other).mag()
    }
}
