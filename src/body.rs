use crate::{quadtree::Quadtree, vector::Vector2D};

use serde::Deserialize;

/// Display color of a body. Has no effect on the physics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Color {
    #[default]
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
}

impl Color {
    /// Packed `0xRRGGBB` value.
    pub fn rgb(self) -> u32 {
        match self {
            Color::Red => 0xFF0000,
            Color::Blue => 0x0000FF,
            Color::Green => 0x00FF00,
            Color::Yellow => 0xFFFF00,
            Color::Orange => 0xFFC800,
        }
    }
}

// Unknown names fall back to red rather than failing the whole config.
impl From<String> for Color {
    fn from(name: String) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "blue" => Color::Blue,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "orange" | "purple" => Color::Orange,
            _ => Color::Red,
        }
    }
}

/// A point mass in the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Position vector.
    pub pos: Vector2D,
    /// Velocity vector.
    pub vel: Vector2D,
    /// Mass of the body. Fixed for the whole run.
    mass: f64,
    /// Drawn size in pixels.
    pub size: u32,
    pub color: Color,
}

impl Default for Body {
    fn default() -> Self {
        Self::new(Vector2D::zero(), Vector2D::zero(), 1.0)
    }
}

impl Body {
    /// Creates a new Body with the given physical state and default appearance.
    pub fn new(pos: Vector2D, vel: Vector2D, mass: f64) -> Self {
        Self {
            pos,
            vel,
            mass,
            size: 1,
            color: Color::default(),
        }
    }

    pub fn with_appearance(mut self, size: u32, color: Color) -> Self {
        self.size = size;
        self.color = color;
        self
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Momentum `m * v`.
    pub fn momentum(&self) -> Vector2D {
        self.vel * self.mass
    }

    /// Advances the body by `dt` under the force field of `tree`.
    /// `id` is the body's index in the simulation, used to skip its own contribution.
    /// Uses semi-implicit Euler integration (velocity update first, then position).
    pub fn integrate(&mut self, id: usize, dt: f64, tree: &Quadtree, theta: f64) {
        let acc = tree.compute_force(id, self, theta) / self.mass;
        self.vel += acc * dt;
        self.pos += self.vel * dt;
    }
}
