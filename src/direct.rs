//! Exact all-pairs reference.
//!
//! O(n²), so only for checking the tree and for energy diagnostics on small systems.

use crate::{body::Body, quadtree::pair_force, vector::Vector2D};

/// Exact net force on `bodies[i]` from every other body.
pub fn force_on(bodies: &[Body], i: usize, g: f64, softening: f64) -> Vector2D {
    let e_sq = softening * softening;
    let target = &bodies[i];
    bodies
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .fold(Vector2D::zero(), |force, (_, other)| {
            force + pair_force(g, e_sq, other.pos, other.mass(), target.pos, target.mass())
        })
}

/// Total softened gravitational potential energy, `-Σ G mᵢ mⱼ / sqrt(r² + ε²)` over pairs.
/// Coincident pairs without softening are skipped.
pub fn potential_energy(bodies: &[Body], g: f64, softening: f64) -> f64 {
    let e_sq = softening * softening;
    let mut energy = 0.0;
    for (i, a) in bodies.iter().enumerate() {
        for b in &bodies[i + 1..] {
            let r_sq = (a.pos - b.pos).mag_sq() + e_sq;
            if r_sq > 0.0 {
                energy -= g * a.mass() * b.mass() / r_sq.sqrt();
            }
        }
    }
    energy
}
