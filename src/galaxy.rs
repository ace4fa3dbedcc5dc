//! Procedural initial conditions.
//!
//! Every galaxy is a heavy central body surrounded by light satellites whose layout
//! depends on the [`GalaxyModel`].

use crate::{
    body::{Body, Color},
    vector::Vector2D,
};

use anyhow::ensure;
use serde::Deserialize;
use std::f64::consts::{PI, TAU};

/// Mass of every satellite body.
pub const SATELLITE_MASS: f64 = 1e-4;
pub const SATELLITE_SIZE: u32 = 1;
pub const CENTER_SIZE: u32 = 6;

/// Layout of the satellites around the central body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum GalaxyModel {
    /// Uniformly random angles, circular orbits around the center.
    Disk,
    /// All satellites on one ray to the left of the center.
    Line,
    /// Satellites on the four axis-aligned rays.
    Plus,
    /// Three rays at 0, 80 and 90 radians, which wind into a spiral.
    Snail,
    /// Random angles, satellites at rest so they fall inward.
    Out,
    /// Uniform area density, orbital speed from the mass enclosed at each radius.
    Uniform,
}

impl GalaxyModel {
    fn angle(self, rng: &mut fastrand::Rng) -> f64 {
        match self {
            GalaxyModel::Disk | GalaxyModel::Out | GalaxyModel::Uniform => rng.f64() * TAU,
            GalaxyModel::Line => PI,
            GalaxyModel::Plus => [0.0, PI / 2.0, PI, 3.0 * PI / 2.0][rng.usize(..4)],
            GalaxyModel::Snail => [0.0, 90.0, 80.0][rng.usize(..3)],
        }
    }
}

/// Description of one galaxy.
#[derive(Clone, Debug, PartialEq)]
pub struct Galaxy {
    pub model: GalaxyModel,
    /// Mass of the central body.
    pub mass: f64,
    pub radius: f64,
    /// Total number of bodies, the central one included.
    pub particles: usize,
    pub position: Vector2D,
    /// Bulk velocity shared by the whole galaxy.
    pub velocity: Vector2D,
    pub color: Color,
}

/// Generates the bodies of one galaxy. The central body comes first.
pub fn build(galaxy: &Galaxy, g: f64, rng: &mut fastrand::Rng) -> anyhow::Result<Vec<Body>> {
    ensure!(galaxy.particles > 0, "a galaxy needs at least one body");
    ensure!(galaxy.radius > 0.0, "galaxy radius must be positive, got {}", galaxy.radius);
    ensure!(galaxy.mass > 0.0, "galaxy mass must be positive, got {}", galaxy.mass);

    let mut bodies = Vec::with_capacity(galaxy.particles);
    bodies.push(
        Body::new(galaxy.position, galaxy.velocity, galaxy.mass)
            .with_appearance(CENTER_SIZE, galaxy.color),
    );

    if galaxy.model == GalaxyModel::Uniform {
        uniform_disc(galaxy, g, rng, &mut bodies);
        return Ok(bodies);
    }

    for _ in 1..galaxy.particles {
        let r = rng.f64() * galaxy.radius + galaxy.radius / 10.0;
        let (sin, cos) = galaxy.model.angle(rng).sin_cos();
        let pos = galaxy.position + Vector2D::new(cos, sin) * r;

        let vel = match galaxy.model {
            GalaxyModel::Out => Vector2D::zero(),
            // Circular orbit: v = sqrt(GM / r)
            _ => galaxy.velocity + Vector2D::new(-sin, cos) * (g * galaxy.mass / r).sqrt(),
        };

        bodies.push(
            Body::new(pos, vel, SATELLITE_MASS).with_appearance(SATELLITE_SIZE, galaxy.color),
        );
    }

    Ok(bodies)
}

fn uniform_disc(galaxy: &Galaxy, g: f64, rng: &mut fastrand::Rng, bodies: &mut Vec<Body>) {
    let inner_radius = galaxy.radius / 10.0;
    let t = inner_radius / galaxy.radius;

    while bodies.len() < galaxy.particles {
        let (sin, cos) = (rng.f64() * TAU).sin_cos();

        // Random radius with uniform area distribution
        let r = rng.f64() * (1.0 - t * t) + t * t;
        let pos = galaxy.position + Vector2D::new(cos, sin) * galaxy.radius * r.sqrt();

        bodies.push(
            Body::new(pos, galaxy.velocity, SATELLITE_MASS)
                .with_appearance(SATELLITE_SIZE, galaxy.color),
        );
    }

    // Sort satellites by distance from center (closest first)
    let center = galaxy.position;
    bodies[1..].sort_by(|a, b| {
        (a.pos - center)
            .mag_sq()
            .total_cmp(&(b.pos - center).mag_sq())
    });

    // Orbital speed from the mass enclosed by each satellite's radius
    let mut enclosed = galaxy.mass;
    for body in &mut bodies[1..] {
        enclosed += body.mass();
        let offset = body.pos - center;
        let r = offset.mag();
        if r == 0.0 {
            continue;
        }
        let tangent = Vector2D::new(-offset.y, offset.x) / r;
        body.vel = galaxy.velocity + tangent * (g * enclosed / r).sqrt();
    }
}

/// Generates every galaxy in order from one seeded generator, so runs are reproducible.
pub fn build_all(galaxies: &[Galaxy], g: f64, seed: u64) -> anyhow::Result<Vec<Body>> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut bodies = Vec::new();
    for galaxy in galaxies {
        bodies.extend(build(galaxy, g, &mut rng)?);
    }
    Ok(bodies)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn galaxy(model: GalaxyModel) -> Galaxy {
        Galaxy {
            model,
            mass: 1000.0,
            radius: 50.0,
            particles: 200,
            position: Vector2D::new(400.0, 300.0),
            velocity: Vector2D::new(1.0, 0.0),
            color: Color::Blue,
        }
    }

    fn build_one(model: GalaxyModel) -> Vec<Body> {
        build(&galaxy(model), 2.0, &mut fastrand::Rng::with_seed(1)).unwrap()
    }

    #[test]
    fn center_comes_first() {
        for model in [
            GalaxyModel::Disk,
            GalaxyModel::Line,
            GalaxyModel::Plus,
            GalaxyModel::Snail,
            GalaxyModel::Out,
            GalaxyModel::Uniform,
        ] {
            let bodies = build_one(model);
            assert_eq!(bodies.len(), 200);
            assert_eq!(bodies[0].pos, Vector2D::new(400.0, 300.0));
            assert_eq!(bodies[0].vel, Vector2D::new(1.0, 0.0));
            assert_eq!(bodies[0].mass(), 1000.0);
            assert_eq!(bodies[0].size, CENTER_SIZE);
            for body in &bodies[1..] {
                assert_eq!(body.mass(), SATELLITE_MASS);
                assert_eq!(body.color, Color::Blue);
                let r = (body.pos - bodies[0].pos).mag();
                assert!((5.0 - 1e-9..55.0 + 1e-9).contains(&r), "{:?}: r = {}", model, r);
            }
        }
    }

    #[test]
    fn disk_satellites_orbit_circularly() {
        let bodies = build_one(GalaxyModel::Disk);
        let center = bodies[0].pos;
        for body in &bodies[1..] {
            let offset = body.pos - center;
            let relative = body.vel - Vector2D::new(1.0, 0.0);
            let r = offset.mag();
            assert!((relative.mag() - (2.0 * 1000.0 / r).sqrt()).abs() < 1e-9);
            assert!(relative.dot(offset).abs() < 1e-6);
        }
    }

    #[test]
    fn line_and_plus_layouts() {
        for body in &build_one(GalaxyModel::Line)[1..] {
            assert!(body.pos.x < 400.0);
            assert!((body.pos.y - 300.0).abs() < 1e-9);
        }
        for body in &build_one(GalaxyModel::Plus)[1..] {
            let d = body.pos - Vector2D::new(400.0, 300.0);
            assert!(d.x.abs() < 1e-9 || d.y.abs() < 1e-9, "{:?}", d);
        }
    }

    #[test]
    fn out_satellites_start_at_rest() {
        for body in &build_one(GalaxyModel::Out)[1..] {
            assert_eq!(body.vel, Vector2D::zero());
        }
    }

    #[test]
    fn uniform_speeds_use_enclosed_mass() {
        let bodies = build_one(GalaxyModel::Uniform);
        let center = bodies[0].pos;
        let mut last = 0.0;
        for (i, body) in bodies[1..].iter().enumerate() {
            let r = (body.pos - center).mag();
            assert!(r >= last);
            last = r;
            let enclosed = 1000.0 + (i + 1) as f64 * SATELLITE_MASS;
            let relative = body.vel - Vector2D::new(1.0, 0.0);
            assert!((relative.mag() - (2.0 * enclosed / r).sqrt()).abs() < 1e-9);
        }
    }

    #[test]
    fn seeded_builds_are_reproducible() {
        let galaxies = [galaxy(GalaxyModel::Disk), galaxy(GalaxyModel::Snail)];
        let a = build_all(&galaxies, 1.0, 42).unwrap();
        let b = build_all(&galaxies, 1.0, 42).unwrap();
        assert_eq!(a.len(), 400);
        assert_eq!(a, b);
        assert_ne!(a, build_all(&galaxies, 1.0, 43).unwrap());
    }

    #[test]
    fn rejects_empty_galaxy() {
        let mut empty = galaxy(GalaxyModel::Disk);
        empty.particles = 0;
        assert!(build(&empty, 1.0, &mut fastrand::Rng::with_seed(0)).is_err());

        let single = Galaxy { particles: 1, ..galaxy(GalaxyModel::Plus) };
        assert_eq!(build(&single, 1.0, &mut fastrand::Rng::with_seed(0)).unwrap().len(), 1);
    }
}
