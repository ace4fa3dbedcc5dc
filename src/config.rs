//! Scenario files.
//!
//! A scenario holds the simulation constants, the simulated region and the galaxies to
//! generate. Keys are PascalCase. The format is YAML, and since JSON is valid YAML, JSON
//! scenario files load unchanged:
//!
//! ```yaml
//! Size: 800          # side of the simulated square
//! Origin: [0, 0]     # its upper-left corner
//! G: 1.0
//! Theta: 0.5         # 0 = exact forces
//! TimeStep: 0.1
//! Softening: 0.0     # optional
//! Seed: 7            # optional, for reproducible galaxies
//! Threads: 4         # optional, defaults to one worker per core
//! Galaxies:
//!   Milky:
//!     Model: Disk    # Disk, Line, Plus, Snail, Out or Uniform
//!     Mass: 1000
//!     Radius: 100
//!     Particles: 2000
//!     Position: [300, 400]
//!     Velocity: [0, 0]
//!     Color: Blue
//! ```

use crate::{
    body::Color,
    galaxy::{self, Galaxy, GalaxyModel},
    params::Parameters,
    quadrant::Quadrant,
    simulation::Simulation,
    vector::Vector2D,
};

use anyhow::{Context, Result, ensure};
use linked_hash_map::LinkedHashMap;
use serde::Deserialize;
use std::path::Path;

/// Top-level scenario, as loaded from a file.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct SimulationConfig {
    pub size: f64,
    #[serde(default)]
    pub origin: [f64; 2],
    #[serde(rename = "G")]
    pub g: f64,
    pub theta: f64,
    pub time_step: f64,
    #[serde(default)]
    pub softening: f64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub threads: Option<usize>,
    /// Generated in file order.
    pub galaxies: LinkedHashMap<String, GalaxyConfig>,
}

/// One entry of `Galaxies`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct GalaxyConfig {
    pub model: GalaxyModel,
    pub mass: f64,
    pub radius: f64,
    pub particles: usize,
    pub position: [f64; 2],
    #[serde(default)]
    pub velocity: [f64; 2],
    #[serde(default)]
    pub color: Color,
}

impl SimulationConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the simulation cannot run with. Called by the loaders.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.size > 0.0 && self.size.is_finite(), "Size must be positive, got {}", self.size);
        ensure!(self.origin.iter().all(|c| c.is_finite()), "Origin must be finite");
        ensure!(self.g.is_finite(), "G must be finite, got {}", self.g);
        ensure!(self.theta >= 0.0 && self.theta.is_finite(), "Theta must be >= 0, got {}", self.theta);
        ensure!(
            self.time_step > 0.0 && self.time_step.is_finite(),
            "TimeStep must be positive, got {}",
            self.time_step
        );
        ensure!(self.softening >= 0.0, "Softening must be >= 0, got {}", self.softening);
        if let Some(threads) = self.threads {
            ensure!(threads > 0, "Threads must be at least 1");
        }

        for (name, galaxy) in &self.galaxies {
            ensure!(galaxy.mass > 0.0, "galaxy {name}: Mass must be positive, got {}", galaxy.mass);
            ensure!(
                galaxy.radius > 0.0,
                "galaxy {name}: Radius must be positive, got {}",
                galaxy.radius
            );
            ensure!(galaxy.particles > 0, "galaxy {name}: Particles must be at least 1");
        }
        Ok(())
    }

    pub fn parameters(&self) -> Parameters {
        Parameters::new(self.g, self.theta, self.time_step).with_softening(self.softening)
    }

    pub fn bounds(&self) -> Quadrant {
        Quadrant::new(Vector2D::new(self.origin[0], self.origin[1]), self.size)
    }

    pub fn galaxies(&self) -> Vec<Galaxy> {
        self.galaxies
            .values()
            .map(|g| Galaxy {
                model: g.model,
                mass: g.mass,
                radius: g.radius,
                particles: g.particles,
                position: Vector2D::new(g.position[0], g.position[1]),
                velocity: Vector2D::new(g.velocity[0], g.velocity[1]),
                color: g.color,
            })
            .collect()
    }

    /// Generates the bodies and sets up the simulation.
    pub fn into_simulation(self) -> Result<Simulation> {
        let bodies = galaxy::build_all(&self.galaxies(), self.g, self.seed)?;
        log::info!(
            "generated {} bodies in {} galaxies",
            bodies.len(),
            self.galaxies.len()
        );

        let simulation = Simulation::new(self.parameters(), self.bounds(), bodies);
        match self.threads {
            Some(threads) => simulation.with_threads(threads),
            None => Ok(simulation),
        }
    }
}
