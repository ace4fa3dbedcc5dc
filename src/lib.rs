//! Two-dimensional gravitational N-body simulation using the Barnes-Hut approximation.
//!
//! Each [`Simulation::step`] rebuilds a [`Quadtree`] over a fixed [`Quadrant`] from the
//! current body positions, then integrates every [`Body`] against it in parallel.

pub mod body;
pub mod config;
pub mod direct;
pub mod export;
pub mod galaxy;
pub mod params;
pub mod quadrant;
pub mod quadtree;
pub mod simulation;
pub mod vector;

pub use body::{Body, Color};
pub use config::SimulationConfig;
pub use galaxy::{Galaxy, GalaxyModel};
pub use params::Parameters;
pub use quadrant::{Corner, Quadrant};
pub use quadtree::{MassAggregate, Node, Occupant, Quadtree};
pub use simulation::Simulation;
pub use vector::{Vector2D, VectorExt};
