use crate::{
    body::Body,
    direct,
    params::Parameters,
    quadrant::Quadrant,
    quadtree::Quadtree,
    vector::Vector2D,
};

use anyhow::Context;
use rayon::prelude::*;

/// Manages the Barnes-Hut N-body simulation state and logic.
pub struct Simulation {
    /// Constants threaded into every step.
    params: Parameters,
    /// Number of completed steps.
    frame: usize,
    /// Fixed simulated region; never grows.
    bounds: Quadrant,
    /// Collection of all bodies in the simulation. Count and order never change.
    bodies: Vec<Body>,
    /// Tree built at the start of the last step.
    tree: Quadtree,
    /// Dedicated worker pool, or rayon's global pool when `None`.
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("params", &self.params)
            .field("frame", &self.frame)
            .field("bounds", &self.bounds)
            .field("bodies", &self.bodies.len())
            .field("tree_nodes", &self.tree.nodes().len())
            .field("threads", &self.threads())
            .finish()
    }
}

impl Simulation {
    /// Initializes a simulation over `bounds` with the given bodies.
    /// Force evaluation runs on rayon's global pool until [`Simulation::with_threads`] is used.
    pub fn new(params: Parameters, bounds: Quadrant, bodies: Vec<Body>) -> Self {
        let tree = Quadtree::new(bounds.clone(), &params);
        Self {
            params,
            frame: 0,
            bounds,
            bodies,
            tree,
            pool: None,
        }
    }

    /// Runs force evaluation on a dedicated pool of `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> anyhow::Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("bhsim-worker-{i}"))
            .build()
            .with_context(|| format!("failed to start a pool of {threads} worker threads"))?;
        self.pool = Some(pool);
        Ok(self)
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn bounds(&self) -> &Quadrant {
        &self.bounds
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// The tree the last step evaluated forces with. Empty before the first step.
    pub fn tree(&self) -> &Quadtree {
        &self.tree
    }

    /// Bodies outside the region during the last step.
    pub fn escaped(&self) -> usize {
        self.tree.escaped()
    }

    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Advances the simulation by one step.
    /// 1. Rebuilds the Quadtree from current body positions.
    /// 2. Integrates every body against that tree in parallel.
    ///
    /// The parallel phase only returns once every body is done, so the next
    /// tree is never built from a half-updated state.
    pub fn step(&mut self) {
        self.tree = Quadtree::build(self.bounds.clone(), &self.params, &self.bodies);

        let Parameters { dt, theta, .. } = self.params;
        match &self.pool {
            Some(pool) => pool.install(|| integrate_all(&mut self.bodies, &self.tree, dt, theta)),
            None => integrate_all(&mut self.bodies, &self.tree, dt, theta),
        }

        self.frame += 1;
    }

    /// Runs `steps` steps.
    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Runs `steps` steps, handing the simulation to `observe` after each one.
    pub fn step_with<E>(
        &mut self,
        steps: usize,
        mut observe: impl FnMut(&Simulation) -> Result<(), E>,
    ) -> Result<(), E> {
        for _ in 0..steps {
            self.step();
            observe(self)?;
        }
        Ok(())
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(Body::mass).sum()
    }

    pub fn momentum(&self) -> Vector2D {
        self.bodies
            .iter()
            .fold(Vector2D::zero(), |p, body| p + body.momentum())
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies
            .iter()
            .map(|body| 0.5 * body.mass() * body.vel.mag_sq())
            .sum()
    }

    /// Exact pairwise potential energy. O(n²).
    pub fn potential_energy(&self) -> f64 {
        direct::potential_energy(&self.bodies, self.params.g, self.params.softening)
    }
}

fn integrate_all(bodies: &mut [Body], tree: &Quadtree, dt: f64, theta: f64) {
    bodies
        .par_iter_mut()
        .enumerate()
        .for_each(|(id, body)| body.integrate(id, dt, tree, theta));
}
