//! Numerical and physical parameters for the simulation
//!
//! `Parameters` is passed explicitly to the tree build and to every integration step;
//! nothing here lives in global state.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub g: f64,         // gravitational constant
    pub theta: f64,     // acceptance threshold, 0 = exact traversal
    pub dt: f64,        // time step
    pub softening: f64, // Plummer softening length, 0 = none
}

impl Parameters {
    pub fn new(g: f64, theta: f64, dt: f64) -> Self {
        Self {
            g,
            theta,
            dt,
            softening: 0.0,
        }
    }

    pub fn with_softening(mut self, softening: f64) -> Self {
        self.softening = softening;
        self
    }

    /// Squared softening, the form the force kernel uses.
    #[inline]
    pub fn softening_sq(&self) -> f64 {
        self.softening * self.softening
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new(1.0, 0.5, 0.01)
    }
}
