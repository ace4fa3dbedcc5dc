//! Trajectory export for offline playback.
//!
//! An export directory holds `ParticleProperties.json` (size and color per body, written once)
//! and `Trajectories.csv` (one row of positions per completed step).

use crate::{body::Body, simulation::Simulation};

use anyhow::{Context, Result, ensure};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

pub const PROPERTIES_FILE: &str = "ParticleProperties.json";
pub const TRAJECTORIES_FILE: &str = "Trajectories.csv";

/// Streams body positions as CSV: `P0_X,P0_Y,P1_X,P1_Y,...`, one row per step.
pub struct TrajectoryWriter<W: Write> {
    out: W,
    bodies: usize,
    rows: usize,
}

impl<W: Write> TrajectoryWriter<W> {
    /// Writes the header for `bodies` bodies.
    pub fn new(mut out: W, bodies: usize) -> Result<Self> {
        let header = (0..bodies)
            .map(|i| format!("P{i}_X,P{i}_Y"))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(out, "{header}")?;
        Ok(Self {
            out,
            bodies,
            rows: 0,
        })
    }

    pub fn write_row(&mut self, bodies: &[Body]) -> Result<()> {
        ensure!(
            bodies.len() == self.bodies,
            "expected {} bodies, got {}",
            self.bodies,
            bodies.len()
        );
        for (i, body) in bodies.iter().enumerate() {
            if i > 0 {
                write!(self.out, ",")?;
            }
            write!(self.out, "{},{}", body.pos.x, body.pos.y)?;
        }
        writeln!(self.out)?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Properties {
    size: u32,
    color: u32,
}

/// Writes the static per-body properties as a JSON object keyed by body index.
pub fn write_properties(out: impl Write, bodies: &[Body]) -> Result<()> {
    let properties: BTreeMap<usize, Properties> = bodies
        .iter()
        .enumerate()
        .map(|(i, body)| {
            let properties = Properties {
                size: body.size,
                color: body.color.rgb(),
            };
            (i, properties)
        })
        .collect();
    serde_json::to_writer_pretty(out, &properties)?;
    Ok(())
}

/// Runs `steps` steps of `simulation` and writes the property and trajectory files into `dir`.
pub fn export_simulation(simulation: &mut Simulation, dir: &Path, steps: usize) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let properties_path = dir.join(PROPERTIES_FILE);
    log::info!("exporting body properties to {}", properties_path.display());
    let file = File::create(&properties_path)
        .with_context(|| format!("failed to create {}", properties_path.display()))?;
    let mut out = BufWriter::new(file);
    write_properties(&mut out, simulation.bodies())?;
    out.flush()?;

    let trajectories_path = dir.join(TRAJECTORIES_FILE);
    let file = File::create(&trajectories_path)
        .with_context(|| format!("failed to create {}", trajectories_path.display()))?;
    let mut writer = TrajectoryWriter::new(BufWriter::new(file), simulation.bodies().len())?;

    let report_every = (steps / 10).max(1);
    simulation.step_with(steps, |sim| {
        writer.write_row(sim.bodies())?;
        if sim.frame() % report_every == 0 {
            log::info!("exported step {}/{}", writer.rows(), steps);
        }
        Ok::<_, anyhow::Error>(())
    })?;

    writer
        .finish()
        .with_context(|| format!("failed to write {}", trajectories_path.display()))?;
    log::info!("wrote {} steps to {}", steps, trajectories_path.display());
    Ok(())
}
