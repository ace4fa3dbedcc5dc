use bhsim2d::{Simulation, SimulationConfig, export};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

#[derive(Parser, Debug)]
#[command(version, about = "Barnes-Hut gravity simulation in two dimensions")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Worker threads for force evaluation, overriding the scenario
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario and report energy and momentum drift
    Run {
        config: PathBuf,
        #[arg(short, long, default_value_t = 1000)]
        steps: usize,
        /// Log diagnostics every this many steps
        #[arg(long, default_value_t = 100)]
        report_every: usize,
    },
    /// Run a scenario and write its trajectories for playback
    Export {
        config: PathBuf,
        out_dir: PathBuf,
        #[arg(short, long, default_value_t = 1000)]
        steps: usize,
    },
}

fn load(config: &Path, threads: Option<usize>) -> Result<Simulation> {
    let mut config = SimulationConfig::from_path(config)?;
    if let Some(threads) = threads {
        config.threads = Some(threads);
        config.validate()?;
    }
    config.into_simulation()
}

fn per_step(elapsed: Duration, steps: usize) -> Duration {
    elapsed.div_f64(steps.max(1) as f64)
}

fn energy(sim: &Simulation) -> f64 {
    sim.kinetic_energy() + sim.potential_energy()
}

fn run(mut sim: Simulation, steps: usize, report_every: usize) {
    let report_every = report_every.max(1);
    let e0 = energy(&sim);
    let p0 = sim.momentum();
    log::info!(
        "running {} steps with {} bodies on {} threads, E0 = {:.6e}",
        steps,
        sim.bodies().len(),
        sim.threads(),
        e0
    );

    let start = Instant::now();
    for _ in 0..steps {
        sim.step();
        if sim.frame() % report_every == 0 {
            let e = energy(&sim);
            log::info!(
                "step {}: E = {:.6e} (drift {:.3e}), |dp| = {:.3e}, escaped = {}, nodes = {}",
                sim.frame(),
                e,
                (e - e0) / e0.abs().max(f64::MIN_POSITIVE),
                (sim.momentum() - p0).mag(),
                sim.escaped(),
                sim.tree().nodes().len()
            );
        }
    }

    let elapsed = start.elapsed();
    log::info!(
        "finished {} steps in {:.2?} ({:.2?} per step)",
        steps,
        elapsed,
        per_step(elapsed, steps)
    );
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match args.command {
        Command::Run {
            config,
            steps,
            report_every,
        } => {
            let sim = load(&config, args.threads)?;
            run(sim, steps, report_every);
        }
        Command::Export {
            config,
            out_dir,
            steps,
        } => {
            let mut sim = load(&config, args.threads)?;
            export::export_simulation(&mut sim, &out_dir, steps)?;
        }
    }

    Ok(())
}
