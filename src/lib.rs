pub mod bench;
pub mod config;
pub mod error;
pub mod grid;
pub mod init;
pub mod neighbors;
pub mod render;
pub mod rng;
pub mod sim;
pub mod state;
pub mod stats;
pub mod transition;

use std::time::Instant;

use tracing::info;

use config::Params;
use error::SimError;
use grid::Grid;
use sim::Simulation;
use state::CellState;
use stats::History;

pub struct Outcome {
    pub history: History,
    pub final_grid: Grid<CellState>,
    /// RGBA8 frames, captured every `frame_every` days when enabled.
    pub frames: Vec<Vec<u8>>,
    /// Wall time of the day loop, excluding initialization.
    pub elapsed_secs: f64,
}

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Run a complete simulation. Parameters are validated before anything is built.
pub fn run(params: &Params) -> Result<(Outcome, Vec<Timing>), SimError> {
    let mut timings = Vec::new();
    let total_start = Instant::now();

    // 1. Validate, seed the initial infections, build the worker pool
    let t = Instant::now();
    let mut sim = Simulation::new(params)?;
    timings.push(Timing {
        name: "init",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Day loop
    let t = Instant::now();
    sim.run();
    let elapsed_secs = t.elapsed().as_secs_f64();

    let (history, final_grid, frames, phases) = sim.finish();
    for (name, ms) in [
        ("neighbors", phases.neighbors),
        ("transition", phases.transition),
        ("stats", phases.stats),
        ("frames", phases.frames),
    ] {
        timings.push(Timing { name, ms });
    }

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    timings.push(Timing {
        name: "TOTAL",
        ms: total_ms,
    });

    if let Some(last) = history.last() {
        info!(
            days = history.len(),
            workers = params.workers,
            infected = last.stats.infected,
            recovered = last.stats.recovered,
            dead = last.stats.dead,
            elapsed_secs,
            "simulation finished"
        );
    }

    let outcome = Outcome {
        history,
        final_grid,
        frames,
        elapsed_secs,
    };

    Ok((outcome, timings))
}
