use std::time::Instant;

use rayon::ThreadPool;
use tracing::debug;

use crate::config::Params;
use crate::error::SimError;
use crate::grid::Grid;
use crate::init::init_grid;
use crate::neighbors::{count_infected_neighbors, count_infected_neighbors_par};
use crate::render::render_grid;
use crate::state::CellState;
use crate::stats::{DayStats, History};
use crate::transition::{Rates, step_day};

/// Accumulated wall time per phase, in milliseconds.
#[derive(Clone, Debug, Default)]
pub struct PhaseTimes {
    pub neighbors: f64,
    pub transition: f64,
    pub stats: f64,
    pub frames: f64,
}

/// Day-sequential driver. Day `d + 1` only ever reads the complete day-`d` grid.
pub struct Simulation {
    params: Params,
    rates: Rates,
    pool: Option<ThreadPool>,
    grid: Grid<CellState>,
    day: usize,
    history: History,
    frames: Vec<Vec<u8>>,
    times: PhaseTimes,
}

impl Simulation {
    /// Validate everything and build the day-0 grid. Fails before any day runs.
    pub fn new(params: &Params) -> Result<Self, SimError> {
        params.validate()?;
        let rates = Rates::from_params(params)?;
        let pool = if params.workers > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(params.workers)
                    .build()?,
            )
        } else {
            None
        };
        let grid = init_grid(
            params.width,
            params.height,
            params.initial_infected_fraction,
            params.seed,
        )?;
        Ok(Self {
            params: params.clone(),
            rates,
            pool,
            grid,
            day: 0,
            history: History::with_capacity(params.days),
            frames: Vec::new(),
            times: PhaseTimes::default(),
        })
    }

    pub fn grid(&self) -> &Grid<CellState> {
        &self.grid
    }

    pub fn day(&self) -> usize {
        self.day
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_finished(&self) -> bool {
        self.day >= self.params.days
    }

    /// Advance one day and record its stats. Returns the recorded stats.
    pub fn step(&mut self) -> DayStats {
        let d = self.day;

        let t = Instant::now();
        let counts = match &self.pool {
            Some(pool) => count_infected_neighbors_par(&self.grid, pool),
            None => count_infected_neighbors(&self.grid),
        };
        self.times.neighbors += t.elapsed().as_secs_f64() * 1000.0;

        let t = Instant::now();
        let next = step_day(
            &self.grid,
            &counts,
            &self.rates,
            self.params.seed,
            d,
            self.pool.as_ref(),
        );
        self.times.transition += t.elapsed().as_secs_f64() * 1000.0;

        let t = Instant::now();
        let stats = DayStats::from_transition(&self.grid, &next);
        self.history.push(d, stats);
        self.times.stats += t.elapsed().as_secs_f64() * 1000.0;

        self.grid = next;
        self.day += 1;

        if self.params.collect_frames && d % self.params.frame_every == 0 {
            let t = Instant::now();
            self.frames.push(render_grid(&self.grid));
            self.times.frames += t.elapsed().as_secs_f64() * 1000.0;
        }

        debug!(
            day = d,
            s = stats.susceptible,
            i = stats.infected,
            r = stats.recovered,
            dead = stats.dead,
            new = stats.new_infections,
            "day complete"
        );
        stats
    }

    /// Run the remaining days. No early exit when the infection dies out.
    pub fn run(&mut self) {
        while !self.is_finished() {
            self.step();
        }
    }

    /// Consume the driver, returning history, final grid and captured frames.
    pub fn finish(self) -> (History, Grid<CellState>, Vec<Vec<u8>>, PhaseTimes) {
        (self.history, self.grid, self.frames, self.times)
    }
}
