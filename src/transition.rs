use rayon::prelude::*;
use rayon::ThreadPool;

use crate::config::Params;
use crate::error::SimError;
use crate::grid::Grid;
use crate::neighbors::block_rows;
use crate::rng::{Rng, row_stream};
use crate::state::CellState;

/// Validated transition probabilities.
///
/// `infection[k]` is `1 - (1 - beta)^k`, the chance that at least one of `k`
/// independent exposures infects a susceptible cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Rates {
    pub beta: f64,
    pub gamma: f64,
    pub mu: f64,
    infection: [f64; 9],
}

impl Rates {
    pub fn new(beta: f64, gamma: f64, mu: f64) -> Result<Self, SimError> {
        for (name, p) in [("beta", beta), ("gamma", gamma), ("mu", mu)] {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(SimError::invalid(name, format!("{p} is not in [0, 1]")));
            }
        }
        if gamma + mu > 1.0 {
            return Err(SimError::invalid("mu", format!("gamma + mu = {} exceeds 1", gamma + mu)));
        }
        let mut infection = [0.0; 9];
        for (k, p) in infection.iter_mut().enumerate() {
            *p = 1.0 - (1.0 - beta).powi(k as i32);
        }
        Ok(Self {
            beta,
            gamma,
            mu,
            infection,
        })
    }

    pub fn from_params(params: &Params) -> Result<Self, SimError> {
        Self::new(params.beta, params.gamma, params.mu)
    }

    #[inline]
    pub fn infection_probability(&self, k: u8) -> f64 {
        self.infection[k.min(8) as usize]
    }

    /// Next state of one cell given its infected-neighbor count and its draw.
    ///
    /// An infected cell's draw is split into `[0, gamma)` recover,
    /// `[gamma, gamma + mu)` die, and stay infected otherwise. Recovery wins
    /// the tie and the two outcomes are mutually exclusive.
    #[inline]
    pub fn next_state(&self, state: CellState, k: u8, r: f64) -> CellState {
        match state {
            CellState::Susceptible => {
                if r < self.infection_probability(k) {
                    CellState::Infected
                } else {
                    CellState::Susceptible
                }
            }
            CellState::Infected => {
                if r < self.gamma {
                    CellState::Recovered
                } else if r < self.gamma + self.mu {
                    CellState::Dead
                } else {
                    CellState::Infected
                }
            }
            CellState::Recovered | CellState::Dead => state,
        }
    }
}

/// Fill `out` (rows `first_row..` of the next grid). Every cell takes exactly
/// one draw from its row's stream, whatever its state.
fn step_rows(
    prev: &Grid<CellState>,
    counts: &Grid<u8>,
    rates: &Rates,
    seed: u64,
    day: usize,
    first_row: usize,
    out: &mut [CellState],
) {
    let w = prev.w;
    for (r, row) in out.chunks_mut(w).enumerate() {
        let y = first_row + r;
        let mut rng = Rng::new(row_stream(seed, day, y));
        let states = prev.row(y);
        let ks = counts.row(y);
        for x in 0..w {
            let draw = rng.next_f64();
            row[x] = rates.next_state(states[x], ks[x], draw);
        }
    }
}

/// Synchronous update: a fresh grid for day `day + 1` computed only from the
/// day-`day` snapshot. With a pool, rows are split into one contiguous block
/// per thread; the result is identical to the sequential path.
pub fn step_day(
    prev: &Grid<CellState>,
    counts: &Grid<u8>,
    rates: &Rates,
    seed: u64,
    day: usize,
    pool: Option<&ThreadPool>,
) -> Grid<CellState> {
    debug_assert_eq!((prev.w, prev.h), (counts.w, counts.h));
    let w = prev.w;
    let mut next = Grid::new(w, prev.h);
    match pool {
        None => step_rows(prev, counts, rates, seed, day, 0, &mut next.data),
        Some(pool) => {
            let rows = block_rows(prev.h, pool.current_num_threads());
            pool.install(|| {
                next.data
                    .par_chunks_mut(rows * w)
                    .enumerate()
                    .for_each(|(b, block)| {
                        step_rows(prev, counts, rates, seed, day, b * rows, block)
                    });
            });
        }
    }
    next
}
