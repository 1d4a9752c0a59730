use crate::error::SimError;
use crate::grid::Grid;
use crate::rng::{Rng, SALT_INIT};
use crate::state::CellState;

/// Number of initially infected cells: `max(1, round(h*w*f))`, at most `h*w`.
pub fn initial_infected_count(w: usize, h: usize, fraction: f64) -> usize {
    let total = w * h;
    let n = (total as f64 * fraction).round() as usize;
    n.max(1).min(total)
}

/// All cells Susceptible except `initial_infected_count` distinct cells
/// chosen uniformly without replacement (partial Fisher-Yates).
pub fn init_grid(w: usize, h: usize, fraction: f64, seed: u64) -> Result<Grid<CellState>, SimError> {
    if w == 0 {
        return Err(SimError::invalid("width", "must be positive"));
    }
    if h == 0 {
        return Err(SimError::invalid("height", "must be positive"));
    }
    if !(0.0..=1.0).contains(&fraction) {
        return Err(SimError::invalid(
            "initial_infected_fraction",
            format!("{fraction} is not in [0, 1]"),
        ));
    }

    let total = w
        .checked_mul(h)
        .ok_or_else(|| SimError::invalid("width", "height * width overflows"))?;
    let n = initial_infected_count(w, h, fraction);
    let mut rng = Rng::new(seed ^ SALT_INIT);
    let mut indices: Vec<usize> = (0..total).collect();
    for i in 0..n {
        let j = i + rng.range_usize(total - i);
        indices.swap(i, j);
    }

    let mut grid = Grid::new(w, h);
    for &i in &indices[..n] {
        grid.data[i] = CellState::Infected;
    }
    Ok(grid)
}
