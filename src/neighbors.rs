use rayon::prelude::*;
use rayon::ThreadPool;

use crate::grid::{Grid, MOORE, wrap};
use crate::state::CellState;

/// Rows per contiguous block when `h` rows are split across `workers`.
#[inline]
pub fn block_rows(h: usize, workers: usize) -> usize {
    h.div_ceil(workers.max(1)).max(1)
}

/// Fill `out` (rows `first_row..` of the count grid) from the full snapshot.
fn count_rows(grid: &Grid<CellState>, first_row: usize, out: &mut [u8]) {
    let w = grid.w;
    let h = grid.h;
    for (r, row) in out.chunks_mut(w).enumerate() {
        let y = first_row + r;
        for (x, slot) in row.iter_mut().enumerate() {
            let mut k = 0u8;
            for (dx, dy) in MOORE {
                let nx = wrap(x, dx, w);
                let ny = wrap(y, dy, h);
                if grid.data[ny * w + nx] == CellState::Infected {
                    k += 1;
                }
            }
            *slot = k;
        }
    }
}

/// Number of Infected cells in each cell's toroidal Moore neighborhood.
/// Aliased offsets on narrow grids count with multiplicity.
pub fn count_infected_neighbors(grid: &Grid<CellState>) -> Grid<u8> {
    let mut counts = Grid::new(grid.w, grid.h);
    count_rows(grid, 0, &mut counts.data);
    counts
}

/// Same as [`count_infected_neighbors`], one contiguous row block per pool thread.
pub fn count_infected_neighbors_par(grid: &Grid<CellState>, pool: &ThreadPool) -> Grid<u8> {
    let w = grid.w;
    let rows = block_rows(grid.h, pool.current_num_threads());
    let mut counts = Grid::new(w, grid.h);
    pool.install(|| {
        counts
            .data
            .par_chunks_mut(rows * w)
            .enumerate()
            .for_each(|(b, block)| count_rows(grid, b * rows, block));
    });
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_infected(w: usize, h: usize, cells: &[(usize, usize)]) -> Grid<CellState> {
        let mut g = Grid::new(w, h);
        for &(x, y) in cells {
            g.set(x, y, CellState::Infected);
        }
        g
    }

    #[test]
    fn single_infected_in_corner_wraps() {
        let g = with_infected(5, 4, &[(0, 0)]);
        let c = count_infected_neighbors(&g);
        assert_eq!(c.get(0, 0), 0);
        for (x, y) in [(4, 3), (0, 3), (1, 3), (4, 0), (1, 0), (4, 1), (0, 1), (1, 1)] {
            assert_eq!(c.get(x, y), 1, "cell ({x},{y})");
        }
        assert_eq!(c.data.iter().map(|&k| k as usize).sum::<usize>(), 8);
    }

    #[test]
    fn fully_infected_grid_counts_eight() {
        let mut g: Grid<CellState> = Grid::new(6, 6);
        g.data.fill(CellState::Infected);
        let c = count_infected_neighbors(&g);
        assert!(c.data.iter().all(|&k| k == 8));
    }

    #[test]
    fn only_infected_state_counts() {
        let mut g = with_infected(5, 5, &[(2, 1)]);
        g.set(1, 1, CellState::Recovered);
        g.set(3, 3, CellState::Dead);
        let c = count_infected_neighbors(&g);
        assert_eq!(c.get(2, 2), 1);
        assert_eq!(c.get(2, 3), 0);
    }

    #[test]
    fn single_row_counts_self_twice() {
        // Vertical offsets alias onto the row itself.
        let g = with_infected(5, 1, &[(2, 0)]);
        let c = count_infected_neighbors(&g);
        assert_eq!(c.get(2, 0), 2);
        assert_eq!(c.get(1, 0), 3);
        assert_eq!(c.get(0, 0), 0);
    }

    #[test]
    fn parallel_matches_sequential() {
        let g = crate::init::init_grid(37, 23, 0.2, 9).unwrap();
        let seq = count_infected_neighbors(&g);
        for workers in [1, 2, 3, 5, 8, 30] {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build().unwrap();
            assert_eq!(count_infected_neighbors_par(&g, &pool), seq, "workers={workers}");
        }
    }

    #[test]
    fn block_rows_covers_grid() {
        assert_eq!(block_rows(10, 3), 4);
        assert_eq!(block_rows(10, 1), 10);
        assert_eq!(block_rows(2, 8), 1);
    }
}
