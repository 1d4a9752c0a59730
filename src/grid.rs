/// Row-major flat grid. No per-cell objects.
/// Topology is toroidal: both axes wrap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub w: usize,
    pub h: usize,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            data: vec![T::default(); w * h],
            w,
            h,
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.w && y < self.h);
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: T) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        &self.data[y * self.w..(y + 1) * self.w]
    }
}

/// Offsets of the Moore neighborhood (N, S, E, W and the four diagonals).
pub const MOORE: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Wrap a coordinate onto `0..n`: `(i + d + n) mod n`.
#[inline]
pub fn wrap(i: usize, d: i32, n: usize) -> usize {
    ((i as i64 + d as i64).rem_euclid(n as i64)) as usize
}

/// Wrap both coordinates (torus).
#[inline]
pub fn wrap_xy(x: usize, y: usize, dx: i32, dy: i32, w: usize, h: usize) -> (usize, usize) {
    (wrap(x, dx, w), wrap(y, dy, h))
}

/// 8-connected neighbors with wrapping on both axes.
/// On grids narrower than 3 cells some offsets alias the same cell (or the cell itself).
pub fn neighbors8_torus(x: usize, y: usize, w: usize, h: usize) -> impl Iterator<Item = (usize, usize)> {
    MOORE
        .into_iter()
        .map(move |(dx, dy)| wrap_xy(x, y, dx, dy, w, h))
}
