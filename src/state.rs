use serde::{Deserialize, Serialize};

/// Disease state of a single cell. Recovered and Dead are absorbing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellState {
    #[default]
    Susceptible = 0,
    Infected = 1,
    Recovered = 2,
    Dead = 3,
}

impl CellState {
    #[inline]
    pub fn is_absorbing(self) -> bool {
        matches!(self, CellState::Recovered | CellState::Dead)
    }
}
