use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::state::CellState;

/// Population counts after one day plus that day's new infections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStats {
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
    pub dead: usize,
    pub new_infections: usize,
}

impl DayStats {
    /// Derive stats for the transition `prev -> next`.
    pub fn from_transition(prev: &Grid<CellState>, next: &Grid<CellState>) -> Self {
        debug_assert_eq!(prev.data.len(), next.data.len());
        let mut s = Self::default();
        for (&a, &b) in prev.data.iter().zip(&next.data) {
            match b {
                CellState::Susceptible => s.susceptible += 1,
                CellState::Infected => {
                    s.infected += 1;
                    if a == CellState::Susceptible {
                        s.new_infections += 1;
                    }
                }
                CellState::Recovered => s.recovered += 1,
                CellState::Dead => s.dead += 1,
            }
        }
        s
    }

    pub fn total(&self) -> usize {
        self.susceptible + self.infected + self.recovered + self.dead
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: usize,
    pub stats: DayStats,
}

/// Append-only per-day history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<DayRecord>,
}

impl History {
    pub fn with_capacity(days: usize) -> Self {
        Self {
            records: Vec::with_capacity(days),
        }
    }

    pub fn push(&mut self, day: usize, stats: DayStats) {
        debug_assert!(self.records.last().is_none_or(|r| r.day < day));
        self.records.push(DayRecord { day, stats });
    }

    pub fn records(&self) -> &[DayRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&DayRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayRecord> {
        self.records.iter()
    }
}
