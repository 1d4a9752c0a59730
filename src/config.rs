use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// All tunable parameters of a run. Partial JSON overlays the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // Grid
    pub height: usize,
    pub width: usize,
    pub days: usize,

    // Disease
    pub beta: f64,
    pub gamma: f64,
    pub mu: f64,
    pub initial_infected_fraction: f64,
    pub seed: u64,

    // Execution
    pub workers: usize,

    // Frames
    pub collect_frames: bool,
    pub frame_every: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            height: 1000,
            width: 1000,
            days: 365,
            beta: 0.25,
            gamma: 0.05,
            mu: 0.01,
            initial_infected_fraction: 1e-4,
            seed: 12345,
            workers: 1,
            collect_frames: false,
            frame_every: 1,
        }
    }
}

fn check_probability(name: &'static str, p: f64) -> Result<(), SimError> {
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(SimError::invalid(name, format!("{p} is not in [0, 1]")));
    }
    Ok(())
}

fn check_positive(name: &'static str, n: usize) -> Result<(), SimError> {
    if n == 0 {
        return Err(SimError::invalid(name, "must be positive"));
    }
    Ok(())
}

impl Params {
    /// Reject the whole run up front; nothing is simulated on error.
    pub fn validate(&self) -> Result<(), SimError> {
        check_positive("height", self.height)?;
        check_positive("width", self.width)?;
        if self.height.checked_mul(self.width).is_none() {
            return Err(SimError::invalid("width", "height * width overflows"));
        }
        check_positive("days", self.days)?;
        check_positive("workers", self.workers)?;
        check_positive("frame_every", self.frame_every)?;
        check_probability("beta", self.beta)?;
        check_probability("gamma", self.gamma)?;
        check_probability("mu", self.mu)?;
        check_probability("initial_infected_fraction", self.initial_infected_fraction)?;
        if self.gamma + self.mu > 1.0 {
            return Err(SimError::invalid(
                "mu",
                format!("gamma + mu = {} exceeds 1", self.gamma + self.mu),
            ));
        }
        Ok(())
    }

    pub fn cells(&self) -> usize {
        self.height.saturating_mul(self.width)
    }

    /// Frames a run will capture: one after each day `d` with `d % frame_every == 0`.
    pub fn frame_count(&self) -> usize {
        if !self.collect_frames || self.frame_every == 0 {
            return 0;
        }
        self.days.div_ceil(self.frame_every)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Params::default().validate().unwrap();
    }

    #[test]
    fn rejects_bad_parameters() {
        let cases: Vec<(&str, Params)> = vec![
            ("height", Params { height: 0, ..Params::default() }),
            ("width", Params { width: 0, ..Params::default() }),
            ("days", Params { days: 0, ..Params::default() }),
            ("workers", Params { workers: 0, ..Params::default() }),
            ("width", Params { height: 1 << 33, width: 1 << 31, ..Params::default() }),
            ("width", Params { height: usize::MAX, width: 2, ..Params::default() }),
            ("beta", Params { beta: 1.5, ..Params::default() }),
            ("beta", Params { beta: f64::NAN, ..Params::default() }),
            ("gamma", Params { gamma: -0.1, ..Params::default() }),
            ("mu", Params { gamma: 0.7, mu: 0.4, ..Params::default() }),
            (
                "initial_infected_fraction",
                Params { initial_infected_fraction: 1.01, ..Params::default() },
            ),
        ];
        for (expected, params) in cases {
            match params.validate() {
                Err(SimError::InvalidParameter { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected InvalidParameter({expected}), got {other:?}"),
            }
        }
    }

    #[test]
    fn gamma_plus_mu_may_equal_one() {
        let p = Params { gamma: 0.5, mu: 0.5, ..Params::default() };
        p.validate().unwrap();
    }

    #[test]
    fn cells_saturates_instead_of_wrapping() {
        let p = Params { height: usize::MAX, width: 3, ..Params::default() };
        assert_eq!(p.cells(), usize::MAX);
    }

    #[test]
    fn frame_count_follows_cadence() {
        let p = Params { days: 10, frame_every: 3, collect_frames: true, ..Params::default() };
        assert_eq!(p.frame_count(), 4);
        assert_eq!(Params { frame_every: 1, ..p.clone() }.frame_count(), 10);
        assert_eq!(Params { collect_frames: false, ..p }.frame_count(), 0);
    }

    #[test]
    fn partial_json_overlays_defaults() {
        let p: Params = serde_json::from_str(r#"{"height": 10, "beta": 0.5}"#).unwrap();
        assert_eq!(p.height, 10);
        assert_eq!(p.beta, 0.5);
        assert_eq!(p.width, Params::default().width);
        assert_eq!(p.seed, 12345);
    }
}
