use std::collections::HashSet;

use epigrid::config::Params;
use epigrid::grid::neighbors8_torus;
use epigrid::init::init_grid;
use epigrid::sim::Simulation;
use epigrid::state::CellState;

fn infected_cells(data: &[CellState], w: usize) -> HashSet<(usize, usize)> {
    data.iter()
        .enumerate()
        .filter(|(_, s)| **s == CellState::Infected)
        .map(|(i, _)| (i % w, i / w))
        .collect()
}

#[test]
fn certain_spread_from_five_seeds() {
    let params = Params {
        height: 10,
        width: 10,
        days: 1,
        beta: 1.0,
        gamma: 0.0,
        mu: 0.0,
        initial_infected_fraction: 0.05,
        seed: 1,
        ..Params::default()
    };

    let start = init_grid(10, 10, 0.05, 1).unwrap();
    let seeds = infected_cells(&start.data, 10);
    assert_eq!(seeds.len(), 5);

    let mut exposed = HashSet::new();
    for &(x, y) in &seeds {
        for n in neighbors8_torus(x, y, 10, 10) {
            if !seeds.contains(&n) {
                exposed.insert(n);
            }
        }
    }

    let mut sim = Simulation::new(&params).unwrap();
    assert_eq!(sim.grid(), &start);
    let stats = sim.step();

    let after = infected_cells(&sim.grid().data, 10);
    let expected: HashSet<_> = seeds.union(&exposed).copied().collect();
    assert_eq!(after, expected);
    assert_eq!(stats.infected, 5 + exposed.len());
    assert_eq!(stats.new_infections, exposed.len());
}

#[test]
fn immediate_resolution_when_gamma_is_one() {
    let params = Params {
        height: 40,
        width: 40,
        days: 8,
        beta: 0.0,
        gamma: 1.0,
        mu: 0.0,
        initial_infected_fraction: 0.1,
        seed: 3,
        ..Params::default()
    };
    let (outcome, _) = epigrid::run(&params).unwrap();
    assert_eq!(outcome.history.len(), 8);
    // Seeds recover on day 0; nobody is infectious afterwards.
    for r in outcome.history.iter() {
        assert_eq!(r.stats.infected, 0, "day {}", r.day);
    }
    assert_eq!(outcome.history.records()[0].stats.recovered, 160);
}

#[test]
fn infections_last_exactly_one_day_when_gamma_is_one() {
    let params = Params {
        height: 40,
        width: 40,
        days: 10,
        beta: 0.6,
        gamma: 1.0,
        mu: 0.0,
        initial_infected_fraction: 0.02,
        seed: 5,
        ..Params::default()
    };
    let mut sim = Simulation::new(&params).unwrap();
    while !sim.is_finished() {
        let prev = sim.grid().clone();
        let stats = sim.step();
        for (a, b) in prev.data.iter().zip(&sim.grid().data) {
            if *a == CellState::Infected {
                assert_eq!(*b, CellState::Recovered);
            }
        }
        // Everyone infected now was susceptible yesterday.
        assert_eq!(stats.infected, stats.new_infections);
    }
}

#[test]
fn zero_beta_never_spreads() {
    let params = Params {
        height: 30,
        width: 30,
        days: 25,
        beta: 0.0,
        gamma: 0.1,
        mu: 0.05,
        initial_infected_fraction: 0.2,
        seed: 8,
        ..Params::default()
    };
    let (outcome, _) = epigrid::run(&params).unwrap();
    let mut prev_infected = 180;
    for r in outcome.history.iter() {
        assert_eq!(r.stats.new_infections, 0);
        assert!(r.stats.infected <= prev_infected);
        prev_infected = r.stats.infected;
    }
}

#[test]
fn repeated_runs_are_identical() {
    let params = Params {
        height: 50,
        width: 40,
        days: 30,
        beta: 0.3,
        gamma: 0.05,
        mu: 0.02,
        initial_infected_fraction: 0.01,
        seed: 42,
        collect_frames: true,
        frame_every: 5,
        ..Params::default()
    };
    let (a, _) = epigrid::run(&params).unwrap();
    let (b, _) = epigrid::run(&params).unwrap();
    assert_eq!(a.history, b.history);
    assert_eq!(a.final_grid, b.final_grid);
    assert_eq!(a.frames, b.frames);
}

#[test]
fn worker_count_does_not_change_results() {
    let base = Params {
        height: 45,
        width: 33,
        days: 20,
        beta: 0.35,
        gamma: 0.08,
        mu: 0.03,
        initial_infected_fraction: 0.01,
        seed: 2024,
        ..Params::default()
    };
    let (seq, _) = epigrid::run(&base).unwrap();
    for workers in [2, 3, 4, 8, 45, 64] {
        let (par, _) = epigrid::run(&Params { workers, ..base.clone() }).unwrap();
        assert_eq!(par.history, seq.history, "workers={workers}");
        assert_eq!(par.final_grid, seq.final_grid, "workers={workers}");
    }
}

#[test]
fn invalid_parameters_abort_run() {
    for params in [
        Params { height: 0, ..Params::default() },
        Params { days: 0, ..Params::default() },
        Params { mu: 1.5, ..Params::default() },
        Params { gamma: 0.6, mu: 0.6, ..Params::default() },
        Params { initial_infected_fraction: -0.5, ..Params::default() },
    ] {
        assert!(epigrid::run(&params).is_err(), "{params:?}");
    }
}
