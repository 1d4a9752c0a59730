use std::io::Write;

use serde::Serialize;
use tracing::info;

use crate::config::Params;
use crate::error::SimError;
use crate::run;

/// One strong-scaling measurement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScalingRow {
    pub worker_count: usize,
    pub elapsed_seconds: f64,
    pub speedup: f64,
}

#[inline]
pub fn speedup(t_seq: f64, t_par: f64) -> f64 {
    if t_par > 0.0 { t_seq / t_par } else { 0.0 }
}

/// Time the same problem under each worker count against a one-worker baseline.
/// Every run must reproduce the baseline history and final grid exactly.
pub fn scaling(params: &Params, worker_counts: &[usize]) -> Result<Vec<ScalingRow>, SimError> {
    let baseline_params = Params {
        workers: 1,
        collect_frames: false,
        ..params.clone()
    };
    let (baseline, _) = run(&baseline_params)?;
    let t_seq = baseline.elapsed_secs;
    info!(t_seq, "sequential baseline");

    let mut rows = Vec::with_capacity(worker_counts.len());
    for &workers in worker_counts {
        let (outcome, _) = run(&Params {
            workers,
            ..baseline_params.clone()
        })?;
        if outcome.history != baseline.history || outcome.final_grid != baseline.final_grid {
            return Err(SimError::Nondeterministic { workers });
        }
        let row = ScalingRow {
            worker_count: workers,
            elapsed_seconds: outcome.elapsed_secs,
            speedup: speedup(t_seq, outcome.elapsed_secs),
        };
        info!(
            workers,
            elapsed = row.elapsed_seconds,
            speedup = row.speedup,
            "scaling run"
        );
        rows.push(row);
    }
    Ok(rows)
}

pub fn write_csv<W: Write>(mut out: W, rows: &[ScalingRow]) -> std::io::Result<()> {
    writeln!(out, "worker_count,elapsed_seconds,speedup")?;
    for r in rows {
        writeln!(out, "{},{},{}", r.worker_count, r.elapsed_seconds, r.speedup)?;
    }
    Ok(())
}
