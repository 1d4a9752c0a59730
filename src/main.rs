use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use epigrid::config::Params;
use epigrid::{bench, render};

/// Stochastic SIR cellular automaton on a toroidal grid
#[derive(Parser, Debug)]
#[command(name = "epigrid", version, long_about = None)]
struct Cli {
    /// Debug logging (per-day stats)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one simulation
    Run(RunArgs),
    /// Strong-scaling benchmark over several worker counts
    Bench(BenchArgs),
}

/// Overrides applied on top of the defaults (or a `--config` file).
#[derive(Args, Debug, Default)]
struct ParamArgs {
    #[arg(long)]
    height: Option<usize>,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    days: Option<usize>,
    #[arg(long)]
    beta: Option<f64>,
    #[arg(long)]
    gamma: Option<f64>,
    #[arg(long)]
    mu: Option<f64>,
    /// Initial infected fraction in [0, 1]
    #[arg(long)]
    fraction: Option<f64>,
    #[arg(short, long)]
    seed: Option<u64>,
}

impl ParamArgs {
    fn apply(&self, p: &mut Params) {
        p.height = self.height.unwrap_or(p.height);
        p.width = self.width.unwrap_or(p.width);
        p.days = self.days.unwrap_or(p.days);
        p.beta = self.beta.unwrap_or(p.beta);
        p.gamma = self.gamma.unwrap_or(p.gamma);
        p.mu = self.mu.unwrap_or(p.mu);
        p.initial_infected_fraction = self.fraction.unwrap_or(p.initial_infected_fraction);
        p.seed = self.seed.unwrap_or(p.seed);
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// JSON file with (partial) parameters
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    params: ParamArgs,

    #[arg(short, long)]
    workers: Option<usize>,

    /// Capture a frame every N days
    #[arg(long)]
    frame_every: Option<usize>,

    /// Write captured frames as an animated GIF
    #[arg(long)]
    gif: Option<PathBuf>,

    #[arg(long, default_value = "10")]
    fps: u32,

    /// Write the per-day history as JSON
    #[arg(long)]
    history: Option<PathBuf>,

    /// Write the final grid as PNG
    #[arg(long)]
    final_png: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BenchArgs {
    #[arg(long, default_value = "300")]
    height: usize,
    #[arg(long, default_value = "300")]
    width: usize,
    #[arg(long, default_value = "60")]
    days: usize,
    #[arg(long, value_delimiter = ',', default_value = "1,2,4,8")]
    workers: Vec<usize>,
    #[arg(short, long, default_value = "12345")]
    seed: u64,
    #[arg(short, long, default_value = "data/scaling_results.csv")]
    out: PathBuf,
}

fn load_params(args: &RunArgs) -> Result<Params> {
    let mut params = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Params::default(),
    };
    args.params.apply(&mut params);
    if let Some(w) = args.workers {
        params.workers = w;
    }
    if let Some(n) = args.frame_every {
        params.frame_every = n;
    }
    if args.gif.is_some() {
        params.collect_frames = true;
    }
    Ok(params)
}

fn run_cmd(args: RunArgs) -> Result<()> {
    let params = load_params(&args)?;
    info!(
        "Simulating {}x{} grid for {} days (beta={}, gamma={}, mu={}, seed={}, workers={})",
        params.width, params.height, params.days, params.beta, params.gamma, params.mu,
        params.seed, params.workers
    );

    let (outcome, timings) = epigrid::run(&params)?;

    info!("Timings:");
    for t in &timings {
        info!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    if let Some(path) = &args.history {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &outcome.history)?;
        info!("Saved {}", path.display());
    }

    if let Some(path) = &args.gif {
        render::save_gif(path, &outcome.frames, params.width, params.height, args.fps)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Saved {} ({} frames)", path.display(), outcome.frames.len());
    }

    if let Some(path) = &args.final_png {
        let rgba = render::render_grid(&outcome.final_grid);
        render::save_png(path, &rgba, params.width, params.height)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Saved {}", path.display());
    }

    Ok(())
}

fn bench_cmd(args: BenchArgs) -> Result<()> {
    let params = Params {
        height: args.height,
        width: args.width,
        days: args.days,
        seed: args.seed,
        ..Params::default()
    };
    info!("Strong scaling on {}x{} for {} days", args.width, args.height, args.days);

    let rows = bench::scaling(&params, &args.workers)?;
    for r in &rows {
        info!(
            "Workers: {} | Time: {:.4} s | Speed-up: {:.2}",
            r.worker_count, r.elapsed_seconds, r.speedup
        );
    }

    if let Some(dir) = args.out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = File::create(&args.out).with_context(|| format!("creating {}", args.out.display()))?;
    bench::write_csv(BufWriter::new(file), &rows)?;
    info!("Saved {}", args.out.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Run(args) => run_cmd(args),
        Command::Bench(args) => bench_cmd(args),
    }
}
