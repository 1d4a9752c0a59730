use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use base64::Engine;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use epigrid::config::Params;
use epigrid::error::SimError;
use epigrid::render;
use epigrid::stats::History;

/// Largest grid a request may ask for.
const MAX_CELLS: usize = 4096 * 4096;
/// Longest run a request may ask for.
const MAX_DAYS: usize = 10_000;
/// Upper bound on buffered RGBA frame bytes before GIF encoding.
const MAX_FRAME_BYTES: usize = 512 * 1024 * 1024;

#[derive(Serialize)]
struct SimulateResponse {
    history: History,
    timings: Vec<TimingEntry>,
    elapsed_secs: f64,
    width: usize,
    height: usize,
    final_frame: String,
    animation: Option<String>,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

fn data_url(mime: &str, bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, b64)
}

fn simulate(params: Params) -> anyhow::Result<SimulateResponse> {
    let (outcome, timings) = epigrid::run(&params)?;
    let (w, h) = (params.width, params.height);

    let png = render::encode_png(&render::render_grid(&outcome.final_grid), w, h)?;
    let animation = if outcome.frames.is_empty() {
        None
    } else {
        Some(data_url("image/gif", &render::encode_gif(&outcome.frames, w, h, 10)?))
    };

    Ok(SimulateResponse {
        history: outcome.history,
        timings: timings
            .iter()
            .map(|t| TimingEntry {
                name: t.name.to_string(),
                ms: t.ms,
            })
            .collect(),
        elapsed_secs: outcome.elapsed_secs,
        width: w,
        height: h,
        final_frame: data_url("image/png", &png),
        animation,
    })
}

/// Reject requests that are valid runs but too large to serve.
fn check_limits(params: &Params) -> Result<(), SimError> {
    params.validate()?;
    if params.cells() > MAX_CELLS {
        return Err(SimError::invalid("height", format!("grid exceeds {MAX_CELLS} cells")));
    }
    if params.days > MAX_DAYS {
        return Err(SimError::invalid("days", format!("exceeds {MAX_DAYS}")));
    }
    let frame_bytes = params.frame_count().saturating_mul(params.cells().saturating_mul(4));
    if frame_bytes > MAX_FRAME_BYTES {
        return Err(SimError::invalid(
            "frame_every",
            format!(
                "{} frames of {}x{} exceed {} MiB",
                params.frame_count(),
                params.width,
                params.height,
                MAX_FRAME_BYTES >> 20
            ),
        ));
    }
    Ok(())
}

async fn simulate_handler(
    Json(params): Json<Params>,
) -> Result<Json<SimulateResponse>, (StatusCode, String)> {
    check_limits(&params).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let result = tokio::task::spawn_blocking(move || simulate(params))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match result {
        Ok(resp) => Ok(Json(resp)),
        Err(e) => {
            error!("simulation failed: {e:#}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/simulate", post(simulate_handler))
        .fallback_service(frontend)
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("epigrid server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
