use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use layers::{LayerStack, MapSurface};
use renderer::{RenderError, RenderOutcome, RendererConfig, RouteRenderingEngine, RouteSegment};
use routing::RoutingBackend;
use tools::{RouteReport, SimulatedBackend, Simulation, load_route};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render a route against a simulated routing backend")]
struct Args {
    /// Route file: JSON array of { lon, lat, ele, time_ms } points
    #[arg(long)]
    route: PathBuf,

    /// Renderer config (JSON); ROUTE_* environment variables apply on top
    #[arg(long)]
    config: Option<PathBuf>,

    /// Milliseconds until the simulated backend reports ready
    #[arg(long, default_value_t = 0)]
    init_delay_ms: u64,

    /// Number of route queries answered with "point not found"
    #[arg(long, default_value_t = 0)]
    point_not_found: usize,

    /// Enable download mode with this many alternative datasets
    #[arg(long)]
    alternatives: Option<usize>,

    /// Points interpolated into every simulated route
    #[arg(long, default_value_t = 3)]
    intermediate_points: usize,

    /// Map tile size handed to the layers
    #[arg(long, default_value_t = 256)]
    tile_size: u32,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(args: Args) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => RendererConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => RendererConfig::default(),
    }
    .with_env_overrides()
    .map_err(|e| e.to_string())?;

    let positions = load_route(&args.route).map_err(|e| e.to_string())?;
    let segments = RouteSegment::pairs(&positions);
    info!(
        "loaded {} positions from {:?}",
        positions.len(),
        args.route
    );

    let stack = Arc::new(LayerStack::new(args.tile_size));
    let backend = Arc::new(SimulatedBackend::new(Simulation {
        init_delay: Duration::from_millis(args.init_delay_ms),
        point_not_found: args.point_not_found,
        alternatives: args.alternatives,
        intermediate_points: args.intermediate_points,
    }));

    let engine = RouteRenderingEngine::new(
        Arc::clone(&stack) as Arc<dyn MapSurface>,
        Arc::clone(&backend) as Arc<dyn RoutingBackend>,
        config,
        |err: &RenderError| eprintln!("routing error: {err}"),
    )
    .map_err(|e| e.to_string())?;

    let (tx, rx) = mpsc::channel();
    engine.render(segments.clone(), move |outcome| {
        let _ = tx.send(outcome);
    });
    let outcome = rx
        .recv()
        .map_err(|_| "render worker stopped without an outcome".to_string())?;
    info!(
        "{outcome:?} after {} route queries",
        backend.route_queries()
    );

    let report = RouteReport::collect(&segments, &stack);
    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        print!("{}", report.to_text());
    }

    match outcome {
        RenderOutcome::Completed => Ok(()),
        RenderOutcome::Cancelled => Err("rendering was cancelled".to_string()),
        RenderOutcome::Failed => Err("rendering failed".to_string()),
    }
}
