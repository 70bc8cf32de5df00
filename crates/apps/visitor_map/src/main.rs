use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use foundation::{GeoBounds, LonLat, RecordId};
use records::sample::sample_records;
use records::{CustomerType, FilterCriteria, Record};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use view::{CameraState, MapEvent, StaticMapView};
use visitor_map::{MapConfig, VisitorMap};

#[derive(Debug, Parser)]
#[command(name = "visitor-map", about = "Filter, cluster and inspect visitor records")]
struct Cli {
    /// JSON config file (defaults to $VISITOR_MAP_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the display items for a filter and viewport as JSON.
    Clusters(ClustersArgs),
    /// Print the filter dropdown choices.
    Choices(SourceArgs),
    /// Print the popup summary of one record.
    Show {
        id: u64,
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Records JSON file; the bundled sample set when omitted.
    #[arg(long)]
    records: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ClustersArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, default_value = "")]
    country: String,
    #[arg(long, default_value = "")]
    device: String,
    #[arg(long, default_value = "any")]
    customer: CustomerType,
    #[arg(long, default_value = "")]
    country_code: String,
    #[arg(long)]
    zoom: Option<f64>,
    /// Viewport as W,S,E,N.
    #[arg(long, value_parser = parse_bounds, allow_hyphen_values = true)]
    bounds: Option<GeoBounds>,
}

fn parse_bounds(s: &str) -> Result<GeoBounds, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("bounds: {e}"))?;
    match parts.as_slice() {
        [w, s, e, n] => Ok(GeoBounds::new(*w, *s, *e, *n)),
        _ => Err(format!("bounds needs 4 values (W,S,E,N), got {}", parts.len())),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let cli = Cli::parse();
    let config = MapConfig::load(cli.config.as_deref()).map_err(|e| e.to_string())?;

    match cli.command {
        Command::Clusters(args) => cmd_clusters(&config, args),
        Command::Choices(source) => {
            let app = VisitorMap::new(StaticMapView::new(), load(&source)?, &config);
            print_json(app.choices())
        }
        Command::Show { id, source } => cmd_show(&config, RecordId(id), &source),
    }
}

fn load(source: &SourceArgs) -> Result<Vec<Record>, String> {
    let loaded = match &source.records {
        Some(path) => records::load_records_from_path(path),
        None => sample_records(),
    };
    loaded.map_err(|e| e.to_string())
}

fn cmd_clusters(config: &MapConfig, args: ClustersArgs) -> Result<(), String> {
    let mut view = StaticMapView::new();
    if args.zoom.is_some() || args.bounds.is_some() {
        let home = config.selection.default_camera;
        let center = args
            .bounds
            .map(|b| LonLat::new((b.west + b.east) / 2.0, (b.south + b.north) / 2.0))
            .unwrap_or(home.center);
        let camera = CameraState::new(center, args.zoom.unwrap_or(home.zoom));
        view.set_viewport(camera, args.bounds);
    }

    let mut app = VisitorMap::new(view, load(&args.source)?, config);
    app.handle_event(MapEvent::FilterChanged(FilterCriteria {
        search_text: args.search,
        country: args.country,
        device: args.device,
        customer_type: args.customer,
        country_code: args.country_code,
    }));

    #[derive(Serialize)]
    struct Output<'a> {
        summary: records::FilterSummary,
        items: &'a [clustering::DisplayItem],
    }
    let summary = app.summary();
    print_json(&Output {
        summary,
        items: app.display_items(),
    })
}

fn cmd_show(config: &MapConfig, id: RecordId, source: &SourceArgs) -> Result<(), String> {
    let mut app = VisitorMap::new(StaticMapView::new(), load(source)?, config);
    app.handle_event(MapEvent::MarkerClicked(id));
    let popup = app.popup().ok_or_else(|| format!("no record with id {id}"))?;
    print_json(&popup)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let out = serde_json::to_string_pretty(value).map_err(|e| format!("encode json: {e}"))?;
    println!("{out}");
    Ok(())
}
