//! Choropleth frame renderer.
//!
//! Loads a statistic's feature collection and a visualization setting,
//! renders one frame through the same layer engine the dashboard uses and
//! writes the composed map, and optionally its legend, as PNG.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use atlas_common::{Extent, FeatureCollection, FrameState, VisualizationSetting};
use clap::Parser;
use interaction::{HighlightCoordinator, ParcelHandler, PointerEvent, PointerHandler, RegionHandler, Transition};
use layers::{Granularity, LayerManager, StatisticKind};
use renderer::{png, render_legend, LabelPainter};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::{parse_point, parse_size, DashboardConfig};

const DEFAULT_SIZE: (u32, u32) = (800, 600);
const LEGEND_SWATCH_HEIGHT: u32 = 24;
/// Margin added around the data extent when no `--extent` is given.
const EXTENT_MARGIN: f64 = 0.05;

#[derive(Parser, Debug)]
#[command(name = "atlas-render")]
#[command(about = "Render an agricultural statistic as a choropleth PNG")]
struct Args {
    /// Feature collection JSON
    #[arg(long, env = "ATLAS_FEATURES")]
    features: PathBuf,

    /// Statistic carried by the collection (aging, groundwater, cultivation, ...)
    #[arg(long, env = "ATLAS_STATISTIC")]
    statistic: StatisticKind,

    /// Visualization setting JSON (default: dashboard config, then built-in)
    #[arg(long)]
    setting: Option<PathBuf>,

    /// Map extent as minx,miny,maxx,maxy (default: data extent)
    #[arg(long)]
    extent: Option<String>,

    /// Output size as WIDTHxHEIGHT
    #[arg(long)]
    size: Option<String>,

    /// Output map PNG
    #[arg(long, default_value = "map.png")]
    out: PathBuf,

    /// Also write the legend as PNG
    #[arg(long)]
    legend: Option<PathBuf>,

    /// Also write the legend entries as JSON
    #[arg(long)]
    legend_json: Option<PathBuf>,

    /// Label font (TrueType)
    #[arg(long, env = "ATLAS_FONT")]
    font: Option<PathBuf>,

    /// Dashboard config YAML
    #[arg(long, env = "ATLAS_CONFIG")]
    config: Option<PathBuf>,

    /// Outline the region under this screen point, as X,Y
    #[arg(long)]
    select: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    let dashboard = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };

    let setting = load_setting(args.setting.as_deref(), &dashboard)?;
    let (width, height) = match args.size.as_deref().or(dashboard.size.as_deref()) {
        Some(size) => parse_size(size)?,
        None => DEFAULT_SIZE,
    };

    let json = std::fs::read_to_string(&args.features)
        .with_context(|| format!("Failed to read features {}", args.features.display()))?;

    let extent = match &args.extent {
        Some(csv) => Extent::from_csv(csv).context("Invalid --extent")?,
        None => data_extent(&json)?,
    };
    let frame = FrameState::fit(extent, width, height);

    let font = args.font.as_deref().or(dashboard.font_path.as_deref());
    let painter = Arc::new(LabelPainter::load_or_disabled(font));

    info!(
        statistic = %args.statistic,
        width,
        height,
        resolution = frame.resolution(),
        "Rendering choropleth"
    );

    let mut manager = LayerManager::new();
    let layer = args
        .statistic
        .build_layer(args.statistic.as_str(), &json, 0, &setting, Some(painter.clone()))
        .with_context(|| format!("Failed to build {} layer", args.statistic))?;
    manager.add_boxed(layer)?;

    if manager.render_frame(Some(&frame)) == 0 {
        warn!("Nothing was drawn, the output map is empty");
    }

    let mut coordinator = HighlightCoordinator::new();
    coordinator.attach(handler_for(args.statistic.granularity()));
    if let Some(point) = &args.select {
        let (x, y) = parse_point(point).context("Invalid --select")?;
        match coordinator.dispatch(PointerEvent::click(x, y), &mut manager) {
            Transition::Selected(hit) => info!(feature = %hit.feature_id, "Region selected"),
            _ => warn!(x, y, "No region under the selection point"),
        }
    }

    let composed = coordinator.compose(&manager, &frame)?;
    write_png(&args.out, &png::encode_surface(&composed)?)?;
    info!(path = %args.out.display(), "Map written");

    if args.legend.is_some() || args.legend_json.is_some() {
        let legend = manager
            .get(args.statistic.as_str())
            .map(|layer| layer.legend())
            .transpose()?
            .flatten();

        match legend {
            Some(legend) => {
                if let Some(path) = &args.legend {
                    let surface = render_legend(&legend, dashboard.legend_width, LEGEND_SWATCH_HEIGHT, &painter)?;
                    write_png(path, &png::encode_surface(&surface)?)?;
                    info!(path = %path.display(), entries = legend.len(), "Legend written");
                }
                if let Some(path) = &args.legend_json {
                    let body = serde_json::to_string_pretty(&legend)?;
                    std::fs::write(path, body)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                }
            }
            None => warn!(statistic = %args.statistic, "Statistic is rank-colored and has no legend"),
        }
    }

    coordinator.teardown(&mut manager);
    Ok(())
}

fn init_tracing(level: &str, json: bool) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn load_setting(path: Option<&Path>, dashboard: &DashboardConfig) -> Result<VisualizationSetting> {
    if let Some(path) = path {
        return VisualizationSetting::from_file(path)
            .with_context(|| format!("Failed to load setting {}", path.display()));
    }
    Ok(dashboard.default_setting.clone().unwrap_or_default())
}

/// Extent of every feature, padded by a small margin.
fn data_extent(json: &str) -> Result<Extent> {
    let collection = FeatureCollection::<serde_json::Value>::from_json(json)?;
    let extent = collection.extent();
    if extent.is_empty() {
        bail!("Feature collection has no coordinates; pass --extent");
    }
    let dx = extent.width() * EXTENT_MARGIN;
    let dy = extent.height() * EXTENT_MARGIN;
    Ok(Extent::new(
        extent.min_x - dx,
        extent.min_y - dy,
        extent.max_x + dx,
        extent.max_y + dy,
    ))
}

fn handler_for(granularity: Granularity) -> Box<dyn PointerHandler> {
    match granularity {
        Granularity::Region => Box::new(RegionHandler),
        Granularity::Parcel => Box::new(ParcelHandler),
    }
}

fn write_png(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}
