use crate::config::{Config, load_config};
use crate::ir::GeoBBox;
use crate::layout::projection::global_bbox;
use crate::layout::text::measurer_for;
use crate::layout::{Layout, compute_layout};
use crate::layout_dump::{layout_json, write_layout_dump};
use crate::parser::{ParsedFeatures, parse_geojson};
use crate::render::{render_svg, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `GEOLR_LOG=debug`.
const LOG_ENV: &str = "GEOLR_LOG";

#[derive(Parser, Debug)]
#[command(name = "geolr", version, about = "Collision-free labels and label-aware line routing for GeoJSON")]
pub struct Args {
    /// GeoJSON input; repeat to merge files. '-' or none reads stdin
    #[arg(short = 'i', long = "input")]
    pub inputs: Vec<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (themeVariables, placement, routing, simplify)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport as minLng,minLat,maxLng,maxLat. Defaults to the input extent
    #[arg(long = "bbox", allow_hyphen_values = true)]
    pub bbox: Option<GeoBBox>,

    /// View width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// View height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Text pinned at the view center before other labels
    #[arg(long = "centerLabel")]
    pub center_label: Option<String>,

    /// Use the built-in width table instead of system fonts
    #[arg(long = "fastText")]
    pub fast_text: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = apply_args(load_config(args.config.as_deref())?, &args);

    let parsed = read_features(&args.inputs)?;
    if parsed.features.is_empty() {
        tracing::warn!("no drawable features in input");
    }
    let bbox = args.bbox.or_else(|| global_bbox(&parsed.features));
    let measurer = measurer_for(&config.theme, &config.layout);
    let layout = compute_layout(
        &parsed.features,
        bbox,
        (config.render.width, config.render.height),
        &config.theme,
        &config.layout,
        measurer.as_ref(),
    );

    write_layout(&layout, &config, args.output_format, args.output.as_deref())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn apply_args(mut config: Config, args: &Args) -> Config {
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if let Some(text) = &args.center_label {
        config.layout.placement.center_label = Some(text.clone());
    }
    if args.fast_text {
        config.layout.fast_text_metrics = true;
    }
    config
}

fn read_features(inputs: &[PathBuf]) -> Result<ParsedFeatures> {
    if inputs.is_empty() {
        return parse_geojson(&read_input(None)?).context("failed to parse stdin");
    }
    let mut merged = ParsedFeatures::default();
    let mut offset = 0;
    for path in inputs {
        let parsed = parse_geojson(&read_input(Some(path))?)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let count = parsed.features.len() + parsed.skipped.len();
        merged.merge(parsed, offset);
        offset += count;
    }
    Ok(merged)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_layout(layout: &Layout, config: &Config, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    match format {
        OutputFormat::Svg => write_output_svg(&render_svg(layout, &config.theme), output),
        OutputFormat::Json => match output {
            Some(path) => write_layout_dump(path, layout),
            None => {
                println!("{}", layout_json(layout)?);
                Ok(())
            }
        },
        OutputFormat::Png => write_png(layout, config, output),
    }
}

#[cfg(feature = "png")]
fn write_png(layout: &Layout, config: &Config, output: Option<&Path>) -> Result<()> {
    let output = output.ok_or_else(|| anyhow::anyhow!("output path required for png output"))?;
    crate::render::write_output_png(&render_svg(layout, &config.theme), output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_layout: &Layout, _config: &Config, _output: Option<&Path>) -> Result<()> {
    Err(anyhow::anyhow!("png output requires the `png` feature"))
}
