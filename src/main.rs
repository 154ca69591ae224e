//! osm2svg CLI
//!
//! Usage:
//!   osm2svg render [OPTIONS] --style <FILE> <INPUT>
//!   osm2svg check <STYLE>
//!
//! Options:
//!   -v, --verbose  More log output (repeat for debug output)
//!   -h, --help     Print help

use std::fs;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use osm2svg::{render_files, BoundingBox, RenderConfig, RenderError, StyleSheet, SvgConfig};

#[derive(Parser)]
#[command(name = "osm2svg")]
#[command(about = "Render OpenStreetMap data as styled SVG paths")]
struct Cli {
    /// More log output (-v for info, -vv for debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render an Overpass JSON extract to SVG
    Render {
        /// Overpass JSON input file
        input: PathBuf,

        /// Style sheet (JSON or TOML)
        #[arg(short, long)]
        style: PathBuf,

        /// Output file (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Canvas width in pixels
        #[arg(long, default_value_t = 1000)]
        width: u32,

        /// Canvas height in pixels
        #[arg(long, default_value_t = 1000)]
        height: u32,

        /// Area to draw as min_lon,min_lat,max_lon,max_lat
        #[arg(long, value_parser = parse_bbox)]
        bbox: Option<BoundingBox>,

        /// Background fill color
        #[arg(long)]
        background: Option<String>,

        /// Draw every way separately instead of merging shared endpoints
        #[arg(long)]
        no_merge: bool,
    },

    /// Validate a style sheet and list its styles in priority order
    Check {
        /// Style sheet (JSON or TOML)
        style: PathBuf,
    },
}

fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate: {e}"))?;
    match values.as_slice() {
        &[min_lon, min_lat, max_lon, max_lat] => {
            Ok(BoundingBox::new(min_lon, min_lat, max_lon, max_lat))
        }
        _ => Err(format!("expected 4 comma separated values, got {}", values.len())),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Render {
            input,
            style,
            output,
            width,
            height,
            bbox,
            background,
            no_merge,
        } => {
            let mut svg_config = SvgConfig::new().with_size(width, height);
            if let Some(color) = background {
                svg_config = svg_config.with_background(color);
            }
            let mut config = RenderConfig::new()
                .with_svg(svg_config)
                .with_merge_lines(!no_merge);
            if let Some(bbox) = bbox {
                config = config.with_bbox(bbox);
            }

            let svg = match render_files(&input, &style, &config) {
                Ok(svg) => svg,
                Err(RenderError::Style(e)) => {
                    eprintln!(
                        "Error loading style sheet '{}':\n{}",
                        style.display(),
                        e.format()
                    );
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            match &output {
                Some(path) => {
                    if let Err(e) = fs::write(path, svg) {
                        eprintln!("Error writing file '{}': {}", path.display(), e);
                        std::process::exit(1);
                    }
                }
                None => print!("{}", svg),
            }
        }
        Command::Check { style } => {
            let sheet = match StyleSheet::from_path(&style) {
                Ok(sheet) => sheet,
                Err(e) => {
                    eprintln!(
                        "Error loading style sheet '{}':\n{}",
                        style.display(),
                        e.format()
                    );
                    std::process::exit(1);
                }
            };

            println!("{} rule(s), in priority order:", sheet.len());
            for (i, entry) in sheet.entries().iter().enumerate() {
                println!("{:>4}. {}", i + 1, entry.style);
                for line in entry.rule.to_string().lines() {
                    println!("        {}", line);
                }
            }

            let needed = sheet.needed_relations();
            if !needed.is_empty() {
                println!();
                println!("relations needed for membership filters:");
                for rule in needed {
                    println!("  - {}", rule.to_string().replace('\n', "\n    "));
                }
            }
        }
    }
}
