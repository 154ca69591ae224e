//! osm2svg - render OpenStreetMap data as styled SVG paths
//!
//! The library is built around two engines:
//!
//! - [`style`]: a small rule language selecting entities by kind, tags and
//!   relation membership, composed into first-match-wins style sheets.
//! - [`merger`]: a polyline merger stitching ways that share endpoints into
//!   long continuous paths.
//!
//! [`render_map`] ties them together with a linear projection and an SVG
//! writer.
//!
//! # Example
//!
//! ```rust
//! use osm2svg::{render_map, OsmData, RenderConfig, StyleEntry, StyleRule, StyleSheet};
//!
//! let data = OsmData::from_str(r#"{"elements": [
//!     {"type": "node", "id": 1, "lat": 0.0, "lon": 0.0},
//!     {"type": "node", "id": 2, "lat": 1.0, "lon": 1.0},
//!     {"type": "way", "id": 3, "nodes": [1, 2], "tags": {"highway": "primary"}}
//! ]}"#).unwrap();
//! let sheet = StyleSheet::from_entries(vec![
//!     StyleEntry::new(r#"stroke="black""#, StyleRule::tag("highway", "*")),
//! ]);
//!
//! let svg = render_map(&data, &sheet, &RenderConfig::default()).unwrap();
//! assert!(svg.contains(r#"<path stroke="black""#));
//! ```

pub mod entity;
pub mod error;
pub mod geometry;
pub mod merger;
pub mod osm;
pub mod renderer;
pub mod style;

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};
use thiserror::Error;

pub use entity::{Entity, EntityKind, MembershipIndex, Tags};
pub use error::ConfigError;
pub use geometry::{BoundingBox, Point};
pub use merger::{merge_ways, LineMerger, MergeError, MergeStats};
pub use osm::{OsmData, OsmError};
pub use renderer::{Projection, SvgBuilder, SvgConfig};
pub use style::{StyleEntry, StyleRule, StyleSheet};

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error loading the style sheet
    #[error("style error: {0}")]
    Style(#[from] ConfigError),

    /// Error loading the map data
    #[error("input error: {0}")]
    Input(#[from] OsmError),

    /// Error while merging ways
    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    /// Nothing to derive a projection from
    #[error("no bounding box: the input has no nodes and none was configured")]
    NoBounds,

    /// The bounding box has no area
    #[error("bounding box {0:?} has zero or invalid width or height")]
    DegenerateBounds(BoundingBox),
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// SVG output configuration
    pub svg: SvgConfig,
    /// Area to draw; defaults to the bounds of all input nodes
    pub bbox: Option<BoundingBox>,
    /// Stitch ways sharing endpoints into longer paths
    pub merge_lines: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            svg: SvgConfig::default(),
            bbox: None,
            merge_lines: true,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SVG configuration
    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    /// Set the area to draw
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Enable or disable line merging
    pub fn with_merge_lines(mut self, merge: bool) -> Self {
        self.merge_lines = merge;
        self
    }
}

/// Render map data to SVG
///
/// Every way is resolved against the style sheet; unmatched ways are not
/// drawn. Projected ways are merged per style and written in style sheet
/// order.
pub fn render_map(
    data: &OsmData,
    sheet: &StyleSheet,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    let bbox = config
        .bbox
        .or_else(|| data.bounds())
        .ok_or(RenderError::NoBounds)?;
    if bbox.is_degenerate() {
        return Err(RenderError::DegenerateBounds(bbox));
    }
    let projection = Projection::new(config.svg.width, config.svg.height, bbox);

    let needed = sheet.needed_relations();
    let memberships = data.membership_index(&needed);
    debug!(
        "{} relation rule(s) needed, {} member(s) indexed",
        needed.len(),
        memberships.len()
    );

    let coords = data.node_coords();
    let mut layers: Vec<(&str, Vec<Vec<Point>>)> = Vec::new();
    let mut layer_of: HashMap<&str, usize> = HashMap::new();
    for style in sheet.styles_in_order() {
        layer_of.entry(style).or_insert_with(|| {
            layers.push((style, Vec::new()));
            layers.len() - 1
        });
    }

    let mut skipped = 0usize;
    for way in data.ways() {
        let entity = way.entity();
        let Some(style) = sheet.resolve(&entity, Some(&memberships)) else {
            continue;
        };

        let points: Vec<Point> = way
            .nodes
            .iter()
            .filter_map(|id| coords.get(id))
            .map(|&(lon, lat)| projection.project(lon, lat))
            .collect();
        if points.len() < way.nodes.len() {
            debug!(
                "way {}: {} of {} node(s) missing from input",
                way.id,
                way.nodes.len() - points.len(),
                way.nodes.len()
            );
        }
        if points.len() < 2 {
            warn!("way {} has fewer than 2 known nodes, skipping", way.id);
            skipped += 1;
            continue;
        }

        // Every resolved style is one of the sheet's styles.
        if let Some(&idx) = layer_of.get(style) {
            layers[idx].1.push(points);
        }
    }

    let mut builder = SvgBuilder::new(config.svg.clone());
    for (style, ways) in layers {
        builder.add_layer(style);
        let lines = if config.merge_lines {
            merge_ways(ways)?
        } else {
            ways
        };
        for line in &lines {
            builder.add_path(style, line);
        }
    }

    info!(
        "rendered {} path(s), skipped {} way(s)",
        builder.path_count(),
        skipped
    );
    Ok(builder.build())
}

/// Load map data and a style sheet from disk and render them
pub fn render_files(
    input: &Path,
    style: &Path,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    let sheet = StyleSheet::from_path(style)?;
    let data = OsmData::from_file(input)?;
    render_map(&data, &sheet, config)
}
