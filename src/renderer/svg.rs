//! SVG document generation from styled paths

use crate::geometry::Point;

use super::path::path_element;
use super::SvgConfig;

/// Paths sharing one style descriptor
#[derive(Debug)]
struct Layer {
    style: String,
    paths: Vec<String>,
}

/// Build SVG documents incrementally
///
/// Paths are grouped into layers by style. Layers are written in the order
/// they were first seen, so registering every style up front with
/// [`SvgBuilder::add_layer`] fixes the painting order.
#[derive(Debug)]
pub struct SvgBuilder {
    config: SvgConfig,
    layers: Vec<Layer>,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            layers: vec![],
        }
    }

    fn indent_str(&self) -> &str {
        if self.config.pretty_print {
            "  "
        } else {
            ""
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    fn layer_mut(&mut self, style: &str) -> &mut Layer {
        let idx = match self.layers.iter().position(|l| l.style == style) {
            Some(idx) => idx,
            None => {
                self.layers.push(Layer {
                    style: style.to_string(),
                    paths: vec![],
                });
                self.layers.len() - 1
            }
        };
        &mut self.layers[idx]
    }

    /// Register a style layer without adding paths to it
    pub fn add_layer(&mut self, style: &str) {
        self.layer_mut(style);
    }

    /// Add a path; returns false when the path collapses to a single point
    pub fn add_path(&mut self, style: &str, points: &[Point]) -> bool {
        match path_element(points, style) {
            Some(element) => {
                self.layer_mut(style).paths.push(element);
                true
            }
            None => false,
        }
    }

    /// Number of path elements added so far
    pub fn path_count(&self) -> usize {
        self.layers.iter().map(|l| l.paths.len()).sum()
    }

    /// Build the final SVG string
    pub fn build(self) -> String {
        let nl = self.newline();
        let indent = self.indent_str();
        let (w, h) = (self.config.width, self.config.height);

        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        ));
        svg.push_str(nl);

        if let Some(background) = &self.config.background {
            svg.push_str(indent);
            svg.push_str(&format!(
                r#"<rect width="100%" height="100%" fill="{}"/>"#,
                escape_xml(background)
            ));
            svg.push_str(nl);
        }

        for layer in &self.layers {
            for path in &layer.paths {
                svg.push_str(indent);
                svg.push_str(path);
                svg.push_str(nl);
            }
        }

        svg.push_str("</svg>");
        svg.push_str(nl);
        svg
    }
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
