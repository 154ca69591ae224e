//! SVG renderer for merged, styled ways
//!
//! Projects geographic coordinates to pixels, formats point sequences as
//! SVG paths and assembles them into a document.

pub mod config;
pub mod path;
pub mod projection;
pub mod svg;

pub use config::SvgConfig;
pub use path::{path_data, path_element};
pub use projection::Projection;
pub use svg::SvgBuilder;
