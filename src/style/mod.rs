//! Declarative styling of geographic entities
//!
//! Rules select entities by kind, tags and relation membership; a style
//! sheet maps the first matching rule to an SVG attribute string.

pub mod rule;
pub mod sheet;
pub mod source;

pub use rule::{StyleRule, TagValue, WILDCARD};
pub use sheet::{StyleEntry, StyleSheet};
pub use source::{FileSource, MemorySource, SourceDocument, SourceFormat, StyleSource};
