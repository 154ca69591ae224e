//! Style sheets: ordered `(style, rule)` pairs with first-match resolution
//!
//! A style document looks like
//!
//! ```json
//! {
//!   "import": ["base", "roads"],
//!   "styles": { "water": { "fill": "#aad3df" }, "lake": "water" },
//!   "rules": [ { "style": "water", "if": { "natural": "water" } } ]
//! }
//! ```
//!
//! Imports are folded in listed order, each one placed in front of what has
//! been collected so far, so a later import outranks an earlier one. The
//! document's own rules go last. Named styles are local to their document.

use std::collections::HashMap;
use std::path::Path;

use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::entity::{Entity, MembershipIndex};
use crate::error::ConfigError;

use super::rule::{scalar_text, StyleRule};
use super::source::{FileSource, SourceDocument, SourceFormat, StyleSource};

/// Document structure shared by the JSON and TOML formats
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSheet {
    #[serde(default)]
    import: Vec<String>,
    #[serde(default)]
    styles: Map<String, Value>,
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRule {
    style: Value,
    #[serde(rename = "if")]
    condition: Map<String, Value>,
}

/// A style descriptor together with the rule selecting it
#[derive(Debug, Clone, PartialEq)]
pub struct StyleEntry {
    /// SVG attribute string, e.g. `stroke="#000" stroke-width="2"`
    pub style: String,
    pub rule: StyleRule,
}

impl StyleEntry {
    pub fn new(style: impl Into<String>, rule: StyleRule) -> Self {
        Self {
            style: style.into(),
            rule,
        }
    }
}

/// Ordered collection of style entries; earlier entries take priority
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    entries: Vec<StyleEntry>,
}

impl StyleSheet {
    pub fn from_entries(entries: Vec<StyleEntry>) -> Self {
        Self { entries }
    }

    /// Load a style file; imports are resolved relative to its directory
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let Some(file_name) = path.file_name() else {
            return Err(ConfigError::Io {
                source_id: path.display().to_string(),
                error: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a style file path",
                ),
            });
        };
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::load(&FileSource::new(base_dir), &file_name.to_string_lossy())
    }

    /// Load the document `id` and everything it imports
    pub fn load<S>(source: &S, id: &str) -> Result<Self, ConfigError>
    where
        S: StyleSource + ?Sized,
    {
        let mut resolving = Vec::new();
        let entries = collect_entries(source, id, &mut resolving)?;
        debug!("style sheet '{}' loaded with {} rule(s)", id, entries.len());
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[StyleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Style descriptors in priority order, e.g. for a legend
    pub fn styles_in_order(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.style.as_str()).collect()
    }

    /// Relation rules needed by any entry, in entry order
    pub fn needed_relations(&self) -> Vec<&StyleRule> {
        self.entries
            .iter()
            .flat_map(|e| e.rule.needed_relations())
            .collect()
    }

    /// Style of the first matching entry, `None` when the entity is not drawn
    pub fn resolve(&self, entity: &Entity, memberships: Option<&MembershipIndex>) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.rule.matches(entity, memberships))
            .map(|e| e.style.as_str())
    }
}

fn parse_document(doc: &SourceDocument) -> Result<RawSheet, ConfigError> {
    match doc.format {
        SourceFormat::Json => {
            serde_json::from_str(&doc.text).map_err(|e| ConfigError::json(&doc.id, &doc.text, e))
        }
        SourceFormat::Toml => {
            toml::from_str(&doc.text).map_err(|e| ConfigError::toml(&doc.id, &doc.text, e))
        }
    }
}

fn collect_entries<S>(
    source: &S,
    id: &str,
    resolving: &mut Vec<String>,
) -> Result<Vec<StyleEntry>, ConfigError>
where
    S: StyleSource + ?Sized,
{
    if resolving.iter().any(|r| r == id) {
        let mut chain = resolving.clone();
        chain.push(id.to_string());
        return Err(ConfigError::CircularImport { chain });
    }

    let doc = source.read(id)?;
    let raw = parse_document(&doc)?;
    debug!(
        "style source '{}': {} import(s), {} named style(s), {} rule(s)",
        id,
        raw.import.len(),
        raw.styles.len(),
        raw.rules.len()
    );

    resolving.push(id.to_string());
    let mut entries = Vec::new();
    for import in &raw.import {
        let mut imported =
            collect_entries(source, import, resolving).map_err(|e| e.imported_by(id))?;
        imported.append(&mut entries);
        entries = imported;
    }
    resolving.pop();

    let mut known = HashMap::new();
    for (name, value) in &raw.styles {
        let style = build_style("styles", value, &known)
            .map_err(|e| e.in_style(name.as_str()).in_source(id))?;
        known.insert(name.clone(), style);
    }

    for (index, rule) in raw.rules.iter().enumerate() {
        let style =
            build_style("style", &rule.style, &known).map_err(|e| e.in_rule(index).in_source(id))?;
        let matcher =
            StyleRule::from_config(&rule.condition).map_err(|e| e.in_rule(index).in_source(id))?;
        entries.push(StyleEntry::new(style, matcher));
    }

    Ok(entries)
}

/// Turn a style value into an attribute string
///
/// A string refers to a named style declared earlier in the same document.
/// A mapping becomes space separated `key="value"` pairs in declaration order.
fn build_style(
    key: &str,
    value: &Value,
    known: &HashMap<String, String>,
) -> Result<String, ConfigError> {
    match value {
        Value::String(name) => known
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownStyle { name: name.clone() }),
        Value::Object(attributes) => {
            let parts = attributes
                .iter()
                .map(|(attr, v)| -> Result<String, ConfigError> {
                    let text = scalar_text(attr, v)?;
                    Ok(format!("{attr}=\"{}\"", escape_attr(&text)))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(parts.join(" "))
        }
        _ => Err(ConfigError::invalid(key, "a style name or an attribute mapping")),
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::MemorySource;

    fn load(source: &MemorySource, id: &str) -> Result<StyleSheet, ConfigError> {
        StyleSheet::load(source, id)
    }

    #[test]
    fn test_inline_and_named_styles() {
        let source = MemorySource::new().with_json(
            "main",
            r##"{
                "styles": {
                    "road": { "stroke": "#000", "stroke-width": 2 },
                    "street": "road"
                },
                "rules": [
                    { "style": "street", "if": { "highway": "*" } },
                    { "style": { "fill": "blue" }, "if": { "natural": "water" } }
                ]
            }"##,
        );
        let sheet = load(&source, "main").unwrap();
        assert_eq!(
            sheet.styles_in_order(),
            vec![r##"stroke="#000" stroke-width="2""##, r#"fill="blue""#]
        );
    }

    #[test]
    fn test_first_match_wins() {
        let sheet = StyleSheet::from_entries(vec![
            StyleEntry::new("s1", StyleRule::tag("highway", "*")),
            StyleEntry::new("s2", StyleRule::tag("highway", "primary")),
        ]);
        let way = Entity::way(1).with_tag("highway", "primary");
        assert_eq!(sheet.resolve(&way, None), Some("s1"));
        assert_eq!(sheet.resolve(&Entity::way(2), None), None);
    }

    #[test]
    fn test_unknown_style_reference() {
        let source = MemorySource::new().with_json(
            "main",
            r#"{ "rules": [ { "style": "nope", "if": { "a": "b" } } ] }"#,
        );
        let err = load(&source, "main").unwrap_err();
        assert_eq!(err.to_string(), "in 'main': rule #0: unknown style 'nope'");
    }

    #[test]
    fn test_style_referencing_later_style_fails() {
        let source = MemorySource::new().with_json(
            "main",
            r#"{ "styles": { "a": "b", "b": { "fill": "red" } } }"#,
        );
        let err = load(&source, "main").unwrap_err();
        assert_eq!(err.to_string(), "in 'main': style 'a': unknown style 'b'");
    }

    #[test]
    fn test_bad_rule_reports_context() {
        let source = MemorySource::new().with_json(
            "main",
            r#"{ "rules": [
                { "style": { "fill": "red" }, "if": { "a": "b" } },
                { "style": { "fill": "red" }, "if": { "$bogus": 1 } }
            ] }"#,
        );
        let err = load(&source, "main").unwrap_err();
        assert_eq!(
            err.to_string(),
            "in 'main': rule #1: unknown meta key '$bogus'"
        );
    }

    #[test]
    fn test_unknown_top_level_key_is_parse_error() {
        let source = MemorySource::new().with_json("main", r#"{ "rulez": [] }"#);
        assert!(matches!(
            load(&source, "main"),
            Err(ConfigError::Parse { source_id, .. }) if source_id == "main"
        ));
    }

    #[test]
    fn test_toml_document() {
        let source = MemorySource::new().with_toml(
            "main",
            r##"
[styles]
water = { fill = "#aad3df" }

[[rules]]
style = "water"
if = { "$type" = "way", natural = "water" }
"##,
        );
        let sheet = load(&source, "main").unwrap();
        assert_eq!(sheet.styles_in_order(), vec![r##"fill="#aad3df""##]);
        let lake = Entity::way(3).with_tag("natural", "water");
        assert_eq!(sheet.resolve(&lake, None), Some(r##"fill="#aad3df""##));
        assert_eq!(sheet.resolve(&Entity::node(3).with_tag("natural", "water"), None), None);
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let source = MemorySource::new().with_json(
            "main",
            r#"{ "rules": [ { "style": { "font-family": "A \"B\" & C" }, "if": { "a": "*" } } ] }"#,
        );
        let sheet = load(&source, "main").unwrap();
        assert_eq!(
            sheet.styles_in_order(),
            vec![r#"font-family="A &quot;B&quot; &amp; C""#]
        );
    }

    #[test]
    fn test_needed_relations_in_rule_order() {
        let sheet = StyleSheet::from_entries(vec![
            StyleEntry::new("a", StyleRule::member_of(StyleRule::tag("route", "bus"))),
            StyleEntry::new("b", StyleRule::tag("highway", "*")),
            StyleEntry::new("c", StyleRule::member_of(StyleRule::tag("route", "tram"))),
        ]);
        let needed: Vec<String> = sheet
            .needed_relations()
            .iter()
            .map(|r| r.to_string())
            .collect();
        assert_eq!(needed, vec!["route = bus", "route = tram"]);
    }
}
