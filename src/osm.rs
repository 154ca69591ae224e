//! Overpass JSON input
//!
//! Reads the `{"elements": [...]}` documents produced by the Overpass API
//! (`[out:json]`). Only the fields the renderer needs are kept.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::entity::{Entity, EntityKind, MembershipIndex, Tags};
use crate::geometry::BoundingBox;
use crate::style::StyleRule;

/// Errors that can occur when loading map data
#[derive(Error, Debug)]
pub enum OsmError {
    #[error("Failed to read map data file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse map data JSON: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// A parsed Overpass JSON document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsmData {
    #[serde(default)]
    pub elements: Vec<OsmElement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OsmElement {
    Node(OsmNode),
    Way(OsmWay),
    Relation(OsmRelation),
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsmNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsmWay {
    pub id: i64,
    /// Node ids in drawing order
    #[serde(default)]
    pub nodes: Vec<i64>,
    #[serde(default)]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsmRelation {
    pub id: i64,
    #[serde(default)]
    pub members: Vec<OsmMember>,
    #[serde(default)]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsmMember {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(rename = "ref")]
    pub id: i64,
    #[serde(default)]
    pub role: String,
}

impl OsmWay {
    pub fn entity(&self) -> Entity {
        Entity {
            kind: EntityKind::Way,
            id: self.id,
            tags: self.tags.clone(),
        }
    }
}

impl OsmRelation {
    pub fn entity(&self) -> Entity {
        Entity {
            kind: EntityKind::Relation,
            id: self.id,
            tags: self.tags.clone(),
        }
    }
}

impl OsmData {
    /// Load map data from an Overpass JSON file
    pub fn from_file(path: &Path) -> Result<Self, OsmError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load map data from an Overpass JSON string
    pub fn from_str(content: &str) -> Result<Self, OsmError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &OsmNode> {
        self.elements.iter().filter_map(|e| match e {
            OsmElement::Node(n) => Some(n),
            _ => None,
        })
    }

    pub fn ways(&self) -> impl Iterator<Item = &OsmWay> {
        self.elements.iter().filter_map(|e| match e {
            OsmElement::Way(w) => Some(w),
            _ => None,
        })
    }

    pub fn relations(&self) -> impl Iterator<Item = &OsmRelation> {
        self.elements.iter().filter_map(|e| match e {
            OsmElement::Relation(r) => Some(r),
            _ => None,
        })
    }

    /// `(lon, lat)` of every node, by id
    pub fn node_coords(&self) -> HashMap<i64, (f64, f64)> {
        self.nodes().map(|n| (n.id, (n.lon, n.lat))).collect()
    }

    /// Bounding box of all nodes
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_coords(self.nodes().map(|n| (n.lon, n.lat)))
    }

    /// Index the members of every relation matched by one of `needed`
    pub fn membership_index(&self, needed: &[&StyleRule]) -> MembershipIndex {
        MembershipIndex::from_relations(
            self.relations().map(|r| {
                let members: Vec<(EntityKind, i64)> =
                    r.members.iter().map(|m| (m.kind, m.id)).collect();
                (r.entity(), members)
            }),
            needed,
        )
    }
}
