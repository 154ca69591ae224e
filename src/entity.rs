//! Geographic entities and the relation membership index

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::style::StyleRule;

/// Tag set of an entity; keys are unique
pub type Tags = HashMap<String, String>;

/// Kind of a geographic entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Node,
    Way,
    Relation,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Way => "way",
            EntityKind::Relation => "relation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no entity kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(EntityKind::Node),
            "way" => Ok(EntityKind::Way),
            "relation" => Ok(EntityKind::Relation),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// A node, way or relation as seen by the style rules
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub id: i64,
    /// `None` when the source carried no tag set at all
    pub tags: Option<Tags>,
}

impl Entity {
    pub fn new(kind: EntityKind, id: i64) -> Self {
        Self {
            kind,
            id,
            tags: None,
        }
    }

    pub fn node(id: i64) -> Self {
        Self::new(EntityKind::Node, id)
    }

    pub fn way(id: i64) -> Self {
        Self::new(EntityKind::Way, id)
    }

    pub fn relation(id: i64) -> Self {
        Self::new(EntityKind::Relation, id)
    }

    /// Add a single tag, creating the tag set if needed
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .get_or_insert_with(Tags::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.as_ref()?.get(key).map(String::as_str)
    }
}

/// Reverse index from an entity to the relations containing it
#[derive(Debug, Clone, Default)]
pub struct MembershipIndex {
    memberships: HashMap<(EntityKind, i64), Vec<Entity>>,
}

impl MembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `relation` contains the member `(kind, id)`
    ///
    /// Relations are kept in insertion order; inserting the same relation
    /// twice for one member is a no-op.
    pub fn insert(&mut self, kind: EntityKind, id: i64, relation: Entity) {
        let relations = self.memberships.entry((kind, id)).or_default();
        if !relations.iter().any(|r| r.id == relation.id) {
            relations.push(relation);
        }
    }

    /// Relations containing `(kind, id)`, empty when unknown
    pub fn relations_of(&self, kind: EntityKind, id: i64) -> &[Entity] {
        self.memberships
            .get(&(kind, id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, kind: EntityKind, id: i64) -> bool {
        self.memberships.contains_key(&(kind, id))
    }

    /// Number of indexed members
    pub fn len(&self) -> usize {
        self.memberships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memberships.is_empty()
    }

    /// Build the index from relations and their members
    ///
    /// Only relations matched by one of `needed` are indexed. The needed
    /// rules are evaluated without an index, so nested `$member` filters on
    /// relations are treated as satisfied.
    pub fn from_relations<R, M>(relations: R, needed: &[&StyleRule]) -> Self
    where
        R: IntoIterator<Item = (Entity, M)>,
        M: IntoIterator<Item = (EntityKind, i64)>,
    {
        let mut index = Self::new();
        if needed.is_empty() {
            return index;
        }
        for (relation, members) in relations {
            if !needed.iter().any(|rule| rule.matches(&relation, None)) {
                continue;
            }
            for (kind, id) in members {
                index.insert(kind, id, relation.clone());
            }
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::TagValue;

    #[test]
    fn test_kind_round_trip() {
        for kind in [EntityKind::Node, EntityKind::Way, EntityKind::Relation] {
            assert_eq!(kind.as_str().parse::<EntityKind>(), Ok(kind));
        }
        assert_eq!(
            "area".parse::<EntityKind>(),
            Err(UnknownKind("area".to_string()))
        );
    }

    #[test]
    fn test_with_tag_creates_tag_set() {
        let way = Entity::way(7).with_tag("highway", "primary");
        assert_eq!(way.tag("highway"), Some("primary"));
        assert_eq!(way.tag("name"), None);
        assert_eq!(Entity::node(1).tag("highway"), None);
    }

    #[test]
    fn test_insert_deduplicates_relations() {
        let mut index = MembershipIndex::new();
        let route = Entity::relation(10).with_tag("type", "route");
        index.insert(EntityKind::Way, 1, route.clone());
        index.insert(EntityKind::Way, 1, route);
        index.insert(EntityKind::Way, 1, Entity::relation(11));
        let ids: Vec<i64> = index
            .relations_of(EntityKind::Way, 1)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![10, 11]);
        assert!(index.relations_of(EntityKind::Node, 1).is_empty());
    }

    #[test]
    fn test_from_relations_keeps_only_needed() {
        let route = StyleRule::Tag {
            key: "type".to_string(),
            value: TagValue::Exact("route".to_string()),
        };
        let relations = vec![
            (
                Entity::relation(1).with_tag("type", "route"),
                vec![(EntityKind::Way, 100), (EntityKind::Node, 5)],
            ),
            (
                Entity::relation(2).with_tag("type", "multipolygon"),
                vec![(EntityKind::Way, 200)],
            ),
        ];
        let index = MembershipIndex::from_relations(relations, &[&route]);
        assert_eq!(index.len(), 2);
        assert!(index.contains(EntityKind::Way, 100));
        assert!(index.contains(EntityKind::Node, 5));
        assert!(!index.contains(EntityKind::Way, 200));
    }

    #[test]
    fn test_from_relations_without_needed_rules_is_empty() {
        let relations = vec![(Entity::relation(1), vec![(EntityKind::Way, 1)])];
        assert!(MembershipIndex::from_relations(relations, &[]).is_empty());
    }
}
