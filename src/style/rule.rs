//! Style rules: predicates over entities
//!
//! A rule is built from a configuration mapping such as
//!
//! ```json
//! { "$type": "way", "highway": "*", "$member": { "route": "bus" } }
//! ```
//!
//! Plain keys are tag filters, `$`-prefixed keys are meta filters. All
//! entries of one mapping must match.

use std::fmt;

use serde_json::{Map, Value};

use crate::entity::{Entity, EntityKind, MembershipIndex, UnknownKind};
use crate::error::ConfigError;

/// Tag value matching any value
pub const WILDCARD: &str = "*";

const META_PREFIX: char = '$';

/// Expected value of a tag filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Any,
    Exact(String),
}

impl TagValue {
    pub fn parse(value: &str) -> Self {
        if value == WILDCARD {
            TagValue::Any
        } else {
            TagValue::Exact(value.to_string())
        }
    }

    fn accepts(&self, actual: &str) -> bool {
        match self {
            TagValue::Any => true,
            TagValue::Exact(expected) => expected == actual,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Any => f.write_str(WILDCARD),
            TagValue::Exact(v) => f.write_str(v),
        }
    }
}

/// A predicate over `(entity, membership index)`
#[derive(Debug, Clone, PartialEq)]
pub enum StyleRule {
    /// Entity is of the given kind
    Type(EntityKind),
    /// Entity carries the tag, with the given value unless it is a wildcard
    Tag { key: String, value: TagValue },
    Or(Vec<StyleRule>),
    And(Vec<StyleRule>),
    /// Entity belongs to a relation matching the inner rule
    MemberOf(Box<StyleRule>),
}

impl StyleRule {
    /// Tag filter; `"*"` accepts any value
    pub fn tag(key: impl Into<String>, value: &str) -> Self {
        StyleRule::Tag {
            key: key.into(),
            value: TagValue::parse(value),
        }
    }

    pub fn member_of(inner: StyleRule) -> Self {
        StyleRule::MemberOf(Box::new(inner))
    }

    /// Evaluate the rule
    ///
    /// Without a membership index `MemberOf` is vacuously true. This lets a
    /// first pass run the rules before the relations have been indexed.
    pub fn matches(&self, entity: &Entity, memberships: Option<&MembershipIndex>) -> bool {
        match self {
            StyleRule::Type(kind) => entity.kind == *kind,
            StyleRule::Tag { key, value } => entity.tag(key).is_some_and(|v| value.accepts(v)),
            StyleRule::And(rules) => rules.iter().all(|r| r.matches(entity, memberships)),
            StyleRule::Or(rules) => rules.iter().any(|r| r.matches(entity, memberships)),
            StyleRule::MemberOf(inner) => {
                let Some(index) = memberships else {
                    return true;
                };
                index
                    .relations_of(entity.kind, entity.id)
                    .iter()
                    .any(|relation| inner.matches(relation, memberships))
            }
        }
    }

    /// Rules that relations must be tested against to build the membership index
    ///
    /// Collected transitively: a `MemberOf` contributes its inner rule and
    /// everything that inner rule needs in turn.
    pub fn needed_relations(&self) -> Vec<&StyleRule> {
        let mut needed = Vec::new();
        self.collect_needed(&mut needed);
        needed
    }

    fn collect_needed<'a>(&'a self, out: &mut Vec<&'a StyleRule>) {
        match self {
            StyleRule::Type(_) | StyleRule::Tag { .. } => {}
            StyleRule::Or(rules) | StyleRule::And(rules) => {
                for rule in rules {
                    rule.collect_needed(out);
                }
            }
            StyleRule::MemberOf(inner) => {
                out.push(inner);
                inner.collect_needed(out);
            }
        }
    }

    /// Build a rule from a configuration mapping
    pub fn from_config(config: &Map<String, Value>) -> Result<Self, ConfigError> {
        let mut rules = Vec::with_capacity(config.len());

        for (key, value) in config {
            let rule = match key.as_str() {
                "$type" => {
                    let name = value
                        .as_str()
                        .ok_or_else(|| ConfigError::invalid(key, "a string"))?;
                    let kind = name
                        .parse()
                        .map_err(|UnknownKind(value)| ConfigError::UnknownType { value })?;
                    StyleRule::Type(kind)
                }
                "$member" => {
                    let inner = value
                        .as_object()
                        .ok_or_else(|| ConfigError::invalid(key, "an object"))?;
                    StyleRule::member_of(Self::from_config(inner)?)
                }
                "$or" => {
                    let items = value
                        .as_array()
                        .filter(|items| !items.is_empty())
                        .ok_or_else(|| ConfigError::invalid(key, "a non-empty array of objects"))?;
                    let alternatives = items
                        .iter()
                        .map(|item| {
                            item.as_object()
                                .ok_or_else(|| ConfigError::invalid(key, "a non-empty array of objects"))
                                .and_then(Self::from_config)
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    StyleRule::Or(alternatives)
                }
                meta if meta.starts_with(META_PREFIX) => {
                    return Err(ConfigError::UnknownMetaKey { key: key.clone() });
                }
                _ => StyleRule::Tag {
                    key: key.clone(),
                    value: TagValue::parse(&scalar_text(key, value)?),
                },
            };
            rules.push(rule);
        }

        match rules.len() {
            0 => Err(ConfigError::NoRules),
            1 => Ok(rules.swap_remove(0)),
            _ => Ok(StyleRule::And(rules)),
        }
    }
}

/// Text form of a scalar tag value (`"lanes": 2` means `lanes=2`)
pub(crate) fn scalar_text(key: &str, value: &Value) -> Result<String, ConfigError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ConfigError::invalid(key, "a string, number or boolean")),
    }
}

fn write_nested(f: &mut fmt::Formatter<'_>, header: &str, rule: &StyleRule) -> fmt::Result {
    write!(f, "{header}\n| {}", rule.to_string().replace('\n', "\n|  "))
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleRule::Type(kind) => write!(f, "$type = {kind}"),
            StyleRule::Tag { key, value } => write!(f, "{key} = {value}"),
            StyleRule::And(rules) => {
                let parts: Vec<String> = rules.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(",\n"))
            }
            StyleRule::Or(rules) => {
                f.write_str("$or")?;
                for rule in rules {
                    write_nested(f, "", rule)?;
                }
                Ok(())
            }
            StyleRule::MemberOf(inner) => write_nested(f, "$member of:", inner),
        }
    }
}
