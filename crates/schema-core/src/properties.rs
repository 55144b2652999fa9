//! `properties`/`patternProperties` storage: a small schema gets a linear
//! `Vec`, a large one gets a hash map, so the common case (a handful of
//! named properties) avoids hashing overhead entirely.
use std::sync::Arc;

use ahash::AHashMap;
use fancy_regex::Regex;
use serde_json::Value;

use crate::node::NodeId;

const MAX_PROPERTIES_FOR_SMALL_MAP: usize = 40;

pub trait PropertiesValidatorsMap: Send + Sync {
    fn get(&self, property: &str) -> Option<NodeId>;
    fn iter(&self) -> Box<dyn Iterator<Item = (&str, NodeId)> + '_>;
}

pub struct SmallValidatorsMap(Vec<(String, NodeId)>);

impl PropertiesValidatorsMap for SmallValidatorsMap {
    fn get(&self, property: &str) -> Option<NodeId> {
        self.0.iter().find(|(name, _)| name == property).map(|(_, id)| *id)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&str, NodeId)> + '_> {
        Box::new(self.0.iter().map(|(name, id)| (name.as_str(), *id)))
    }
}

pub struct BigValidatorsMap(AHashMap<String, NodeId>);

impl PropertiesValidatorsMap for BigValidatorsMap {
    fn get(&self, property: &str) -> Option<NodeId> {
        self.0.get(property).copied()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&str, NodeId)> + '_> {
        Box::new(self.0.iter().map(|(name, id)| (name.as_str(), *id)))
    }
}

#[must_use]
pub fn compile_properties_map(entries: Vec<(String, NodeId)>) -> Box<dyn PropertiesValidatorsMap> {
    if entries.len() <= MAX_PROPERTIES_FOR_SMALL_MAP {
        Box::new(SmallValidatorsMap(entries))
    } else {
        Box::new(BigValidatorsMap(entries.into_iter().collect()))
    }
}

/// Compile `patternProperties`' regex -> schema pairs, preserving the
/// document's insertion order (§3.1: "ordered by insertion") since a
/// property name may match more than one pattern and all matches apply.
pub fn compile_patterns(
    object: &serde_json::Map<String, Value>,
    mut compile_one: impl FnMut(&str, &Value) -> Result<NodeId, crate::error::CompileError>,
) -> Result<Vec<(Arc<Regex>, NodeId)>, crate::error::CompileError> {
    let mut out = Vec::with_capacity(object.len());
    for (pattern, subschema) in object {
        let regex = crate::ecma::compile(pattern)?;
        let id = compile_one(pattern, subschema)?;
        out.push((regex, id));
    }
    Ok(out)
}

#[must_use]
pub fn matching_patterns<'p>(patterns: &'p [(Arc<Regex>, NodeId)], property: &str) -> Vec<NodeId> {
    patterns
        .iter()
        .filter(|(regex, _)| regex.is_match(property).unwrap_or(false))
        .map(|(_, id)| *id)
        .collect()
}
