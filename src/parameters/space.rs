// vnep-eval: Evaluation of VNEP Approximation Experiments
// Copyright (C) 2024-2025 The vnep-eval authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! The scenario generation parameter space.
//!
//! Generator frameworks record the space they sampled scenarios from as a
//! tree: generation stages contain generator groups, groups contain named
//! generators, generators contain parameter leaves with the list of values
//! that were crossed. Archives merged from several campaigns carry one such
//! tree per campaign.
//!
//! The central operation is [`extract_parameter_range`]: given a parameter
//! name it returns where in the tree the parameter lives and which values it
//! takes, so that axes and filters can be built without hard-coding the
//! generator nesting.

use std::{cmp::Ordering, collections::BTreeMap, fmt};

use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Parameters of generators below stage and group levels only match once the
/// walk has descended past those levels. Latency parameters are grafted
/// directly beside the stages and match immediately.
const GENERATION_PARAMETER_MIN_DEPTH: i32 = 2;
pub(crate) const LATENCY_KEY_PREFIX: &str = "latency";

/// A scalar parameter value.
///
/// Values of one parameter are homogeneous in practice, but the total order
/// also covers mixed collections: numbers sort before booleans, booleans
/// before text. Integers and floats compare by numeric value and are
/// considered equal when they coincide, so `20` and `20.0` address the same
/// map entry.
#[derive(Clone, Debug)]
pub enum ParamValue {
    Int(i64),
    Float(OrderedFloat<f64>),
    Bool(bool),
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(f.into_inner()),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(t) => Some(t),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ParamValue::Int(_) | ParamValue::Float(_) => 0,
            ParamValue::Bool(_) => 1,
            ParamValue::Text(_) => 2,
        }
    }

    /// Parse the string form used in map-key position. Numbers and booleans
    /// are recovered, everything else stays text.
    pub fn parse(s: &str) -> ParamValue {
        if let Ok(i) = s.parse::<i64>() {
            return ParamValue::Int(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return ParamValue::Float(OrderedFloat(f));
        }
        match s {
            "true" => ParamValue::Bool(true),
            "false" => ParamValue::Bool(false),
            _ => ParamValue::Text(s.to_string()),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(OrderedFloat(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Text(t) => write!(f, "{t}"),
        }
    }
}

impl Ord for ParamValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use ParamValue::*;
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.cmp(b),
            (Int(a), Float(b)) => OrderedFloat(*a as f64).cmp(b),
            (Float(a), Int(b)) => a.cmp(&OrderedFloat(*b as f64)),
            (Bool(a), Bool(b)) => a.cmp(b),
            // natural ordering, so that Topology2 sorts before Topology10
            (Text(a), Text(b)) => human_sort::compare(a, b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for ParamValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ParamValue {}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Int(i) => serializer.serialize_i64(*i),
            ParamValue::Float(f) => serializer.serialize_f64(f.into_inner()),
            ParamValue::Bool(b) => serializer.serialize_bool(*b),
            ParamValue::Text(t) => serializer.serialize_str(t),
        }
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = ParamValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a scalar parameter value")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ParamValue, E> {
                Ok(ParamValue::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ParamValue, E> {
                i64::try_from(v)
                    .map(ParamValue::Int)
                    .map_err(|_| E::custom("integer parameter value out of range"))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<ParamValue, E> {
                Ok(ParamValue::Float(OrderedFloat(v)))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<ParamValue, E> {
                Ok(ParamValue::Bool(v))
            }

            // map keys arrive as strings; recover their scalar type
            fn visit_str<E: de::Error>(self, v: &str) -> Result<ParamValue, E> {
                Ok(ParamValue::parse(v))
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

/// One node of the parameter space tree.
///
/// The untagged representation mirrors the archive format: a JSON array of
/// scalars is a value leaf, an object is a named group, an array of anything
/// else is a node list. Only lists of length one are transparent to the
/// walker; longer lists hide their content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpaceNode {
    Values(Vec<ParamValue>),
    Group(BTreeMap<String, SpaceNode>),
    List(Vec<SpaceNode>),
}

impl SpaceNode {
    pub fn values<I, V>(values: I) -> SpaceNode
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        SpaceNode::Values(values.into_iter().map(Into::into).collect())
    }

    pub fn group<I, K>(children: I) -> SpaceNode
    where
        I: IntoIterator<Item = (K, SpaceNode)>,
        K: Into<String>,
    {
        SpaceNode::Group(children.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Wrap a node in a singleton list, the shape the walker descends.
    pub fn singleton(node: SpaceNode) -> SpaceNode {
        SpaceNode::List(vec![node])
    }
}

/// One segment of a path through the space or its scenario-dictionary
/// mirror. The only index the walker ever produces is 0, recording the
/// descent through a singleton list.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn key(name: impl Into<String>) -> Self {
        PathSegment::Key(name.into())
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Render a path for logs and error messages.
pub fn path_to_string(path: &[PathSegment]) -> String {
    path.iter().map(PathSegment::to_string).join("/")
}

#[derive(Debug, Error)]
pub enum SpaceError {
    #[error("path segment {0:?} does not exist in the parameter space")]
    MissingSegment(String),
    #[error("path segment {0:?} does not match the shape of the parameter space")]
    SegmentShape(String),
    #[error("path {0:?} does not terminate in a parameter value leaf")]
    NotALeaf(String),
}

/// The parameter space of an experiment campaign, one subspace per merged
/// archive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterSpace {
    pub subspaces: Vec<SpaceNode>,
}

impl From<SpaceNode> for ParameterSpace {
    fn from(node: SpaceNode) -> Self {
        match node {
            SpaceNode::List(subspaces) => ParameterSpace { subspaces },
            other => ParameterSpace {
                subspaces: vec![other],
            },
        }
    }
}

impl Serialize for ParameterSpace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.subspaces.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParameterSpace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // accept both a single tree and a list of merged trees
        SpaceNode::deserialize(deserializer).map(ParameterSpace::from)
    }
}

impl ParameterSpace {
    /// Graft a subtree beside the generation stages of every subspace. Used
    /// to make execution-side latency parameters addressable like generation
    /// parameters. The subtree is wrapped in a singleton list so the walker
    /// sees through it.
    pub fn graft(&mut self, key: &str, node: SpaceNode) {
        for subspace in &mut self.subspaces {
            if let SpaceNode::Group(children) = subspace {
                children.insert(key.to_string(), SpaceNode::singleton(node.clone()));
            }
        }
    }

    /// Remove values from the leaf addressed by `path` in every subspace.
    pub fn remove_values(
        &mut self,
        path: &[PathSegment],
        excluded: &[ParamValue],
    ) -> Result<(), SpaceError> {
        for values in self.leaf_values_mut(path)? {
            values.retain(|value| !excluded.contains(value));
        }
        Ok(())
    }

    /// Add a value to the leaf addressed by `path` in every subspace, unless
    /// it is already present.
    pub fn push_value(
        &mut self,
        path: &[PathSegment],
        value: ParamValue,
    ) -> Result<(), SpaceError> {
        for values in self.leaf_values_mut(path)? {
            if !values.contains(&value) {
                values.push(value.clone());
            }
        }
        Ok(())
    }

    fn leaf_values_mut(
        &mut self,
        path: &[PathSegment],
    ) -> Result<Vec<&mut Vec<ParamValue>>, SpaceError> {
        let (leaf, prefix) = path
            .split_last()
            .ok_or_else(|| SpaceError::NotALeaf(path_to_string(path)))?;
        let PathSegment::Key(leaf_key) = leaf else {
            return Err(SpaceError::NotALeaf(path_to_string(path)));
        };

        let mut leaves = Vec::new();
        for subspace in &mut self.subspaces {
            let mut node = subspace;
            for segment in prefix {
                node = match segment {
                    PathSegment::Key(key) => match node {
                        SpaceNode::Group(children) => children
                            .get_mut(key)
                            .ok_or_else(|| SpaceError::MissingSegment(key.clone()))?,
                        _ => return Err(SpaceError::SegmentShape(key.clone())),
                    },
                    PathSegment::Index(index) => match node {
                        SpaceNode::List(items) => items
                            .get_mut(*index)
                            .ok_or_else(|| SpaceError::MissingSegment(index.to_string()))?,
                        _ => return Err(SpaceError::SegmentShape(index.to_string())),
                    },
                };
            }
            let SpaceNode::Group(children) = node else {
                return Err(SpaceError::SegmentShape(leaf_key.clone()));
            };
            match children.get_mut(leaf_key) {
                Some(SpaceNode::Values(values)) => leaves.push(values),
                Some(_) => return Err(SpaceError::NotALeaf(path_to_string(path))),
                None => return Err(SpaceError::MissingSegment(leaf_key.clone())),
            }
        }
        Ok(leaves)
    }
}

/// Locate a parameter in the space and collect its value range.
///
/// Returns the path to the leaf and the sorted, deduplicated union of the
/// values over all subspaces. The path must be identical in every subspace
/// containing the parameter; merged archives with diverging layouts are a
/// bug upstream, so divergence panics. A parameter that no subspace knows is
/// logged and reported as `None`; callers skip such keys.
pub fn extract_parameter_range(
    space: &ParameterSpace,
    key: &str,
) -> Option<(Vec<PathSegment>, Vec<ParamValue>)> {
    let min_depth = if key.starts_with(LATENCY_KEY_PREFIX) {
        0
    } else {
        GENERATION_PARAMETER_MIN_DEPTH
    };

    let mut found: Option<(Vec<PathSegment>, Vec<ParamValue>)> = None;
    for subspace in &space.subspaces {
        match find_parameter(subspace, key, min_depth) {
            Some((path, values)) => match &mut found {
                None => found = Some((path, values)),
                Some((existing_path, existing_values)) => {
                    assert_eq!(
                        *existing_path,
                        path,
                        "parameter {key} sits on diverging paths in merged subspaces"
                    );
                    existing_values.extend(values);
                }
            },
            None => {
                log::warn!("parameter {key} not found in a scenario parameter subspace");
            }
        }
    }

    found.map(|(path, values)| {
        let values: Vec<_> = values.into_iter().sorted().dedup().collect();
        (path, values)
    })
}

fn find_parameter(
    node: &SpaceNode,
    key: &str,
    min_depth: i32,
) -> Option<(Vec<PathSegment>, Vec<ParamValue>)> {
    let SpaceNode::Group(children) = node else {
        return None;
    };
    for (name, child) in children {
        if name == key && min_depth <= 0 {
            if let SpaceNode::Values(values) = child {
                return Some((vec![PathSegment::key(name)], values.clone()));
            }
        }
        match child {
            // only singleton lists are transparent
            SpaceNode::List(items) if items.len() == 1 => {
                if let Some((path, values)) = find_parameter(&items[0], key, min_depth - 1) {
                    let mut full = vec![PathSegment::key(name), PathSegment::Index(0)];
                    full.extend(path);
                    return Some((full, values));
                }
            }
            SpaceNode::Group(_) => {
                if let Some((path, values)) = find_parameter(child, key, min_depth - 1) {
                    let mut full = vec![PathSegment::key(name)];
                    full.extend(path);
                    return Some((full, values));
                }
            }
            _ => {}
        }
    }
    None
}
