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
//! Selecting scenarios by the parameter values they were generated with.
//!
//! The scenario parameter dictionary mirrors the parameter space tree, but
//! every value leaf maps each parameter value to the set of scenario ids
//! generated with it. For a fixed parameter those sets partition the
//! scenario universe, which is what makes intersecting lookups across
//! several parameters meaningful.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    parameters::space::{path_to_string, ParamValue, PathSegment},
    ScenarioSet,
};

/// One node of the scenario parameter dictionary.
///
/// Untagged like [`super::SpaceNode`]; the variant order matters for
/// deserialization: a JSON object whose values are all id arrays is a value
/// leaf, any other object is a group. The `All` variant covers the bare
/// convenience id sets stored under `"all"` keys at group levels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DictNode {
    Scenarios(BTreeMap<ParamValue, ScenarioSet>),
    Group(BTreeMap<String, DictNode>),
    List(Vec<DictNode>),
    All(ScenarioSet),
}

impl DictNode {
    pub fn scenarios<I, V>(entries: I) -> DictNode
    where
        I: IntoIterator<Item = (V, ScenarioSet)>,
        V: Into<ParamValue>,
    {
        DictNode::Scenarios(entries.into_iter().map(|(v, s)| (v.into(), s)).collect())
    }

    pub fn group<I, K>(children: I) -> DictNode
    where
        I: IntoIterator<Item = (K, DictNode)>,
        K: Into<String>,
    {
        DictNode::Group(children.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    fn shape(&self) -> &'static str {
        match self {
            DictNode::Scenarios(_) => "value map",
            DictNode::Group(_) => "group",
            DictNode::List(_) => "list",
            DictNode::All(_) => "id set",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("key {key:?} missing at {path:?} in the scenario parameter dictionary")]
    MissingKey { key: String, path: String },
    #[error("index {index} missing at {path:?} in the scenario parameter dictionary")]
    MissingIndex { index: usize, path: String },
    #[error("segment {segment:?} hit a {found} node in the scenario parameter dictionary")]
    SegmentShape { segment: String, found: &'static str },
    #[error("parameter at {path:?} has no scenario set for value {value}")]
    UnknownValue { path: String, value: String },
    #[error("path {path:?} ends at a {found} node, expected a value map")]
    NotALeaf { path: String, found: &'static str },
}

/// Resolve the scenario ids generated with `value` for the parameter leaf
/// addressed by `path`.
///
/// The path comes from walking the matching parameter space, so every miss
/// here means the dictionary and the space disagree; that is corrupt input
/// and reported as a hard error rather than an empty set.
pub fn lookup_scenarios_having_specific_values(
    dict: &DictNode,
    path: &[PathSegment],
    value: &ParamValue,
) -> Result<ScenarioSet, SelectionError> {
    let mut node = dict;
    for segment in path {
        node = match segment {
            PathSegment::Key(key) => match node {
                DictNode::Group(children) => {
                    children.get(key).ok_or_else(|| SelectionError::MissingKey {
                        key: key.clone(),
                        path: path_to_string(path),
                    })?
                }
                other => {
                    return Err(SelectionError::SegmentShape {
                        segment: key.clone(),
                        found: other.shape(),
                    })
                }
            },
            PathSegment::Index(index) => match node {
                DictNode::List(items) => {
                    items
                        .get(*index)
                        .ok_or_else(|| SelectionError::MissingIndex {
                            index: *index,
                            path: path_to_string(path),
                        })?
                }
                other => {
                    return Err(SelectionError::SegmentShape {
                        segment: index.to_string(),
                        found: other.shape(),
                    })
                }
            },
        };
    }
    match node {
        DictNode::Scenarios(map) => {
            map.get(value)
                .cloned()
                .ok_or_else(|| SelectionError::UnknownValue {
                    path: path_to_string(path),
                    value: value.to_string(),
                })
        }
        other => Err(SelectionError::NotALeaf {
            path: path_to_string(path),
            found: other.shape(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ids(range: impl IntoIterator<Item = usize>) -> ScenarioSet {
        range.into_iter().collect()
    }

    /// Dictionary shaped like the space in `space::test`: 32 scenarios with
    /// two request counts and four edge resource factors.
    fn dictionary() -> DictNode {
        DictNode::group([(
            "scenario_generation",
            DictNode::List(vec![DictNode::group([(
                "request_generation",
                DictNode::group([(
                    "cactus",
                    DictNode::group([
                        (
                            "CactusRequestGenerator",
                            DictNode::group([
                                (
                                    "number_of_requests",
                                    DictNode::scenarios([
                                        (20i64, ids((0..32).filter(|i| i % 2 == 0))),
                                        (30i64, ids((0..32).filter(|i| i % 2 == 1))),
                                    ]),
                                ),
                                (
                                    "edge_resource_factor",
                                    DictNode::scenarios([
                                        (0.25, ids(0..8)),
                                        (0.5, ids(8..16)),
                                        (0.75, ids(16..24)),
                                        (0.8, ids(24..32)),
                                    ]),
                                ),
                            ]),
                        ),
                        ("all", DictNode::All(ids(0..32))),
                    ]),
                )]),
            )])]),
        )])
    }

    fn request_path() -> Vec<PathSegment> {
        vec![
            PathSegment::key("scenario_generation"),
            PathSegment::Index(0),
            PathSegment::key("request_generation"),
            PathSegment::key("cactus"),
            PathSegment::key("CactusRequestGenerator"),
            PathSegment::key("number_of_requests"),
        ]
    }

    #[test]
    fn lookup_resolves_value_sets() {
        let dict = dictionary();
        let evens = lookup_scenarios_having_specific_values(
            &dict,
            &request_path(),
            &ParamValue::Int(20),
        )
        .unwrap();
        assert_eq!(evens, ids((0..32).filter(|i| i % 2 == 0)));
    }

    #[test]
    fn value_sets_partition_the_universe() {
        let dict = dictionary();
        let path = request_path();
        let evens =
            lookup_scenarios_having_specific_values(&dict, &path, &ParamValue::Int(20)).unwrap();
        let odds =
            lookup_scenarios_having_specific_values(&dict, &path, &ParamValue::Int(30)).unwrap();
        assert!(evens.is_disjoint(&odds));
        let union: ScenarioSet = evens.union(&odds).copied().collect();
        assert_eq!(union, ids(0..32));
    }

    #[test]
    fn missing_key_is_a_hard_error() {
        let dict = dictionary();
        let mut path = request_path();
        path[3] = PathSegment::key("star");
        let err = lookup_scenarios_having_specific_values(&dict, &path, &ParamValue::Int(20))
            .unwrap_err();
        assert!(matches!(err, SelectionError::MissingKey { .. }));
    }

    #[test]
    fn missing_value_is_a_hard_error() {
        let dict = dictionary();
        let err = lookup_scenarios_having_specific_values(
            &dict,
            &request_path(),
            &ParamValue::Int(999),
        )
        .unwrap_err();
        assert!(matches!(err, SelectionError::UnknownValue { .. }));
    }

    #[test]
    fn wrong_shape_is_a_hard_error() {
        let dict = dictionary();
        // an index segment cannot descend a group
        let path = vec![PathSegment::Index(0)];
        let err = lookup_scenarios_having_specific_values(&dict, &path, &ParamValue::Int(20))
            .unwrap_err();
        assert!(matches!(err, SelectionError::SegmentShape { .. }));

        // a path ending on a group is not a value leaf
        let path = vec![PathSegment::key("scenario_generation"), PathSegment::Index(0)];
        let err = lookup_scenarios_having_specific_values(&dict, &path, &ParamValue::Int(20))
            .unwrap_err();
        assert!(matches!(err, SelectionError::NotALeaf { .. }));
    }

    #[test]
    fn float_and_text_keys_survive_serde() {
        let json = r#"{
            "edge_resource_factor": {"0.25": [0, 1], "0.5": [2, 3]},
            "topology": {"Geant2012": [0, 2], "Funet": [1, 3]}
        }"#;
        let dict: DictNode = serde_json::from_str(json).unwrap();
        let erf = lookup_scenarios_having_specific_values(
            &dict,
            &[PathSegment::key("edge_resource_factor")],
            &0.25.into(),
        )
        .unwrap();
        assert_eq!(erf, ids([0, 1]));
        let topo = lookup_scenarios_having_specific_values(
            &dict,
            &[PathSegment::key("topology")],
            &"Funet".into(),
        )
        .unwrap();
        assert_eq!(topo, ids([1, 3]));
    }

    #[test]
    fn group_with_all_set_deserializes_as_group() {
        let json = r#"{
            "all": [0, 1, 2, 3],
            "CactusRequestGenerator": {
                "number_of_requests": {"20": [0, 1], "30": [2, 3]}
            }
        }"#;
        let dict: DictNode = serde_json::from_str(json).unwrap();
        let set = lookup_scenarios_having_specific_values(
            &dict,
            &[
                PathSegment::key("CactusRequestGenerator"),
                PathSegment::key("number_of_requests"),
            ],
            &ParamValue::Int(30),
        )
        .unwrap();
        assert_eq!(set, ids([2, 3]));
    }
}
