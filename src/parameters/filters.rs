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
//! Scenario filters: every plot family is rendered once per filter, where a
//! filter restricts the scenario universe to fixed values of some generation
//! parameters.

use std::fmt;

use itertools::Itertools;

use crate::{
    parameters::{
        selection::{lookup_scenarios_having_specific_values, DictNode, SelectionError},
        space::{extract_parameter_range, ParamValue, ParameterSpace, PathSegment},
    },
    ScenarioSet,
};

/// One conjunct of a scenario filter: the named parameter is fixed to
/// `value`. The resolved path is cached at construction so that repeated
/// lookups skip the space walk.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterSpec {
    pub parameter: String,
    pub path: Vec<PathSegment>,
    pub value: ParamValue,
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.parameter, self.value)
    }
}

/// Build the full filter grid over the given parameter keys.
///
/// The first entry is always `None`, the unfiltered baseline. After that,
/// every combination of `1..=maxdepth` distinct parameters is crossed with
/// every assignment of their value ranges, so for `k` resolvable keys the
/// total count is `1 + sum_{i=1..maxdepth} sum_{|c|=i} prod_{j in c} |V_j|`.
/// Keys the space walker cannot resolve are dropped (the walker logs them).
pub fn construct_filter_specs(
    space: &ParameterSpace,
    parameter_filter_keys: &[String],
    maxdepth: usize,
) -> Vec<Option<Vec<FilterSpec>>> {
    let ranges: Vec<(String, Vec<PathSegment>, Vec<ParamValue>)> = parameter_filter_keys
        .iter()
        .filter_map(|key| {
            extract_parameter_range(space, key)
                .map(|(path, values)| (key.clone(), path, values))
        })
        .collect();

    let mut result: Vec<Option<Vec<FilterSpec>>> = vec![None];
    for depth in 1..=maxdepth {
        for combination in ranges.iter().combinations(depth) {
            for assignment in combination
                .iter()
                .map(|(_, _, values)| values.iter().cloned())
                .multi_cartesian_product()
            {
                let specs = combination
                    .iter()
                    .zip(assignment)
                    .map(|((parameter, path, _), value)| FilterSpec {
                        parameter: parameter.clone(),
                        path: path.clone(),
                        value,
                    })
                    .collect();
                result.push(Some(specs));
            }
        }
    }
    result
}

/// Intersect the scenario universe with the scenarios matching every filter
/// conjunct.
pub fn scenarios_matching_filters(
    dict: &DictNode,
    universe: &ScenarioSet,
    filter_specs: &[FilterSpec],
) -> Result<ScenarioSet, SelectionError> {
    let mut result = universe.clone();
    for spec in filter_specs {
        let matching = lookup_scenarios_having_specific_values(dict, &spec.path, &spec.value)?;
        result = result.intersection(&matching).copied().collect();
    }
    Ok(result)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parameters::space::SpaceNode;

    fn space() -> ParameterSpace {
        SpaceNode::group([(
            "gen",
            SpaceNode::group([(
                "req",
                SpaceNode::group([
                    ("number_of_requests", SpaceNode::values([20i64, 30])),
                    ("edge_resource_factor", SpaceNode::values([0.25, 0.5, 0.75])),
                ]),
            )]),
        )])
        .into()
    }

    fn keys() -> Vec<String> {
        vec![
            "number_of_requests".to_string(),
            "edge_resource_factor".to_string(),
        ]
    }

    #[test]
    fn filter_spec_count_matches_the_formula() {
        // 1 + (|V1| + |V2|) + |V1| * |V2|
        let specs = construct_filter_specs(&space(), &keys(), 2);
        assert_eq!(specs.len(), 1 + (2 + 3) + 2 * 3);
        assert!(specs[0].is_none());
        assert!(specs[1..].iter().all(Option::is_some));

        // depth 1 keeps single conjuncts, depth 2 pairs them
        let singles = specs[1..=5]
            .iter()
            .flatten()
            .map(Vec::len)
            .collect::<Vec<_>>();
        assert_eq!(singles, vec![1; 5]);
        let pairs = specs[6..].iter().flatten().map(Vec::len).collect::<Vec<_>>();
        assert_eq!(pairs, vec![2; 6]);
    }

    #[test]
    fn maxdepth_one_has_no_pairs() {
        let specs = construct_filter_specs(&space(), &keys(), 1);
        assert_eq!(specs.len(), 1 + 5);
    }

    #[test]
    fn maxdepth_beyond_key_count_adds_nothing() {
        let two = construct_filter_specs(&space(), &keys(), 2);
        let ten = construct_filter_specs(&space(), &keys(), 10);
        assert_eq!(two.len(), ten.len());
    }

    #[test]
    fn unresolvable_keys_are_dropped() {
        let mut keys = keys();
        keys.push("no_such_parameter".to_string());
        let specs = construct_filter_specs(&space(), &keys, 2);
        assert_eq!(specs.len(), 1 + 5 + 6);
    }

    #[test]
    fn no_keys_yields_only_the_baseline() {
        let specs = construct_filter_specs(&space(), &[], 2);
        assert_eq!(specs.len(), 1);
        assert!(specs[0].is_none());
    }

    #[test]
    fn filter_display_names_parameter_and_value() {
        let specs = construct_filter_specs(&space(), &keys(), 1);
        let first = specs[1].as_ref().unwrap();
        assert_eq!(first[0].to_string(), "number_of_requests_20");
    }

    #[test]
    fn filters_intersect_from_the_universe() {
        let dict = DictNode::group([(
            "gen",
            DictNode::group([(
                "req",
                DictNode::group([
                    (
                        "number_of_requests",
                        DictNode::scenarios([
                            (20i64, (0..8).collect::<ScenarioSet>()),
                            (30i64, (8..16).collect()),
                        ]),
                    ),
                    (
                        "edge_resource_factor",
                        DictNode::scenarios([
                            (0.25, (0..16).step_by(2).collect::<ScenarioSet>()),
                            (0.5, (0..16).skip(1).step_by(2).collect()),
                        ]),
                    ),
                ]),
            )]),
        )]);
        let universe: ScenarioSet = (0..16).collect();

        let specs = vec![
            FilterSpec {
                parameter: "number_of_requests".to_string(),
                path: vec![
                    PathSegment::key("gen"),
                    PathSegment::key("req"),
                    PathSegment::key("number_of_requests"),
                ],
                value: ParamValue::Int(20),
            },
            FilterSpec {
                parameter: "edge_resource_factor".to_string(),
                path: vec![
                    PathSegment::key("gen"),
                    PathSegment::key("req"),
                    PathSegment::key("edge_resource_factor"),
                ],
                value: 0.25.into(),
            },
        ];
        let matching = scenarios_matching_filters(&dict, &universe, &specs).unwrap();
        assert_eq!(matching, [0, 2, 4, 6].into_iter().collect::<ScenarioSet>());

        // conjunct order does not matter
        let reversed: Vec<FilterSpec> = specs.iter().rev().cloned().collect();
        let swapped = scenarios_matching_filters(&dict, &universe, &reversed).unwrap();
        assert_eq!(swapped, matching);

        // an unknown value surfaces as an error, not an empty set
        let mut bad = specs;
        bad[0].value = ParamValue::Int(999);
        assert!(scenarios_matching_filters(&dict, &universe, &bad).is_err());
    }
}
