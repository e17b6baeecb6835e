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
//! Reading the reduced result archives and preparing them for plotting.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::{
    parameters::{
        extract_parameter_range, lookup_scenarios_having_specific_values, DictNode, ParamValue,
        ParameterSpace, SelectionError, SpaceError, SpaceNode,
    },
    ExecutionId, ExecutionSet, ScenarioId, ScenarioSet,
};

/// The parameters grafted onto the scenario parameter room by the latency
/// study; they vary per execution, not per scenario.
const LATENCY_PARAMETER_KEYS: [&str; 3] = [
    "latency_approximation_factor",
    "latency_approximation_limit",
    "latency_approximation_type",
];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("no *_aggregated_results.json archive under {0}")]
    NoArchive(PathBuf),
    #[error("expected a single aggregated results archive under {path}, found {count}")]
    AmbiguousArchive { path: PathBuf, count: usize },
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
    #[error(transparent)]
    Glob(#[from] glob::GlobError),
    #[error("unknown algorithm id {id:?}, the archive contains {known:?}")]
    UnknownAlgorithm { id: String, known: Vec<String> },
    #[error("no executions recorded for algorithm parameter {parameter:?}")]
    UnknownExecutionParameter { parameter: String },
    #[error("no executions recorded for algorithm parameter {parameter:?} = {value}")]
    UnknownExecutionValue { parameter: String, value: ParamValue },
    #[error("cannot exclude values of {0:?}, not a generation parameter of the archive")]
    UnknownParameter(String),
    #[error("cannot exclude {value} of {parameter:?}, not among the generated values")]
    ValueOutsideRange { parameter: String, value: ParamValue },
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Space(#[from] SpaceError),
}

/// The scenario-generation side of an archive: the parameter space the
/// scenarios were generated from and the reverse mapping from parameter
/// values to scenario ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameterContainer {
    pub scenarioparameter_room: ParameterSpace,
    pub scenario_parameter_dict: DictNode,
}

/// Reverse lookup from algorithm parameter values to execution ids, per
/// algorithm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmLookup {
    pub all: ExecutionSet,
    pub algorithm_parameters: BTreeMap<String, BTreeMap<ParamValue, ExecutionSet>>,
}

impl AlgorithmLookup {
    /// The executions run with the given algorithm parameter value, if any
    /// were recorded.
    pub fn executions_with(&self, parameter: &str, value: &ParamValue) -> Option<&ExecutionSet> {
        self.algorithm_parameters.get(parameter)?.get(value)
    }

    /// Intersects the full execution universe with the id set of every
    /// requested parameter value. Parameters or values the archive never
    /// recorded are hard errors, as silently dropping a conjunct would
    /// blend results of unrelated executions into one plot.
    pub fn filtered_executions(
        &self,
        filters: &BTreeMap<String, ParamValue>,
    ) -> Result<ExecutionSet, StorageError> {
        let mut executions = self.all.clone();
        for (parameter, value) in filters {
            let per_value = self.algorithm_parameters.get(parameter).ok_or_else(|| {
                StorageError::UnknownExecutionParameter {
                    parameter: parameter.clone(),
                }
            })?;
            let matching =
                per_value
                    .get(value)
                    .ok_or_else(|| StorageError::UnknownExecutionValue {
                        parameter: parameter.clone(),
                        value: value.clone(),
                    })?;
            executions = executions.intersection(matching).copied().collect();
        }
        Ok(executions)
    }
}

/// The execution side of an archive: one parameter assignment per execution
/// id plus the per-algorithm reverse lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParameterContainer {
    pub execution_parameters: Vec<BTreeMap<String, ParamValue>>,
    pub reverse_lookup: BTreeMap<String, AlgorithmLookup>,
}

impl ExecutionParameterContainer {
    pub fn lookup(&self, algorithm: &str) -> Result<&AlgorithmLookup, StorageError> {
        self.reverse_lookup
            .get(algorithm)
            .ok_or_else(|| StorageError::UnknownAlgorithm {
                id: algorithm.to_string(),
                known: self.reverse_lookup.keys().cloned().collect(),
            })
    }
}

/// One reduced result archive: per-algorithm, per-scenario, per-execution
/// result summaries next to the parameter containers describing how the
/// scenarios and executions were generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentStorage<R> {
    pub algorithm_scenario_solution_dictionary:
        BTreeMap<String, BTreeMap<ScenarioId, BTreeMap<ExecutionId, R>>>,
    pub scenario_parameter_container: ScenarioParameterContainer,
    pub execution_parameter_container: ExecutionParameterContainer,
}

impl<R: DeserializeOwned> ExperimentStorage<R> {
    /// Loads an archive. A directory is resolved to the single
    /// `*_aggregated_results.json` file within it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let archive = if path.is_dir() {
            Self::find_archive(path)?
        } else {
            path.to_path_buf()
        };
        log::info!("loading aggregated results from {}", archive.display());
        let serialized = fs::read_to_string(&archive).map_err(|source| StorageError::Io {
            path: archive.clone(),
            source,
        })?;
        serde_json::from_str(&serialized).map_err(|source| StorageError::Json {
            path: archive,
            source,
        })
    }

    fn find_archive(dir: &Path) -> Result<PathBuf, StorageError> {
        let mut pattern = dir.to_string_lossy().to_string();
        pattern.push_str("/*_aggregated_results.json");
        let mut matches = Vec::new();
        for entry in glob::glob(&pattern)? {
            matches.push(entry?);
        }
        match matches.len() {
            0 => Err(StorageError::NoArchive(dir.to_path_buf())),
            1 => Ok(matches.remove(0)),
            count => Err(StorageError::AmbiguousArchive {
                path: dir.to_path_buf(),
                count,
            }),
        }
    }
}

impl<R> ExperimentStorage<R> {
    /// The per-scenario solution maps of one algorithm.
    pub fn algorithm(
        &self,
        id: &str,
    ) -> Result<&BTreeMap<ScenarioId, BTreeMap<ExecutionId, R>>, StorageError> {
        self.algorithm_scenario_solution_dictionary
            .get(id)
            .ok_or_else(|| StorageError::UnknownAlgorithm {
                id: id.to_string(),
                known: self
                    .algorithm_scenario_solution_dictionary
                    .keys()
                    .cloned()
                    .collect(),
            })
    }

    pub fn scenario_ids(&self, algorithm: &str) -> Result<ScenarioSet, StorageError> {
        Ok(self.algorithm(algorithm)?.keys().copied().collect())
    }
}

/// Collects the distinct latency approximation parameters over all recorded
/// executions. Parameters named in `filter` are pinned to exactly the filter
/// value instead, matching the executions the plots will select. The result
/// is meant to be grafted onto the scenario parameter room under
/// `latency_approx`.
pub fn extract_latency_parameters(
    container: &ExecutionParameterContainer,
    filter: &BTreeMap<String, ParamValue>,
) -> SpaceNode {
    SpaceNode::group(LATENCY_PARAMETER_KEYS.into_iter().map(|key| {
        let values: Vec<ParamValue> = match filter.get(key) {
            Some(pinned) => vec![pinned.clone()],
            None => container
                .execution_parameters
                .iter()
                .filter_map(|parameters| parameters.get(key))
                .cloned()
                .collect::<std::collections::BTreeSet<_>>()
                .into_iter()
                .collect(),
        };
        (key, SpaceNode::Values(values))
    }))
}

/// Removes the given generation parameter values from both archives and
/// returns the scenario ids generated with any of them. The ViNE archive is
/// authoritative for ranges and scenario ids; both parameter rooms are
/// pruned so downstream filters no longer offer the excluded values.
pub fn exclude_generation_parameters<V, R>(
    vine: &mut ExperimentStorage<V>,
    rand_round: &mut ExperimentStorage<R>,
    excluded: &BTreeMap<String, Vec<ParamValue>>,
) -> Result<ScenarioSet, StorageError> {
    let mut forbidden = ScenarioSet::new();
    for (parameter, values) in excluded {
        let container = &vine.scenario_parameter_container;
        let (path, range) = extract_parameter_range(&container.scenarioparameter_room, parameter)
            .ok_or_else(|| StorageError::UnknownParameter(parameter.clone()))?;
        for value in values {
            if !range.contains(value) {
                return Err(StorageError::ValueOutsideRange {
                    parameter: parameter.clone(),
                    value: value.clone(),
                });
            }
            forbidden.extend(lookup_scenarios_having_specific_values(
                &container.scenario_parameter_dict,
                &path,
                value,
            )?);
        }
        log::info!(
            "excluding {parameter} in {values:?}, forbidding {} scenarios",
            forbidden.len()
        );
        vine.scenario_parameter_container
            .scenarioparameter_room
            .remove_values(&path, values)?;
        rand_round
            .scenario_parameter_container
            .scenarioparameter_room
            .remove_values(&path, values)?;
    }
    Ok(forbidden)
}
