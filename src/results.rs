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
//! Typed views of the reduced per-scenario result summaries.
//!
//! The reduction step boils each experiment down to aggregates per scenario
//! (and, for randomized rounding, per execution). These are the structures
//! the plotters read; their serde shape is the archive wire format.

use std::{collections::BTreeMap, fmt, sync::Once};

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use thiserror::Error;

use crate::{
    aggregation::AggregatedData,
    settings::{RandRoundSettings, VineSettings},
};

#[derive(Debug, Error)]
#[error("invalid load key {0:?}, expected \"resource:element\"")]
pub struct LoadKeyParseError(String);

/// Substrate resource addressed by a load entry. The first component is the
/// resource type; `"universal"` marks a node resource, every other type an
/// edge resource.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct LoadKey(pub String, pub String);

impl LoadKey {
    pub fn node(element: impl Into<String>) -> Self {
        LoadKey("universal".to_string(), element.into())
    }

    pub fn is_node_resource(&self) -> bool {
        self.0 == "universal"
    }
}

impl fmt::Display for LoadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}

impl From<LoadKey> for String {
    fn from(key: LoadKey) -> String {
        key.to_string()
    }
}

impl TryFrom<String> for LoadKey {
    type Error = LoadKeyParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let (resource, element) = s
            .split_once(':')
            .ok_or_else(|| LoadKeyParseError(s.clone()))?;
        Ok(LoadKey(resource.to_string(), element.to_string()))
    }
}

/// Summary of the repetitions of one ViNE settings combination on one
/// scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VineResult {
    pub profit: AggregatedData,
    pub total_runtime: AggregatedData,
    pub load: BTreeMap<LoadKey, f64>,
}

impl VineResult {
    fn node_loads(&self) -> impl Iterator<Item = f64> + '_ {
        static UNIVERSAL_ONLY: Once = Once::new();
        UNIVERSAL_ONLY.call_once(|| {
            log::warn!("load summaries only consider the universal node type");
        });
        self.load
            .iter()
            .filter(|(key, _)| key.is_node_resource())
            .map(|(_, load)| *load)
    }

    fn edge_loads(&self) -> impl Iterator<Item = f64> + '_ {
        self.load
            .iter()
            .filter(|(key, _)| !key.is_node_resource())
            .map(|(_, load)| *load)
    }

    pub fn average_node_load(&self) -> f64 {
        Statistics::mean(self.node_loads())
    }

    pub fn max_node_load(&self) -> f64 {
        self.node_loads().fold(f64::NAN, f64::max)
    }

    pub fn average_edge_load(&self) -> f64 {
        Statistics::mean(self.edge_loads())
    }

    pub fn max_edge_load(&self) -> f64 {
        self.edge_loads().fold(f64::NAN, f64::max)
    }

    pub fn average_load(&self) -> f64 {
        Statistics::mean(self.load.values())
    }

    pub fn max_load(&self) -> f64 {
        self.load.values().copied().fold(f64::NAN, f64::max)
    }
}

/// All ViNE results of one scenario, keyed by settings name. The archives
/// store a list per settings key; it holds exactly one entry per scenario,
/// and every accessor reads the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VineScenarioResults(pub BTreeMap<VineSettings, Vec<VineResult>>);

impl VineScenarioResults {
    pub fn result(&self, settings: &VineSettings) -> Option<&VineResult> {
        self.0.get(settings).and_then(|results| results.first())
    }

    /// Best mean-aggregate maximum profit over the given settings, NaN when
    /// none of them are present.
    pub fn best_profit(&self, settings: &[VineSettings]) -> f64 {
        settings
            .iter()
            .filter_map(|s| self.result(s))
            .map(|result| result.profit.max)
            .fold(f64::NAN, f64::max)
    }
}

/// Summary of one randomized-rounding execution on one scenario. Besides
/// the per-settings rounding outcomes this carries the runtime breakdown of
/// the separation LP that all rounding variants share.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RandRoundResult {
    pub profits: BTreeMap<RandRoundSettings, AggregatedData>,
    pub rounding_runtimes: BTreeMap<RandRoundSettings, AggregatedData>,
    pub lp_profit: f64,
    pub lp_time_preprocess: f64,
    pub lp_time_optimization: f64,
    pub lp_time_dynvmp_initialization: AggregatedData,
    pub lp_time_tree_decomposition: AggregatedData,
    pub lp_time_gurobi_optimization: AggregatedData,
    /// One aggregate per request of the scenario.
    pub lp_time_dynvmp_computation: Vec<AggregatedData>,
    pub lp_generated_columns: u64,
    pub latency_information: AggregatedData,
}

impl RandRoundResult {
    /// Best maximum profit over the given settings, NaN when none of them
    /// are present.
    pub fn best_profit(&self, settings: &[RandRoundSettings]) -> f64 {
        settings
            .iter()
            .filter_map(|s| self.profits.get(s))
            .map(|profit| profit.max)
            .fold(f64::NAN, f64::max)
    }

    /// Wall time of the whole execution: LP preprocessing and optimization
    /// plus the summed DynVMP initializations.
    pub fn total_runtime(&self) -> f64 {
        self.lp_time_optimization
            + self.lp_time_preprocess
            + self.lp_time_dynvmp_initialization.sum()
    }

    /// Mean rounding runtime of each of the given settings that was run.
    pub fn rounding_runtime_means(&self, settings: &[RandRoundSettings]) -> Vec<f64> {
        settings
            .iter()
            .filter_map(|s| self.rounding_runtimes.get(s))
            .map(|runtime| runtime.mean)
            .collect()
    }
}
