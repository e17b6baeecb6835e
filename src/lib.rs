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
//! Library for evaluating and plotting the results of VNEP approximation
//! experiment campaigns: ViNE-style heuristics against randomized rounding of
//! a separation LP, plus a study of latency-constrained executions against a
//! latency-free baseline.
use std::collections::BTreeSet;

/// Identifier of one generated scenario within an experiment campaign.
pub type ScenarioId = usize;
/// Identifier of one algorithm execution (one parameter combination).
pub type ExecutionId = usize;

/// Ordered scenario-id sets keep iteration, logs and dumps deterministic.
pub type ScenarioSet = BTreeSet<ScenarioId>;
pub type ExecutionSet = BTreeSet<ExecutionId>;

pub mod aggregation;
pub mod evaluation;
pub mod parameters;
pub mod plotters;
pub mod results;
pub mod settings;
pub mod specs;
pub mod storage;
pub mod util;

pub mod prelude {
    pub use super::{
        aggregation::AggregatedData,
        parameters::{FilterSpec, ParamValue, ParameterSpace, PathSegment},
        results::{RandRoundResult, VineResult, VineScenarioResults},
        settings::{RandRoundSettings, VineSettings},
        specs::{HeatmapPlotType, HeatmapSpecRegistry},
        storage::ExperimentStorage,
        ExecutionId, ExecutionSet, ScenarioId, ScenarioSet,
    };
}
