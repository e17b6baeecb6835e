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
//! Plot drivers turning loaded result archives into HTML figures plus raw
//! CSV dumps.
//!
//! Every plotter renders one plot family and is invoked once per scenario
//! filter. Output paths encode the date, the axes, the settings group and the
//! filter, so repeated invocations fill one directory tree:
//!
//! ```text
//! <base>/<date>/html/<axes folder>/<settings group>/<filter dirs>/<name>__<filter>.html
//! ```
//!
//! Plots whose output file already exists are skipped unless overwriting is
//! requested, which makes interrupted evaluation runs cheap to resume.

pub mod heatmap;
pub mod profiles;
pub mod runtime;

pub use heatmap::{ComparisonHeatmapPlotter, LatencyHeatmapPlotter, SingleHeatmapPlotter};
pub use profiles::ProfileComparisonPlotter;
pub use runtime::{
    latency_boxplot_axes, runtime_boxplot_axes, runtime_metrics, BoxplotAxes, RuntimeBoxplotPlotter,
    RuntimeMetric,
};

use std::{
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use statrs::statistics::Statistics;
use thiserror::Error;

use crate::{
    parameters::{
        lookup_scenarios_having_specific_values, scenarios_matching_filters,
        extract_parameter_range, DictNode, FilterSpec, ParamValue, ParameterSpace, PathSegment,
        SelectionError, SpaceError,
    },
    specs::HeatmapPlotType,
    storage::{AlgorithmLookup, StorageError},
    util::PathBufExt,
    ExecutionSet, ScenarioSet,
};

/// Plotly renders to standalone HTML; the raw data lands next to it as CSV.
pub(crate) const OUTPUT_FILETYPE: &str = "html";

/// The latency-free baseline archive records exactly one execution.
pub(crate) const BASELINE_EXECUTION_ID: crate::ExecutionId = 0;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Space(#[from] SpaceError),
    #[error("axis parameter {0:?} does not span the scenario space")]
    UnknownAxisParameter(String),
    #[error("spec {spec:?} belongs to family {actual}, this plotter renders {expected}")]
    ForeignSpec {
        spec: String,
        actual: HeatmapPlotType,
        expected: HeatmapPlotType,
    },
    #[error("spec {0:?} carries a metric binding of the wrong shape")]
    BindingShape(String),
}

/// Options shared by all plotters.
#[derive(Debug, Clone)]
pub struct PlotterOptions {
    /// Root of the output tree.
    pub output_base: PathBuf,
    /// Re-render plots whose output file already exists.
    pub overwrite: bool,
    /// Strip figure titles for print-ready output.
    pub paper_mode: bool,
    /// Scenarios excluded from every plot.
    pub forbidden_scenario_ids: ScenarioSet,
}

impl PlotterOptions {
    pub fn new(output_base: impl Into<PathBuf>) -> Self {
        PlotterOptions {
            output_base: output_base.into(),
            overwrite: true,
            paper_mode: true,
            forbidden_scenario_ids: ScenarioSet::new(),
        }
    }

    /// Directory of an axes-bound plot:
    /// `<base>/<date>/html/<axes folder>/<settings group>/<filter dirs>`.
    pub(crate) fn output_directory(
        &self,
        axes_foldername: &str,
        alg_variant: &str,
        filter: Option<&[FilterSpec]>,
    ) -> PathBuf {
        let mut dir = self.dated_root().then(axes_foldername).then(alg_variant);
        for spec in filter.unwrap_or_default() {
            dir = dir.then(spec.to_string());
        }
        dir
    }

    /// Directory of the plots not tied to an axes pair.
    pub(crate) fn general_output_directory(&self, filter: Option<&[FilterSpec]>) -> PathBuf {
        let mut dir = self.dated_root().then("general_plots");
        for spec in filter.unwrap_or_default() {
            dir = dir.then(spec.to_string());
        }
        dir
    }

    fn dated_root(&self) -> PathBuf {
        self.output_base
            .join(chrono::Utc::now().format("%Y-%m-%d").to_string())
            .then(OUTPUT_FILETYPE)
    }
}

/// Filter part of an output file name: `no_filter` or the conjuncts joined
/// by underscores.
pub(crate) fn filter_filename_part(filter: Option<&[FilterSpec]>) -> String {
    match filter {
        None => "no_filter".to_string(),
        Some(specs) => specs.iter().map(ToString::to_string).join("_"),
    }
}

pub(crate) fn plot_filename(base: &str, filter: Option<&[FilterSpec]>) -> String {
    format!(
        "{base}__{}.{OUTPUT_FILETYPE}",
        filter_filename_part(filter)
    )
}

/// Skip rendering when the target exists and overwriting is disabled.
pub(crate) fn should_skip(path: &Path, overwrite: bool) -> bool {
    if path.exists() && !overwrite {
        log::info!("skipping existing plot {}", path.display());
        true
    } else {
        false
    }
}

/// A filter pinning an axis parameter would collapse that axis to a single
/// value; such combinations are skipped.
pub(crate) fn filter_conflicts_with_parameters(
    filter: Option<&[FilterSpec]>,
    parameters: &[&str],
) -> bool {
    match filter
        .unwrap_or_default()
        .iter()
        .find(|spec| parameters.contains(&spec.parameter.as_str()))
    {
        Some(spec) => {
            log::debug!(
                "filter on {} conflicts with a plot axis, skipping",
                spec.parameter
            );
            true
        }
        None => false,
    }
}

/// Resolve an axis parameter against a parameter room. The range comes back
/// ascending. A parameter the room does not know, or knows with an empty
/// range, cannot span an axis.
pub(crate) fn resolve_axis(
    room: &ParameterSpace,
    parameter: &str,
) -> Result<(Vec<PathSegment>, Vec<ParamValue>), PlotError> {
    match extract_parameter_range(room, parameter) {
        Some((_, values)) if values.is_empty() => {
            Err(PlotError::UnknownAxisParameter(parameter.to_string()))
        }
        Some(range) => Ok(range),
        None => Err(PlotError::UnknownAxisParameter(parameter.to_string())),
    }
}

/// The scenarios generated with one value of an axis parameter. Latency
/// parameters vary per execution instead of per scenario, so they leave the
/// scenario side unrestricted; the execution lookup narrows those plots.
pub(crate) fn scenarios_for_axis_value(
    dict: &DictNode,
    universe: &ScenarioSet,
    parameter: &str,
    path: &[PathSegment],
    value: &ParamValue,
) -> Result<ScenarioSet, PlotError> {
    if parameter.starts_with(crate::parameters::LATENCY_KEY_PREFIX) {
        return Ok(universe.clone());
    }
    Ok(lookup_scenarios_having_specific_values(dict, path, value)?)
}

/// Executions carrying `value` of a latency axis parameter, reduced to a
/// base execution set. Scenario parameters leave the execution side
/// unrestricted.
pub(crate) fn executions_for_axis_value(
    lookup: &AlgorithmLookup,
    base: &ExecutionSet,
    parameter: &str,
    value: &ParamValue,
) -> ExecutionSet {
    if !parameter.starts_with(crate::parameters::LATENCY_KEY_PREFIX) {
        return base.clone();
    }
    match lookup.executions_with(parameter, value) {
        Some(executions) => executions.intersection(base).copied().collect(),
        None => ExecutionSet::new(),
    }
}

/// The scenario universe reduced to the filter conjuncts, minus the
/// excluded scenarios.
pub(crate) fn allowed_scenarios(
    dict: &DictNode,
    universe: &ScenarioSet,
    filter: &[&FilterSpec],
    forbidden: &ScenarioSet,
) -> Result<ScenarioSet, PlotError> {
    let specs: Vec<FilterSpec> = filter.iter().map(|spec| (*spec).clone()).collect();
    let mut allowed = scenarios_matching_filters(dict, universe, &specs)?;
    allowed.retain(|id| !forbidden.contains(id));
    Ok(allowed)
}

/// Split filter conjuncts into the scenario-side ones and the ones naming
/// per-execution latency parameters.
pub(crate) fn partition_latency_filters(
    filter: Option<&[FilterSpec]>,
) -> (Vec<&FilterSpec>, Vec<&FilterSpec>) {
    filter
        .unwrap_or_default()
        .iter()
        .partition(|spec| !spec.parameter.starts_with(crate::parameters::LATENCY_KEY_PREFIX))
}

/// Mean over the non-NaN entries; NaN when none remain.
pub(crate) fn nanmean(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if finite.is_empty() {
        f64::NAN
    } else {
        Statistics::mean(&finite)
    }
}

/// Cell value shown in a heatmap: the metric's own rounding when given, two
/// decimals otherwise.
pub(crate) fn round_cell(value: f64, rounding: Option<fn(f64) -> f64>) -> f64 {
    match rounding {
        Some(round) => round(value),
        None => (value * 100.0).round() / 100.0,
    }
}

/// Color bar labels; ranges reaching into the thousands are compacted to
/// `Nk`.
pub(crate) fn colorbar_tick_labels(ticks: &[f64]) -> Vec<String> {
    let kilo = ticks.last().map(|tick| *tick >= 1000.0).unwrap_or(false);
    ticks
        .iter()
        .map(|tick| {
            if kilo {
                format!("{}k", (tick / 1000.0).round() as i64)
            } else {
                format!("{tick}")
            }
        })
        .collect()
}

/// Substrate topology names are abbreviated to keep tick labels short.
pub(crate) fn axis_tick_label(value: &ParamValue) -> String {
    let label = value.to_string();
    match label.as_str() {
        "Funet" => "Fn".to_string(),
        "Eunetworks" => "Enw".to_string(),
        "Noel" => "Nl".to_string(),
        "Netrail" => "Ntr".to_string(),
        "Oxford" => "Ox".to_string(),
        _ => label,
    }
}

/// Raw data dump next to each plot, same directory and stem with a `.csv`
/// extension.
pub(crate) fn csv_writer(path: &Path) -> Result<csv::Writer<fs::File>, PlotError> {
    Ok(csv::WriterBuilder::new().from_writer(
        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .append(false)
            .truncate(true)
            .open(path)?,
    ))
}

/// Inferno samples tinting grouped box traces.
const TRACE_COLORS: [&str; 8] = [
    "#000004", "#1f0c48", "#550f6d", "#88226a", "#ba3655", "#e35933", "#f98c0a", "#f9c932",
];

pub(crate) fn trace_color(index: usize, count: usize) -> &'static str {
    let slot = (index * TRACE_COLORS.len()) / count.max(1);
    TRACE_COLORS[slot.min(TRACE_COLORS.len() - 1)]
}
