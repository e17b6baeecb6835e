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
//! Heatmaps over two scenario generation parameters.
//!
//! A cell collects one metric value per (scenario, execution) combination
//! generated with the cell's parameter values and shows the mean. Three
//! drivers share the grid machinery: [`SingleHeatmapPlotter`] reads one
//! archive, [`ComparisonHeatmapPlotter`] joins the ViNE and randomized
//! rounding archives per scenario, and [`LatencyHeatmapPlotter`] spans
//! per-execution latency parameters as plot axes.

use std::fs;
use std::path::Path;

use plotly::{layout::Axis, Layout, Plot, Trace};
use serde::Serialize;

use crate::{
    parameters::{DictNode, FilterSpec, ParamValue, ParameterSpace, PathSegment},
    results::{RandRoundResult, VineScenarioResults},
    specs::{HeatmapAxes, HeatmapPlotType, HeatmapSpec, HeatmapSpecRegistry, MetricBinding},
    storage::ExperimentStorage,
    util::PathBufExt,
    ExecutionId, ExecutionSet, ScenarioSet,
};

use super::{
    allowed_scenarios, axis_tick_label, colorbar_tick_labels, csv_writer,
    executions_for_axis_value, filter_conflicts_with_parameters, nanmean,
    partition_latency_filters, plot_filename, resolve_axis, round_cell, scenarios_for_axis_value,
    should_skip, PlotError, PlotterOptions, BASELINE_EXECUTION_ID,
};

/// Heatmap trace with a pinned value range and explicit color bar ticks.
/// Serializes to the plotly `heatmap` schema; `None` cells become `null`
/// and stay blank.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct BoundedHeatMap {
    #[serde(rename = "type")]
    kind: &'static str,
    x: Vec<String>,
    y: Vec<String>,
    z: Vec<Vec<Option<f64>>>,
    colorscale: &'static str,
    reversescale: bool,
    zauto: bool,
    zmin: f64,
    zmax: f64,
    colorbar: ColorBarTicks,
}

#[derive(Debug, Clone, Serialize)]
struct ColorBarTicks {
    tickmode: &'static str,
    tickvals: Vec<f64>,
    ticktext: Vec<String>,
}

impl BoundedHeatMap {
    fn new(spec: &HeatmapSpec, grid: &HeatmapGrid) -> Self {
        BoundedHeatMap {
            kind: "heatmap",
            x: grid.x_labels.clone(),
            y: grid.y_labels.clone(),
            z: grid.rows.clone(),
            colorscale: spec.colormap.scale_name(),
            reversescale: spec.colormap.reversed(),
            zauto: false,
            zmin: spec.vmin,
            zmax: spec.vmax,
            colorbar: ColorBarTicks {
                tickmode: "array",
                tickvals: spec.colorbar_ticks.clone(),
                ticktext: colorbar_tick_labels(&spec.colorbar_ticks),
            },
        }
    }
}

impl Trace for BoundedHeatMap {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Applies a metric binding to the solution type an archive stores.
pub trait SolutionMetric {
    fn metric_value(metric: &MetricBinding, result: &Self) -> Option<f64>;
}

impl SolutionMetric for VineScenarioResults {
    fn metric_value(metric: &MetricBinding, result: &Self) -> Option<f64> {
        metric.vine(result)
    }
}

impl SolutionMetric for RandRoundResult {
    fn metric_value(metric: &MetricBinding, result: &Self) -> Option<f64> {
        metric.rand_round(result)
    }
}

/// One rendered grid. Rows run top to bottom, so the y range is stored
/// descending and the first row belongs to the largest y value.
struct HeatmapGrid {
    x_labels: Vec<String>,
    y_labels: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
    samples: Vec<Vec<usize>>,
}

#[derive(Serialize)]
struct HeatmapCsvRow<'a> {
    x: &'a str,
    y: &'a str,
    value: Option<f64>,
    samples: usize,
}

/// Reduces the collected metric values of one cell to its displayed value
/// and sample count.
fn finish_cell(spec: &HeatmapSpec, mut values: Vec<f64>) -> (Option<f64>, usize) {
    if let Some(keep) = spec.metric_filter {
        values.retain(|value| keep(*value));
    }
    let samples = values.len();
    let mean = nanmean(&values);
    if mean.is_nan() {
        (None, samples)
    } else {
        (Some(round_cell(mean, spec.rounding)), samples)
    }
}

struct GridAxis {
    parameter: String,
    path: Vec<PathSegment>,
    values: Vec<ParamValue>,
}

struct GridAxes {
    x: GridAxis,
    y: GridAxis,
}

fn resolve_grid_axes(room: &ParameterSpace, axes: &HeatmapAxes) -> Result<GridAxes, PlotError> {
    let (x_path, x_values) = resolve_axis(room, axes.x_parameter)?;
    let (y_path, y_values) = resolve_axis(room, axes.y_parameter)?;
    Ok(GridAxes {
        x: GridAxis {
            parameter: axes.x_parameter.to_string(),
            path: x_path,
            values: x_values,
        },
        y: GridAxis {
            parameter: axes.y_parameter.to_string(),
            path: y_path,
            values: y_values,
        },
    })
}

/// Walks the grid and asks `cell_values` for the metric values of every
/// cell's scenario set. The y axis is iterated descending so the smallest
/// value ends up at the plot origin.
fn build_grid<F>(
    spec: &HeatmapSpec,
    axes: &GridAxes,
    dict: &DictNode,
    universe: &ScenarioSet,
    allowed: &ScenarioSet,
    mut cell_values: F,
) -> Result<HeatmapGrid, PlotError>
where
    F: FnMut(&ParamValue, &ParamValue, &ScenarioSet) -> Result<Vec<f64>, PlotError>,
{
    let mut x_sets = Vec::with_capacity(axes.x.values.len());
    for x_value in &axes.x.values {
        let mut ids =
            scenarios_for_axis_value(dict, universe, &axes.x.parameter, &axes.x.path, x_value)?;
        ids.retain(|id| allowed.contains(id));
        x_sets.push(ids);
    }

    let mut grid = HeatmapGrid {
        x_labels: axes.x.values.iter().map(ToString::to_string).collect(),
        y_labels: Vec::with_capacity(axes.y.values.len()),
        rows: Vec::with_capacity(axes.y.values.len()),
        samples: Vec::with_capacity(axes.y.values.len()),
    };
    for y_value in axes.y.values.iter().rev() {
        let y_set =
            scenarios_for_axis_value(dict, universe, &axes.y.parameter, &axes.y.path, y_value)?;
        let mut row = Vec::with_capacity(axes.x.values.len());
        let mut row_samples = Vec::with_capacity(axes.x.values.len());
        for (x_value, x_set) in axes.x.values.iter().zip(&x_sets) {
            let ids: ScenarioSet = x_set.intersection(&y_set).copied().collect();
            let (value, samples) = finish_cell(spec, cell_values(x_value, y_value, &ids)?);
            row.push(value);
            row_samples.push(samples);
        }
        grid.y_labels.push(axis_tick_label(y_value));
        grid.rows.push(row);
        grid.samples.push(row_samples);
    }
    Ok(grid)
}

fn render_heatmap(
    spec: &HeatmapSpec,
    axes: &HeatmapAxes,
    grid: &HeatmapGrid,
    output: &Path,
    paper_mode: bool,
) -> Result<(), PlotError> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let counts = grid.samples.iter().flatten();
    log::debug!(
        "cell sample counts range from {:?} to {:?}",
        counts.clone().min(),
        counts.max()
    );

    let mut plot = Plot::new();
    plot.add_trace(Box::new(BoundedHeatMap::new(spec, grid)));
    let mut layout = Layout::new()
        .x_axis(Axis::new().title(axes.x_title))
        .y_axis(Axis::new().title(axes.y_title));
    if !paper_mode {
        layout = layout.title(spec.name.clone());
    }
    plot.set_layout(layout);
    log::debug!("Plotting {output:?}");
    plot.write_html(output);

    let mut csv = csv_writer(&output.with_extension("csv"))?;
    for (y, (row, samples)) in grid.y_labels.iter().zip(grid.rows.iter().zip(&grid.samples)) {
        for (x, (value, samples)) in grid.x_labels.iter().zip(row.iter().zip(samples)) {
            csv.serialize(HeatmapCsvRow {
                x,
                y,
                value: *value,
                samples: *samples,
            })?;
        }
    }
    csv.flush()?;
    Ok(())
}

fn guard_plot_type(
    spec: &HeatmapSpec,
    expected: HeatmapPlotType,
) -> Result<(), PlotError> {
    if spec.plot_type != expected {
        return Err(PlotError::ForeignSpec {
            spec: spec.filename.clone(),
            actual: spec.plot_type,
            expected,
        });
    }
    Ok(())
}

/// Heatmaps over a single archive: one metric value per scenario, taken from
/// one fixed execution. Further archives of repeated campaigns can be
/// attached; their values are averaged into the cells scenario by scenario.
pub struct SingleHeatmapPlotter<'a, R> {
    plot_type: HeatmapPlotType,
    algorithm: String,
    execution_id: ExecutionId,
    storage: &'a ExperimentStorage<R>,
    second_storages: Vec<&'a ExperimentStorage<R>>,
    axes: Vec<HeatmapAxes>,
}

impl<'a, R: SolutionMetric> SingleHeatmapPlotter<'a, R> {
    pub fn new(
        plot_type: HeatmapPlotType,
        algorithm: impl Into<String>,
        execution_id: ExecutionId,
        storage: &'a ExperimentStorage<R>,
        axes: Vec<HeatmapAxes>,
    ) -> Self {
        SingleHeatmapPlotter {
            plot_type,
            algorithm: algorithm.into(),
            execution_id,
            storage,
            second_storages: Vec::new(),
            axes,
        }
    }

    pub fn with_second_storages(mut self, storages: Vec<&'a ExperimentStorage<R>>) -> Self {
        self.second_storages = storages;
        self
    }

    pub fn plot_all(
        &self,
        registry: &HeatmapSpecRegistry,
        options: &PlotterOptions,
        filter: Option<&[FilterSpec]>,
    ) -> Result<(), PlotError> {
        for axes in &self.axes {
            for spec in registry.specs(self.plot_type) {
                self.plot_single(spec, axes, options, filter)?;
            }
        }
        Ok(())
    }

    fn plot_single(
        &self,
        spec: &HeatmapSpec,
        axes: &HeatmapAxes,
        options: &PlotterOptions,
        filter: Option<&[FilterSpec]>,
    ) -> Result<(), PlotError> {
        guard_plot_type(spec, self.plot_type)?;
        if filter_conflicts_with_parameters(filter, &[axes.x_parameter, axes.y_parameter]) {
            return Ok(());
        }
        let output = options
            .output_directory(axes.foldername, &spec.alg_variant, filter)
            .then(plot_filename(&spec.filename, filter));
        if should_skip(&output, options.overwrite) {
            return Ok(());
        }

        let container = &self.storage.scenario_parameter_container;
        let grid_axes = resolve_grid_axes(&container.scenarioparameter_room, axes)?;
        let universe = self.storage.scenario_ids(&self.algorithm)?;
        let filter_refs: Vec<&FilterSpec> = filter.unwrap_or_default().iter().collect();
        let allowed = allowed_scenarios(
            &container.scenario_parameter_dict,
            &universe,
            &filter_refs,
            &options.forbidden_scenario_ids,
        )?;

        let solutions = self.storage.algorithm(&self.algorithm)?;
        let second_solutions = self
            .second_storages
            .iter()
            .map(|storage| storage.algorithm(&self.algorithm))
            .collect::<Result<Vec<_>, _>>()?;

        let grid = build_grid(
            spec,
            &grid_axes,
            &container.scenario_parameter_dict,
            &universe,
            &allowed,
            |_, _, ids| {
                let mut values = Vec::new();
                for scenario in ids {
                    let Some(result) = solutions
                        .get(scenario)
                        .and_then(|executions| executions.get(&self.execution_id))
                    else {
                        continue;
                    };
                    let value = R::metric_value(&spec.metric, result)
                        .ok_or_else(|| PlotError::BindingShape(spec.filename.clone()))?;
                    let mut total = value;
                    let mut archives = 1usize;
                    for solutions in &second_solutions {
                        let Some(result) = solutions
                            .get(scenario)
                            .and_then(|executions| executions.get(&self.execution_id))
                        else {
                            continue;
                        };
                        total += R::metric_value(&spec.metric, result)
                            .ok_or_else(|| PlotError::BindingShape(spec.filename.clone()))?;
                        archives += 1;
                    }
                    values.push(total / archives as f64);
                }
                Ok(values)
            },
        )?;
        render_heatmap(spec, axes, &grid, &output, options.paper_mode)
    }
}

/// Heatmaps joining the ViNE and randomized rounding archives per scenario.
/// Scenarios solved by only one of the two are left out.
pub struct ComparisonHeatmapPlotter<'a> {
    vine: &'a ExperimentStorage<VineScenarioResults>,
    rand_round: &'a ExperimentStorage<RandRoundResult>,
    vine_algorithm: String,
    rand_round_algorithm: String,
    vine_execution_id: ExecutionId,
    rand_round_execution_id: ExecutionId,
    axes: Vec<HeatmapAxes>,
}

impl<'a> ComparisonHeatmapPlotter<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vine: &'a ExperimentStorage<VineScenarioResults>,
        rand_round: &'a ExperimentStorage<RandRoundResult>,
        vine_algorithm: impl Into<String>,
        rand_round_algorithm: impl Into<String>,
        vine_execution_id: ExecutionId,
        rand_round_execution_id: ExecutionId,
        axes: Vec<HeatmapAxes>,
    ) -> Self {
        ComparisonHeatmapPlotter {
            vine,
            rand_round,
            vine_algorithm: vine_algorithm.into(),
            rand_round_algorithm: rand_round_algorithm.into(),
            vine_execution_id,
            rand_round_execution_id,
            axes,
        }
    }

    pub fn plot_all(
        &self,
        registry: &HeatmapSpecRegistry,
        options: &PlotterOptions,
        filter: Option<&[FilterSpec]>,
    ) -> Result<(), PlotError> {
        for axes in &self.axes {
            for spec in registry.specs(HeatmapPlotType::ComparisonVineRandRound) {
                self.plot_single(spec, axes, options, filter)?;
            }
        }
        Ok(())
    }

    fn plot_single(
        &self,
        spec: &HeatmapSpec,
        axes: &HeatmapAxes,
        options: &PlotterOptions,
        filter: Option<&[FilterSpec]>,
    ) -> Result<(), PlotError> {
        guard_plot_type(spec, HeatmapPlotType::ComparisonVineRandRound)?;
        if filter_conflicts_with_parameters(filter, &[axes.x_parameter, axes.y_parameter]) {
            return Ok(());
        }
        let output = options
            .output_directory(axes.foldername, &spec.alg_variant, filter)
            .then(plot_filename(&spec.filename, filter));
        if should_skip(&output, options.overwrite) {
            return Ok(());
        }

        // the ViNE archive is authoritative for the scenario space
        let container = &self.vine.scenario_parameter_container;
        let grid_axes = resolve_grid_axes(&container.scenarioparameter_room, axes)?;
        let universe: ScenarioSet = self
            .vine
            .scenario_ids(&self.vine_algorithm)?
            .intersection(&self.rand_round.scenario_ids(&self.rand_round_algorithm)?)
            .copied()
            .collect();
        let filter_refs: Vec<&FilterSpec> = filter.unwrap_or_default().iter().collect();
        let allowed = allowed_scenarios(
            &container.scenario_parameter_dict,
            &universe,
            &filter_refs,
            &options.forbidden_scenario_ids,
        )?;

        let vine_solutions = self.vine.algorithm(&self.vine_algorithm)?;
        let rand_round_solutions = self.rand_round.algorithm(&self.rand_round_algorithm)?;

        let grid = build_grid(
            spec,
            &grid_axes,
            &container.scenario_parameter_dict,
            &universe,
            &allowed,
            |_, _, ids| {
                let mut values = Vec::new();
                for scenario in ids {
                    let vine_result = vine_solutions
                        .get(scenario)
                        .and_then(|executions| executions.get(&self.vine_execution_id));
                    let rand_round_result = rand_round_solutions
                        .get(scenario)
                        .and_then(|executions| executions.get(&self.rand_round_execution_id));
                    let (Some(vine_result), Some(rand_round_result)) =
                        (vine_result, rand_round_result)
                    else {
                        continue;
                    };
                    let value = spec
                        .metric
                        .vine_vs_rand_round(vine_result, rand_round_result)
                        .ok_or_else(|| PlotError::BindingShape(spec.filename.clone()))?;
                    values.push(value);
                }
                Ok(values)
            },
        )?;
        render_heatmap(spec, axes, &grid, &output, options.paper_mode)
    }
}

/// Heatmaps of the latency study. Latency approximation parameters are
/// recorded per execution, not per scenario, so the axes machinery runs on a
/// parameter room extended with the observed latency parameter ranges and
/// each axis value selects executions instead of scenarios.
///
/// With a baseline archive attached the comparison family is rendered, each
/// cell pairing a latency-constrained execution with the baseline run of the
/// same scenario. Without one the study family plots the with-latencies
/// archive on its own.
pub struct LatencyHeatmapPlotter<'a> {
    with_latencies: &'a ExperimentStorage<RandRoundResult>,
    baseline: Option<&'a ExperimentStorage<RandRoundResult>>,
    algorithm: String,
    execution_filter: ExecutionSet,
    room: ParameterSpace,
    axes: Vec<HeatmapAxes>,
}

impl<'a> LatencyHeatmapPlotter<'a> {
    pub fn study(
        with_latencies: &'a ExperimentStorage<RandRoundResult>,
        algorithm: impl Into<String>,
        execution_parameter_filter: &std::collections::BTreeMap<String, ParamValue>,
        axes: Vec<HeatmapAxes>,
    ) -> Result<Self, PlotError> {
        Self::build(with_latencies, None, algorithm, execution_parameter_filter, axes)
    }

    pub fn comparison(
        with_latencies: &'a ExperimentStorage<RandRoundResult>,
        baseline: &'a ExperimentStorage<RandRoundResult>,
        algorithm: impl Into<String>,
        execution_parameter_filter: &std::collections::BTreeMap<String, ParamValue>,
        axes: Vec<HeatmapAxes>,
    ) -> Result<Self, PlotError> {
        Self::build(
            with_latencies,
            Some(baseline),
            algorithm,
            execution_parameter_filter,
            axes,
        )
    }

    fn build(
        with_latencies: &'a ExperimentStorage<RandRoundResult>,
        baseline: Option<&'a ExperimentStorage<RandRoundResult>>,
        algorithm: impl Into<String>,
        execution_parameter_filter: &std::collections::BTreeMap<String, ParamValue>,
        axes: Vec<HeatmapAxes>,
    ) -> Result<Self, PlotError> {
        let algorithm = algorithm.into();
        let container = &with_latencies.execution_parameter_container;
        let execution_filter = container
            .lookup(&algorithm)?
            .filtered_executions(execution_parameter_filter)?;
        let mut room = with_latencies
            .scenario_parameter_container
            .scenarioparameter_room
            .clone();
        room.graft(
            "latency_approx",
            crate::storage::extract_latency_parameters(container, execution_parameter_filter),
        );
        Ok(LatencyHeatmapPlotter {
            with_latencies,
            baseline,
            algorithm,
            execution_filter,
            room,
            axes,
        })
    }

    /// The scenario parameter room extended with the latency parameters.
    /// Filters fed back into [`Self::plot_all`] must be built against this
    /// room so latency conjuncts resolve.
    pub fn room(&self) -> &ParameterSpace {
        &self.room
    }

    fn plot_type(&self) -> HeatmapPlotType {
        if self.baseline.is_some() {
            HeatmapPlotType::ComparisonLatencyBaseline
        } else {
            HeatmapPlotType::LatencyStudy
        }
    }

    pub fn plot_all(
        &self,
        registry: &HeatmapSpecRegistry,
        options: &PlotterOptions,
        filter: Option<&[FilterSpec]>,
    ) -> Result<(), PlotError> {
        for axes in &self.axes {
            for spec in registry.specs(self.plot_type()) {
                self.plot_single(spec, axes, options, filter)?;
            }
        }
        Ok(())
    }

    fn plot_single(
        &self,
        spec: &HeatmapSpec,
        axes: &HeatmapAxes,
        options: &PlotterOptions,
        filter: Option<&[FilterSpec]>,
    ) -> Result<(), PlotError> {
        guard_plot_type(spec, self.plot_type())?;
        if filter_conflicts_with_parameters(filter, &[axes.x_parameter, axes.y_parameter]) {
            return Ok(());
        }
        let output = options
            .output_directory(axes.foldername, &spec.alg_variant, filter)
            .then(plot_filename(&spec.filename, filter));
        if should_skip(&output, options.overwrite) {
            return Ok(());
        }

        let container = &self.with_latencies.scenario_parameter_container;
        let grid_axes = resolve_grid_axes(&self.room, axes)?;
        let mut universe = self.with_latencies.scenario_ids(&self.algorithm)?;
        if let Some(baseline) = self.baseline {
            universe = universe
                .intersection(&baseline.scenario_ids(&self.algorithm)?)
                .copied()
                .collect();
        }
        let (scenario_filters, latency_filters) = partition_latency_filters(filter);
        let allowed = allowed_scenarios(
            &container.scenario_parameter_dict,
            &universe,
            &scenario_filters,
            &options.forbidden_scenario_ids,
        )?;

        let lookup = self
            .with_latencies
            .execution_parameter_container
            .lookup(&self.algorithm)?;
        let mut executions = self.execution_filter.clone();
        for latency_filter in &latency_filters {
            match lookup.executions_with(&latency_filter.parameter, &latency_filter.value) {
                Some(matching) => {
                    executions = executions.intersection(matching).copied().collect();
                }
                None => executions.clear(),
            }
        }

        let solutions = self.with_latencies.algorithm(&self.algorithm)?;
        let baseline_solutions = match self.baseline {
            Some(baseline) => Some(baseline.algorithm(&self.algorithm)?),
            None => None,
        };

        let grid = build_grid(
            spec,
            &grid_axes,
            &container.scenario_parameter_dict,
            &universe,
            &allowed,
            |x_value, y_value, ids| {
                let x_executions =
                    executions_for_axis_value(lookup, &executions, axes.x_parameter, x_value);
                let y_executions =
                    executions_for_axis_value(lookup, &executions, axes.y_parameter, y_value);
                let cell_executions: ExecutionSet =
                    x_executions.intersection(&y_executions).copied().collect();

                let mut values = Vec::new();
                for scenario in ids {
                    let Some(scenario_solutions) = solutions.get(scenario) else {
                        continue;
                    };
                    let baseline_result = match baseline_solutions {
                        Some(baseline_solutions) => {
                            let Some(result) = baseline_solutions
                                .get(scenario)
                                .and_then(|executions| executions.get(&BASELINE_EXECUTION_ID))
                            else {
                                continue;
                            };
                            Some(result)
                        }
                        None => None,
                    };
                    for execution in &cell_executions {
                        let Some(result) = scenario_solutions.get(execution) else {
                            continue;
                        };
                        let value = match baseline_result {
                            Some(baseline_result) => spec
                                .metric
                                .rand_round_pair(baseline_result, result)
                                .ok_or_else(|| PlotError::BindingShape(spec.filename.clone()))?,
                            None => spec
                                .metric
                                .rand_round(result)
                                .ok_or_else(|| PlotError::BindingShape(spec.filename.clone()))?,
                        };
                        values.push(value);
                    }
                }
                Ok(values)
            },
        )?;
        render_heatmap(spec, axes, &grid, &output, options.paper_mode)
    }
}
