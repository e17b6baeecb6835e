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
//! Grouped box plots of the randomized rounding runtimes and profits. Each
//! metric becomes one plot: the outer parameter spans the x axis, and every
//! value of the inner parameter contributes one box per outer value. For the
//! latency study the inner parameter is a per-execution latency parameter,
//! so the boxes select executions instead of scenarios; a baseline archive
//! can join as an extra `baseline` box.

use std::collections::BTreeMap;
use std::fs;

use plotly::{
    common::Marker,
    layout::{Axis, AxisType, BoxMode},
    BoxPlot, Layout, Plot,
};
use serde::Serialize;

use crate::{
    parameters::{extract_parameter_range, FilterSpec, ParamValue, ParameterSpace},
    results::RandRoundResult,
    settings::{rand_round_settings_universe, LpRecomputationMode, RandRoundSettings},
    storage::{extract_latency_parameters, ExperimentStorage},
    util::PathBufExt,
    ExecutionSet,
};

use super::{
    allowed_scenarios, axis_tick_label, csv_writer, executions_for_axis_value,
    filter_conflicts_with_parameters, nanmean, partition_latency_filters, plot_filename,
    resolve_axis, scenarios_for_axis_value, should_skip, trace_color, PlotError, PlotterOptions,
    BASELINE_EXECUTION_ID,
};

/// Pseudo parameter value standing in for the baseline archive when it is
/// plotted next to the latency approximation types.
pub(crate) const NO_LATENCIES: &str = "no latencies";

const LATENCY_TYPE_PARAMETER: &str = "latency_approximation_type";
const RR_ALL_VARIANT: &str = "rr_seplp_ALL";

/// How a metric reads its samples out of one result summary.
#[derive(Debug, Clone, Copy)]
pub enum RuntimeValues {
    Single(fn(&RandRoundResult) -> f64),
    Many(fn(&RandRoundResult) -> Vec<f64>),
}

#[derive(Debug, Clone)]
pub struct RuntimeMetric {
    pub name: &'static str,
    pub filename: &'static str,
    pub y_label: &'static str,
    pub log_scale: bool,
    pub values: RuntimeValues,
}

fn lp_total(result: &RandRoundResult) -> f64 {
    result.lp_time_optimization + result.lp_time_preprocess
}

/// Share of the LP runtime spent inside DynVMP, i.e. the total minus the
/// tree decomposition and Gurobi shares.
fn dynvmp_total(result: &RandRoundResult) -> f64 {
    lp_total(result)
        - result.lp_time_tree_decomposition.sum()
        - result.lp_time_gurobi_optimization.sum()
}

fn recomputation_settings() -> Vec<RandRoundSettings> {
    rand_round_settings_universe()
        .into_iter()
        .filter(|settings| {
            settings.lp_recomputation_mode == LpRecomputationMode::WithoutSeparation
        })
        .collect()
}

/// All runtime and profit metrics of the randomized rounding results.
/// Archives recorded without latency information yield flat zero boxes for
/// the two latency metrics.
pub fn runtime_metrics() -> Vec<RuntimeMetric> {
    vec![
        RuntimeMetric {
            name: "LP Runtime",
            filename: "lp_optimization_time",
            y_label: "Runtime [s]",
            log_scale: true,
            values: RuntimeValues::Single(lp_total),
        },
        RuntimeMetric {
            name: "Maximum latency per embedded path",
            filename: "lp_latency_approx_max",
            y_label: "% of Limit",
            log_scale: false,
            values: RuntimeValues::Single(|result| result.latency_information.max),
        },
        RuntimeMetric {
            name: "Average latency per embedded path",
            filename: "lp_latency_approx_mean",
            y_label: "% of Limit",
            log_scale: false,
            values: RuntimeValues::Single(|result| result.latency_information.mean),
        },
        RuntimeMetric {
            name: "Recomputation Heuristic Runtime",
            filename: "solution_rounding_time",
            y_label: "Runtime [s]",
            log_scale: true,
            values: RuntimeValues::Many(|result| {
                result.rounding_runtime_means(&recomputation_settings())
            }),
        },
        RuntimeMetric {
            name: "DynVMP Runtime",
            filename: "lp_dynvmp_time_total",
            y_label: "Runtime [s]",
            log_scale: true,
            values: RuntimeValues::Single(dynvmp_total),
        },
        RuntimeMetric {
            name: "DynVMP Runtime Share",
            filename: "lp_dynvmp_time_total_percentage",
            y_label: "Fraction of Total [%]",
            log_scale: false,
            values: RuntimeValues::Single(|result| 100.0 * dynvmp_total(result) / lp_total(result)),
        },
        RuntimeMetric {
            name: "Average DynVMP Runtime per Request",
            filename: "lp_dynvmp_time_computation_per_request",
            y_label: "Runtime [s]",
            log_scale: true,
            values: RuntimeValues::Many(|result| {
                result
                    .lp_time_dynvmp_computation
                    .iter()
                    .map(|data| data.mean)
                    .collect()
            }),
        },
        RuntimeMetric {
            name: "Separation Runtime",
            filename: "lp_dynvmp_time_per_separation",
            y_label: "Runtime [s]",
            log_scale: true,
            values: RuntimeValues::Single(|result| {
                result
                    .lp_time_dynvmp_computation
                    .iter()
                    .map(|data| data.mean)
                    .sum()
            }),
        },
        RuntimeMetric {
            name: "DynVMP Initialization",
            filename: "lp_dynvmp_init_sum",
            y_label: "Runtime [s]",
            log_scale: true,
            values: RuntimeValues::Single(|result| result.lp_time_dynvmp_initialization.sum()),
        },
        RuntimeMetric {
            name: "Average DynVMP Initialization",
            filename: "lp_dynvmp_init_mean",
            y_label: "Runtime [s]",
            log_scale: true,
            values: RuntimeValues::Single(|result| result.lp_time_dynvmp_initialization.mean),
        },
        RuntimeMetric {
            name: "Profit (max)",
            filename: "profits_max",
            y_label: "max. Profit",
            log_scale: true,
            values: RuntimeValues::Single(|result| {
                result
                    .profits
                    .values()
                    .fold(f64::NAN, |best, data| best.max(data.max))
            }),
        },
        RuntimeMetric {
            name: "Profit (mean)",
            filename: "profits_mean",
            y_label: "average Profit",
            log_scale: true,
            values: RuntimeValues::Single(|result| {
                let means: Vec<f64> = result.profits.values().map(|data| data.mean).collect();
                nanmean(&means)
            }),
        },
        RuntimeMetric {
            name: "Profit (min)",
            filename: "profits_min",
            y_label: "min. Profit",
            log_scale: true,
            values: RuntimeValues::Single(|result| {
                result
                    .profits
                    .values()
                    .fold(f64::NAN, |worst, data| worst.min(data.min))
            }),
        },
    ]
}

/// One outer/inner parameter pairing of the box plots.
#[derive(Debug, Clone, Copy)]
pub struct BoxplotAxes {
    pub outer_parameter: &'static str,
    pub outer_title: &'static str,
    pub inner_parameter: &'static str,
    pub foldername: &'static str,
}

pub fn runtime_boxplot_axes() -> Vec<BoxplotAxes> {
    vec![BoxplotAxes {
        outer_parameter: "treewidth",
        outer_title: "Treewidth",
        inner_parameter: "number_of_requests",
        foldername: "AXES_TREEWIDTH_vs_NO_REQ",
    }]
}

pub fn latency_boxplot_axes() -> Vec<BoxplotAxes> {
    vec![BoxplotAxes {
        outer_parameter: "topology",
        outer_title: "Topology",
        inner_parameter: LATENCY_TYPE_PARAMETER,
        foldername: "AXES_TOPOLOGY_vs_TYPE",
    }]
}

fn is_no_latencies(value: &ParamValue) -> bool {
    matches!(value, ParamValue::Text(text) if text == NO_LATENCIES)
}

#[derive(Serialize)]
struct RuntimeCsvRow<'a> {
    group: &'a str,
    series: &'a str,
    value: f64,
}

struct TraceData {
    series: String,
    color_index: usize,
    groups: Vec<String>,
    values: Vec<f64>,
}

/// Renders every runtime metric as a grouped box plot under the
/// `rr_seplp_ALL` variant directory.
pub struct RuntimeBoxplotPlotter<'a> {
    algorithm: String,
    storage: &'a ExperimentStorage<RandRoundResult>,
    baseline: Option<&'a ExperimentStorage<RandRoundResult>>,
    execution_filter: ExecutionSet,
    room: ParameterSpace,
    axes: Vec<BoxplotAxes>,
    metrics: Vec<RuntimeMetric>,
}

impl<'a> RuntimeBoxplotPlotter<'a> {
    pub fn new(
        storage: &'a ExperimentStorage<RandRoundResult>,
        algorithm: impl Into<String>,
        execution_parameter_filter: &BTreeMap<String, ParamValue>,
        axes: Vec<BoxplotAxes>,
    ) -> Result<Self, PlotError> {
        let algorithm = algorithm.into();
        let container = &storage.execution_parameter_container;
        let execution_filter = container
            .lookup(&algorithm)?
            .filtered_executions(execution_parameter_filter)?;
        let mut room = storage
            .scenario_parameter_container
            .scenarioparameter_room
            .clone();
        room.graft(
            "latency_approx",
            extract_latency_parameters(container, execution_parameter_filter),
        );
        Ok(RuntimeBoxplotPlotter {
            algorithm,
            storage,
            baseline: None,
            execution_filter,
            room,
            axes,
            metrics: runtime_metrics(),
        })
    }

    /// Adds the latency-free archive as an extra box next to the latency
    /// approximation types. Its results are read at the baseline execution.
    pub fn with_baseline(
        mut self,
        baseline: &'a ExperimentStorage<RandRoundResult>,
    ) -> Result<Self, PlotError> {
        if let Some((path, _)) = extract_parameter_range(&self.room, LATENCY_TYPE_PARAMETER) {
            self.room.push_value(&path, ParamValue::from(NO_LATENCIES))?;
        }
        self.baseline = Some(baseline);
        Ok(self)
    }

    pub fn with_metrics(mut self, metrics: Vec<RuntimeMetric>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The scenario parameter room extended with the latency parameters.
    /// Filters fed back into [`Self::plot_all`] must be built against this
    /// room so latency conjuncts resolve.
    pub fn room(&self) -> &ParameterSpace {
        &self.room
    }

    pub fn plot_all(
        &self,
        options: &PlotterOptions,
        filter: Option<&[FilterSpec]>,
    ) -> Result<(), PlotError> {
        for axes in &self.axes {
            for metric in &self.metrics {
                self.plot_single(axes, metric, options, filter)?;
            }
        }
        Ok(())
    }

    fn plot_single(
        &self,
        axes: &BoxplotAxes,
        metric: &RuntimeMetric,
        options: &PlotterOptions,
        filter: Option<&[FilterSpec]>,
    ) -> Result<(), PlotError> {
        if filter_conflicts_with_parameters(filter, &[axes.outer_parameter, axes.inner_parameter])
        {
            return Ok(());
        }
        let output = options
            .output_directory(axes.foldername, RR_ALL_VARIANT, filter)
            .then(plot_filename(metric.filename, filter));
        if should_skip(&output, options.overwrite) {
            return Ok(());
        }

        let container = &self.storage.scenario_parameter_container;
        let (outer_path, outer_values) = resolve_axis(&self.room, axes.outer_parameter)?;
        let (inner_path, inner_values) = resolve_axis(&self.room, axes.inner_parameter)?;

        let mut universe = self.storage.scenario_ids(&self.algorithm)?;
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
            .storage
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

        let solutions = self.storage.algorithm(&self.algorithm)?;
        let baseline_solutions = match self.baseline {
            Some(baseline) => Some(baseline.algorithm(&self.algorithm)?),
            None => None,
        };

        let mut trace_data: Vec<TraceData> = Vec::new();
        for (inner_index, inner_value) in inner_values.iter().enumerate() {
            let (source, inner_executions) = match baseline_solutions {
                Some(baseline_solutions) if is_no_latencies(inner_value) => (
                    baseline_solutions,
                    ExecutionSet::from([BASELINE_EXECUTION_ID]),
                ),
                _ => (
                    solutions,
                    executions_for_axis_value(
                        lookup,
                        &executions,
                        axes.inner_parameter,
                        inner_value,
                    ),
                ),
            };
            let series = if is_no_latencies(inner_value) {
                "baseline".to_string()
            } else {
                inner_value.to_string()
            };
            let inner_scenarios = scenarios_for_axis_value(
                &container.scenario_parameter_dict,
                &universe,
                axes.inner_parameter,
                &inner_path,
                inner_value,
            )?;

            let mut groups = Vec::new();
            let mut values = Vec::new();
            for outer_value in &outer_values {
                let outer_scenarios = scenarios_for_axis_value(
                    &container.scenario_parameter_dict,
                    &universe,
                    axes.outer_parameter,
                    &outer_path,
                    outer_value,
                )?;
                let group = axis_tick_label(outer_value);
                for scenario in &outer_scenarios {
                    if !inner_scenarios.contains(scenario) || !allowed.contains(scenario) {
                        continue;
                    }
                    let Some(scenario_solutions) = source.get(scenario) else {
                        continue;
                    };
                    for execution in &inner_executions {
                        let Some(result) = scenario_solutions.get(execution) else {
                            continue;
                        };
                        let samples = match metric.values {
                            RuntimeValues::Single(extract) => vec![extract(result)],
                            RuntimeValues::Many(extract) => extract(result),
                        };
                        for value in samples {
                            if !value.is_finite() {
                                continue;
                            }
                            groups.push(group.clone());
                            values.push(value);
                        }
                    }
                }
            }
            if values.is_empty() {
                continue;
            }
            trace_data.push(TraceData {
                series,
                color_index: inner_index,
                groups,
                values,
            });
        }
        if trace_data.is_empty() {
            log::debug!("no samples for {output:?}, skipping");
            return Ok(());
        }

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut csv = csv_writer(&output.with_extension("csv"))?;
        for trace in &trace_data {
            for (group, value) in trace.groups.iter().zip(&trace.values) {
                csv.serialize(RuntimeCsvRow {
                    group,
                    series: &trace.series,
                    value: *value,
                })?;
            }
        }
        csv.flush()?;

        let mut plot = Plot::new();
        let inner_count = inner_values.len();
        for trace in trace_data {
            plot.add_trace(
                BoxPlot::new_xy(trace.groups, trace.values)
                    .name(&trace.series)
                    .marker(Marker::new().color(trace_color(trace.color_index, inner_count))),
            );
        }
        let mut value_axis = Axis::new().title(metric.y_label);
        if metric.log_scale {
            value_axis = value_axis.type_(AxisType::Log);
        }
        let mut layout = Layout::new()
            .box_mode(BoxMode::Group)
            .x_axis(Axis::new().title(axes.outer_title))
            .y_axis(value_axis);
        if !options.paper_mode {
            layout = layout.title(metric.name);
        }
        plot.set_layout(layout);
        log::debug!("Plotting {output:?}");
        plot.write_html(&output);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        aggregation::AggregatedData,
        parameters::PathSegment,
        storage::{ExecutionParameterContainer, ScenarioParameterContainer},
    };
    use std::path::{Path, PathBuf};

    const RAND_ROUND: &str = "RandRoundSepLPOptDynVMPCollection";

    fn sample_result() -> RandRoundResult {
        let mut result = RandRoundResult {
            lp_profit: 20.0,
            lp_time_preprocess: 2.0,
            lp_time_optimization: 3.0,
            lp_time_dynvmp_initialization: AggregatedData::aggregate(&[1.0, 3.0]),
            lp_time_tree_decomposition: AggregatedData::aggregate(&[0.5, 0.5]),
            lp_time_gurobi_optimization: AggregatedData::aggregate(&[1.0]),
            lp_time_dynvmp_computation: vec![
                AggregatedData::aggregate(&[2.0, 4.0]),
                AggregatedData::aggregate(&[6.0]),
            ],
            latency_information: AggregatedData::aggregate(&[50.0, 100.0]),
            ..Default::default()
        };
        for settings in rand_round_settings_universe() {
            result
                .profits
                .insert(settings, AggregatedData::aggregate(&[4.0, 8.0]));
            result
                .rounding_runtimes
                .insert(settings, AggregatedData::aggregate(&[1.5]));
        }
        result
    }

    fn single(filename: &str, result: &RandRoundResult) -> f64 {
        let metric = runtime_metrics()
            .into_iter()
            .find(|metric| metric.filename == filename)
            .unwrap();
        match metric.values {
            RuntimeValues::Single(extract) => extract(result),
            RuntimeValues::Many(_) => panic!("{filename} yields many values"),
        }
    }

    fn many(filename: &str, result: &RandRoundResult) -> Vec<f64> {
        let metric = runtime_metrics()
            .into_iter()
            .find(|metric| metric.filename == filename)
            .unwrap();
        match metric.values {
            RuntimeValues::Many(extract) => extract(result),
            RuntimeValues::Single(_) => panic!("{filename} yields a single value"),
        }
    }

    #[test]
    fn metrics_decompose_the_lp_runtime() {
        let result = sample_result();
        assert_eq!(single("lp_optimization_time", &result), 5.0);
        // total minus tree decomposition (1s) and gurobi (1s) shares
        assert_eq!(single("lp_dynvmp_time_total", &result), 3.0);
        assert_eq!(single("lp_dynvmp_time_total_percentage", &result), 60.0);
        assert_eq!(
            many("lp_dynvmp_time_computation_per_request", &result),
            vec![3.0, 6.0]
        );
        assert_eq!(single("lp_dynvmp_time_per_separation", &result), 9.0);
        assert_eq!(single("lp_dynvmp_init_sum", &result), 4.0);
        assert_eq!(single("lp_dynvmp_init_mean", &result), 2.0);
    }

    #[test]
    fn metrics_cover_latencies_profits_and_rounding() {
        let result = sample_result();
        assert_eq!(single("lp_latency_approx_max", &result), 100.0);
        assert_eq!(single("lp_latency_approx_mean", &result), 75.0);
        assert_eq!(single("profits_max", &result), 8.0);
        assert_eq!(single("profits_mean", &result), 6.0);
        assert_eq!(single("profits_min", &result), 4.0);
        // one mean per rounding order of the recomputation mode
        assert_eq!(many("solution_rounding_time", &result), vec![1.5, 1.5, 1.5]);
        assert_eq!(runtime_metrics().len(), 13);
    }

    fn runtime_scenario_container() -> ScenarioParameterContainer {
        let room = serde_json::from_str(
            r#"{"scenario_generation": [{
                "request_generation": {"number_of_requests": [40, 60], "treewidth": [2, 3]}
            }]}"#,
        )
        .unwrap();
        let dict = serde_json::from_str(
            r#"{"scenario_generation": [{
                "request_generation": {
                    "number_of_requests": {"40": [0, 2], "60": [1, 3]},
                    "treewidth": {"2": [0, 1], "3": [2, 3]}
                }
            }]}"#,
        )
        .unwrap();
        ScenarioParameterContainer {
            scenarioparameter_room: room,
            scenario_parameter_dict: dict,
        }
    }

    fn plain_execution_container() -> ExecutionParameterContainer {
        serde_json::from_str(
            r#"{
                "execution_parameters": [{}],
                "reverse_lookup": {"RandRoundSepLPOptDynVMPCollection": {
                    "all": [0],
                    "algorithm_parameters": {}
                }}
            }"#,
        )
        .unwrap()
    }

    fn lp_result(runtime: f64) -> RandRoundResult {
        RandRoundResult {
            lp_time_optimization: runtime,
            ..Default::default()
        }
    }

    /// Scenario `s` takes `10 * (s + 1)` seconds at execution 0.
    fn runtime_storage() -> ExperimentStorage<RandRoundResult> {
        let mut solutions = BTreeMap::new();
        for scenario in 0..4usize {
            solutions.insert(
                scenario,
                BTreeMap::from([(0usize, lp_result(10.0 * (scenario + 1) as f64))]),
            );
        }
        ExperimentStorage {
            algorithm_scenario_solution_dictionary: BTreeMap::from([(
                RAND_ROUND.to_string(),
                solutions,
            )]),
            scenario_parameter_container: runtime_scenario_container(),
            execution_parameter_container: plain_execution_container(),
        }
    }

    fn lp_runtime_metric() -> Vec<RuntimeMetric> {
        runtime_metrics()
            .into_iter()
            .filter(|metric| metric.filename == "lp_optimization_time")
            .collect()
    }

    fn temp_options(tag: &str) -> (PlotterOptions, PathBuf) {
        let base = std::env::temp_dir().join(format!(
            "vnep_eval_runtime_{tag}_{}",
            std::process::id()
        ));
        (PlotterOptions::new(&base), base)
    }

    fn find_output(base: &Path, filename_part: &str) -> Vec<PathBuf> {
        let pattern = format!("{}/**/*{filename_part}*", base.to_string_lossy());
        glob::glob(&pattern).unwrap().map(Result::unwrap).collect()
    }

    fn read_rows(path: &Path) -> Vec<(String, String, f64)> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader.deserialize().map(Result::unwrap).collect()
    }

    #[test]
    fn boxplots_group_by_the_inner_parameter() {
        let storage = runtime_storage();
        let plotter = RuntimeBoxplotPlotter::new(
            &storage,
            RAND_ROUND,
            &BTreeMap::new(),
            runtime_boxplot_axes(),
        )
        .unwrap()
        .with_metrics(lp_runtime_metric());
        let (options, base) = temp_options("plain");

        plotter.plot_all(&options, None).unwrap();

        let outputs = find_output(&base, "lp_optimization_time__no_filter.html");
        assert_eq!(outputs.len(), 1);
        assert!(outputs[0]
            .to_string_lossy()
            .contains("/AXES_TREEWIDTH_vs_NO_REQ/rr_seplp_ALL/"));

        // one trace per request count, boxes keyed by treewidth
        let rows = read_rows(&outputs[0].with_extension("csv"));
        assert_eq!(
            rows,
            vec![
                ("2".to_string(), "40".to_string(), 10.0),
                ("3".to_string(), "40".to_string(), 30.0),
                ("2".to_string(), "60".to_string(), 20.0),
                ("3".to_string(), "60".to_string(), 40.0),
            ]
        );

        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn pinned_axis_parameters_skip_the_plot() {
        let storage = runtime_storage();
        let plotter = RuntimeBoxplotPlotter::new(
            &storage,
            RAND_ROUND,
            &BTreeMap::new(),
            runtime_boxplot_axes(),
        )
        .unwrap();
        let (options, base) = temp_options("pinned");

        let filter = vec![FilterSpec {
            parameter: "number_of_requests".to_string(),
            path: vec![
                PathSegment::key("scenario_generation"),
                PathSegment::Index(0),
                PathSegment::key("request_generation"),
                PathSegment::key("number_of_requests"),
            ],
            value: ParamValue::Int(40),
        }];
        plotter.plot_all(&options, Some(&filter)).unwrap();

        assert!(find_output(&base, ".html").is_empty());
        if base.exists() {
            std::fs::remove_dir_all(&base).unwrap();
        }
    }

    fn latency_scenario_container() -> ScenarioParameterContainer {
        let room = serde_json::from_str(
            r#"{"scenario_generation": [{
                "substrate_generation": {"topology": ["Funet", "Noel"]}
            }]}"#,
        )
        .unwrap();
        let dict = serde_json::from_str(
            r#"{"scenario_generation": [{
                "substrate_generation": {"topology": {"Funet": [0], "Noel": [1]}}
            }]}"#,
        )
        .unwrap();
        ScenarioParameterContainer {
            scenarioparameter_room: room,
            scenario_parameter_dict: dict,
        }
    }

    fn latency_execution_container() -> ExecutionParameterContainer {
        serde_json::from_str(
            r#"{
                "execution_parameters": [
                    {"latency_approximation_type": "strict"},
                    {"latency_approximation_type": "flex"}
                ],
                "reverse_lookup": {"RandRoundSepLPOptDynVMPCollection": {
                    "all": [0, 1],
                    "algorithm_parameters": {
                        "latency_approximation_type": {"strict": [0], "flex": [1]}
                    }
                }}
            }"#,
        )
        .unwrap()
    }

    /// Execution 0 ran `strict` in 100s, execution 1 ran `flex` in 200s.
    fn latency_storage() -> ExperimentStorage<RandRoundResult> {
        let mut solutions = BTreeMap::new();
        for scenario in 0..2usize {
            solutions.insert(
                scenario,
                BTreeMap::from([(0usize, lp_result(100.0)), (1usize, lp_result(200.0))]),
            );
        }
        ExperimentStorage {
            algorithm_scenario_solution_dictionary: BTreeMap::from([(
                RAND_ROUND.to_string(),
                solutions,
            )]),
            scenario_parameter_container: latency_scenario_container(),
            execution_parameter_container: latency_execution_container(),
        }
    }

    fn baseline_storage() -> ExperimentStorage<RandRoundResult> {
        let mut solutions = BTreeMap::new();
        for scenario in 0..2usize {
            solutions.insert(scenario, BTreeMap::from([(0usize, lp_result(50.0))]));
        }
        ExperimentStorage {
            algorithm_scenario_solution_dictionary: BTreeMap::from([(
                RAND_ROUND.to_string(),
                solutions,
            )]),
            scenario_parameter_container: latency_scenario_container(),
            execution_parameter_container: plain_execution_container(),
        }
    }

    #[test]
    fn latency_inners_pick_executions_and_the_baseline() {
        let storage = latency_storage();
        let baseline = baseline_storage();
        let plotter = RuntimeBoxplotPlotter::new(
            &storage,
            RAND_ROUND,
            &BTreeMap::new(),
            latency_boxplot_axes(),
        )
        .unwrap()
        .with_baseline(&baseline)
        .unwrap()
        .with_metrics(lp_runtime_metric());
        let (options, base) = temp_options("latency");

        plotter.plot_all(&options, None).unwrap();

        let outputs = find_output(&base, "lp_optimization_time__no_filter.csv");
        assert_eq!(outputs.len(), 1);
        assert!(outputs[0].to_string_lossy().contains("/AXES_TOPOLOGY_vs_TYPE/"));

        // inner values sort as flex, no latencies, strict; topologies are
        // abbreviated on the x axis
        let rows = read_rows(&outputs[0]);
        assert_eq!(
            rows,
            vec![
                ("Fn".to_string(), "flex".to_string(), 200.0),
                ("Nl".to_string(), "flex".to_string(), 200.0),
                ("Fn".to_string(), "baseline".to_string(), 50.0),
                ("Nl".to_string(), "baseline".to_string(), 50.0),
                ("Fn".to_string(), "strict".to_string(), 100.0),
                ("Nl".to_string(), "strict".to_string(), 100.0),
            ]
        );

        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn the_execution_filter_narrows_every_trace() {
        let storage = latency_storage();
        let execution_filter = BTreeMap::from([(
            "latency_approximation_type".to_string(),
            ParamValue::from("strict"),
        )]);
        let plotter = RuntimeBoxplotPlotter::new(
            &storage,
            RAND_ROUND,
            &execution_filter,
            latency_boxplot_axes(),
        )
        .unwrap()
        .with_metrics(lp_runtime_metric());
        let (options, base) = temp_options("execfilter");

        plotter.plot_all(&options, None).unwrap();

        let outputs = find_output(&base, "lp_optimization_time__no_filter.csv");
        let rows = read_rows(&outputs[0]);
        assert_eq!(
            rows,
            vec![
                ("Fn".to_string(), "strict".to_string(), 100.0),
                ("Nl".to_string(), "strict".to_string(), 100.0),
            ]
        );

        std::fs::remove_dir_all(&base).unwrap();
    }
}
