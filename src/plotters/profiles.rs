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
//! Profit profiles comparing the ViNE heuristics against randomized
//! rounding: an ECDF of the per-scenario profit ratio and a box plot of the
//! profits relative to the LP upper bound. Both land under `general_plots`
//! since they aggregate over the whole scenario space instead of spanning an
//! axes pair.

use std::fs;

use itertools::Itertools;
use plotly::{
    common::{DashType, Line, Mode},
    layout::{Axis, BoxMode, GridPattern, LayoutGrid},
    BoxPlot, Layout, Plot, Scatter,
};
use serde::Serialize;

use crate::{
    parameters::{lookup_scenarios_having_specific_values, FilterSpec, ParamValue},
    results::{RandRoundResult, VineScenarioResults},
    settings::{
        rand_round_settings_universe, vine_settings_universe, LpRecomputationMode,
        LpRoundingOrder, VineRoundingProcedure,
    },
    storage::ExperimentStorage,
    util::PathBufExt,
    ExecutionId, ScenarioId, ScenarioSet,
};

use super::{
    allowed_scenarios, csv_writer, filter_conflicts_with_parameters, filter_filename_part,
    resolve_axis, should_skip, trace_color, PlotError, PlotterOptions, OUTPUT_FILETYPE,
};

/// Profiles use a single underscore between name and filter part, unlike the
/// heatmap files.
fn general_filename(base: &str, filter: Option<&[FilterSpec]>) -> String {
    format!("{base}_{}.{OUTPUT_FILETYPE}", filter_filename_part(filter))
}

#[derive(Serialize)]
struct EcdfCsvRow<'a> {
    request_set: &'a str,
    edge_resource_factor: &'a str,
    relative_profit: f64,
    fraction: f64,
}

#[derive(Serialize)]
struct BoxplotCsvRow<'a> {
    panel: &'static str,
    group: &'a str,
    series: &'a str,
    statistic: &'static str,
    scenario: ScenarioId,
    value: f64,
}

const BEST_COLOR: &str = "#2563eb";
const MEAN_COLOR: &str = "#16a34a";

fn statistic_color(statistic: &str) -> &'static str {
    if statistic == "best" {
        BEST_COLOR
    } else {
        MEAN_COLOR
    }
}

/// Renders the ECDF and box plot profit comparisons of the two archives.
/// Scenarios solved by only one archive are left out, as are executions
/// other than the configured one.
pub struct ProfileComparisonPlotter<'a> {
    vine: &'a ExperimentStorage<VineScenarioResults>,
    rand_round: &'a ExperimentStorage<RandRoundResult>,
    vine_algorithm: String,
    rand_round_algorithm: String,
    execution_id: ExecutionId,
    /// Request counts pooled into one ECDF panel each.
    request_sets: Vec<Vec<i64>>,
}

impl<'a> ProfileComparisonPlotter<'a> {
    pub fn new(
        vine: &'a ExperimentStorage<VineScenarioResults>,
        rand_round: &'a ExperimentStorage<RandRoundResult>,
        vine_algorithm: impl Into<String>,
        rand_round_algorithm: impl Into<String>,
        execution_id: ExecutionId,
    ) -> Self {
        ProfileComparisonPlotter {
            vine,
            rand_round,
            vine_algorithm: vine_algorithm.into(),
            rand_round_algorithm: rand_round_algorithm.into(),
            execution_id,
            request_sets: vec![vec![40, 60], vec![80, 100]],
        }
    }

    pub fn with_request_sets(mut self, request_sets: Vec<Vec<i64>>) -> Self {
        self.request_sets = request_sets;
        self
    }

    pub fn plot_all(
        &self,
        options: &PlotterOptions,
        filter: Option<&[FilterSpec]>,
    ) -> Result<(), PlotError> {
        self.plot_ecdf(options, filter)?;
        self.plot_boxplot(options, filter)
    }

    /// The scenarios both archives solved, reduced to the filter.
    fn joint_scenarios(
        &self,
        options: &PlotterOptions,
        filter: Option<&[FilterSpec]>,
    ) -> Result<ScenarioSet, PlotError> {
        let universe: ScenarioSet = self
            .vine
            .scenario_ids(&self.vine_algorithm)?
            .intersection(&self.rand_round.scenario_ids(&self.rand_round_algorithm)?)
            .copied()
            .collect();
        let filter_refs: Vec<&FilterSpec> = filter.unwrap_or_default().iter().collect();
        allowed_scenarios(
            &self.vine.scenario_parameter_container.scenario_parameter_dict,
            &universe,
            &filter_refs,
            &options.forbidden_scenario_ids,
        )
    }

    /// Best randomized rounding profit over the best ViNE profit, per
    /// scenario. Scenarios missing a result on either side or yielding a
    /// non-finite ratio are dropped.
    fn profit_ratios(&self, allowed: &ScenarioSet) -> Result<Vec<(ScenarioId, f64)>, PlotError> {
        let vine_solutions = self.vine.algorithm(&self.vine_algorithm)?;
        let rand_round_solutions = self.rand_round.algorithm(&self.rand_round_algorithm)?;
        let vine_settings = vine_settings_universe();
        let rand_round_settings = rand_round_settings_universe();

        let mut ratios = Vec::new();
        for scenario in allowed {
            let vine_result = vine_solutions
                .get(scenario)
                .and_then(|executions| executions.get(&self.execution_id));
            let rand_round_result = rand_round_solutions
                .get(scenario)
                .and_then(|executions| executions.get(&self.execution_id));
            let (Some(vine_result), Some(rand_round_result)) = (vine_result, rand_round_result)
            else {
                continue;
            };
            let ratio = rand_round_result.best_profit(&rand_round_settings)
                / vine_result.best_profit(&vine_settings);
            if !ratio.is_finite() {
                log::debug!("scenario {scenario} yields profit ratio {ratio}, dropping");
                continue;
            }
            if ratio > 1.29999 {
                log::debug!("scenario {scenario} has an unusually high profit ratio {ratio:.4}");
            }
            ratios.push((*scenario, ratio));
        }
        Ok(ratios)
    }

    /// ECDF of the relative profit, one panel per request set and one curve
    /// per edge resource factor.
    fn plot_ecdf(
        &self,
        options: &PlotterOptions,
        filter: Option<&[FilterSpec]>,
    ) -> Result<(), PlotError> {
        // the panels pool over request counts, a pinned count is meaningless
        if filter_conflicts_with_parameters(filter, &["number_of_requests"]) {
            return Ok(());
        }
        let output = options
            .general_output_directory(filter)
            .then(general_filename("ECDF_profit", filter));
        if should_skip(&output, options.overwrite) {
            return Ok(());
        }

        let container = &self.vine.scenario_parameter_container;
        let (request_path, request_counts) =
            resolve_axis(&container.scenarioparameter_room, "number_of_requests")?;
        let (factor_path, factors) =
            resolve_axis(&container.scenarioparameter_room, "edge_resource_factor")?;

        let allowed = self.joint_scenarios(options, filter)?;
        let ratios = self.profit_ratios(&allowed)?;

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut plot = Plot::new();
        let mut csv = csv_writer(&output.with_extension("csv"))?;
        for (panel, request_set) in self.request_sets.iter().enumerate() {
            let panel_label = request_set.iter().join(",");
            let mut panel_scenarios = ScenarioSet::new();
            for count in request_set {
                let value = ParamValue::Int(*count);
                // request sets come from the caller, not from the room
                if !request_counts.contains(&value) {
                    log::debug!("request count {count} not in this archive");
                    continue;
                }
                panel_scenarios.extend(lookup_scenarios_having_specific_values(
                    &container.scenario_parameter_dict,
                    &request_path,
                    &value,
                )?);
            }

            for (index, factor) in factors.iter().enumerate() {
                let factor_scenarios = lookup_scenarios_having_specific_values(
                    &container.scenario_parameter_dict,
                    &factor_path,
                    factor,
                )?;
                let mut values: Vec<f64> = ratios
                    .iter()
                    .filter(|(scenario, _)| {
                        panel_scenarios.contains(scenario) && factor_scenarios.contains(scenario)
                    })
                    .map(|(_, ratio)| 100.0 * ratio)
                    .collect();
                if values.is_empty() {
                    continue;
                }
                values.sort_by(f64::total_cmp);
                let count = values.len();
                let fractions: Vec<f64> = (1..=count)
                    .map(|rank| 100.0 * rank as f64 / count as f64)
                    .collect();

                let factor_label = factor.to_string();
                for (value, fraction) in values.iter().zip(&fractions) {
                    csv.serialize(EcdfCsvRow {
                        request_set: &panel_label,
                        edge_resource_factor: &factor_label,
                        relative_profit: *value,
                        fraction: *fraction,
                    })?;
                }

                let mut trace = Scatter::new(values, fractions)
                    .name(format!("erf={factor}"))
                    .mode(Mode::Lines)
                    .line(Line::new().color(trace_color(index, factors.len())).width(2.0))
                    .legend_group(format!("requests {panel_label}"))
                    .legend_group_title(format!("#Requests {panel_label}"));
                if panel > 0 {
                    trace = trace.x_axis("x2").y_axis("y2");
                }
                plot.add_trace(trace);
            }

            // equality marker at 100%
            let mut marker = Scatter::new(vec![100.0, 100.0], vec![0.0, 100.0])
                .mode(Mode::Lines)
                .line(Line::new().color("#ff0000").width(1.0).dash(DashType::Dash))
                .show_legend(false);
            if panel > 0 {
                marker = marker.x_axis("x2").y_axis("y2");
            }
            plot.add_trace(marker);
        }
        csv.flush()?;

        let mut layout = Layout::new()
            .grid(
                LayoutGrid::new()
                    .rows(self.request_sets.len())
                    .columns(1)
                    .pattern(GridPattern::Independent),
            )
            .x_axis(Axis::new().title("Relative Profit [%]").range(vec![20.0, 200.0]))
            .y_axis(Axis::new().title("ECDF [%]"))
            .x_axis2(Axis::new().title("Relative Profit [%]").range(vec![20.0, 200.0]))
            .y_axis2(Axis::new().title("ECDF [%]"));
        if !options.paper_mode {
            layout = layout.title("ECDF of the relative profit: rand round vs ViNE");
        }
        plot.set_layout(layout);
        log::debug!("Plotting {output:?}");
        plot.write_html(&output);
        Ok(())
    }

    /// Box plots of the achieved profits relative to the LP upper bound. The
    /// left panel spreads the ViNE variants, the right one the rounding
    /// heuristics; deterministic rounding contributes its single outcome as
    /// `best` only.
    fn plot_boxplot(
        &self,
        options: &PlotterOptions,
        filter: Option<&[FilterSpec]>,
    ) -> Result<(), PlotError> {
        let output = options
            .general_output_directory(filter)
            .then(general_filename("boxplot_relative_performance", filter));
        if should_skip(&output, options.overwrite) {
            return Ok(());
        }

        let allowed = self.joint_scenarios(options, filter)?;
        let vine_solutions = self.vine.algorithm(&self.vine_algorithm)?;
        let rand_round_solutions = self.rand_round.algorithm(&self.rand_round_algorithm)?;

        // (series, statistic) -> (group label, value, scenario), one
        // collection per panel, insertion ordered so traces come out stable
        type Samples = Vec<(String, f64, ScenarioId)>;
        type PanelSamples = Vec<((&'static str, &'static str), Samples)>;
        fn samples_of<'c>(
            collection: &'c mut PanelSamples,
            series: &'static str,
            statistic: &'static str,
        ) -> &'c mut Samples {
            if let Some(position) = collection
                .iter()
                .position(|(key, _)| *key == (series, statistic))
            {
                return &mut collection[position].1;
            }
            collection.push(((series, statistic), Vec::new()));
            let last = collection.len() - 1;
            &mut collection[last].1
        }
        let mut vine_samples: PanelSamples = Vec::new();
        let mut rand_round_samples: PanelSamples = Vec::new();

        for scenario in &allowed {
            let vine_result = vine_solutions
                .get(scenario)
                .and_then(|executions| executions.get(&self.execution_id));
            let rand_round_result = rand_round_solutions
                .get(scenario)
                .and_then(|executions| executions.get(&self.execution_id));
            let (Some(vine_result), Some(rand_round_result)) = (vine_result, rand_round_result)
            else {
                continue;
            };
            let lp_bound = rand_round_result.lp_profit;

            for settings in vine_settings_universe() {
                let Some(result) = vine_result.result(&settings) else {
                    continue;
                };
                let group = match settings.rounding_procedure {
                    VineRoundingProcedure::Deterministic => "Det.",
                    VineRoundingProcedure::Randomized => "Rand.",
                };
                let series = match settings.lp_objective.objective_code() {
                    "lb" => "L",
                    _ => "C",
                };
                let best = 100.0 * result.profit.max / lp_bound;
                if best.is_finite() {
                    samples_of(&mut vine_samples, series, "best")
                        .push((group.to_string(), best, *scenario));
                }
                if settings.rounding_procedure == VineRoundingProcedure::Randomized {
                    let mean = 100.0 * result.profit.mean / lp_bound;
                    if mean.is_finite() {
                        samples_of(&mut vine_samples, series, "mean")
                            .push((group.to_string(), mean, *scenario));
                    }
                }
            }

            for settings in rand_round_settings_universe() {
                let Some(profit) = rand_round_result.profits.get(&settings) else {
                    continue;
                };
                let group = match settings.lp_recomputation_mode {
                    LpRecomputationMode::NoRecomputation => "No Recomp.",
                    _ => "Recomp.",
                };
                let series = match settings.rounding_order {
                    LpRoundingOrder::Random => "R",
                    LpRoundingOrder::StaticProfit => "S",
                    LpRoundingOrder::AchievedProfit => "A",
                };
                for (statistic, value) in [("best", profit.max), ("mean", profit.mean)] {
                    let value = 100.0 * value / lp_bound;
                    if value.is_finite() {
                        samples_of(&mut rand_round_samples, series, statistic)
                            .push((group.to_string(), value, *scenario));
                    }
                }
            }
        }

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut plot = Plot::new();
        let mut csv = csv_writer(&output.with_extension("csv"))?;
        for (panel, collection) in [("vine", &vine_samples), ("rand_round", &rand_round_samples)] {
            for ((series, statistic), samples) in collection {
                let mut groups = Vec::with_capacity(samples.len());
                let mut values = Vec::with_capacity(samples.len());
                for (group, value, scenario) in samples {
                    csv.serialize(BoxplotCsvRow {
                        panel,
                        group,
                        series,
                        statistic,
                        scenario: *scenario,
                        value: *value,
                    })?;
                    groups.push(group.clone());
                    values.push(*value);
                }
                let mut trace = BoxPlot::new_xy(groups, values)
                    .name(format!("{series} {statistic}"))
                    .marker(plotly::common::Marker::new().color(statistic_color(statistic)))
                    .legend_group(statistic.to_string());
                if panel == "rand_round" {
                    trace = trace.x_axis("x2").y_axis("y2");
                }
                plot.add_trace(trace);
            }
        }
        csv.flush()?;

        let mut layout = Layout::new()
            .box_mode(BoxMode::Group)
            .grid(
                LayoutGrid::new()
                    .rows(1)
                    .columns(2)
                    .pattern(GridPattern::Independent),
            )
            .x_axis(Axis::new().title("WiNE(ViNE)"))
            .y_axis(
                Axis::new()
                    .title("Profit / LP_UB [%]")
                    .range(vec![-5.0, 105.0]),
            )
            .x_axis2(Axis::new().title("RR Heuristics"))
            .y_axis2(Axis::new().range(vec![-5.0, 105.0]));
        if !options.paper_mode {
            layout = layout.title("Relative performance against the LP upper bound");
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
        results::VineResult,
        storage::{ExecutionParameterContainer, ScenarioParameterContainer},
    };
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    const VINE: &str = "ViNESingleWindow";
    const RAND_ROUND: &str = "RandRoundSepLPOptDynVMPCollection";

    fn scenario_container() -> ScenarioParameterContainer {
        let room = serde_json::from_str(
            r#"{"scenario_generation": [{
                "request_generation": {"number_of_requests": [40, 60]},
                "substrate_generation": {"edge_resource_factor": [0.5, 1.0]}
            }]}"#,
        )
        .unwrap();
        let dict = serde_json::from_str(
            r#"{"scenario_generation": [{
                "request_generation": {"number_of_requests": {"40": [0, 1], "60": [2, 3]}},
                "substrate_generation": {"edge_resource_factor": {"0.5": [0, 2], "1.0": [1, 3]}}
            }]}"#,
        )
        .unwrap();
        ScenarioParameterContainer {
            scenarioparameter_room: room,
            scenario_parameter_dict: dict,
        }
    }

    fn vine_storage(profit: f64) -> ExperimentStorage<VineScenarioResults> {
        let mut results = VineScenarioResults::default();
        for settings in vine_settings_universe() {
            results.0.insert(
                settings,
                vec![VineResult {
                    profit: AggregatedData::aggregate(&[profit, profit / 2.0]),
                    ..Default::default()
                }],
            );
        }
        let mut solutions = BTreeMap::new();
        for scenario in 0..4usize {
            solutions.insert(scenario, BTreeMap::from([(0usize, results.clone())]));
        }
        ExperimentStorage {
            algorithm_scenario_solution_dictionary: BTreeMap::from([(
                VINE.to_string(),
                solutions,
            )]),
            scenario_parameter_container: scenario_container(),
            execution_parameter_container: ExecutionParameterContainer::default(),
        }
    }

    fn rand_round_storage(profit: f64, lp_profit: f64) -> ExperimentStorage<RandRoundResult> {
        let mut result = RandRoundResult {
            lp_profit,
            ..Default::default()
        };
        for settings in rand_round_settings_universe() {
            result
                .profits
                .insert(settings, AggregatedData::aggregate(&[profit, profit / 2.0]));
        }
        let mut solutions = BTreeMap::new();
        for scenario in 0..4usize {
            solutions.insert(scenario, BTreeMap::from([(0usize, result.clone())]));
        }
        ExperimentStorage {
            algorithm_scenario_solution_dictionary: BTreeMap::from([(
                RAND_ROUND.to_string(),
                solutions,
            )]),
            scenario_parameter_container: scenario_container(),
            execution_parameter_container: ExecutionParameterContainer::default(),
        }
    }

    fn temp_options(tag: &str) -> (PlotterOptions, PathBuf) {
        let base = std::env::temp_dir().join(format!(
            "vnep_eval_profiles_{tag}_{}",
            std::process::id()
        ));
        (PlotterOptions::new(&base), base)
    }

    fn find_output(base: &Path, name: &str) -> Vec<PathBuf> {
        let pattern = format!("{}/**/{name}", base.to_string_lossy());
        glob::glob(&pattern).unwrap().map(Result::unwrap).collect()
    }

    #[test]
    fn ecdf_pools_request_sets_and_splits_factors() {
        let vine = vine_storage(5.0);
        let rand_round = rand_round_storage(10.0, 20.0);
        let plotter = ProfileComparisonPlotter::new(&vine, &rand_round, VINE, RAND_ROUND, 0)
            .with_request_sets(vec![vec![40], vec![60]]);
        let (options, base) = temp_options("ecdf");

        plotter.plot_all(&options, None).unwrap();

        let outputs = find_output(&base, "ECDF_profit_no_filter.html");
        assert_eq!(outputs.len(), 1);
        assert!(outputs[0].to_string_lossy().contains("/general_plots/"));

        // best rand round profit 10 over best vine profit 5: every scenario
        // sits at 200%, one scenario per (request count, factor) pair
        let mut reader = csv::Reader::from_path(outputs[0].with_extension("csv")).unwrap();
        let rows: Vec<(String, String, f64, f64)> = reader
            .deserialize()
            .map(Result::unwrap)
            .collect();
        assert_eq!(rows.len(), 4);
        for (_, _, relative_profit, fraction) in &rows {
            assert_eq!(*relative_profit, 200.0);
            assert_eq!(*fraction, 100.0);
        }
        assert!(rows.iter().any(|(set, factor, _, _)| set == "40" && factor == "0.5"));
        assert!(rows.iter().any(|(set, factor, _, _)| set == "60" && factor == "1"));

        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn ecdf_is_skipped_when_requests_are_pinned() {
        let vine = vine_storage(5.0);
        let rand_round = rand_round_storage(10.0, 20.0);
        let plotter = ProfileComparisonPlotter::new(&vine, &rand_round, VINE, RAND_ROUND, 0);
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

        assert!(find_output(&base, "ECDF_profit_number_of_requests_40.html").is_empty());
        // the box plot still renders, restricted to the two matching scenarios
        let outputs = find_output(
            &base,
            "boxplot_relative_performance_number_of_requests_40.csv",
        );
        assert_eq!(outputs.len(), 1);
        let mut reader = csv::Reader::from_path(&outputs[0]).unwrap();
        let rows: Vec<(String, String, String, String, usize, f64)> =
            reader.deserialize().map(Result::unwrap).collect();
        assert!(rows.iter().all(|(_, _, _, _, scenario, _)| *scenario < 2));

        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn boxplot_panels_follow_the_settings_split() {
        let vine = vine_storage(5.0);
        let rand_round = rand_round_storage(8.0, 16.0);
        let plotter = ProfileComparisonPlotter::new(&vine, &rand_round, VINE, RAND_ROUND, 0);
        let (options, base) = temp_options("boxplot");

        plotter.plot_all(&options, None).unwrap();

        let outputs = find_output(&base, "boxplot_relative_performance_no_filter.csv");
        assert_eq!(outputs.len(), 1);
        let mut reader = csv::Reader::from_path(&outputs[0]).unwrap();
        let rows: Vec<(String, String, String, String, usize, f64)> =
            reader.deserialize().map(Result::unwrap).collect();

        // vine panel: best 100*5/16, mean only for randomized rounding
        let vine_rows: Vec<_> = rows.iter().filter(|row| row.0 == "vine").collect();
        assert!(vine_rows
            .iter()
            .all(|(_, _, series, _, _, _)| series == "L" || series == "C"));
        assert!(vine_rows
            .iter()
            .filter(|(_, group, _, statistic, _, _)| group == "Det." && statistic == "mean")
            .count()
            == 0);
        for (_, _, _, statistic, _, value) in &vine_rows {
            if statistic == "best" {
                assert_eq!(*value, 100.0 * 5.0 / 16.0);
            } else {
                assert_eq!(*value, 100.0 * 3.75 / 16.0);
            }
        }

        // rand round panel: both recomputation groups and all three orders
        let rand_round_rows: Vec<_> =
            rows.iter().filter(|row| row.0 == "rand_round").collect();
        let groups: std::collections::BTreeSet<&str> = rand_round_rows
            .iter()
            .map(|(_, group, _, _, _, _)| group.as_str())
            .collect();
        assert_eq!(groups, ["No Recomp.", "Recomp."].into_iter().collect());
        let series: std::collections::BTreeSet<&str> = rand_round_rows
            .iter()
            .map(|(_, _, series, _, _, _)| series.as_str())
            .collect();
        assert_eq!(series, ["A", "R", "S"].into_iter().collect());
        for (_, _, _, statistic, _, value) in &rand_round_rows {
            if statistic == "best" {
                assert_eq!(*value, 50.0);
            } else {
                assert_eq!(*value, 100.0 * 6.0 / 16.0);
            }
        }

        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn scenarios_missing_from_one_archive_are_dropped() {
        let vine = vine_storage(5.0);
        let mut rand_round = rand_round_storage(10.0, 20.0);
        rand_round
            .algorithm_scenario_solution_dictionary
            .get_mut(RAND_ROUND)
            .unwrap()
            .remove(&0);
        let plotter = ProfileComparisonPlotter::new(&vine, &rand_round, VINE, RAND_ROUND, 0)
            .with_request_sets(vec![vec![40], vec![60]]);
        let (options, base) = temp_options("missing");

        plotter.plot_all(&options, None).unwrap();

        let outputs = find_output(&base, "ECDF_profit_no_filter.csv");
        let mut reader = csv::Reader::from_path(&outputs[0]).unwrap();
        let rows: Vec<(String, String, f64, f64)> =
            reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 3);

        std::fs::remove_dir_all(&base).unwrap();
    }
}
