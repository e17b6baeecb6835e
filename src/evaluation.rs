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
//! The two evaluation flows. [`evaluate_vine_and_rand_round`] renders every
//! plot comparing the ViNE heuristics against randomized rounding;
//! [`evaluate_latency_and_baseline`] renders the latency study plots of one
//! latency-constrained archive against a latency-free baseline. Both run
//! every plotter once per filter combination, so a flow touches each output
//! file at most once and resumes cheaply after an interruption.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::{
    parameters::{construct_filter_specs, ParamValue},
    plotters::{
        latency_boxplot_axes, runtime_boxplot_axes, BoxplotAxes, ComparisonHeatmapPlotter,
        LatencyHeatmapPlotter, PlotError, PlotterOptions, ProfileComparisonPlotter,
        RuntimeBoxplotPlotter, SingleHeatmapPlotter,
    },
    results::{RandRoundResult, VineScenarioResults},
    specs::{
        latency_comparison_axes, latency_study_axes, main_heatmap_axes, HeatmapPlotType,
        HeatmapSpecRegistry,
    },
    storage::{exclude_generation_parameters, ExperimentStorage, StorageError},
};

/// Algorithm id of the ViNE heuristic collection in the reduced archives.
pub const VINE_ALGORITHM_ID: &str = "ViNESingleWindow";
/// Algorithm id of the randomized rounding collection.
pub const RAND_ROUND_ALGORITHM_ID: &str = "RandRoundSepLPOptDynVMPCollection";

/// Runtime box plot filters stay shallow, deeper conjuncts thin the boxes
/// out to single samples.
const RUNTIME_FILTER_DEPTH: usize = 2;

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Plot(#[from] PlotError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Options shared by both evaluation flows.
#[derive(Debug, Clone)]
pub struct EvaluationOptions {
    pub plotter: PlotterOptions,
    /// Scenario parameters the plots are additionally split by. Every
    /// combination of up to [`Self::filter_max_depth`] pinned values becomes
    /// one output subdirectory.
    pub filter_parameter_keys: Vec<String>,
    pub filter_max_depth: usize,
    /// Request counts pooled per ECDF panel.
    pub request_sets: Vec<Vec<i64>>,
    /// Generation parameter values whose scenarios are dropped entirely.
    pub excluded_generation_parameters: BTreeMap<String, Vec<ParamValue>>,
}

impl EvaluationOptions {
    pub fn new(output_base: impl Into<PathBuf>) -> Self {
        EvaluationOptions {
            plotter: PlotterOptions::new(output_base),
            filter_parameter_keys: Vec::new(),
            filter_max_depth: 2,
            request_sets: vec![vec![40, 60], vec![80, 100]],
            excluded_generation_parameters: BTreeMap::new(),
        }
    }
}

/// Renders the main evaluation: per-algorithm heatmaps over every axes pair,
/// the vine/rand-round comparison heatmaps, the profit profiles and the
/// runtime box plots. Further archives of repeated rand-round campaigns
/// average into the rand-round heatmap cells.
pub fn evaluate_vine_and_rand_round(
    mut vine: ExperimentStorage<VineScenarioResults>,
    mut rand_round: ExperimentStorage<RandRoundResult>,
    second_rand_rounds: &[ExperimentStorage<RandRoundResult>],
    options: EvaluationOptions,
) -> Result<(), EvaluationError> {
    let forbidden = exclude_generation_parameters(
        &mut vine,
        &mut rand_round,
        &options.excluded_generation_parameters,
    )?;
    let mut plotter_options = options.plotter;
    plotter_options.forbidden_scenario_ids = forbidden;

    let registry = HeatmapSpecRegistry::build();
    let filters = construct_filter_specs(
        &vine.scenario_parameter_container.scenarioparameter_room,
        &options.filter_parameter_keys,
        options.filter_max_depth,
    );
    log::info!("rendering the main evaluation for {} filters", filters.len());

    let vine_heatmaps = SingleHeatmapPlotter::new(
        HeatmapPlotType::Vine,
        VINE_ALGORITHM_ID,
        0,
        &vine,
        main_heatmap_axes(),
    );
    let rand_round_heatmaps = SingleHeatmapPlotter::new(
        HeatmapPlotType::RandRoundSepLpDynVmp,
        RAND_ROUND_ALGORITHM_ID,
        0,
        &rand_round,
        main_heatmap_axes(),
    )
    .with_second_storages(second_rand_rounds.iter().collect());
    let comparison = ComparisonHeatmapPlotter::new(
        &vine,
        &rand_round,
        VINE_ALGORITHM_ID,
        RAND_ROUND_ALGORITHM_ID,
        0,
        0,
        main_heatmap_axes(),
    );
    let profiles = ProfileComparisonPlotter::new(
        &vine,
        &rand_round,
        VINE_ALGORITHM_ID,
        RAND_ROUND_ALGORITHM_ID,
        0,
    )
    .with_request_sets(options.request_sets.clone());

    for filter in &filters {
        let filter = filter.as_deref();
        vine_heatmaps.plot_all(&registry, &plotter_options, filter)?;
        rand_round_heatmaps.plot_all(&registry, &plotter_options, filter)?;
        comparison.plot_all(&registry, &plotter_options, filter)?;
        profiles.plot_all(&plotter_options, filter)?;
    }

    evaluate_rand_round_runtimes(
        &rand_round,
        None,
        &BTreeMap::new(),
        runtime_boxplot_axes(),
        &options.filter_parameter_keys,
        &plotter_options,
    )
}

/// Renders the latency study: heatmaps over the approximation parameters,
/// the comparison against the latency-free baseline and the runtime box
/// plots with the baseline as an extra box. The execution parameter filter
/// pins latency parameters to one value each, e.g. the approximation type.
pub fn evaluate_latency_and_baseline(
    mut with_latencies: ExperimentStorage<RandRoundResult>,
    mut baseline: ExperimentStorage<RandRoundResult>,
    execution_parameter_filter: BTreeMap<String, ParamValue>,
    options: EvaluationOptions,
) -> Result<(), EvaluationError> {
    let forbidden = exclude_generation_parameters(
        &mut with_latencies,
        &mut baseline,
        &options.excluded_generation_parameters,
    )?;
    let mut plotter_options = options.plotter;
    plotter_options.forbidden_scenario_ids = forbidden;

    let registry = HeatmapSpecRegistry::build();
    let study = LatencyHeatmapPlotter::study(
        &with_latencies,
        RAND_ROUND_ALGORITHM_ID,
        &execution_parameter_filter,
        latency_study_axes(),
    )?;
    let comparison = LatencyHeatmapPlotter::comparison(
        &with_latencies,
        &baseline,
        RAND_ROUND_ALGORITHM_ID,
        &execution_parameter_filter,
        latency_comparison_axes(),
    )?;
    // filters must come from the grafted room so latency conjuncts resolve
    let filters = construct_filter_specs(
        comparison.room(),
        &options.filter_parameter_keys,
        options.filter_max_depth,
    );
    log::info!("rendering the latency study for {} filters", filters.len());
    for filter in &filters {
        let filter = filter.as_deref();
        study.plot_all(&registry, &plotter_options, filter)?;
        comparison.plot_all(&registry, &plotter_options, filter)?;
    }

    evaluate_rand_round_runtimes(
        &with_latencies,
        Some(&baseline),
        &execution_parameter_filter,
        latency_boxplot_axes(),
        &options.filter_parameter_keys,
        &plotter_options,
    )
}

fn evaluate_rand_round_runtimes(
    storage: &ExperimentStorage<RandRoundResult>,
    baseline: Option<&ExperimentStorage<RandRoundResult>>,
    execution_parameter_filter: &BTreeMap<String, ParamValue>,
    axes: Vec<BoxplotAxes>,
    filter_parameter_keys: &[String],
    options: &PlotterOptions,
) -> Result<(), EvaluationError> {
    let mut plotter = RuntimeBoxplotPlotter::new(
        storage,
        RAND_ROUND_ALGORITHM_ID,
        execution_parameter_filter,
        axes,
    )?;
    if let Some(baseline) = baseline {
        plotter = plotter.with_baseline(baseline)?;
    }
    let filters =
        construct_filter_specs(plotter.room(), filter_parameter_keys, RUNTIME_FILTER_DEPTH);
    for filter in &filters {
        plotter.plot_all(options, filter.as_deref())?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        aggregation::AggregatedData,
        results::VineResult,
        settings::{rand_round_settings_universe, vine_settings_universe},
        storage::{ExecutionParameterContainer, ScenarioParameterContainer},
    };
    use std::path::{Path, PathBuf};

    fn scenario_container() -> ScenarioParameterContainer {
        let room = serde_json::from_str(
            r#"{"scenario_generation": [{
                "request_generation": {"number_of_requests": [40, 60], "treewidth": [2, 3]},
                "substrate_generation": {
                    "edge_resource_factor": [0.5, 1.0],
                    "node_resource_factor": [0.2, 0.6]
                }
            }]}"#,
        )
        .unwrap();
        let dict = serde_json::from_str(
            r#"{"scenario_generation": [{
                "request_generation": {
                    "number_of_requests": {"40": [0, 1], "60": [2, 3]},
                    "treewidth": {"2": [0, 2], "3": [1, 3]}
                },
                "substrate_generation": {
                    "edge_resource_factor": {"0.5": [0, 2], "1.0": [1, 3]},
                    "node_resource_factor": {"0.2": [0, 3], "0.6": [1, 2]}
                }
            }]}"#,
        )
        .unwrap();
        ScenarioParameterContainer {
            scenarioparameter_room: room,
            scenario_parameter_dict: dict,
        }
    }

    fn registered_execution_container() -> ExecutionParameterContainer {
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

    fn vine_results(runtime: f64) -> VineScenarioResults {
        let mut results = VineScenarioResults::default();
        for settings in vine_settings_universe() {
            results.0.insert(
                settings,
                vec![VineResult {
                    profit: AggregatedData::aggregate(&[5.0]),
                    total_runtime: AggregatedData::aggregate(&[runtime]),
                    ..Default::default()
                }],
            );
        }
        results
    }

    fn rr_result(profit: f64, runtime: f64) -> RandRoundResult {
        let mut result = RandRoundResult {
            lp_profit: profit * 2.0,
            lp_time_optimization: runtime,
            latency_information: AggregatedData::aggregate(&[42.0]),
            ..Default::default()
        };
        for settings in rand_round_settings_universe() {
            result
                .profits
                .insert(settings, AggregatedData::aggregate(&[profit]));
            result
                .rounding_runtimes
                .insert(settings, AggregatedData::aggregate(&[1.0]));
        }
        result
    }

    fn vine_storage() -> ExperimentStorage<VineScenarioResults> {
        let mut solutions = BTreeMap::new();
        for scenario in 0..4usize {
            solutions.insert(
                scenario,
                BTreeMap::from([(0usize, vine_results(10.0 * (scenario + 1) as f64))]),
            );
        }
        ExperimentStorage {
            algorithm_scenario_solution_dictionary: BTreeMap::from([(
                VINE_ALGORITHM_ID.to_string(),
                solutions,
            )]),
            scenario_parameter_container: scenario_container(),
            execution_parameter_container: ExecutionParameterContainer::default(),
        }
    }

    fn rand_round_storage() -> ExperimentStorage<RandRoundResult> {
        let mut solutions = BTreeMap::new();
        for scenario in 0..4usize {
            solutions.insert(scenario, BTreeMap::from([(0usize, rr_result(8.0, 100.0))]));
        }
        ExperimentStorage {
            algorithm_scenario_solution_dictionary: BTreeMap::from([(
                RAND_ROUND_ALGORITHM_ID.to_string(),
                solutions,
            )]),
            scenario_parameter_container: scenario_container(),
            execution_parameter_container: registered_execution_container(),
        }
    }

    fn temp_base(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vnep_eval_flow_{tag}_{}", std::process::id()))
    }

    fn find_output(base: &Path, filename_part: &str) -> Vec<PathBuf> {
        let pattern = format!("{}/**/*{filename_part}*", base.to_string_lossy());
        glob::glob(&pattern).unwrap().map(Result::unwrap).collect()
    }

    #[test]
    fn the_main_flow_renders_every_plot_family() {
        let base = temp_base("main");
        let mut options = EvaluationOptions::new(&base);
        options
            .excluded_generation_parameters
            .insert("edge_resource_factor".to_string(), vec![ParamValue::from(1.0)]);

        evaluate_vine_and_rand_round(vine_storage(), rand_round_storage(), &[], options).unwrap();

        // one vine heatmap per settings group
        let vine_heatmaps = find_output(&base, "vine_mean_runtime__no_filter.html");
        assert_eq!(vine_heatmaps.len(), 5 * 9);
        assert!(!find_output(&base, "total_runtime__no_filter.html").is_empty());
        let comparisons = find_output(&base, "comparison_vine_rand_round__no_filter.html");
        assert!(comparisons
            .iter()
            .any(|path| path.to_string_lossy().contains("/vine_ALL_vs_randround_ALL/")));
        assert_eq!(find_output(&base, "ECDF_profit_no_filter.html").len(), 1);
        assert_eq!(
            find_output(&base, "boxplot_relative_performance_no_filter.html").len(),
            1
        );
        assert!(!find_output(&base, "lp_optimization_time__no_filter.html").is_empty());

        // the excluded factor value is gone: only the 0.5 row remains
        let all_variant = vine_heatmaps
            .iter()
            .find(|path| {
                let path = path.to_string_lossy();
                path.contains("/vine_ALL/") && path.contains("/AXES_NO_REQ_vs_EDGE_RF/")
            })
            .unwrap();
        let mut reader = csv::Reader::from_path(all_variant.with_extension("csv")).unwrap();
        let rows: Vec<(String, String, Option<f64>, usize)> =
            reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(
            rows,
            vec![
                ("40".to_string(), "0.5".to_string(), Some(10.0), 1),
                ("60".to_string(), "0.5".to_string(), Some(30.0), 1),
            ]
        );

        std::fs::remove_dir_all(&base).unwrap();
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
                    {
                        "latency_approximation_factor": 0.1,
                        "latency_approximation_limit": 5,
                        "latency_approximation_type": "strict"
                    },
                    {
                        "latency_approximation_factor": 0.4,
                        "latency_approximation_limit": 5,
                        "latency_approximation_type": "strict"
                    }
                ],
                "reverse_lookup": {"RandRoundSepLPOptDynVMPCollection": {
                    "all": [0, 1],
                    "algorithm_parameters": {
                        "latency_approximation_factor": {"0.1": [0], "0.4": [1]},
                        "latency_approximation_limit": {"5": [0, 1]},
                        "latency_approximation_type": {"strict": [0, 1]}
                    }
                }}
            }"#,
        )
        .unwrap()
    }

    fn latency_storage() -> ExperimentStorage<RandRoundResult> {
        let mut solutions = BTreeMap::new();
        for scenario in 0..2usize {
            solutions.insert(
                scenario,
                BTreeMap::from([
                    (0usize, rr_result(6.0, 100.0)),
                    (1usize, rr_result(4.0, 200.0)),
                ]),
            );
        }
        ExperimentStorage {
            algorithm_scenario_solution_dictionary: BTreeMap::from([(
                RAND_ROUND_ALGORITHM_ID.to_string(),
                solutions,
            )]),
            scenario_parameter_container: latency_scenario_container(),
            execution_parameter_container: latency_execution_container(),
        }
    }

    fn baseline_storage() -> ExperimentStorage<RandRoundResult> {
        let mut solutions = BTreeMap::new();
        for scenario in 0..2usize {
            solutions.insert(scenario, BTreeMap::from([(0usize, rr_result(8.0, 50.0))]));
        }
        ExperimentStorage {
            algorithm_scenario_solution_dictionary: BTreeMap::from([(
                RAND_ROUND_ALGORITHM_ID.to_string(),
                solutions,
            )]),
            scenario_parameter_container: latency_scenario_container(),
            execution_parameter_container: registered_execution_container(),
        }
    }

    #[test]
    fn the_latency_flow_renders_study_comparison_and_boxplots() {
        let base = temp_base("latency");
        let options = EvaluationOptions::new(&base);

        evaluate_latency_and_baseline(
            latency_storage(),
            baseline_storage(),
            BTreeMap::new(),
            options,
        )
        .unwrap();

        let study = find_output(&base, "total_runtime__no_filter.html");
        assert!(study
            .iter()
            .any(|path| path.to_string_lossy().contains("/AXES_EPSILON_LIMIT/")));
        let comparisons = find_output(&base, "comparison_baseline_with_latencies__no_filter.html");
        assert!(comparisons.iter().any(|path| {
            let path = path.to_string_lossy();
            path.contains("/AXES_TYPE_TOPOLOGY/") && path.contains("/with_latencies_vs_baseline/")
        }));
        assert!(!find_output(&base, "absolute_profit_comp__no_filter.html").is_empty());

        let boxplots = find_output(&base, "lp_optimization_time__no_filter.csv");
        let under_axes = boxplots
            .iter()
            .find(|path| path.to_string_lossy().contains("/AXES_TOPOLOGY_vs_TYPE/"))
            .unwrap();
        let mut reader = csv::Reader::from_path(under_axes).unwrap();
        let rows: Vec<(String, String, f64)> = reader.deserialize().map(Result::unwrap).collect();
        assert!(rows
            .iter()
            .any(|(_, series, value)| series == "baseline" && *value == 50.0));
        assert!(rows
            .iter()
            .any(|(_, series, value)| series == "strict" && *value == 100.0));

        std::fs::remove_dir_all(&base).unwrap();
    }
}
