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
//! The heatmap plot registry.
//!
//! Every heatmap is described by a [`HeatmapSpec`]: a display name, a file
//! name, a value range with color scale and color bar ticks, and a metric
//! bound to the settings it aggregates over. One metric prototype expands
//! into many specs, one per settings group, distinguished by the
//! `alg_variant` output path segment. The registry is built once at startup
//! and shared by all plotters.

use std::collections::BTreeMap;

use statrs::statistics::Statistics;

use crate::{
    aggregation::{compute_aggregated_mean, AggregatedData},
    results::{RandRoundResult, VineScenarioResults},
    settings::{
        comparison_settings_pairs, rand_round_settings_groups, rand_round_settings_universe,
        vine_settings_groups, RandRoundSettings, VineSettings,
    },
};

/// The plot families. Each plotter declares the single family it renders
/// and rejects specs of any other family at construction time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumIter,
)]
pub enum HeatmapPlotType {
    Vine,
    RandRoundSepLpDynVmp,
    SeparationLp,
    ComparisonVineRandRound,
    LatencyStudy,
    ComparisonLatencyBaseline,
}

/// Named plotly color scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMap {
    Greys,
    Reds,
    Blues,
    Greens,
    RdBuReversed,
}

impl ColorMap {
    pub fn scale_name(&self) -> &'static str {
        match self {
            ColorMap::Greys => "Greys",
            ColorMap::Reds => "Reds",
            ColorMap::Blues => "Blues",
            ColorMap::Greens => "Greens",
            ColorMap::RdBuReversed => "RdBu",
        }
    }

    pub fn reversed(&self) -> bool {
        matches!(self, ColorMap::RdBuReversed)
    }
}

pub type VineExtract = fn(&VineScenarioResults, &[VineSettings]) -> f64;
pub type RandRoundExtract = fn(&RandRoundResult, &[RandRoundSettings]) -> f64;
pub type ComparisonExtract =
    fn(&VineScenarioResults, &RandRoundResult, &[VineSettings], &[RandRoundSettings]) -> f64;
pub type PairExtract = fn(&RandRoundResult, &RandRoundResult, &[RandRoundSettings]) -> f64;

/// A metric bound to the settings it aggregates over. The extraction
/// functions are pure; binding happens by carrying the settings alongside
/// instead of capturing them in a closure, which keeps specs comparable and
/// cheap to clone.
#[derive(Debug, Clone)]
pub enum MetricBinding {
    Vine {
        extract: VineExtract,
        settings: Vec<VineSettings>,
    },
    RandRound {
        extract: RandRoundExtract,
        settings: Vec<RandRoundSettings>,
    },
    VineVsRandRound {
        extract: ComparisonExtract,
        vine_settings: Vec<VineSettings>,
        rand_round_settings: Vec<RandRoundSettings>,
    },
    /// Latency study: the first argument is the baseline result, the second
    /// the with-latencies result.
    RandRoundPair {
        extract: PairExtract,
        settings: Vec<RandRoundSettings>,
    },
}

impl MetricBinding {
    pub fn vine(&self, results: &VineScenarioResults) -> Option<f64> {
        match self {
            MetricBinding::Vine { extract, settings } => Some(extract(results, settings)),
            _ => None,
        }
    }

    pub fn rand_round(&self, result: &RandRoundResult) -> Option<f64> {
        match self {
            MetricBinding::RandRound { extract, settings } => Some(extract(result, settings)),
            _ => None,
        }
    }

    pub fn vine_vs_rand_round(
        &self,
        vine: &VineScenarioResults,
        rand_round: &RandRoundResult,
    ) -> Option<f64> {
        match self {
            MetricBinding::VineVsRandRound {
                extract,
                vine_settings,
                rand_round_settings,
            } => Some(extract(vine, rand_round, vine_settings, rand_round_settings)),
            _ => None,
        }
    }

    pub fn rand_round_pair(
        &self,
        baseline: &RandRoundResult,
        with_latencies: &RandRoundResult,
    ) -> Option<f64> {
        match self {
            MetricBinding::RandRoundPair { extract, settings } => {
                Some(extract(baseline, with_latencies, settings))
            }
            _ => None,
        }
    }
}

/// One heatmap plot.
#[derive(Debug, Clone)]
pub struct HeatmapSpec {
    pub name: String,
    pub filename: String,
    pub plot_type: HeatmapPlotType,
    pub vmin: f64,
    pub vmax: f64,
    pub colormap: ColorMap,
    pub colorbar_ticks: Vec<f64>,
    /// Output path segment naming the settings group the metric is bound to.
    pub alg_variant: String,
    pub metric: MetricBinding,
    /// Cell rounding; cells fall back to two decimals when absent.
    pub rounding: Option<fn(f64) -> f64>,
    /// Drops metric values before the cell mean.
    pub metric_filter: Option<fn(f64) -> bool>,
}

/// The shared scalar fields of a metric prototype, before it is expanded
/// over settings groups.
struct SpecTemplate {
    name: &'static str,
    filename: &'static str,
    plot_type: HeatmapPlotType,
    vmin: f64,
    vmax: f64,
    colormap: ColorMap,
    colorbar_ticks: Vec<f64>,
    rounding: Option<fn(f64) -> f64>,
}

impl SpecTemplate {
    fn instantiate(&self, alg_variant: String, metric: MetricBinding) -> HeatmapSpec {
        HeatmapSpec {
            name: self.name.to_string(),
            filename: self.filename.to_string(),
            plot_type: self.plot_type,
            vmin: self.vmin,
            vmax: self.vmax,
            colormap: self.colormap,
            colorbar_ticks: self.colorbar_ticks.clone(),
            alg_variant,
            metric,
            rounding: self.rounding,
            metric_filter: None,
        }
    }
}

fn ticks(from: i64, to_inclusive: i64, step: usize) -> Vec<f64> {
    (from..=to_inclusive).step_by(step).map(|t| t as f64).collect()
}

fn round_to_integer(value: f64) -> f64 {
    value.round()
}

fn vine_mean_total_runtime(results: &VineScenarioResults, settings: &[VineSettings]) -> f64 {
    let runtimes: Vec<AggregatedData> = settings
        .iter()
        .filter_map(|s| results.0.get(s))
        .flatten()
        .map(|result| result.total_runtime)
        .collect();
    compute_aggregated_mean(&runtimes)
}

fn rand_round_mean_rounding_runtime(
    result: &RandRoundResult,
    settings: &[RandRoundSettings],
) -> f64 {
    Statistics::mean(result.rounding_runtime_means(settings))
}

fn rand_round_dynvmp_initialization_sum(
    result: &RandRoundResult,
    _settings: &[RandRoundSettings],
) -> f64 {
    result.lp_time_dynvmp_initialization.sum()
}

fn rand_round_generated_mappings(result: &RandRoundResult, _settings: &[RandRoundSettings]) -> f64 {
    result.lp_generated_columns as f64 / 1000.0
}

fn rand_round_total_runtime(result: &RandRoundResult, _settings: &[RandRoundSettings]) -> f64 {
    result.total_runtime()
}

fn comparison_profit_best_relative(
    vine: &VineScenarioResults,
    rand_round: &RandRoundResult,
    vine_settings: &[VineSettings],
    rand_round_settings: &[RandRoundSettings],
) -> f64 {
    let best_vine = vine.best_profit(vine_settings);
    let best_rand_round = rand_round.best_profit(rand_round_settings);
    100.0 * (best_rand_round - best_vine) / best_vine
}

fn comparison_profit_qualitative_rand_round(
    vine: &VineScenarioResults,
    rand_round: &RandRoundResult,
    vine_settings: &[VineSettings],
    rand_round_settings: &[RandRoundSettings],
) -> f64 {
    let best_vine = vine.best_profit(vine_settings);
    let best_rand_round = rand_round.best_profit(rand_round_settings);
    if (best_rand_round - best_vine) / best_vine >= 0.05 {
        100.0
    } else {
        0.0
    }
}

fn comparison_profit_qualitative_vine(
    vine: &VineScenarioResults,
    rand_round: &RandRoundResult,
    vine_settings: &[VineSettings],
    rand_round_settings: &[RandRoundSettings],
) -> f64 {
    let best_vine = vine.best_profit(vine_settings);
    let best_rand_round = rand_round.best_profit(rand_round_settings);
    if (best_vine - best_rand_round) / best_rand_round >= 0.05 {
        100.0
    } else {
        0.0
    }
}

fn profit_relative_to_lp_bound_rand_round(
    _vine: &VineScenarioResults,
    rand_round: &RandRoundResult,
    _vine_settings: &[VineSettings],
    rand_round_settings: &[RandRoundSettings],
) -> f64 {
    100.0 * rand_round.best_profit(rand_round_settings) / rand_round.lp_profit
}

fn profit_relative_to_lp_bound_vine(
    vine: &VineScenarioResults,
    rand_round: &RandRoundResult,
    vine_settings: &[VineSettings],
    _rand_round_settings: &[RandRoundSettings],
) -> f64 {
    100.0 * vine.best_profit(vine_settings) / rand_round.lp_profit
}

fn relative_profit_difference_to_lp_bound(
    vine: &VineScenarioResults,
    rand_round: &RandRoundResult,
    vine_settings: &[VineSettings],
    rand_round_settings: &[RandRoundSettings],
) -> f64 {
    let lp_bound = rand_round.lp_profit;
    100.0 * (rand_round.best_profit(rand_round_settings) / lp_bound)
        - 100.0 * (vine.best_profit(vine_settings) / lp_bound)
}

/// The only metric guarding a zero denominator; all others let NaN and inf
/// flow into the cell mean.
fn latency_relative_profit(
    baseline: &RandRoundResult,
    with_latencies: &RandRoundResult,
    settings: &[RandRoundSettings],
) -> f64 {
    let best_baseline = baseline.best_profit(settings);
    let best_with_latencies = with_latencies.best_profit(settings);
    let relative = if best_baseline == 0.0 {
        0.0
    } else {
        100.0 * best_with_latencies / best_baseline
    };
    log::debug!(
        "latency comparison: baseline {best_baseline:.4}, \
         with latencies {best_with_latencies:.4} -> {relative:.4}"
    );
    relative
}

fn latency_absolute_profit(
    baseline: &RandRoundResult,
    with_latencies: &RandRoundResult,
    settings: &[RandRoundSettings],
) -> f64 {
    baseline.best_profit(settings) - with_latencies.best_profit(settings)
}

fn expand_over_vine_groups(template: SpecTemplate, extract: VineExtract) -> Vec<HeatmapSpec> {
    vine_settings_groups()
        .into_iter()
        .map(|(settings, name)| {
            template.instantiate(name, MetricBinding::Vine { extract, settings })
        })
        .collect()
}

fn expand_over_rand_round_groups(
    template: SpecTemplate,
    extract: RandRoundExtract,
) -> Vec<HeatmapSpec> {
    rand_round_settings_groups()
        .into_iter()
        .map(|(settings, name)| {
            template.instantiate(name, MetricBinding::RandRound { extract, settings })
        })
        .collect()
}

/// For metrics independent of the rounding settings a single plot over the
/// full universe suffices.
fn single_rand_round_group(template: SpecTemplate, extract: RandRoundExtract) -> Vec<HeatmapSpec> {
    vec![template.instantiate(
        "rr_seplp_ALL".to_string(),
        MetricBinding::RandRound {
            extract,
            settings: rand_round_settings_universe(),
        },
    )]
}

fn expand_over_comparison_pairs(
    template: SpecTemplate,
    extract: ComparisonExtract,
) -> Vec<HeatmapSpec> {
    comparison_settings_pairs()
        .into_iter()
        .map(|(vine_settings, rand_round_settings, name)| {
            template.instantiate(
                name,
                MetricBinding::VineVsRandRound {
                    extract,
                    vine_settings,
                    rand_round_settings,
                },
            )
        })
        .collect()
}

fn single_latency_pair(template: SpecTemplate, extract: PairExtract) -> Vec<HeatmapSpec> {
    vec![template.instantiate(
        "with_latencies_vs_baseline".to_string(),
        MetricBinding::RandRoundPair {
            extract,
            settings: rand_round_settings_universe(),
        },
    )]
}

fn vine_specs() -> Vec<HeatmapSpec> {
    expand_over_vine_groups(
        SpecTemplate {
            name: "ViNE: Mean Runtime [s]",
            filename: "vine_mean_runtime",
            plot_type: HeatmapPlotType::Vine,
            vmin: 0.0,
            vmax: 20.0,
            colormap: ColorMap::Greys,
            colorbar_ticks: ticks(0, 20, 4),
            rounding: Some(round_to_integer),
        },
        vine_mean_total_runtime,
    )
}

fn total_runtime_template(plot_type: HeatmapPlotType) -> SpecTemplate {
    SpecTemplate {
        name: "Total runtime [s]",
        filename: "total_runtime",
        plot_type,
        vmin: 0.0,
        vmax: 8000.0,
        colormap: ColorMap::Blues,
        colorbar_ticks: ticks(0, 8000, 2000),
        rounding: None,
    }
}

fn rand_round_specs() -> Vec<HeatmapSpec> {
    let mut specs = expand_over_rand_round_groups(
        SpecTemplate {
            name: "RR: Mean Rounding Runtime",
            filename: "randround_mean_rounding_runtime",
            plot_type: HeatmapPlotType::RandRoundSepLpDynVmp,
            vmin: 0.0,
            vmax: 200.0,
            colormap: ColorMap::Reds,
            colorbar_ticks: ticks(0, 200, 40),
            rounding: None,
        },
        rand_round_mean_rounding_runtime,
    );
    specs.extend(single_rand_round_group(
        SpecTemplate {
            name: "RR: Mean DynVMP Initialization Runtimes",
            filename: "randround_mean_dynvmp_initialization",
            plot_type: HeatmapPlotType::RandRoundSepLpDynVmp,
            vmin: 0.0,
            vmax: 50.0,
            colormap: ColorMap::Reds,
            colorbar_ticks: ticks(0, 50, 10),
            rounding: None,
        },
        rand_round_dynvmp_initialization_sum,
    ));
    specs.extend(single_rand_round_group(
        SpecTemplate {
            name: "Generated mappings [k]",
            filename: "lp_generated_mappings",
            plot_type: HeatmapPlotType::RandRoundSepLpDynVmp,
            vmin: 0.0,
            vmax: 2.0,
            colormap: ColorMap::Greens,
            colorbar_ticks: ticks(0, 2, 1),
            rounding: None,
        },
        rand_round_generated_mappings,
    ));
    specs.extend(expand_over_rand_round_groups(
        SpecTemplate {
            name: "RR: Rounding Runtime",
            filename: "randround_rounding_runtime",
            plot_type: HeatmapPlotType::RandRoundSepLpDynVmp,
            vmin: 0.0,
            vmax: 100.0,
            colormap: ColorMap::Blues,
            colorbar_ticks: ticks(0, 100, 20),
            rounding: None,
        },
        rand_round_mean_rounding_runtime,
    ));
    specs.extend(expand_over_rand_round_groups(
        total_runtime_template(HeatmapPlotType::RandRoundSepLpDynVmp),
        rand_round_total_runtime,
    ));
    specs
}

fn comparison_specs() -> Vec<HeatmapSpec> {
    let mut specs = expand_over_comparison_pairs(
        SpecTemplate {
            name: "Relative Profit: rand round vs ViNE",
            filename: "comparison_vine_rand_round",
            plot_type: HeatmapPlotType::ComparisonVineRandRound,
            vmin: -100.0,
            vmax: 100.0,
            colormap: ColorMap::Reds,
            colorbar_ticks: ticks(-100, 100, 33),
            rounding: None,
        },
        comparison_profit_best_relative,
    );
    specs.extend(expand_over_comparison_pairs(
        SpecTemplate {
            name: "Qualitative Difference > 5%: Rand Round",
            filename: "qual_diff_5perc_rand_round",
            plot_type: HeatmapPlotType::ComparisonVineRandRound,
            vmin: 0.0,
            vmax: 100.0,
            colormap: ColorMap::Reds,
            colorbar_ticks: ticks(0, 100, 20),
            rounding: None,
        },
        comparison_profit_qualitative_rand_round,
    ));
    specs.extend(expand_over_comparison_pairs(
        SpecTemplate {
            name: "Qualitative Difference > 5%: ViNE",
            filename: "qual_diff_5perc_vine",
            plot_type: HeatmapPlotType::ComparisonVineRandRound,
            vmin: 0.0,
            vmax: 100.0,
            colormap: ColorMap::Reds,
            colorbar_ticks: ticks(0, 100, 20),
            rounding: None,
        },
        comparison_profit_qualitative_vine,
    ));
    specs.extend(expand_over_comparison_pairs(
        SpecTemplate {
            name: "Rel. Profit: Rand Round",
            filename: "rel_profit_lpbound_rr",
            plot_type: HeatmapPlotType::ComparisonVineRandRound,
            vmin: 0.0,
            vmax: 100.0,
            colormap: ColorMap::Reds,
            colorbar_ticks: ticks(0, 100, 20),
            rounding: None,
        },
        profit_relative_to_lp_bound_rand_round,
    ));
    specs.extend(expand_over_comparison_pairs(
        SpecTemplate {
            name: "Rel. Profit: WiNE",
            filename: "rel_profit_lpbound_vine",
            plot_type: HeatmapPlotType::ComparisonVineRandRound,
            vmin: 0.0,
            vmax: 100.0,
            colormap: ColorMap::Reds,
            colorbar_ticks: ticks(0, 100, 20),
            rounding: None,
        },
        profit_relative_to_lp_bound_vine,
    ));
    specs.extend(expand_over_comparison_pairs(
        SpecTemplate {
            name: "Rel. Improv.: ($\\mathsf{RR}_{\\mathsf{best}}$ - \
                   $\\mathsf{WiNE}_{\\mathsf{best}}$)/$\\mathsf{LP}_{\\mathsf{UB}}$ [%]",
            filename: "rel_profit_difference_lpbound",
            plot_type: HeatmapPlotType::ComparisonVineRandRound,
            vmin: -25.0,
            vmax: 25.0,
            colormap: ColorMap::RdBuReversed,
            colorbar_ticks: ticks(-24, 24, 6),
            rounding: None,
        },
        relative_profit_difference_to_lp_bound,
    ));
    specs
}

fn latency_study_specs() -> Vec<HeatmapSpec> {
    expand_over_rand_round_groups(
        total_runtime_template(HeatmapPlotType::LatencyStudy),
        rand_round_total_runtime,
    )
}

fn latency_comparison_specs() -> Vec<HeatmapSpec> {
    let mut specs = single_latency_pair(
        SpecTemplate {
            name: "Relative profit: % of baseline",
            filename: "comparison_baseline_with_latencies",
            plot_type: HeatmapPlotType::ComparisonLatencyBaseline,
            vmin: 0.0,
            vmax: 120.0,
            colormap: ColorMap::Reds,
            colorbar_ticks: ticks(0, 120, 20),
            rounding: None,
        },
        latency_relative_profit,
    );
    specs.extend(single_latency_pair(
        SpecTemplate {
            name: "Absolute Profit: With Latencies vs. Baseline",
            filename: "absolute_profit_comp",
            plot_type: HeatmapPlotType::ComparisonLatencyBaseline,
            vmin: 0.0,
            vmax: 100.0,
            colormap: ColorMap::Reds,
            colorbar_ticks: ticks(0, 100, 20),
            rounding: None,
        },
        latency_absolute_profit,
    ));
    specs
}

/// All registered heatmap specs keyed by plot family.
#[derive(Debug, Clone)]
pub struct HeatmapSpecRegistry {
    specs: BTreeMap<HeatmapPlotType, Vec<HeatmapSpec>>,
}

impl HeatmapSpecRegistry {
    pub fn build() -> Self {
        let mut specs = BTreeMap::new();
        specs.insert(HeatmapPlotType::Vine, vine_specs());
        specs.insert(HeatmapPlotType::RandRoundSepLpDynVmp, rand_round_specs());
        specs.insert(
            HeatmapPlotType::ComparisonVineRandRound,
            comparison_specs(),
        );
        specs.insert(HeatmapPlotType::LatencyStudy, latency_study_specs());
        specs.insert(
            HeatmapPlotType::ComparisonLatencyBaseline,
            latency_comparison_specs(),
        );
        Self { specs }
    }

    pub fn specs(&self, plot_type: HeatmapPlotType) -> &[HeatmapSpec] {
        self.specs
            .get(&plot_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// One heatmap axis pair: the scenario generation parameters spanning the
/// grid and the output folder collecting the plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapAxes {
    pub x_parameter: &'static str,
    pub x_title: &'static str,
    pub y_parameter: &'static str,
    pub y_title: &'static str,
    pub foldername: &'static str,
}

pub fn main_heatmap_axes() -> Vec<HeatmapAxes> {
    vec![
        HeatmapAxes {
            x_parameter: "number_of_requests",
            x_title: "Number of Requests",
            y_parameter: "edge_resource_factor",
            y_title: "Edge Resource Factor",
            foldername: "AXES_NO_REQ_vs_EDGE_RF",
        },
        HeatmapAxes {
            x_parameter: "treewidth",
            x_title: "Treewidth",
            y_parameter: "number_of_requests",
            y_title: "Number of Requests",
            foldername: "AXES_TREEWIDTH_vs_NO_REQ",
        },
        HeatmapAxes {
            x_parameter: "node_resource_factor",
            x_title: "Node Resource Factor",
            y_parameter: "edge_resource_factor",
            y_title: "Edge Resource Factor",
            foldername: "AXES_RESOURCES",
        },
        HeatmapAxes {
            x_parameter: "number_of_requests",
            x_title: "Number of Requests",
            y_parameter: "node_resource_factor",
            y_title: "Node Resource Factor",
            foldername: "AXES_NO_REQ_vs_NODE_RF",
        },
        HeatmapAxes {
            x_parameter: "treewidth",
            x_title: "Treewidth",
            y_parameter: "edge_resource_factor",
            y_title: "Edge Resource Factor",
            foldername: "AXES_TREEWIDTH_vs_EDGE_RF",
        },
    ]
}

pub fn latency_study_axes() -> Vec<HeatmapAxes> {
    vec![HeatmapAxes {
        x_parameter: "latency_approximation_factor",
        x_title: "Epsilon",
        y_parameter: "latency_approximation_limit",
        y_title: "Limit",
        foldername: "AXES_EPSILON_LIMIT",
    }]
}

pub fn latency_comparison_axes() -> Vec<HeatmapAxes> {
    vec![HeatmapAxes {
        x_parameter: "latency_approximation_type",
        x_title: "Type",
        y_parameter: "topology",
        y_title: "Topology",
        foldername: "AXES_TYPE_TOPOLOGY",
    }]
}
