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
use std::{collections::BTreeMap, fs, path::PathBuf, process};

use clap::{Parser, ValueEnum};

use vnep_eval::{
    evaluation::{evaluate_latency_and_baseline, EvaluationOptions},
    parameters::ParamValue,
    results::RandRoundResult,
    storage::ExperimentStorage,
    util,
};

/// Renders the latency study of a latency-constrained randomized rounding
/// archive against a latency-free baseline.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Aggregated results of the latency-constrained campaign, a JSON file
    /// or a directory containing one.
    #[arg(short, long, default_value = "./data/with_latencies/")]
    with_latencies_path: String,
    /// Aggregated results of the latency-free baseline campaign.
    #[arg(short, long, default_value = "./data/baseline/")]
    baseline_path: String,
    /// Overwrite the output path for plots.
    #[arg(short, long, default_value = "./plots/")]
    output_path: String,
    /// Restrict the study to one latency approximation type.
    #[arg(short = 't', long, value_enum)]
    filter_type: Option<FilterType>,
    /// Pin a latency execution parameter to one value, e.g.
    /// `latency_approximation_limit=10`; may be given several times.
    #[arg(long, value_parser = util::parse_parameter_value)]
    filter_exec: Vec<(String, ParamValue)>,
    /// Keep existing plot files instead of re-rendering them.
    #[arg(long)]
    keep_existing: bool,
    /// Render figure titles; the default output is print-ready without them.
    #[arg(long)]
    with_titles: bool,
    /// Scenario parameter to additionally split the plots by; may be given
    /// several times.
    #[arg(short, long)]
    filter_parameter: Vec<String>,
    /// How many filter parameters may be pinned at once.
    #[arg(long, default_value_t = 10)]
    max_depth_filter: usize,
    /// Exclude scenarios generated with the given parameter values; may be
    /// given several times.
    #[arg(short, long, value_parser = util::parse_parameter_values)]
    exclude: Vec<(String, Vec<ParamValue>)>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FilterType {
    /// Executions approximating latencies against strict limits.
    Strict,
    /// Executions approximating latencies against flexible limits.
    Flex,
    /// Executions that ignored latencies entirely.
    NoLatencies,
}

impl FilterType {
    fn parameter_value(self) -> ParamValue {
        match self {
            FilterType::Strict => ParamValue::from("strict"),
            FilterType::Flex => ParamValue::from("flex"),
            FilterType::NoLatencies => ParamValue::from("no latencies"),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init_logging();

    let args = Args::parse();
    fs::create_dir_all(&args.output_path)?;

    let with_latencies_path = PathBuf::from(&args.with_latencies_path);
    let baseline_path = PathBuf::from(&args.baseline_path);
    if !with_latencies_path.exists() || !baseline_path.exists() {
        log::error!("could not read data in {with_latencies_path:?} and {baseline_path:?}");
        process::exit(1)
    }

    let with_latencies: ExperimentStorage<RandRoundResult> =
        ExperimentStorage::load(&with_latencies_path)?;
    let baseline: ExperimentStorage<RandRoundResult> = ExperimentStorage::load(&baseline_path)?;

    let mut execution_filter: BTreeMap<String, ParamValue> =
        args.filter_exec.into_iter().collect();
    if let Some(filter_type) = args.filter_type {
        execution_filter.insert(
            "latency_approximation_type".to_string(),
            filter_type.parameter_value(),
        );
    }

    let mut options = EvaluationOptions::new(&args.output_path);
    options.plotter.overwrite = !args.keep_existing;
    options.plotter.paper_mode = !args.with_titles;
    options.filter_parameter_keys = args.filter_parameter;
    options.filter_max_depth = args.max_depth_filter;
    options.excluded_generation_parameters = args.exclude.into_iter().collect();

    evaluate_latency_and_baseline(with_latencies, baseline, execution_filter, options)?;
    Ok(())
}
