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
use std::{fs, path::PathBuf, process};

use clap::Parser;

use vnep_eval::{
    evaluation::{evaluate_vine_and_rand_round, EvaluationOptions},
    parameters::ParamValue,
    results::{RandRoundResult, VineScenarioResults},
    storage::ExperimentStorage,
    util,
};

/// Renders the full ViNE vs randomized rounding evaluation from two reduced
/// result archives.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Aggregated ViNE results, a JSON file or a directory containing one.
    #[arg(short, long, default_value = "./data/vine/")]
    vine_path: String,
    /// Aggregated randomized rounding results.
    #[arg(short, long, default_value = "./data/randround/")]
    rand_round_path: String,
    /// Further randomized rounding archives of repeated campaigns; their
    /// values are averaged into the heatmap cells.
    #[arg(long)]
    second_rand_round_path: Vec<String>,
    /// Overwrite the output path for plots.
    #[arg(short, long, default_value = "./plots/")]
    output_path: String,
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
    #[arg(long, default_value_t = 2)]
    max_depth_filter: usize,
    /// Exclude scenarios generated with the given parameter values, e.g.
    /// `edge_resource_factor=0.25,0.5`; may be given several times.
    #[arg(short, long, value_parser = util::parse_parameter_values)]
    exclude: Vec<(String, Vec<ParamValue>)>,
    /// Request counts pooled into one ECDF panel, e.g. `40,60`; may be
    /// given several times.
    #[arg(long, value_parser = util::parse_request_set)]
    request_set: Vec<Vec<i64>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init_logging();

    let args = Args::parse();
    fs::create_dir_all(&args.output_path)?;

    let vine_path = PathBuf::from(&args.vine_path);
    let rand_round_path = PathBuf::from(&args.rand_round_path);
    if !vine_path.exists() || !rand_round_path.exists() {
        log::error!("could not read data in {vine_path:?} and {rand_round_path:?}");
        process::exit(1)
    }

    let vine: ExperimentStorage<VineScenarioResults> = ExperimentStorage::load(&vine_path)?;
    let rand_round: ExperimentStorage<RandRoundResult> = ExperimentStorage::load(&rand_round_path)?;
    let second_rand_rounds: Vec<ExperimentStorage<RandRoundResult>> = args
        .second_rand_round_path
        .iter()
        .map(ExperimentStorage::load)
        .collect::<Result<_, _>>()?;

    let mut options = EvaluationOptions::new(&args.output_path);
    options.plotter.overwrite = !args.keep_existing;
    options.plotter.paper_mode = !args.with_titles;
    options.filter_parameter_keys = args.filter_parameter;
    options.filter_max_depth = args.max_depth_filter;
    if !args.request_set.is_empty() {
        options.request_sets = args.request_set;
    }
    options.excluded_generation_parameters = args.exclude.into_iter().collect();

    evaluate_vine_and_rand_round(vine, rand_round, &second_rand_rounds, options)?;
    Ok(())
}
