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
//! Compact statistical summaries of sample populations.
//!
//! The reduced result archives never carry raw sample vectors, only the
//! five-field [`AggregatedData`] summary per population. Downstream code must
//! therefore be careful about what it re-aggregates: the mean survives
//! count-weighted merging, the other fields do not.

use std::fmt;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Summary of a population of samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedData {
    /// Smallest observed value.
    pub min: f64,
    /// Arithmetic mean over all observed values.
    pub mean: f64,
    /// Largest observed value.
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Number of samples the summary was computed from.
    pub value_count: usize,
}

impl AggregatedData {
    /// Summarize a population. An empty population yields the all-zero
    /// default value.
    pub fn aggregate(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        Self {
            min: Statistics::min(values.iter()),
            mean: Statistics::mean(values.iter()),
            max: Statistics::max(values.iter()),
            std_dev: Statistics::population_std_dev(values.iter()),
            value_count: values.len(),
        }
    }

    /// Total of the summarized population, reconstructed as `mean * count`.
    pub fn sum(&self) -> f64 {
        self.mean * self.value_count as f64
    }
}

impl fmt::Display for AggregatedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.4} <= {:.4} (+- {:.4}) <= {:.4}; n={}]",
            self.min, self.mean, self.std_dev, self.max, self.value_count
        )
    }
}

/// Count-weighted mean over several population summaries.
///
/// This is the only field of [`AggregatedData`] that can be merged across
/// populations: `sum(mean_i * count_i) / sum(count_i)` equals the mean of the
/// concatenated populations. Returns NaN when the summaries are empty or
/// cover no samples at all.
pub fn compute_aggregated_mean(data: &[AggregatedData]) -> f64 {
    let total: usize = data.iter().map(|agg| agg.value_count).sum();
    if total == 0 {
        return f64::NAN;
    }
    let weighted: f64 = data.iter().map(AggregatedData::sum).sum();
    weighted / total as f64
}
