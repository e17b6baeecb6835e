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
//! Algorithm variants and their naming scheme.
//!
//! Each evaluated algorithm family spans a small cross product of
//! sub-parameters. The reduced archives key results by the canonical name of
//! the sub-parameter combination, and output directories reuse the same
//! names, so the string forms here are wire format and must stay stable.

use std::{fmt, str::FromStr};

use itertools::iproduct;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid algorithm settings name {0:?}")]
pub struct SettingsParseError(String);

/// How the ViNE heuristic embeds virtual edges.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum_macros::EnumString,
)]
pub enum VineEdgeEmbeddingModel {
    /// Multi-commodity flow embedding, edges may be split across paths.
    #[strum(serialize = "mcf")]
    Splittable,
    /// Single shortest-path embedding per virtual edge.
    #[strum(serialize = "sp")]
    Unsplittable,
}

/// Objective of the node/edge mapping LPs solved by ViNE.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    strum_macros::EnumString,
)]
pub enum VineLpObjective {
    #[strum(serialize = "lb_def")]
    LbDefault,
    #[strum(serialize = "lb_scenario")]
    LbInclScenarioCosts,
    #[strum(serialize = "cost_def")]
    CostsDefault,
    #[strum(serialize = "cost_scenario")]
    CostsInclScenarioCosts,
}

impl VineLpObjective {
    /// Load balancing or cost minimization.
    pub fn objective_code(&self) -> &'static str {
        match self {
            VineLpObjective::LbDefault | VineLpObjective::LbInclScenarioCosts => "lb",
            VineLpObjective::CostsDefault | VineLpObjective::CostsInclScenarioCosts => "cost",
        }
    }

    /// Whether the objective includes the scenario costs.
    pub fn scope_code(&self) -> &'static str {
        match self {
            VineLpObjective::LbInclScenarioCosts | VineLpObjective::CostsInclScenarioCosts => {
                "scenario"
            }
            VineLpObjective::LbDefault | VineLpObjective::CostsDefault => "def",
        }
    }
}

/// How ViNE derives a mapping from the LP solutions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum_macros::EnumString,
)]
pub enum VineRoundingProcedure {
    #[strum(serialize = "rand")]
    Randomized,
    #[strum(serialize = "det")]
    Deterministic,
}

/// One ViNE sub-parameter combination.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct VineSettings {
    pub edge_embedding_model: VineEdgeEmbeddingModel,
    pub lp_objective: VineLpObjective,
    pub rounding_procedure: VineRoundingProcedure,
}

impl VineSettings {
    pub fn new(
        edge_embedding_model: VineEdgeEmbeddingModel,
        lp_objective: VineLpObjective,
        rounding_procedure: VineRoundingProcedure,
    ) -> Self {
        Self {
            edge_embedding_model,
            lp_objective,
            rounding_procedure,
        }
    }

    /// Canonical name, e.g. `vine_sp_lb_def_rand`. Used as result map key
    /// and output directory name.
    pub fn name(&self) -> String {
        format!(
            "vine_{}_{}_{}_{}",
            self.edge_embedding_model,
            self.lp_objective.objective_code(),
            self.lp_objective.scope_code(),
            self.rounding_procedure,
        )
    }

    /// Shorter variant id without the cost scope, e.g. `vine_sp_lb_rand`.
    pub fn variant_string(&self) -> String {
        format!(
            "vine_{}_{}_{}",
            self.edge_embedding_model,
            self.lp_objective.objective_code(),
            self.rounding_procedure,
        )
    }
}

impl fmt::Display for VineSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for VineSettings {
    type Err = SettingsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SettingsParseError(s.to_string());
        let rest = s.strip_prefix("vine_").ok_or_else(err)?;
        let parts: Vec<&str> = rest.split('_').collect();
        let [edge, objective, scope, rounding] = parts.as_slice() else {
            return Err(err());
        };
        Ok(VineSettings {
            edge_embedding_model: edge.parse().map_err(|_| err())?,
            lp_objective: format!("{objective}_{scope}").parse().map_err(|_| err())?,
            rounding_procedure: rounding.parse().map_err(|_| err())?,
        })
    }
}

impl From<VineSettings> for String {
    fn from(settings: VineSettings) -> String {
        settings.name()
    }
}

impl TryFrom<String> for VineSettings {
    type Error = SettingsParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Whether the separation LP is re-solved while rounding.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum_macros::EnumString,
)]
pub enum LpRecomputationMode {
    #[strum(serialize = "no_recomp")]
    NoRecomputation,
    #[strum(serialize = "recomp_no_sep")]
    WithoutSeparation,
    #[strum(serialize = "recomp_single_sep")]
    WithSingleSeparation,
}

impl LpRecomputationMode {
    /// Alternative code used by the `dynvmp__` variant ids.
    pub fn variant_code(&self) -> &'static str {
        match self {
            LpRecomputationMode::NoRecomputation => "recomp_none",
            LpRecomputationMode::WithoutSeparation => "recomp_no_sep",
            LpRecomputationMode::WithSingleSeparation => "recomp_single_sep",
        }
    }
}

/// Order in which requests are considered during rounding.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum_macros::EnumString,
)]
pub enum LpRoundingOrder {
    #[strum(serialize = "round_rand")]
    Random,
    #[strum(serialize = "round_static_profit")]
    StaticProfit,
    #[strum(serialize = "round_achieved_profit")]
    AchievedProfit,
}

/// One randomized-rounding sub-parameter combination.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct RandRoundSettings {
    pub lp_recomputation_mode: LpRecomputationMode,
    pub rounding_order: LpRoundingOrder,
}

impl RandRoundSettings {
    pub fn new(lp_recomputation_mode: LpRecomputationMode, rounding_order: LpRoundingOrder) -> Self {
        Self {
            lp_recomputation_mode,
            rounding_order,
        }
    }

    /// Canonical name, e.g. `rr_seplp_no_recomp__round_rand`.
    pub fn name(&self) -> String {
        format!(
            "rr_seplp_{}__{}",
            self.lp_recomputation_mode, self.rounding_order
        )
    }

    /// Variant id in the DynVMP naming scheme, e.g.
    /// `dynvmp__recomp_none__round_rand`.
    pub fn variant_string(&self) -> String {
        format!(
            "dynvmp__{}__{}",
            self.lp_recomputation_mode.variant_code(),
            self.rounding_order
        )
    }
}

impl fmt::Display for RandRoundSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for RandRoundSettings {
    type Err = SettingsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SettingsParseError(s.to_string());
        let rest = s.strip_prefix("rr_seplp_").ok_or_else(err)?;
        let (mode, order) = rest.split_once("__").ok_or_else(err)?;
        Ok(RandRoundSettings {
            lp_recomputation_mode: mode.parse().map_err(|_| err())?,
            rounding_order: order.parse().map_err(|_| err())?,
        })
    }
}

impl From<RandRoundSettings> for String {
    fn from(settings: RandRoundSettings) -> String {
        settings.name()
    }
}

impl TryFrom<String> for RandRoundSettings {
    type Error = SettingsParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// The evaluated ViNE sub-parameter combinations: unsplittable embeddings
/// with the default (scenario-cost-free) objectives.
pub fn vine_settings_universe() -> Vec<VineSettings> {
    iproduct!(
        VineEdgeEmbeddingModel::iter(),
        VineLpObjective::iter(),
        VineRoundingProcedure::iter()
    )
    .filter(|(edge, objective, _)| {
        *edge != VineEdgeEmbeddingModel::Splittable
            && !matches!(
                objective,
                VineLpObjective::LbInclScenarioCosts | VineLpObjective::CostsInclScenarioCosts
            )
    })
    .map(|(edge, objective, rounding)| VineSettings::new(edge, objective, rounding))
    .collect()
}

/// The evaluated randomized-rounding combinations; single-separation
/// recomputation was never run.
pub fn rand_round_settings_universe() -> Vec<RandRoundSettings> {
    iproduct!(LpRecomputationMode::iter(), LpRoundingOrder::iter())
        .filter(|(mode, _)| *mode != LpRecomputationMode::WithSingleSeparation)
        .map(|(mode, order)| RandRoundSettings::new(mode, order))
        .collect()
}

/// Settings groups a metric prototype is expanded over: the whole universe,
/// every single combination, and every aggregation level that selects a
/// strict, non-empty subset of the universe.
pub fn vine_settings_groups() -> Vec<(Vec<VineSettings>, String)> {
    let universe = vine_settings_universe();
    let mut groups = vec![(universe.clone(), "vine_ALL".to_string())];
    for settings in &universe {
        groups.push((vec![*settings], settings.name()));
    }

    let mut push_level = |matching: Vec<VineSettings>, name: String| {
        if !matching.is_empty() && matching.len() < universe.len() {
            groups.push((matching, name));
        }
    };
    for edge in VineEdgeEmbeddingModel::iter() {
        let matching = universe
            .iter()
            .copied()
            .filter(|s| s.edge_embedding_model == edge)
            .collect();
        push_level(matching, format!("vine_{}", edge.to_string().to_uppercase()));
    }
    for objective in VineLpObjective::iter() {
        let matching = universe
            .iter()
            .copied()
            .filter(|s| s.lp_objective == objective)
            .collect();
        push_level(
            matching,
            format!(
                "vine_{}_{}",
                objective.objective_code().to_uppercase(),
                objective.scope_code().to_uppercase()
            ),
        );
    }
    for rounding in VineRoundingProcedure::iter() {
        let matching = universe
            .iter()
            .copied()
            .filter(|s| s.rounding_procedure == rounding)
            .collect();
        push_level(
            matching,
            format!("vine_{}", rounding.to_string().to_uppercase()),
        );
    }
    groups
}

/// The (ViNE, RandRound) settings pairs the comparison plots are drawn for.
/// Both pairs select the same sets as long as the ViNE universe is
/// unsplittable-only, but they are kept as separate output variants.
pub fn comparison_settings_pairs() -> Vec<(Vec<VineSettings>, Vec<RandRoundSettings>, String)> {
    let vine = vine_settings_universe();
    let rand_round = rand_round_settings_universe();
    let unsplittable: Vec<VineSettings> = vine
        .iter()
        .copied()
        .filter(|s| s.edge_embedding_model == VineEdgeEmbeddingModel::Unsplittable)
        .collect();
    vec![
        (
            vine,
            rand_round.clone(),
            "vine_ALL_vs_randround_ALL".to_string(),
        ),
        (
            unsplittable,
            rand_round,
            "vine_SP_vs_randround_ALL".to_string(),
        ),
    ]
}

/// Randomized-rounding counterpart of [`vine_settings_groups`].
pub fn rand_round_settings_groups() -> Vec<(Vec<RandRoundSettings>, String)> {
    let universe = rand_round_settings_universe();
    let mut groups = vec![(universe.clone(), "rr_seplp_ALL".to_string())];
    for settings in &universe {
        groups.push((vec![*settings], settings.name()));
    }

    let mut push_level = |matching: Vec<RandRoundSettings>, name: String| {
        if !matching.is_empty() && matching.len() < universe.len() {
            groups.push((matching, name));
        }
    };
    for mode in LpRecomputationMode::iter() {
        let matching = universe
            .iter()
            .copied()
            .filter(|s| s.lp_recomputation_mode == mode)
            .collect();
        push_level(
            matching,
            format!("rr_seplp_{}", mode.to_string().to_uppercase()),
        );
    }
    for order in LpRoundingOrder::iter() {
        let matching = universe
            .iter()
            .copied()
            .filter(|s| s.rounding_order == order)
            .collect();
        push_level(
            matching,
            format!("rr_seplp_{}", order.to_string().to_uppercase()),
        );
    }
    groups
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn vine_universe_covers_default_objectives_only() {
        let universe = vine_settings_universe();
        assert_eq!(universe.len(), 4);
        assert!(universe
            .iter()
            .all(|s| s.edge_embedding_model == VineEdgeEmbeddingModel::Unsplittable));
        assert!(universe.iter().all(|s| matches!(
            s.lp_objective,
            VineLpObjective::LbDefault | VineLpObjective::CostsDefault
        )));
    }

    #[test]
    fn rand_round_universe_skips_single_separation() {
        let universe = rand_round_settings_universe();
        assert_eq!(universe.len(), 6);
        assert!(universe
            .iter()
            .all(|s| s.lp_recomputation_mode != LpRecomputationMode::WithSingleSeparation));
    }

    #[test]
    fn vine_names_are_stable() {
        let settings = VineSettings::new(
            VineEdgeEmbeddingModel::Unsplittable,
            VineLpObjective::LbDefault,
            VineRoundingProcedure::Randomized,
        );
        assert_eq!(settings.name(), "vine_sp_lb_def_rand");
        assert_eq!(settings.variant_string(), "vine_sp_lb_rand");

        let settings = VineSettings::new(
            VineEdgeEmbeddingModel::Splittable,
            VineLpObjective::CostsInclScenarioCosts,
            VineRoundingProcedure::Deterministic,
        );
        assert_eq!(settings.name(), "vine_mcf_cost_scenario_det");
    }

    #[test]
    fn rand_round_names_are_stable() {
        let settings = RandRoundSettings::new(
            LpRecomputationMode::NoRecomputation,
            LpRoundingOrder::Random,
        );
        assert_eq!(settings.name(), "rr_seplp_no_recomp__round_rand");
        // the DynVMP scheme spells no-recomputation differently
        assert_eq!(settings.variant_string(), "dynvmp__recomp_none__round_rand");

        let settings = RandRoundSettings::new(
            LpRecomputationMode::WithoutSeparation,
            LpRoundingOrder::AchievedProfit,
        );
        assert_eq!(
            settings.name(),
            "rr_seplp_recomp_no_sep__round_achieved_profit"
        );
    }

    #[test]
    fn names_parse_back() {
        for settings in vine_settings_universe() {
            assert_eq!(settings.name().parse::<VineSettings>().unwrap(), settings);
        }
        for settings in rand_round_settings_universe() {
            assert_eq!(
                settings.name().parse::<RandRoundSettings>().unwrap(),
                settings
            );
        }
        assert!("vine_sp_lb_def".parse::<VineSettings>().is_err());
        assert!("rr_seplp_no_recomp".parse::<RandRoundSettings>().is_err());
        assert!("dynvmp__recomp_none__round_rand"
            .parse::<RandRoundSettings>()
            .is_err());
    }

    #[test]
    fn settings_serialize_as_name_strings() {
        let settings = VineSettings::new(
            VineEdgeEmbeddingModel::Unsplittable,
            VineLpObjective::CostsDefault,
            VineRoundingProcedure::Deterministic,
        );
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(json, "\"vine_sp_cost_def_det\"");
        assert_eq!(serde_json::from_str::<VineSettings>(&json).unwrap(), settings);

        // usable as JSON map keys
        let map: std::collections::BTreeMap<RandRoundSettings, usize> =
            rand_round_settings_universe()
                .into_iter()
                .enumerate()
                .map(|(i, s)| (s, i))
                .collect();
        let json = serde_json::to_string(&map).unwrap();
        let back: std::collections::BTreeMap<RandRoundSettings, usize> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
    }

    #[test]
    fn vine_groups_expand_universe_singles_and_levels() {
        let groups = vine_settings_groups();
        // universe + 4 singles + 2 objective levels + 2 rounding levels; the
        // edge model never yields a strict subset here
        assert_eq!(groups.len(), 9);
        assert_eq!(groups[0].1, "vine_ALL");
        assert_eq!(groups[0].0.len(), 4);

        let names: Vec<&str> = groups.iter().map(|(_, n)| n.as_str()).collect();
        assert!(names.contains(&"vine_LB_DEF"));
        assert!(names.contains(&"vine_COST_DEF"));
        assert!(names.contains(&"vine_RAND"));
        assert!(names.contains(&"vine_DET"));
        assert!(!names.iter().any(|n| *n == "vine_SP" || *n == "vine_MCF"));

        for (settings, name) in &groups {
            if name == "vine_RAND" || name == "vine_DET" || name.ends_with("_DEF") {
                assert_eq!(settings.len(), 2, "level {name} must cover half");
            }
        }
    }

    #[test]
    fn rand_round_groups_expand_universe_singles_and_levels() {
        let groups = rand_round_settings_groups();
        // universe + 6 singles + 2 recomputation levels + 3 rounding levels
        assert_eq!(groups.len(), 12);
        assert_eq!(groups[0].1, "rr_seplp_ALL");

        let names: Vec<&str> = groups.iter().map(|(_, n)| n.as_str()).collect();
        assert!(names.contains(&"rr_seplp_NO_RECOMP"));
        assert!(names.contains(&"rr_seplp_RECOMP_NO_SEP"));
        assert!(names.contains(&"rr_seplp_ROUND_RAND"));
        assert!(names.contains(&"rr_seplp_ROUND_STATIC_PROFIT"));
        assert!(names.contains(&"rr_seplp_ROUND_ACHIEVED_PROFIT"));
        assert!(!names.contains(&"rr_seplp_RECOMP_SINGLE_SEP"));
    }

    #[test]
    fn comparison_pairs_cover_both_variants() {
        let pairs = comparison_settings_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].2, "vine_ALL_vs_randround_ALL");
        assert_eq!(pairs[1].2, "vine_SP_vs_randround_ALL");
        for (vine, rand_round, _) in &pairs {
            assert_eq!(vine.len(), 4);
            assert_eq!(rand_round.len(), 6);
        }
    }
}
