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
//! Scenario generation parameters: the parameter space tree recorded by the
//! scenario generator, its value-to-scenario mirror, and the filter machinery
//! built on top of both.

pub mod filters;
pub mod selection;
pub mod space;

pub use filters::{construct_filter_specs, scenarios_matching_filters, FilterSpec};
pub use selection::{lookup_scenarios_having_specific_values, DictNode, SelectionError};
pub use space::{
    extract_parameter_range, ParamValue, ParameterSpace, PathSegment, SpaceError, SpaceNode,
};

pub(crate) use space::LATENCY_KEY_PREFIX;
