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
//! Utility module collection of functions

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

use crate::parameters::ParamValue;

pub fn init_logging() {
    if Path::new("log4rs.yml").exists() {
        log4rs::init_file("log4rs.yml", Default::default()).unwrap();
    } else {
        pretty_env_logger::init();
    }
}

lazy_static! {
    static ref PARAMETER_VALUES: Regex =
        Regex::new(r"^(?P<parameter>[A-Za-z][A-Za-z0-9_]*)=(?P<values>[^=]+)$").unwrap();
}

/// Parse a `parameter=value1,value2,...` command line argument, e.g.
/// `number_of_requests=40,60`. Values take the narrowest fitting type.
pub fn parse_parameter_values(s: &str) -> Result<(String, Vec<ParamValue>), String> {
    let captures = PARAMETER_VALUES
        .captures(s)
        .ok_or_else(|| format!("expected parameter=value1,value2,..., got {s:?}"))?;
    let parameter = captures["parameter"].to_string();
    let values = captures["values"]
        .split(',')
        .map(|value| ParamValue::parse(value.trim()))
        .collect();
    Ok((parameter, values))
}

/// Parse a `parameter=value` command line argument carrying a single value.
pub fn parse_parameter_value(s: &str) -> Result<(String, ParamValue), String> {
    let (parameter, mut values) = parse_parameter_values(s)?;
    if values.len() != 1 {
        return Err(format!("expected a single value for {parameter}, got {s:?}"));
    }
    Ok((parameter, values.remove(0)))
}

/// Parse a request-count set such as `40,60` into its counts.
pub fn parse_request_set(s: &str) -> Result<Vec<i64>, String> {
    s.split(',')
        .map(|count| {
            count
                .trim()
                .parse::<i64>()
                .map_err(|e| format!("invalid request count {count:?}: {e}"))
        })
        .collect()
}

pub trait PathBufExt: Sized {
    fn then(self, p: impl AsRef<Path>) -> PathBuf;
}

impl PathBufExt for PathBuf {
    fn then(mut self, p: impl AsRef<Path>) -> PathBuf {
        self.push(p);
        self
    }
}

impl PathBufExt for &Path {
    fn then(self, p: impl AsRef<Path>) -> PathBuf {
        let mut path = self.to_path_buf();
        path.push(p);
        path
    }
}
