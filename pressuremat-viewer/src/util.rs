// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

use log::LevelFilter;
use pressuremat_host_core::calibration::DEFAULT_CALIBRATION_SAMPLES;
use pressuremat_host_core::heatmap::{DEFAULT_MAX_FORCE, DEFAULT_THRESHOLD};
use std::io::{Error as IoError, ErrorKind, Result as IoResult};
use std::str::FromStr;

pub(crate) const DEFAULT_BAUD_RATE: u32 = 460_800;

pub(crate) fn parse_log_level(args: &[String]) -> LevelFilter {
    option_value(args, "--log-level")
        .map(|level_str| match level_str.to_uppercase().as_str() {
            "OFF" => LevelFilter::Off,
            "TRACE" => LevelFilter::Trace,
            "DEBUG" => LevelFilter::Debug,
            "INFO" => LevelFilter::Info,
            "WARN" => LevelFilter::Warn,
            "ERROR" => LevelFilter::Error,
            _ => {
                eprintln!("Unknown log level: {}. Using INFO", level_str);
                LevelFilter::Info
            }
        })
        .unwrap_or(LevelFilter::Info)
}

fn option_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_option<T: FromStr>(args: &[String], flag: &str, default: T) -> IoResult<T> {
    match option_value(args, flag) {
        Some(value) => value.parse().map_err(|_| {
            IoError::new(ErrorKind::InvalidInput, format!("Invalid value for {}: {}", flag, value))
        }),
        None => Ok(default),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ViewerArgs {
    /// First listed port when not given
    pub port: Option<String>,
    pub baud_rate: u32,
    pub samples: u32,
    pub threshold: i32,
    pub max_force: i32,
}

impl ViewerArgs {
    pub(crate) fn from_args(args: &[String]) -> IoResult<Self> {
        Ok(Self {
            port: option_value(args, "--port").map(str::to_string),
            baud_rate: parse_option(args, "--baud", DEFAULT_BAUD_RATE)?,
            samples: parse_option(args, "--samples", DEFAULT_CALIBRATION_SAMPLES)?,
            threshold: parse_option(args, "--threshold", DEFAULT_THRESHOLD)?,
            max_force: parse_option(args, "--max-force", DEFAULT_MAX_FORCE)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn defaults_without_flags() {
        let parsed = ViewerArgs::from_args(&args("pressuremat-viewer")).unwrap();
        assert_eq!(
            parsed,
            ViewerArgs {
                port: None,
                baud_rate: 460_800,
                samples: 30,
                threshold: 20,
                max_force: 600,
            }
        );
        assert_eq!(parse_log_level(&args("pressuremat-viewer")), LevelFilter::Info);
    }

    #[test]
    fn flags_override_defaults() {
        let parsed = ViewerArgs::from_args(&args(
            "viewer --port /dev/ttyACM0 --baud 115200 --samples 5 --log-level debug",
        ))
        .unwrap();

        assert_eq!(parsed.port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(parsed.baud_rate, 115_200);
        assert_eq!(parsed.samples, 5);
        assert_eq!(
            parse_log_level(&args("viewer --log-level debug")),
            LevelFilter::Debug
        );
    }

    #[test]
    fn rejects_non_numeric_values() {
        let err = ViewerArgs::from_args(&args("viewer --baud fast")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
