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

use anyhow::{Result, anyhow};
use log::LevelFilter;
use std::str::FromStr;

pub const DEFAULT_BROKER_HOST: &str = "localhost";
pub const DEFAULT_BROKER_PORT: u16 = 1883;

pub fn parse_log_level(args: &[String]) -> LevelFilter {
    option_value(args, "--log-level")
        .map(|level_str| match level_str.to_uppercase().as_str() {
            "OFF" => LevelFilter::Off,
            "TRACE" => LevelFilter::Trace,
            "DEBUG" => LevelFilter::Debug,
            "INFO" => LevelFilter::Info,
            "WARN" => LevelFilter::Warn,
            "ERROR" => LevelFilter::Error,
            _ => LevelFilter::Info,
        })
        .unwrap_or(LevelFilter::Info)
}

pub fn init_logging(args: &[String]) {
    env_logger::Builder::from_default_env()
        .filter_level(parse_log_level(args))
        .format_timestamp_millis()
        .init();
}

pub fn option_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

pub fn parse_option<T: FromStr>(args: &[String], flag: &str, default: T) -> Result<T> {
    match option_value(args, flag) {
        Some(value) => value
            .parse()
            .map_err(|_| anyhow!("Invalid value for {}: {}", flag, value)),
        None => Ok(default),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerArgs {
    pub host: String,
    pub port: u16,
}

impl BrokerArgs {
    pub fn from_args(args: &[String]) -> Result<Self> {
        Ok(Self {
            host: option_value(args, "--broker")
                .unwrap_or(DEFAULT_BROKER_HOST)
                .to_string(),
            port: parse_option(args, "--mqtt-port", DEFAULT_BROKER_PORT)?,
        })
    }
}
