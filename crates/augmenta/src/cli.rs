//! Command-line interface handling for the Augmenta receiver.
//!
//! This module provides command-line argument parsing using the `clap` crate.
//! Every option overrides the matching setting from the configuration file.

use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
///
/// This structure holds all the command-line options that can be used to
/// override configuration file settings.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the UDP input port
    pub port: Option<u16>,
    /// Optional override for the protocol version ("v1" or "v2")
    pub protocol: Option<String>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Mirror incoming data on the x axis
    pub flip_x: bool,
    /// Mirror incoming data on the y axis
    pub flip_y: bool,
    /// Start with input muted
    pub mute: bool,
}

impl CliArgs {
    /// Parses command line arguments using clap.
    ///
    /// Exits the process with usage information if the arguments are invalid.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    /// Parses an explicit argument list, program name first.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config.toml")),
            port: matches.get_one::<u16>("port").copied(),
            protocol: matches.get_one::<String>("protocol").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            flip_x: matches.get_flag("flip-x"),
            flip_y: matches.get_flag("flip-y"),
            mute: matches.get_flag("mute"),
        }
    }
}

fn command() -> Command {
    Command::new("Augmenta Receiver")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Receives Augmenta tracking data over OSC and tracks the reported objects")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("UDP input port (e.g., 12000)")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("protocol")
                .long("protocol")
                .value_name("VERSION")
                .help("Protocol version sent by the sensor")
                .value_parser(["v1", "v2"]),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .help("Log level for the receiver crates"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("flip-x")
                .long("flip-x")
                .help("Mirror incoming data on the x axis")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("flip-y")
                .long("flip-y")
                .help("Mirror incoming data on the y axis")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("mute")
                .long("mute")
                .help("Start with incoming data muted")
                .action(clap::ArgAction::SetTrue),
        )
}
