//! Command-line interface for workoutlog.
//!
//! This module provides the CLI structure for the `wlog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;
use crate::workout::Coordinates;

pub use commands::{
    AddCommand, ConfigCommand, ListCommand, OutputFormat, ShowCommand, StatusCommand,
    WorkoutKindArg,
};

/// wlog - Log your runs and rides on a map
///
/// Workouts are pinned to the location they were logged at and kept in a
/// local store between sessions.
#[derive(Debug, Parser)]
#[command(name = "wlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Current position, as LAT,LNG (overrides the configured location)
    #[arg(
        long,
        global = true,
        value_name = "LAT,LNG",
        allow_hyphen_values = true
    )]
    pub from: Option<Coordinates>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log a workout at a map location
    Add(AddCommand),

    /// List logged workouts, newest first
    List(ListCommand),

    /// Center the map on a workout
    Show(ShowCommand),

    /// Show store status
    Status(StatusCommand),

    /// Delete every logged workout
    Reset,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
