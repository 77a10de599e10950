//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::form::{Field, WorkoutForm};
use crate::workout::{Coordinates, WorkoutId, WorkoutKind};

/// Add command arguments.
///
/// Numbers are taken as text and checked the way the entry form checks
/// them, so bad values are reported with the same notice.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Workout type
    #[arg(value_enum)]
    pub kind: WorkoutKindArg,

    /// Distance in km
    #[arg(short, long, allow_hyphen_values = true)]
    pub distance: String,

    /// Duration in minutes
    #[arg(short = 't', long, allow_hyphen_values = true)]
    pub duration: String,

    /// Cadence in steps/min (running)
    #[arg(long, allow_hyphen_values = true)]
    pub cadence: Option<String>,

    /// Elevation gain in meters (cycling)
    #[arg(short, long, allow_hyphen_values = true)]
    pub elevation: Option<String>,

    /// Map location of the workout, as LAT,LNG
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub at: Coordinates,
}

impl AddCommand {
    /// Type the arguments into an open form.
    pub fn fill(&self, form: &mut WorkoutForm) {
        let kind = WorkoutKind::from(self.kind);
        form.select_kind(kind);
        form.set_value(Field::Distance, self.distance.as_str());
        form.set_value(Field::Duration, self.duration.as_str());
        let secondary = match kind {
            WorkoutKind::Running => &self.cadence,
            WorkoutKind::Cycling => &self.elevation,
        };
        form.set_value(
            Field::secondary(kind),
            secondary.as_deref().unwrap_or_default(),
        );
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Workout id, as printed by `list`
    pub id: String,
}

impl ShowCommand {
    /// The requested id.
    #[must_use]
    pub fn workout_id(&self) -> WorkoutId {
        WorkoutId::from(self.id.trim())
    }
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Workout type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WorkoutKindArg {
    /// A run, with cadence
    Running,
    /// A ride, with elevation gain
    Cycling,
}

impl From<WorkoutKindArg> for WorkoutKind {
    fn from(arg: WorkoutKindArg) -> Self {
        match arg {
            WorkoutKindArg::Running => Self::Running,
            WorkoutKindArg::Cycling => Self::Cycling,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
    /// HTML list items
    Html,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn add(kind: WorkoutKindArg) -> AddCommand {
        AddCommand {
            kind,
            distance: "5.2".to_string(),
            duration: "26".to_string(),
            cadence: Some("178".to_string()),
            elevation: Some("-50".to_string()),
            at: Coordinates::new(51.5, -0.12),
        }
    }

    #[test]
    fn test_workout_kind_arg_conversion() {
        assert_eq!(
            WorkoutKind::from(WorkoutKindArg::Running),
            WorkoutKind::Running
        );
        assert_eq!(
            WorkoutKind::from(WorkoutKindArg::Cycling),
            WorkoutKind::Cycling
        );
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_fill_running_form() {
        let mut form = WorkoutForm::new(Duration::ZERO);
        form.show();
        add(WorkoutKindArg::Running).fill(&mut form);

        let values = form.values();
        assert_eq!(values.kind, WorkoutKind::Running);
        assert_eq!(values.distance, "5.2");
        assert_eq!(values.cadence, "178");
        assert!(values.elevation.is_empty());
    }

    #[test]
    fn test_fill_cycling_form() {
        let mut form = WorkoutForm::new(Duration::ZERO);
        form.show();
        add(WorkoutKindArg::Cycling).fill(&mut form);

        let values = form.values();
        assert_eq!(values.kind, WorkoutKind::Cycling);
        assert_eq!(values.elevation, "-50");
        assert!(values.cadence.is_empty());
    }

    #[test]
    fn test_fill_missing_secondary_is_blank() {
        let mut form = WorkoutForm::new(Duration::ZERO);
        form.show();
        let mut cmd = add(WorkoutKindArg::Running);
        cmd.cadence = None;
        cmd.fill(&mut form);
        assert!(form.values().cadence.is_empty());
    }

    #[test]
    fn test_show_command_id() {
        let cmd = ShowCommand {
            id: " 6150000123 ".to_string(),
        };
        assert_eq!(cmd.workout_id().as_str(), "6150000123");
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }

    #[test]
    fn test_output_format_debug() {
        let format = OutputFormat::Html;
        let debug_str = format!("{format:?}");
        assert_eq!(debug_str, "Html");
    }
}
