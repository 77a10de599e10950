//! `wlog` - CLI for workoutlog
//!
//! Each command runs one short session: the stored workouts are loaded, the
//! command acts on them as the map and list would, and any change is saved
//! before exit.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::debug;

use workoutlog::cli::{AddCommand, Cli, Command, ConfigCommand, OutputFormat, ShowCommand};
use workoutlog::render::ListEntry;
use workoutlog::{
    init_logging, Config, ConsoleNotifier, Coordinates, FixedPosition, KeyValueStore, MemoryList,
    MemoryMap, SessionController, SessionSettings, SqliteStore, Workout,
};

type Session = SessionController<SqliteStore, MemoryMap, MemoryList, ConsoleNotifier>;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;
    let position = cli.from.or_else(|| config.location());

    let result = match cli.command {
        Command::Add(cmd) => handle_add(&config, position, &cmd).await,
        Command::List(cmd) => handle_list(&config, cmd.format),
        Command::Show(cmd) => handle_show(&config, position, &cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Reset => handle_reset(&config),
        Command::Config(cmd) => handle_config(&config, cmd),
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // The notice already told the user what went wrong.
        Err(err)
            if err
                .downcast_ref::<workoutlog::Error>()
                .is_some_and(workoutlog::Error::is_notified) =>
        {
            debug!("{err}");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err),
    }
}

fn open_session(config: &Config) -> anyhow::Result<Session> {
    let path = config.database_path();
    let store = SqliteStore::open(&path)
        .with_context(|| format!("failed to open store at {}", path.display()))?;
    Ok(SessionController::new(
        SessionSettings::from(config),
        store,
        MemoryMap::new(),
        MemoryList::new(),
        ConsoleNotifier,
    ))
}

async fn handle_add(
    config: &Config,
    position: Option<Coordinates>,
    cmd: &AddCommand,
) -> anyhow::Result<()> {
    let mut session = open_session(config)?;
    // Without a known position the map opens where the workout is pinned.
    let geolocation = FixedPosition::new(position.unwrap_or(cmd.at));
    session.initialize(&geolocation).await?;

    session.handle_map_click(cmd.at)?;
    cmd.fill(session.form_mut());
    let id = session.submit()?;

    if let Some(workout) = session.workout(&id) {
        println!("{}", ListEntry::from_workout(workout));
    }
    Ok(())
}

fn handle_list(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let mut session = open_session(config)?;
    session.restore()?;

    match format {
        OutputFormat::Plain => {
            if session.list().is_empty() {
                println!("No workouts logged yet.");
            }
            for entry in session.list().entries() {
                println!("{entry}");
            }
        }
        OutputFormat::Table => print_table(session.workouts()),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(session.workouts())?);
        }
        OutputFormat::Html => {
            println!("<ul class=\"workouts\">");
            for entry in session.list().entries() {
                print!("{}", entry.to_html());
            }
            println!("</ul>");
        }
    }
    Ok(())
}

fn print_table(workouts: &[Workout]) {
    println!(
        "{:<12} {:<8} {:<22} {:>9} {:>9} {:>12} {:>10}",
        "ID", "TYPE", "DESCRIPTION", "KM", "MIN", "RATE", "EXTRA"
    );
    for workout in workouts.iter().rev() {
        let (rate, extra) = match (workout.pace(), workout.speed()) {
            (Some(pace), _) => (
                format!("{pace:.1} min/km"),
                format!("{} spm", workout.cadence().unwrap_or_default()),
            ),
            (None, Some(speed)) => (
                format!("{speed:.1} km/h"),
                format!("{} m", workout.elevation_gain().unwrap_or_default()),
            ),
            (None, None) => (String::new(), String::new()),
        };
        println!(
            "{:<12} {:<8} {:<22} {:>9} {:>9} {:>12} {:>10}",
            workout.id(),
            workout.kind(),
            workout.description(),
            workout.distance(),
            workout.duration(),
            rate,
            extra
        );
    }
}

fn handle_show(
    config: &Config,
    position: Option<Coordinates>,
    cmd: &ShowCommand,
) -> anyhow::Result<()> {
    let mut session = open_session(config)?;
    session.restore()?;

    let id = cmd.workout_id();
    let Some(target) = session.workout(&id).map(Workout::coordinates) else {
        bail!("no workout with id {id}");
    };
    session.load_map(position.unwrap_or(target));

    if let Some(workout) = session.select(Some(&id))? {
        println!("{}", ListEntry::from_workout(workout));
    }
    if let Some(view) = session.map().view() {
        let pan = view
            .pan
            .map(|pan| format!(", panned over {:.1}s", pan.duration.as_secs_f64()))
            .unwrap_or_default();
        println!("Map centered on {} at zoom {}{pan}", view.center, view.zoom);
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let mut session = open_session(config)?;
    let workouts = session.restore()?;
    let stats = session.store().stats()?;
    let stored = session.store().get(&config.storage.key)?.is_some();

    if json {
        let status = serde_json::json!({
            "database_path": session.store().path(),
            "storage_key": config.storage.key,
            "stored": stored,
            "workouts": workouts,
            "entries": stats.entries,
            "value_bytes": stats.value_bytes,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("wlog status");
        println!("-----------");
        println!("Database:      {}", session.store().path().display());
        println!("Storage key:   {}", config.storage.key);
        println!("Workouts:      {workouts}");
        println!("Stored bytes:  {}", stats.value_bytes);
        println!("Database size: {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_reset(config: &Config) -> anyhow::Result<()> {
    let mut session = open_session(config)?;
    let removed = session.restore()?;
    session.reset()?;
    debug!("Reset removed {removed} workouts");
    println!("Removed {removed} workouts.");
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Key:                {}", config.storage.key);
                println!();
                println!("[Map]");
                println!("  Zoom level:         {}", config.map.zoom_level);
                println!("  Pan duration (s):   {}", config.map.pan_duration_secs);
                println!(
                    "  Popup width:        {}-{}",
                    config.map.popup_min_width, config.map.popup_max_width
                );
                println!();
                println!("[Form]");
                println!("  Redisplay (ms):     {}", config.form.redisplay_delay_ms);
                println!();
                println!("[Location]");
                match config.location() {
                    Some(location) => println!("  Position:           {location}"),
                    None => println!("  Position:           not set"),
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
