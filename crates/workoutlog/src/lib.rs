//! `workoutlog` - Log runs and rides on a map
//!
//! This library provides the workout model, the session controller that ties
//! the entry form, map, list, and notices together, and the local store that
//! keeps workouts between sessions.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod geolocation;
pub mod list;
pub mod logging;
pub mod map;
pub mod notice;
pub mod render;
pub mod storage;
pub mod workout;

pub use config::Config;
pub use controller::{SessionController, SessionSettings};
pub use error::{Error, Result};
pub use geolocation::{FixedPosition, GeolocationError, GeolocationProvider};
pub use list::{ListView, MemoryList};
pub use logging::init_logging;
pub use map::{MapDisplay, MemoryMap};
pub use notice::{ConsoleNotifier, Notifier};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StoreStats};
pub use workout::{Coordinates, Workout, WorkoutId, WorkoutKind};
