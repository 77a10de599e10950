//! Core workout types for workoutlog.
//!
//! A [`Workout`] is one completed run or ride, pinned to the map location it
//! was logged at. The fields shared by every workout live on the struct; the
//! kind-specific input and its derived value live in [`Activity`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Local, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Month names used in workout descriptions, indexed by `month0()`.
const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Number of trailing timestamp digits kept in a workout id.
const ID_DIGITS: usize = 10;

/// A latitude/longitude pair.
///
/// Serialized as a two-element `[lat, lng]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Create a coordinate pair.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(coords: Coordinates) -> Self {
        [coords.latitude, coords.longitude]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Error returned when text cannot be read as `LAT,LNG`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid coordinates '{0}': expected LAT,LNG")]
pub struct ParseCoordinatesError(String);

impl FromStr for Coordinates {
    type Err = ParseCoordinatesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseCoordinatesError(s.to_string());
        let (lat, lng) = s.split_once(',').ok_or_else(invalid)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = lng.trim().parse().map_err(|_| invalid())?;
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(invalid());
        }
        Ok(Self::new(latitude, longitude))
    }
}

/// The kind of workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    /// A run, measured by cadence and pace.
    #[default]
    Running,
    /// A ride, measured by elevation gain and speed.
    Cycling,
}

impl WorkoutKind {
    /// Capitalized name used in descriptions.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    /// Icon shown next to the workout on the map and in the list.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }

    /// The other kind.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Running => Self::Cycling,
            Self::Cycling => Self::Running,
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Cycling => write!(f, "cycling"),
        }
    }
}

/// Identifier of a workout, unique within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Derive an id from a millisecond timestamp (its last ten digits).
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        let digits = millis.to_string();
        let start = digits.len().saturating_sub(ID_DIGITS);
        Self(digits[start..].to_string())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkoutId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind-specific value a workout is created with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivityInput {
    /// Running cadence in steps per minute.
    Running {
        /// Steps per minute.
        cadence: u32,
    },
    /// Cycling elevation gain in meters (negative for a net descent).
    Cycling {
        /// Meters climbed.
        elevation_gain: f64,
    },
}

/// Kind-specific fields of a workout, including the derived rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Activity {
    /// A run.
    Running {
        /// Steps per minute. Stored fractional values are rounded.
        #[serde(deserialize_with = "stored_cadence")]
        cadence: u32,
        /// Minutes per kilometer, rounded to one decimal.
        #[serde(default = "not_derived", deserialize_with = "derived_value")]
        pace: f64,
    },
    /// A ride.
    Cycling {
        /// Meters climbed (negative for a net descent).
        #[serde(alias = "elevationGain")]
        elevation_gain: f64,
        /// Kilometers per hour, rounded to one decimal.
        #[serde(default = "not_derived", deserialize_with = "derived_value")]
        speed: f64,
    },
}

impl Activity {
    /// Build the activity for `input`, deriving its rate from the shared
    /// distance (km) and duration (min).
    ///
    /// Inputs are trusted: a zero distance or duration yields a non-finite
    /// rate rather than an error.
    #[must_use]
    pub fn derive(input: ActivityInput, distance: f64, duration: f64) -> Self {
        match input {
            ActivityInput::Running { cadence } => Self::Running {
                cadence,
                pace: round_one_decimal(duration / distance),
            },
            ActivityInput::Cycling { elevation_gain } => Self::Cycling {
                elevation_gain,
                speed: round_one_decimal(distance / (duration / 60.0)),
            },
        }
    }

    /// The kind of this activity.
    #[must_use]
    pub fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    /// The input this activity was derived from.
    #[must_use]
    pub fn input(&self) -> ActivityInput {
        match *self {
            Self::Running { cadence, .. } => ActivityInput::Running { cadence },
            Self::Cycling { elevation_gain, .. } => ActivityInput::Cycling { elevation_gain },
        }
    }

    fn rate(&self) -> f64 {
        match *self {
            Self::Running { pace, .. } => pace,
            Self::Cycling { speed, .. } => speed,
        }
    }
}

/// A single logged workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    id: WorkoutId,

    #[serde(alias = "date")]
    created_at: DateTime<Utc>,

    #[serde(alias = "coords")]
    coordinates: Coordinates,

    /// Kilometers.
    distance: f64,

    /// Minutes.
    duration: f64,

    #[serde(default)]
    description: String,

    #[serde(default, alias = "clicks")]
    interaction_count: u32,

    #[serde(flatten)]
    activity: Activity,
}

impl Workout {
    /// Create a workout, computing its derived fields once.
    ///
    /// Numeric inputs are not validated here; see
    /// [`SessionController::submit`](crate::SessionController::submit).
    #[must_use]
    pub fn new(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coordinates: Coordinates,
        distance: f64,
        duration: f64,
        input: ActivityInput,
    ) -> Self {
        let activity = Activity::derive(input, distance, duration);
        let description = describe(activity.kind(), created_at);
        Self {
            id,
            created_at,
            coordinates,
            distance,
            duration,
            description,
            interaction_count: 0,
            activity,
        }
    }

    /// Create a run logged now.
    #[must_use]
    pub fn running(coordinates: Coordinates, distance: f64, duration: f64, cadence: u32) -> Self {
        Self::now(
            coordinates,
            distance,
            duration,
            ActivityInput::Running { cadence },
        )
    }

    /// Create a ride logged now.
    #[must_use]
    pub fn cycling(
        coordinates: Coordinates,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
    ) -> Self {
        Self::now(
            coordinates,
            distance,
            duration,
            ActivityInput::Cycling { elevation_gain },
        )
    }

    fn now(coordinates: Coordinates, distance: f64, duration: f64, input: ActivityInput) -> Self {
        let created_at = Utc::now();
        let id = WorkoutId::from_millis(created_at.timestamp_millis());
        Self::new(id, created_at, coordinates, distance, duration, input)
    }

    /// Fill in derived fields that stored data lacked.
    ///
    /// Returns `true` if anything had to be recomputed.
    pub(crate) fn restore_derived(&mut self) -> bool {
        let mut restored = false;
        if self.description.is_empty() {
            self.description = self.describe();
            restored = true;
        }
        if self.activity.rate().is_nan() {
            self.activity = Activity::derive(self.activity.input(), self.distance, self.duration);
            restored = true;
        }
        restored
    }

    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    /// When the workout was logged.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Where the workout was logged.
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// Distance in kilometers.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Duration in minutes.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Running or cycling.
    #[must_use]
    pub fn kind(&self) -> WorkoutKind {
        self.activity.kind()
    }

    /// Kind-specific fields.
    #[must_use]
    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Display title computed at creation, e.g. `Running on April 14`.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Pace in min/km, for runs.
    #[must_use]
    pub fn pace(&self) -> Option<f64> {
        match self.activity {
            Activity::Running { pace, .. } => Some(pace),
            Activity::Cycling { .. } => None,
        }
    }

    /// Speed in km/h, for rides.
    #[must_use]
    pub fn speed(&self) -> Option<f64> {
        match self.activity {
            Activity::Cycling { speed, .. } => Some(speed),
            Activity::Running { .. } => None,
        }
    }

    /// Cadence in steps/min, for runs.
    #[must_use]
    pub fn cadence(&self) -> Option<u32> {
        match self.activity {
            Activity::Running { cadence, .. } => Some(cadence),
            Activity::Cycling { .. } => None,
        }
    }

    /// Elevation gain in meters, for rides.
    #[must_use]
    pub fn elevation_gain(&self) -> Option<f64> {
        match self.activity {
            Activity::Cycling { elevation_gain, .. } => Some(elevation_gain),
            Activity::Running { .. } => None,
        }
    }

    /// Recompute the description from kind and creation date.
    #[must_use]
    pub fn describe(&self) -> String {
        describe(self.kind(), self.created_at)
    }

    /// Count one selection of this workout.
    pub fn record_interaction(&mut self) {
        self.interaction_count += 1;
    }

    /// Number of recorded selections.
    #[must_use]
    pub fn interaction_count(&self) -> u32 {
        self.interaction_count
    }
}

/// Format the description for a workout of `kind` created at `created_at`.
///
/// Uses the local calendar day of the timestamp.
#[must_use]
pub fn describe(kind: WorkoutKind, created_at: DateTime<Utc>) -> String {
    let local = created_at.with_timezone(&Local);
    let month = MONTHS[local.month0() as usize];
    format!("{} on {} {}", kind.label(), month, local.day())
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn not_derived() -> f64 {
    f64::NAN
}

/// Accepts a cadence stored as any non-negative number, rounding it.
fn stored_cadence<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    let rounded = value.round();
    if !(rounded.is_finite() && (0.0..=f64::from(u32::MAX)).contains(&rounded)) {
        return Err(de::Error::custom(format!("invalid cadence {value}")));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(rounded as u32)
}

/// Accepts a derived value stored as a number, as text (`"5.0"`), or as null.
fn derived_value<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Number(f64),
        Text(String),
        Missing(()),
    }

    Ok(match Stored::deserialize(deserializer)? {
        Stored::Number(value) => value,
        Stored::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
        Stored::Missing(()) => f64::NAN,
    })
}
