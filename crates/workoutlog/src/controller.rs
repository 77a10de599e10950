//! The session controller.
//!
//! [`SessionController`] owns the in-memory workout collection and mediates
//! between the entry form, the map, the workout list, the notice surface,
//! and the persistent store. Every handler runs to completion before the
//! next one starts; the only suspension point is the geolocation request in
//! [`SessionController::initialize`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::form::{Field, FormValues, WorkoutForm};
use crate::geolocation::{GeolocationError, GeolocationProvider};
use crate::list::ListView;
use crate::map::{MapDisplay, Marker, PanOptions};
use crate::notice::{self, Notifier};
use crate::render::{self, ListEntry};
use crate::storage::{self, KeyValueStore};
use crate::workout::{ActivityInput, Coordinates, Workout, WorkoutId, WorkoutKind};

/// Settings the controller needs from the application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Store key holding the serialized collection.
    pub storage_key: String,
    /// Zoom level for the initial view and for pans.
    pub zoom_level: u8,
    /// Length of the pan to a selected workout.
    pub pan_duration: Duration,
    /// Maximum marker popup width.
    pub popup_max_width: u32,
    /// Minimum marker popup width.
    pub popup_min_width: u32,
    /// Delay before a hidden form's display returns.
    pub redisplay_delay: Duration,
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            storage_key: config.storage.key.clone(),
            zoom_level: config.map.zoom_level,
            pan_duration: config.pan_duration(),
            popup_max_width: config.map.popup_max_width,
            popup_min_width: config.map.popup_min_width,
            redisplay_delay: config.redisplay_delay(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Orchestrates one session of the workout logger.
#[derive(Debug)]
pub struct SessionController<S, M, L, N> {
    settings: SessionSettings,
    store: S,
    map: M,
    list: L,
    notifier: N,
    form: WorkoutForm,
    workouts: Vec<Workout>,
    unreadable: Vec<Value>,
    map_loaded: bool,
    selected_location: Option<Coordinates>,
}

impl<S, M, L, N> SessionController<S, M, L, N>
where
    S: KeyValueStore,
    M: MapDisplay,
    L: ListView,
    N: Notifier,
{
    /// Create a controller over its collaborators. Nothing is loaded until
    /// [`initialize`](Self::initialize) runs.
    #[must_use]
    pub fn new(settings: SessionSettings, store: S, map: M, list: L, notifier: N) -> Self {
        let form = WorkoutForm::new(settings.redisplay_delay);
        Self {
            settings,
            store,
            map,
            list,
            notifier,
            form,
            workouts: Vec::new(),
            unreadable: Vec::new(),
            map_loaded: false,
            selected_location: None,
        }
    }

    /// Start the session.
    ///
    /// Loads the persisted collection into the list, then asks for the
    /// current position. On success the map is loaded there and every
    /// workout gets its marker; on failure the user is notified and the map
    /// stays unavailable for the rest of the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. A failed position
    /// lookup is not an error.
    pub async fn initialize<G>(&mut self, geolocation: &G) -> Result<()>
    where
        G: GeolocationProvider + ?Sized,
    {
        self.restore()?;

        match geolocation.current_position().await {
            Ok(position) => self.load_map(position),
            Err(err) => self.location_unavailable(&err),
        }
        Ok(())
    }

    /// Replace the collection with the persisted one and list it.
    ///
    /// Markers are added only if the map is already loaded. Stored records
    /// that cannot be read are kept aside and written back on every save.
    /// Returns the number of workouts loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn restore(&mut self) -> Result<usize> {
        let stored = storage::load_workouts(&self.store, &self.settings.storage_key)?;
        self.workouts = stored.workouts;
        self.unreadable = stored.unreadable;
        for workout in &self.workouts {
            self.list.insert_entry(ListEntry::from_workout(workout));
        }
        if self.map_loaded {
            self.render_all_markers();
        }
        debug!("Restored {} workouts", self.workouts.len());
        Ok(self.workouts.len())
    }

    /// Load the map centered on `position` and pin every workout to it.
    pub fn load_map(&mut self, position: Coordinates) {
        self.map.load(position, self.settings.zoom_level);
        self.map_loaded = true;
        self.render_all_markers();
        info!("Map loaded at {position}");
    }

    fn location_unavailable(&mut self, err: &GeolocationError) {
        warn!("Could not get current position: {err}");
        self.notifier.notify(notice::LOCATION_UNAVAILABLE);
    }

    /// A location was clicked on the map: remember it and open the form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MapUnavailable`] if the map was never loaded.
    pub fn handle_map_click(&mut self, coordinates: Coordinates) -> Result<()> {
        if !self.map_loaded {
            return Err(Error::MapUnavailable);
        }
        self.selected_location = Some(coordinates);
        self.form.show();
        debug!("Selected {coordinates}");
        Ok(())
    }

    /// The type selector changed: swap cadence and elevation inputs.
    pub fn toggle_form_kind(&mut self) -> WorkoutKind {
        self.form.toggle_kind()
    }

    /// Create a workout from the form at the selected location.
    ///
    /// Distance and duration must be finite and positive. Cadence must be a
    /// positive whole number; elevation gain only has to be finite. On
    /// rejection the user is notified and nothing changes, the form stays
    /// open with its values. On success the workout is appended, pinned,
    /// listed, the form is cleared and hidden, and the collection is saved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSelectedLocation`] without a prior map click,
    /// [`Error::InvalidInput`] for rejected values, or a storage error if
    /// saving fails. A failed save leaves the new workout in the session.
    pub fn submit(&mut self) -> Result<WorkoutId> {
        let coordinates = self.selected_location.ok_or(Error::NoSelectedLocation)?;

        let (distance, duration, input) = match validate(&self.form.values()) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("Rejected workout: {err}");
                self.notifier.notify(notice::INVALID_INPUT);
                return Err(err);
            }
        };

        let created_at = Utc::now();
        let id = self.next_id(created_at);
        let workout = Workout::new(id.clone(), created_at, coordinates, distance, duration, input);
        info!("Logged {} ({})", workout.description(), id);

        let marker = self.marker(&workout);
        self.map.add_marker(marker);
        self.list.insert_entry(ListEntry::from_workout(&workout));
        self.workouts.push(workout);
        self.form.hide();
        self.selected_location = None;

        self.persist()?;
        Ok(id)
    }

    /// A row of the list was clicked: pan the map to that workout.
    ///
    /// `row` is the id carried by the clicked row, or `None` if the click
    /// missed every row. Misses and unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MapUnavailable`] if a workout was found but the map
    /// was never loaded.
    pub fn select(&mut self, row: Option<&WorkoutId>) -> Result<Option<&Workout>> {
        let Some(id) = row else {
            return Ok(None);
        };
        let Some(index) = self.workouts.iter().position(|w| w.id() == id) else {
            debug!("No workout with id {id}");
            return Ok(None);
        };
        if !self.map_loaded {
            return Err(Error::MapUnavailable);
        }

        let workout = &self.workouts[index];
        self.map.set_view(
            workout.coordinates(),
            self.settings.zoom_level,
            PanOptions::animated(self.settings.pan_duration),
        );
        Ok(Some(workout))
    }

    /// Delete the persisted collection and return to an empty session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store entry cannot be removed.
    pub fn reset(&mut self) -> Result<()> {
        let removed = self.store.remove(&self.settings.storage_key)?;
        self.workouts.clear();
        self.unreadable.clear();
        self.list.clear();
        self.map.clear_markers();
        if self.form.is_visible() {
            self.form.hide();
        }
        self.selected_location = None;
        info!("Reset session (stored collection removed: {removed})");
        Ok(())
    }

    /// The session collection, oldest first.
    #[must_use]
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    /// Find a workout by id.
    #[must_use]
    pub fn workout(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    /// The entry form.
    #[must_use]
    pub fn form(&self) -> &WorkoutForm {
        &self.form
    }

    /// The entry form, for typing into its inputs.
    pub fn form_mut(&mut self) -> &mut WorkoutForm {
        &mut self.form
    }

    /// The map collaborator.
    #[must_use]
    pub fn map(&self) -> &M {
        &self.map
    }

    /// The list collaborator.
    #[must_use]
    pub fn list(&self) -> &L {
        &self.list
    }

    /// The notice collaborator.
    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The persistent store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the map was loaded.
    #[must_use]
    pub fn is_map_loaded(&self) -> bool {
        self.map_loaded
    }

    /// The location picked by the last map click, until a submit uses it.
    #[must_use]
    pub fn selected_location(&self) -> Option<Coordinates> {
        self.selected_location
    }

    /// The controller's settings.
    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Give back the store, ending the session.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    fn persist(&mut self) -> Result<()> {
        storage::save_workouts(
            &mut self.store,
            &self.settings.storage_key,
            &self.workouts,
            &self.unreadable,
        )?;
        debug!("Saved {} workouts", self.workouts.len());
        Ok(())
    }

    fn marker(&self, workout: &Workout) -> Marker {
        render::marker(
            workout,
            self.settings.popup_max_width,
            self.settings.popup_min_width,
        )
    }

    fn render_all_markers(&mut self) {
        for workout in &self.workouts {
            let marker = self.marker(workout);
            self.map.add_marker(marker);
        }
    }

    /// A time-derived id not yet used in the collection.
    fn next_id(&self, created_at: DateTime<Utc>) -> WorkoutId {
        let mut millis = created_at.timestamp_millis();
        loop {
            let id = WorkoutId::from_millis(millis);
            if self.workouts.iter().all(|w| w.id() != &id) {
                return id;
            }
            millis += 1;
        }
    }
}

/// Parse and check submitted form values.
fn validate(values: &FormValues) -> Result<(f64, f64, ActivityInput)> {
    let distance = positive(values.number(Field::Distance), "distance")?;
    let duration = positive(values.number(Field::Duration), "duration")?;

    let input = match values.kind {
        WorkoutKind::Running => {
            let cadence = positive(values.number(Field::Cadence), "cadence")?;
            if cadence.fract() != 0.0 || cadence > f64::from(u32::MAX) {
                return Err(Error::invalid_input("cadence must be a whole number"));
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let cadence = cadence as u32;
            ActivityInput::Running { cadence }
        }
        WorkoutKind::Cycling => {
            let elevation_gain = values.number(Field::Elevation);
            if !elevation_gain.is_finite() {
                return Err(Error::invalid_input("elevation gain must be a number"));
            }
            ActivityInput::Cycling { elevation_gain }
        }
    };

    Ok((distance, duration, input))
}

fn positive(value: f64, name: &str) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::invalid_input(format!(
            "{name} must be a positive number"
        )))
    }
}
