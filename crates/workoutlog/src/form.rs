//! The workout entry form.
//!
//! The form holds the raw text of its inputs and a small visibility state
//! machine:
//!
//! - a map click shows the form (`Hidden` -> `Visible(Running)`),
//! - the type selector swaps `Visible(Running)` and `Visible(Cycling)`,
//! - a successful submit hides it again.
//!
//! Hiding also drops the form's display for a short moment so that it does
//! not animate out; the display comes back on its own after a delay.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::workout::WorkoutKind;

/// Visibility of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    /// Not shown.
    #[default]
    Hidden,
    /// Shown with the given type selected.
    Visible(WorkoutKind),
}

/// An input of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Distance in km.
    Distance,
    /// Duration in minutes.
    Duration,
    /// Cadence in steps/min (running only).
    Cadence,
    /// Elevation gain in m (cycling only).
    Elevation,
}

impl Field {
    /// The kind-specific input shown for `kind`.
    #[must_use]
    pub fn secondary(kind: WorkoutKind) -> Self {
        match kind {
            WorkoutKind::Running => Self::Cadence,
            WorkoutKind::Cycling => Self::Elevation,
        }
    }
}

/// A snapshot of the form's inputs at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormValues {
    /// Selected workout type.
    pub kind: WorkoutKind,
    /// Distance input text.
    pub distance: String,
    /// Duration input text.
    pub duration: String,
    /// Cadence input text.
    pub cadence: String,
    /// Elevation gain input text.
    pub elevation: String,
}

impl FormValues {
    /// Read `field` as a number.
    ///
    /// Blank input reads as zero and unparseable input as NaN, so both fail
    /// later positivity or finiteness checks.
    #[must_use]
    pub fn number(&self, field: Field) -> f64 {
        let text = match field {
            Field::Distance => &self.distance,
            Field::Duration => &self.duration,
            Field::Cadence => &self.cadence,
            Field::Elevation => &self.elevation,
        };
        let text = text.trim();
        if text.is_empty() {
            return 0.0;
        }
        text.parse().unwrap_or(f64::NAN)
    }
}

/// The entry form shown after a map click.
#[derive(Debug)]
pub struct WorkoutForm {
    state: FormState,
    values: FormValues,
    focused: Option<Field>,
    displayed: Arc<AtomicBool>,
    redisplay_delay: Duration,
}

impl WorkoutForm {
    /// Create a hidden form whose display returns `redisplay_delay` after
    /// each hide.
    #[must_use]
    pub fn new(redisplay_delay: Duration) -> Self {
        Self {
            state: FormState::Hidden,
            values: FormValues::default(),
            focused: None,
            displayed: Arc::new(AtomicBool::new(true)),
            redisplay_delay,
        }
    }

    /// Current visibility.
    #[must_use]
    pub fn state(&self) -> FormState {
        self.state
    }

    /// Whether the form is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self.state, FormState::Visible(_))
    }

    /// Whether the form's display is on. It is briefly off after a hide.
    #[must_use]
    pub fn is_displayed(&self) -> bool {
        self.displayed.load(Ordering::SeqCst)
    }

    /// The selected workout type.
    #[must_use]
    pub fn kind(&self) -> WorkoutKind {
        self.values.kind
    }

    /// The input that has focus.
    #[must_use]
    pub fn focused(&self) -> Option<Field> {
        self.focused
    }

    /// Whether `field` is currently shown. Exactly one of cadence and
    /// elevation is shown at a time.
    #[must_use]
    pub fn is_field_visible(&self, field: Field) -> bool {
        match field {
            Field::Distance | Field::Duration => true,
            Field::Cadence | Field::Elevation => field == Field::secondary(self.values.kind),
        }
    }

    /// Show the form and focus the distance input.
    ///
    /// A hidden form opens with running selected; an open form keeps its
    /// selection.
    pub fn show(&mut self) {
        if self.state == FormState::Hidden {
            self.values.kind = WorkoutKind::Running;
        }
        self.state = FormState::Visible(self.values.kind);
        self.focused = Some(Field::Distance);
    }

    /// Swap the selected type between running and cycling.
    ///
    /// Does nothing while the form is hidden. Returns the selected type.
    pub fn toggle_kind(&mut self) -> WorkoutKind {
        if let FormState::Visible(kind) = self.state {
            let kind = kind.toggled();
            self.values.kind = kind;
            self.state = FormState::Visible(kind);
            trace!("Form switched to {kind}");
        }
        self.values.kind
    }

    /// Select `kind`, toggling if it differs from the current selection.
    pub fn select_kind(&mut self, kind: WorkoutKind) {
        if self.values.kind != kind {
            self.toggle_kind();
        }
    }

    /// Set the text of `field`.
    pub fn set_value(&mut self, field: Field, text: impl Into<String>) {
        let text = text.into();
        match field {
            Field::Distance => self.values.distance = text,
            Field::Duration => self.values.duration = text,
            Field::Cadence => self.values.cadence = text,
            Field::Elevation => self.values.elevation = text,
        }
    }

    /// A snapshot of all inputs.
    #[must_use]
    pub fn values(&self) -> FormValues {
        self.values.clone()
    }

    /// Empty every input, keeping the selected type.
    pub fn clear(&mut self) {
        self.values = FormValues {
            kind: self.values.kind,
            ..FormValues::default()
        };
    }

    /// Clear and hide the form.
    ///
    /// The display comes back after the redisplay delay on a detached task
    /// when a Tokio runtime is running, and immediately otherwise. The
    /// restore cannot be cancelled.
    pub fn hide(&mut self) {
        self.clear();
        self.state = FormState::Hidden;
        self.focused = None;
        self.displayed.store(false, Ordering::SeqCst);

        let displayed = Arc::clone(&self.displayed);
        let delay = self.redisplay_delay;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    displayed.store(true, Ordering::SeqCst);
                });
            }
            Err(_) => displayed.store(true, Ordering::SeqCst),
        }
    }
}
