//! Display projections of a workout.
//!
//! Each workout is rendered twice: as a map marker popup and as an entry in
//! the workout list. Both are pure functions of the workout.

use std::fmt;

use crate::map::{Marker, PopupOptions};
use crate::workout::{Activity, Workout, WorkoutId, WorkoutKind};

/// Popup text for a workout's map marker.
#[must_use]
pub fn popup_content(workout: &Workout) -> String {
    format!("{} {}", workout.kind().icon(), workout.description())
}

/// Popup style class for a workout kind.
#[must_use]
pub fn popup_class(kind: WorkoutKind) -> String {
    format!("{kind}-popup")
}

/// Build the map marker for `workout`.
#[must_use]
pub fn marker(workout: &Workout, max_width: u32, min_width: u32) -> Marker {
    Marker {
        coordinates: workout.coordinates(),
        content: popup_content(workout),
        popup: PopupOptions {
            max_width,
            min_width,
            auto_close: false,
            close_on_click: false,
            class_name: popup_class(workout.kind()),
        },
    }
}

/// One icon/value/unit row of a list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    /// Leading icon.
    pub icon: &'static str,
    /// Formatted value.
    pub value: String,
    /// Unit label.
    pub unit: &'static str,
}

impl Detail {
    fn new(icon: &'static str, value: impl fmt::Display, unit: &'static str) -> Self {
        Self {
            icon,
            value: value.to_string(),
            unit,
        }
    }
}

/// A workout as shown in the workout list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Id of the workout this row selects.
    pub id: WorkoutId,
    /// Kind, used for styling.
    pub kind: WorkoutKind,
    /// Row heading.
    pub title: String,
    /// Distance, duration, rate, and kind-specific rows.
    pub details: Vec<Detail>,
}

impl ListEntry {
    /// Project `workout` into a list row.
    #[must_use]
    pub fn from_workout(workout: &Workout) -> Self {
        let mut details = vec![
            Detail::new(workout.kind().icon(), workout.distance(), "km"),
            Detail::new("⏱", workout.duration(), "min"),
        ];
        match *workout.activity() {
            Activity::Running { cadence, pace } => {
                details.push(Detail::new("⚡️", format!("{pace:.1}"), "min/km"));
                details.push(Detail::new("🦶🏼", cadence, "spm"));
            }
            Activity::Cycling {
                elevation_gain,
                speed,
            } => {
                details.push(Detail::new("⚡️", format!("{speed:.1}"), "km/h"));
                details.push(Detail::new("⛰", elevation_gain, "m"));
            }
        }

        Self {
            id: workout.id().clone(),
            kind: workout.kind(),
            title: workout.description().to_string(),
            details,
        }
    }

    /// Render as an HTML list item carrying the workout id.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<li class=\"workout workout--{}\" data-id=\"{}\">\n  <h2 class=\"workout__title\">{}</h2>\n",
            self.kind,
            self.id,
            escape_html(&self.title)
        );
        for detail in &self.details {
            html.push_str(&format!(
                "  <div class=\"workout__details\">\n    <span class=\"workout__icon\">{}</span>\n    <span class=\"workout__value\">{}</span>\n    <span class=\"workout__unit\">{}</span>\n  </div>\n",
                detail.icon,
                escape_html(&detail.value),
                detail.unit
            ));
        }
        html.push_str("</li>\n");
        html
    }
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.title)?;
        for detail in &self.details {
            write!(f, "  {} {} {}", detail.icon, detail.value, detail.unit)?;
        }
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::Coordinates;

    fn run() -> Workout {
        Workout::running(Coordinates::new(51.5, -0.12), 5.2, 26.0, 178)
    }

    fn ride() -> Workout {
        Workout::cycling(Coordinates::new(51.5, -0.12), 20.0, 60.0, -50.0)
    }

    #[test]
    fn test_popup_content() {
        let workout = run();
        let content = popup_content(&workout);
        assert!(content.starts_with("🏃‍♂️ "));
        assert!(content.ends_with(workout.description()));
    }

    #[test]
    fn test_marker() {
        let workout = ride();
        let marker = marker(&workout, 250, 100);
        assert_eq!(marker.coordinates, workout.coordinates());
        assert_eq!(marker.popup.class_name, "cycling-popup");
        assert_eq!(marker.popup.max_width, 250);
        assert_eq!(marker.popup.min_width, 100);
        assert!(!marker.popup.auto_close);
        assert!(!marker.popup.close_on_click);
    }

    #[test]
    fn test_running_entry_details() {
        let entry = ListEntry::from_workout(&run());
        let values: Vec<(&str, &str)> = entry
            .details
            .iter()
            .map(|d| (d.value.as_str(), d.unit))
            .collect();
        assert_eq!(
            values,
            vec![("5.2", "km"), ("26", "min"), ("5.0", "min/km"), ("178", "spm")]
        );
    }

    #[test]
    fn test_cycling_entry_details() {
        let entry = ListEntry::from_workout(&ride());
        let values: Vec<(&str, &str)> = entry
            .details
            .iter()
            .map(|d| (d.value.as_str(), d.unit))
            .collect();
        assert_eq!(
            values,
            vec![("20", "km"), ("60", "min"), ("20.0", "km/h"), ("-50", "m")]
        );
    }

    #[test]
    fn test_entry_html() {
        let workout = run();
        let html = ListEntry::from_workout(&workout).to_html();
        assert!(html.starts_with("<li class=\"workout workout--running\""));
        assert!(html.contains(&format!("data-id=\"{}\"", workout.id())));
        assert!(html.contains("<span class=\"workout__unit\">min/km</span>"));
        assert!(html.trim_end().ends_with("</li>"));
    }

    #[test]
    fn test_entry_plain_text() {
        let workout = ride();
        let text = ListEntry::from_workout(&workout).to_string();
        assert!(text.starts_with(&format!("[{}] Cycling on", workout.id())));
        assert!(text.contains("20.0 km/h"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
