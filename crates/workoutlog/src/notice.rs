//! User-visible notices.

use tracing::warn;

/// Shown when the current position cannot be determined.
pub const LOCATION_UNAVAILABLE: &str = "Couldn't access your location";

/// Shown when a submitted form is rejected.
pub const INVALID_INPUT: &str = "Inputs have to be positive numbers!";

/// A blocking notice surface, such as an alert dialog.
pub trait Notifier {
    /// Show `message` to the user.
    fn notify(&mut self, message: &str);
}

/// Writes notices to standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, message: &str) {
        warn!("Notice: {message}");
        eprintln!("{message}");
    }
}

/// Keeps every notice, for inspection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectingNotifier {
    messages: Vec<String>,
}

impl CollectingNotifier {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices in the order they were shown.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_notifier() {
        let mut notifier = CollectingNotifier::new();
        notifier.notify(LOCATION_UNAVAILABLE);
        notifier.notify(INVALID_INPUT);
        assert_eq!(
            notifier.messages(),
            &[LOCATION_UNAVAILABLE.to_string(), INVALID_INPUT.to_string()]
        );
    }

    #[test]
    fn test_console_notifier_does_not_panic() {
        ConsoleNotifier.notify("test notice");
    }
}
