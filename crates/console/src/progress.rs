use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Indeterminate spinner shown while a single request is in flight.
/// Callers clear it before printing the result.
pub fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
