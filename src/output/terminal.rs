//! Terminal output utilities.

use colored::Colorize;

/// Left-justify a value to `width` characters. Longer values are kept whole.
///
/// # Examples
/// ```
/// use chi_network_ops::output::pad_field;
/// assert_eq!(pad_field("vlan", 6), "vlan  ");
/// ```
pub fn pad_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    format!("{value_str:<width$}")
}

/// Progress messages for long-running reports, written to stderr so stdout
/// only carries the report.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    enabled: bool,
}

impl Progress {
    pub fn stderr() -> Self {
        Progress { enabled: true }
    }

    pub fn quiet() -> Self {
        Progress { enabled: false }
    }

    pub fn step(&self, message: &str) {
        log::debug!("progress: {message}");
        if self.enabled {
            eprintln!("{} {}", "::".blue().bold(), message);
        }
    }
}
