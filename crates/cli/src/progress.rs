use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner flavours for the stages of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressType {
    /// Page download and extraction
    Fetch,
    /// The four critique calls
    Analyze,
    /// Local storage reads
    Storage,
}

#[derive(Debug, Clone)]
pub struct ProgressConfig {
    pub spinner_chars: &'static str,
    pub tick_interval: Duration,
    pub color: &'static str,
    pub success_message: &'static str,
}

impl ProgressType {
    pub fn config(self) -> ProgressConfig {
        match self {
            ProgressType::Fetch => ProgressConfig {
                spinner_chars: "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏",
                tick_interval: Duration::from_millis(80),
                color: "cyan",
                success_message: "✓ Content extracted",
            },
            ProgressType::Analyze => ProgressConfig {
                spinner_chars: "⠋⠙⠚⠞⠖⠦⠴⠲⠳⠓",
                tick_interval: Duration::from_millis(120),
                color: "blue",
                success_message: "✓ Analysis complete",
            },
            ProgressType::Storage => ProgressConfig {
                spinner_chars: "⠁⠂⠄⡀⢀⠠⠐⠈",
                tick_interval: Duration::from_millis(100),
                color: "green",
                success_message: "✓ Loaded",
            },
        }
    }

    pub fn create_spinner(self, message: &str) -> AdaptiveSpinner {
        let config = self.config();
        let spinner = ProgressBar::new_spinner();

        let template = format!("{{spinner:.{}}} {{msg}}", config.color);
        let style = ProgressStyle::default_spinner()
            .tick_chars(config.spinner_chars)
            .template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);

        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(config.tick_interval);

        AdaptiveSpinner { spinner, config }
    }
}

/// Spinner that finishes with a coloured status line.
pub struct AdaptiveSpinner {
    spinner: ProgressBar,
    config: ProgressConfig,
}

impl AdaptiveSpinner {
    pub fn set_message(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }

    pub fn finish_success(&self, message: Option<&str>) {
        let msg = message.unwrap_or(self.config.success_message);

        let colored_msg = match self.config.color {
            "blue" => msg.blue().to_string(),
            "cyan" => msg.cyan().to_string(),
            _ => msg.green().to_string(),
        };

        self.spinner.finish_with_message(colored_msg);
    }

    pub fn finish_error(&self, message: &str) {
        let error_msg = format!("✗ {message}");
        self.spinner.finish_with_message(error_msg.red().to_string());
    }

    pub fn finish_and_clear(&self) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_type_configs() {
        let fetch = ProgressType::Fetch.config();
        assert_eq!(fetch.tick_interval, Duration::from_millis(80));
        assert_eq!(fetch.color, "cyan");
        assert_eq!(ProgressType::Analyze.config().color, "blue");
    }

    #[test]
    fn test_spinner_lifecycle() {
        let spinner = ProgressType::Analyze.create_spinner("Analyzing...");
        spinner.set_message("Still analyzing...");
        spinner.finish_success(None);

        let spinner = ProgressType::Fetch.create_spinner("Fetching...");
        spinner.finish_error("HTTP 404");

        ProgressType::Storage.create_spinner("Loading...").finish_and_clear();
    }
}
