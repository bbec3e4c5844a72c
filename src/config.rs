use clap::Parser;

use crate::providers::tfl::DEFAULT_BASE_URL;

/// Live bus countdown for a single TfL stop and route.
#[derive(Debug, Parser)]
#[command(name = "pibus", author, version, about)]
pub struct Options {
    /// TfL identifier of a bus stop
    #[arg(short = 'b', long = "bus-stop", env = "PIBUS_STOP")]
    pub bus_stop: Option<String>,

    /// Name of a bus route
    #[arg(short = 'l', long = "bus-line", env = "PIBUS_LINE")]
    pub bus_line: Option<String>,

    /// Base URL of the TfL API endpoint
    #[arg(short = 'u', long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Turn on debug logging
    #[arg(short, long)]
    pub debug: bool,
}

/// Fully validated runtime configuration. The debug flag stays on
/// [`Options`]: logging is initialized before validation so a missing
/// stop/route failure is itself logged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bus_stop: String,
    pub bus_line: String,
    pub base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("you must provide both a bus stop (--bus-stop) and a bus route (--bus-line)")]
    MissingStopOrRoute,
}

impl Options {
    /// Stop and route are both required; missing either is fatal at startup,
    /// before any scheduling begins.
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        match (self.bus_stop, self.bus_line) {
            (Some(bus_stop), Some(bus_line)) => Ok(Settings {
                bus_stop,
                bus_line,
                base_url: self.base_url,
            }),
            _ => Err(ConfigError::MissingStopOrRoute),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_flags() {
        let options =
            Options::parse_from(["pibus", "-b", "490008660N", "--bus-line", "73", "--debug"]);
        assert!(options.debug);
        let settings = options.into_settings().unwrap();
        assert_eq!(settings.bus_stop, "490008660N");
        assert_eq!(settings.bus_line, "73");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn missing_stop_or_route_is_a_config_error() {
        let options = Options::parse_from(["pibus", "-b", "490008660N"]);
        assert!(matches!(
            options.into_settings(),
            Err(ConfigError::MissingStopOrRoute)
        ));

        let options = Options::parse_from(["pibus", "-l", "73"]);
        assert!(options.into_settings().is_err());
    }

    #[test]
    fn base_url_can_be_overridden() {
        let options = Options::parse_from([
            "pibus",
            "-b",
            "490008660N",
            "-l",
            "73",
            "-u",
            "http://localhost:8080",
        ]);
        let settings = options.into_settings().unwrap();
        assert_eq!(settings.base_url, "http://localhost:8080");
    }
}
