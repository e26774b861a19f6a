//! Tracing subscriber setup for the service.
//!
//! `.env` is loaded here, before any variable is read, so logging variables
//! placed in `.env` apply the same way as the rest of the configuration.

use std::env;

use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

// ---

/// Log level used when neither `RUST_LOG` nor `AXUM_LOG_LEVEL` is set.
const DEFAULT_LEVEL: &str = "debug";

/// Subscriber options resolved from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    /// Filter directive; `None` defers to `RUST_LOG`.
    pub directive: Option<String>,
    pub span_events: FmtSpan,
    /// `Some` when `FORCE_COLOR` decides, `None` to follow TTY detection.
    pub force_color: Option<bool>,
}

impl LogSettings {
    /// Resolve `RUST_LOG`, `AXUM_LOG_LEVEL`, `AXUM_SPAN_EVENTS` and `FORCE_COLOR`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // ---
        let directive = match lookup("RUST_LOG") {
            Some(_) => None,
            None => {
                let level = match lookup("AXUM_LOG_LEVEL").as_deref() {
                    Some(l @ ("trace" | "debug" | "info" | "warn" | "error")) => l.to_string(),
                    _ => DEFAULT_LEVEL.to_string(),
                };
                Some(format!("{level},sqlx::query=warn"))
            }
        };

        let span_events = match lookup("AXUM_SPAN_EVENTS").as_deref() {
            Some("full") => FmtSpan::FULL,
            Some("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
            _ => FmtSpan::CLOSE,
        };

        let force_color = match lookup("FORCE_COLOR").as_deref() {
            Some("1" | "true" | "yes") => Some(true),
            Some("0" | "false" | "no") => Some(false),
            _ => None,
        };

        LogSettings {
            directive,
            span_events,
            force_color,
        }
    }
}

/// Load `.env`, then install the global subscriber. Call once at startup.
pub fn init() {
    // ---
    dotenv().ok();

    let settings = LogSettings::from_lookup(|name| env::var(name).ok());
    let use_color = settings
        .force_color
        .unwrap_or_else(|| std::io::stdout().is_terminal());
    let env_filter = match settings.directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::from_default_env(),
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(settings.span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use std::collections::HashMap;

    fn settings_from(vars: HashMap<String, String>) -> LogSettings {
        LogSettings::from_lookup(move |name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        // ---
        let settings = settings_from(HashMap::new());

        assert_eq!(settings.directive.as_deref(), Some("debug,sqlx::query=warn"));
        assert_eq!(settings.span_events, FmtSpan::CLOSE);
        assert_eq!(settings.force_color, None);
    }

    #[test]
    fn test_dotenv_values_are_honored() {
        // ---
        let dotenv_file = "AXUM_LOG_LEVEL=warn\nAXUM_SPAN_EVENTS=full\nFORCE_COLOR=no\n";
        let vars: HashMap<String, String> = dotenvy::from_read_iter(dotenv_file.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();

        let settings = settings_from(vars);

        assert_eq!(settings.directive.as_deref(), Some("warn,sqlx::query=warn"));
        assert_eq!(settings.span_events, FmtSpan::FULL);
        assert_eq!(settings.force_color, Some(false));
    }

    #[test]
    fn test_rust_log_wins_and_unknown_level_falls_back() {
        // ---
        let mut vars = HashMap::new();
        vars.insert("RUST_LOG".to_string(), "info".to_string());
        vars.insert("AXUM_LOG_LEVEL".to_string(), "error".to_string());
        assert_eq!(settings_from(vars).directive, None);

        let mut vars = HashMap::new();
        vars.insert("AXUM_LOG_LEVEL".to_string(), "loud".to_string());
        vars.insert("AXUM_SPAN_EVENTS".to_string(), "enter_exit".to_string());
        let settings = settings_from(vars);
        assert_eq!(settings.directive.as_deref(), Some("debug,sqlx::query=warn"));
        assert_eq!(settings.span_events, FmtSpan::ENTER | FmtSpan::EXIT);
    }
}
