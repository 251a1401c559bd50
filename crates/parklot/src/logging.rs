//! Tracing setup for the simulator binary.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Filter directive for a `PARKLOT_LOG` value. Unknown values fall back to info.
pub fn filter_directive(level: Option<&str>) -> String {
    let base_level = match level {
        Some("debug") => "debug",
        Some("trace") => "trace",
        Some("warn") | Some("warning") => "warn",
        Some("error") => "error",
        _ => "info",
    };
    format!("parklot={base_level},parklot_sim={base_level}")
}

pub fn log_format(value: Option<&str>) -> LogFormat {
    match value {
        Some("json") => LogFormat::Json,
        _ => LogFormat::Text,
    }
}

/// Initialize tracing with `RUST_LOG` (if set) or `PARKLOT_LOG`, and `LOG_FORMAT`.
///
/// Logs go to stderr so stdout stays free for the report. Calling this more
/// than once is harmless.
pub fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = std::env::var("PARKLOT_LOG").ok();
        EnvFilter::new(filter_directive(level.as_deref()))
    };

    let format = log_format(std::env::var("LOG_FORMAT").ok().as_deref());

    match format {
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr));
            let _ = subscriber.try_init();
        }
        LogFormat::Text => {
            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr));
            let _ = subscriber.try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_directives() {
        assert_eq!(filter_directive(None), "parklot=info,parklot_sim=info");
        assert_eq!(
            filter_directive(Some("warning")),
            "parklot=warn,parklot_sim=warn"
        );
        assert_eq!(
            filter_directive(Some("loud")),
            "parklot=info,parklot_sim=info"
        );
    }

    #[test]
    fn json_format_only_when_asked() {
        assert_eq!(log_format(Some("json")), LogFormat::Json);
        assert_eq!(log_format(Some("pretty")), LogFormat::Text);
        assert_eq!(log_format(None), LogFormat::Text);
    }

    #[test]
    fn init_twice_is_harmless() {
        init_tracing();
        init_tracing();
    }
}
