//! Logger initialization.

use std::io::Write;

use colored::*;
use log::LevelFilter;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Initializes the logger with the specified level and format.
///
/// `RUST_LOG` is read first and the `level` argument then overrides it, so
/// `--log-level` always wins for this crate. HTTP client internals are capped
/// at info to keep per-request connection chatter out of debug output.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=jokes_on_tap=debug jokes_on_tap --port 8080
/// jokes_on_tap --log-level debug --log-format json
/// jokes_on_tap --log-format json-pretty
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("hyper_util", LevelFilter::Info);
    builder.filter_module("jokes_on_tap", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                let line = json_record(record, chrono::Utc::now().timestamp_millis(), false);
                writeln!(buf, "{}", line)
            });
        }
        LogFormat::JsonPretty => {
            builder.format(|buf, record| {
                let line = json_record(record, chrono::Utc::now().timestamp_millis(), true);
                writeln!(buf, "{}", line)
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    // try_init so a second call (tests) returns an error instead of panicking
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

/// Renders one record as a JSON object with `ts`, `level`, `target` and `msg`.
fn json_record(record: &log::Record<'_>, ts_millis: i64, pretty: bool) -> String {
    let value = serde_json::json!({
        "ts": ts_millis,
        "level": record.level().to_string(),
        "target": record.target(),
        "msg": record.args().to_string(),
    });
    let rendered = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    // A Value built from strings and integers always serializes
    rendered.unwrap_or_default()
}
