// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging bootstrap for binaries and tests built on the device layer.
//!
//! Library code only talks to the `log` facade. Binaries call
//! [`init_logging`] once to install an `env_logger` sink, optionally teeing
//! every line into a log file.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use env_logger::{Builder, Env, Target};
use serde::{Deserialize, Serialize};

const BANNER_RULE: &str = "------------------------------------------------------";

/// Set once this module's logger is the global one.
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Logger configuration, usually read from the same JSON file as the
/// device settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter used when `RUST_LOG` is not set (`"info"`, `"debug"`, ...).
    pub level: String,
    /// When set, every line is also written to this file. The file is
    /// truncated when the logger starts.
    pub file: Option<PathBuf>,
    /// Level applied to the noisy `wgpu_hal` and `wgpu_core` modules.
    pub wgpu_level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            wgpu_level: "warn".to_string(),
        }
    }
}

impl LogSettings {
    /// Parses settings from JSON. Missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid log settings")
    }
}

/// Installs the global logger.
///
/// Lines look like `12:04:51 [INFO]: message`. Calling this a second time is
/// harmless: the first logger stays installed and the log file of the second
/// call is left untouched.
///
/// ## Errors
/// Fails if the log file cannot be created or `wgpu_level` is not a level name.
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let wgpu_level: log::LevelFilter = settings
        .wgpu_level
        .parse()
        .with_context(|| format!("Unknown log level '{}'", settings.wgpu_level))?;

    if logger_installed() {
        log::debug!("A logger is already installed, keeping it.");
        return Ok(());
    }

    let mut builder = Builder::from_env(Env::default().default_filter_or(settings.level.as_str()));
    builder
        .filter_module("wgpu_hal", wgpu_level)
        .filter_module("wgpu_core", wgpu_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}]: {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        });

    if let Some(path) = &settings.file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        write_banner(&mut file, Local::now())?;
        builder.target(Target::Pipe(Box::new(TeeWriter { file })));
    }

    match builder.try_init() {
        Ok(()) => INSTALLED.store(true, Ordering::Release),
        Err(_) => log::debug!("A logger is already installed, keeping it."),
    }
    Ok(())
}

/// `log` keeps its max level at `Off` until some logger is installed.
fn logger_installed() -> bool {
    INSTALLED.load(Ordering::Acquire) || log::max_level() != log::LevelFilter::Off
}

/// Writes the dated header that opens every log file.
fn write_banner<W: Write>(out: &mut W, now: DateTime<Local>) -> io::Result<()> {
    writeln!(out, "{BANNER_RULE}")?;
    writeln!(out, "LOG DATE: {}", now.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "{BANNER_RULE}")
}

/// Sends each formatted line to stderr and to the log file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings = LogSettings::from_json(r#"{ "level": "debug" }"#).unwrap();
        assert_eq!(settings.level, "debug");
        assert_eq!(settings.file, None);
        assert_eq!(settings.wgpu_level, "warn");
    }

    #[test]
    fn malformed_settings_are_rejected() {
        assert!(LogSettings::from_json("{ level: }").is_err());
    }

    #[test]
    fn banner_is_dated_and_framed() {
        let now = Local.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
        let mut out = Vec::new();
        write_banner(&mut out, now).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], BANNER_RULE);
        assert_eq!(lines[1], "LOG DATE: 2025-03-09 14:05:07");
        assert_eq!(lines[2], BANNER_RULE);
    }

    #[test]
    fn unknown_wgpu_level_is_an_error() {
        let settings = LogSettings {
            wgpu_level: "loud".to_string(),
            ..Default::default()
        };
        assert!(init_logging(&settings).is_err());
    }

    #[test]
    fn log_file_is_truncated_and_initialization_is_repeatable() {
        let path = std::env::temp_dir().join(format!("vesta-log-{}.log", std::process::id()));
        std::fs::write(&path, "stale contents\n").unwrap();
        let settings = LogSettings {
            file: Some(path.clone()),
            ..Default::default()
        };

        init_logging(&settings).unwrap();
        init_logging(&LogSettings::default()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(BANNER_RULE));
        assert!(!text.contains("stale contents"));

        // A later call must neither truncate the active file nor create another.
        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .and_then(|mut file| writeln!(file, "still here"))
            .unwrap();
        let other = path.with_extension("second.log");
        init_logging(&settings).unwrap();
        init_logging(&LogSettings {
            file: Some(other.clone()),
            ..Default::default()
        })
        .unwrap();

        assert!(std::fs::read_to_string(&path).unwrap().contains("still here"));
        assert!(!other.exists());
        let _ = std::fs::remove_file(&path);
    }
}
