//! Declarative configuration binding — spec.md §6. The document shape
//! (`ConfigDoc`/`FilterSpec`/`SaverSpec`) is `serde::Deserialize`, so any
//! format with a serde deserializer (YAML, JSON, TOML, ...) can feed it;
//! this crate itself never parses a file, per spec.md §1's exclusion of
//! "configuration file parsers".

use std::path::PathBuf;
use std::sync::Arc;

use ahash::AHashMap;
use serde::Deserialize;

use crate::error::LoggerError;
use crate::filter::{
    ContentFilter, Filter, FileFilter, FunctionFilter, LevelFilter, Mode, ModuleFilter,
    ThreadFilter,
};
use crate::level::{level_from_string, Level};
use crate::sink::{FileSink, Sink, StderrSink, StdoutSink};

const KNOWN_LEVEL_TOKENS: [&str; 7] =
    ["none", "error", "warning", "info", "verbose", "debug", "debug2"];

fn default_true() -> bool {
    true
}

/// Top-level configuration document — spec.md §6.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigDoc {
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    #[serde(default)]
    pub savers: Vec<SaverSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub filtering_errors: bool,
    #[serde(default)]
    pub follow_thread_context: bool,
    #[serde(default)]
    pub filtering_noname_modules: bool,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub threads: Vec<u64>,
    #[serde(default)]
    pub contents: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaverSpec {
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub max_line_size: Option<usize>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(rename = "continue", default = "default_true")]
    pub continue_existing: bool,
    #[serde(default)]
    pub filters: Vec<String>,
}

/// What [`bind`] produced: the sinks ready to hand to a `Logger`, and every
/// recoverable error encountered along the way — spec.md §7's
/// "the logger proceeds without the offending entry".
#[derive(Default)]
pub struct BindOutcome {
    pub sinks: Vec<Arc<dyn Sink>>,
    pub errors: Vec<LoggerError>,
}

/// Binds a [`ConfigDoc`] into constructed Sinks (with their Filters already
/// attached and locked). Errors are collected, not returned early: a
/// malformed filter or saver entry is skipped and binding continues with
/// the rest of the document.
pub fn bind(doc: &ConfigDoc) -> BindOutcome {
    let mut errors = Vec::new();
    let mut filters: AHashMap<String, Arc<dyn Filter>> = AHashMap::new();

    for spec in &doc.filters {
        match build_filter(spec) {
            Ok(filter) => {
                filter.lock();
                filters.insert(spec.name.clone(), filter);
            }
            Err(e) => errors.push(e),
        }
    }

    let mut sinks = Vec::new();
    for spec in &doc.savers {
        if let Some(sink) = build_saver(spec, &filters, &mut errors) {
            sinks.push(sink);
        }
    }

    BindOutcome { sinks, errors }
}

fn build_filter(spec: &FilterSpec) -> Result<Arc<dyn Filter>, LoggerError> {
    if spec.name.is_empty() {
        return Err(LoggerError::Configuration("filter name must not be empty".into()));
    }
    let mode = match spec.mode.as_deref() {
        None | Some("include") => Mode::Include,
        Some("exclude") => Mode::Exclude,
        Some(other) => {
            return Err(LoggerError::Configuration(format!(
                "filter '{}': unknown mode '{other}'",
                spec.name
            )))
        }
    };

    let mut filter: Box<dyn Filter> = match spec.kind.as_str() {
        "module_name" => {
            let mut f = ModuleFilter::new(spec.name.clone(), spec.modules.clone());
            f.set_filtering_noname_modules(spec.filtering_noname_modules);
            Box::new(f)
        }
        "log_level" => {
            let token = spec.level.as_deref().ok_or_else(|| {
                LoggerError::FilterConstruction(format!(
                    "filter '{}': log_level requires a 'level'",
                    spec.name
                ))
            })?;
            if !KNOWN_LEVEL_TOKENS.contains(&token) {
                return Err(LoggerError::FilterConstruction(format!(
                    "filter '{}': invalid level token '{token}'",
                    spec.name
                )));
            }
            Box::new(LevelFilter::new(spec.name.clone(), level_from_string(token), spec.modules.clone()))
        }
        "func_name" => {
            let mut f = FunctionFilter::new(spec.name.clone());
            for name in &spec.functions {
                f.add_function(name.clone());
            }
            Box::new(f)
        }
        "file_name" => {
            let mut f = FileFilter::new(spec.name.clone());
            for entry in &spec.files {
                if let Some((_, line)) = entry.rsplit_once(':') {
                    if !line.is_empty() && !line.chars().all(|c| c.is_ascii_digit()) {
                        return Err(LoggerError::FilterConstruction(format!(
                            "filter '{}': invalid line number in '{entry}'",
                            spec.name
                        )));
                    }
                }
                f.add_entry(entry);
            }
            Box::new(f)
        }
        "thread_id" => {
            let mut f = ThreadFilter::new(spec.name.clone());
            for id in &spec.threads {
                f.add_thread(*id);
            }
            Box::new(f)
        }
        "content" => {
            let mut f = ContentFilter::new(spec.name.clone());
            for needle in &spec.contents {
                f.add_content(needle.clone());
            }
            Box::new(f)
        }
        other => {
            return Err(LoggerError::Configuration(format!(
                "filter '{}': unknown type '{other}'",
                spec.name
            )))
        }
    };

    filter.core_mut().set_mode(mode);
    filter.core_mut().set_filter_errors(spec.filtering_errors);
    filter.core_mut().set_follow_thread_context(spec.follow_thread_context);
    Ok(Arc::from(filter))
}

fn build_saver(
    spec: &SaverSpec,
    filters: &AHashMap<String, Arc<dyn Filter>>,
    errors: &mut Vec<LoggerError>,
) -> Option<Arc<dyn Sink>> {
    if spec.name.is_empty() {
        errors.push(LoggerError::Configuration("saver name must not be empty".into()));
        return None;
    }

    let level = match spec.level.as_deref() {
        Some(token) if KNOWN_LEVEL_TOKENS.contains(&token) => level_from_string(token),
        Some(token) => {
            errors.push(LoggerError::Configuration(format!(
                "saver '{}': invalid level token '{token}', defaulting to info",
                spec.name
            )));
            Level::Info
        }
        None => Level::Info,
    };

    let sink: Arc<dyn Sink> = match spec.name.as_str() {
        "stdout" => Arc::new(StdoutSink::new("stdout", level, false)),
        "stderr" => Arc::new(StderrSink::new("stderr", level, false)),
        _ => {
            let Some(file) = spec.file.as_deref() else {
                errors.push(LoggerError::Configuration(format!(
                    "saver '{}': 'file' is required for a custom saver",
                    spec.name
                )));
                return None;
            };
            let path = expand_path(file);
            match FileSink::new(spec.name.clone(), path, level, spec.continue_existing) {
                Ok(sink) => Arc::new(sink),
                Err(e) => {
                    errors.push(LoggerError::SinkWrite(format!("saver '{}': {e}", spec.name)));
                    return None;
                }
            }
        }
    };

    sink.core().set_active(spec.active);
    if let Some(max) = spec.max_line_size {
        sink.core().set_max_line_size(max);
    }
    for name in &spec.filters {
        match filters.get(name) {
            Some(filter) => sink.core().add_filter(filter.clone()),
            None => errors.push(LoggerError::Configuration(format!(
                "saver '{}': unknown filter '{name}'",
                spec.name
            ))),
        }
    }
    Some(sink)
}

/// Expands `~`, `ProgramData`, `AppData`, and `Temp` tokens inside a
/// configured file path using the environment variables spec.md §6 names
/// (`HOME`/`USERPROFILE` for `~`, `PROGRAMDATA`, `APPDATA`, `TEMP`). Tokens
/// whose environment variable is unset are left untouched.
pub fn expand_path(input: &str) -> PathBuf {
    let mut s = input.to_string();

    if s == "~" || s.starts_with("~/") {
        if let Some(home) = home_dir() {
            let home = home.to_string_lossy().into_owned();
            s = if s == "~" { home } else { format!("{home}{}", &s[1..]) };
        }
    }

    s = replace_env_token(&s, "ProgramData", "PROGRAMDATA");
    s = replace_env_token(&s, "AppData", "APPDATA");
    s = replace_env_token(&s, "Temp", "TEMP");

    PathBuf::from(s)
}

fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
        .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
}

fn replace_env_token(s: &str, token: &str, env_var: &str) -> String {
    if s.contains(token) {
        if let Ok(val) = std::env::var(env_var) {
            return s.replace(token, &val);
        }
    }
    s.to_string()
}
