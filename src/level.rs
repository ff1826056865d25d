//! Severity levels and the fixed string mapping used at the config/API boundary.

use std::fmt;

/// Total ordering of log severities, lowest to highest.
///
/// `None` means "nothing passes" — it is the bottom of the lattice so that
/// comparisons of the form `record.level <= threshold` behave correctly even
/// when a sink or filter has been configured with the most restrictive
/// setting. Derived `Ord` follows declaration order, so keep this list
/// ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    None,
    Error,
    Warning,
    Info,
    Verbose,
    Debug,
    Debug2,
}

impl Level {
    /// Parses the fixed lowercase token set. Unknown strings degrade to
    /// `Info` per spec rather than failing — producers must never be able
    /// to break logging by mistyping a config value.
    pub fn from_str_token(s: &str) -> Level {
        match s {
            "none" => Level::None,
            "error" => Level::Error,
            "warning" => Level::Warning,
            "info" => Level::Info,
            "verbose" => Level::Verbose,
            "debug" => Level::Debug,
            "debug2" => Level::Debug2,
            _ => Level::Info,
        }
    }

    /// Inverse of [`Level::from_str_token`]. Every non-`None`-fallback value
    /// round-trips: `from_str_token(as_str_token(l)) == l`.
    pub fn as_str_token(self) -> &'static str {
        match self {
            Level::None => "none",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Verbose => "verbose",
            Level::Debug => "debug",
            Level::Debug2 => "debug2",
        }
    }

    /// Upper-case short tag used in prefix3 (`ERROR`, `WARNING`, ...).
    pub fn as_tag(self) -> &'static str {
        match self {
            Level::None => "NONE",
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Info => "INFO",
            Level::Verbose => "VERBOSE",
            Level::Debug => "DEBUG",
            Level::Debug2 => "DEBUG2",
        }
    }

    pub fn from_u8(v: u8) -> Level {
        match v {
            0 => Level::None,
            1 => Level::Error,
            2 => Level::Warning,
            3 => Level::Info,
            4 => Level::Verbose,
            5 => Level::Debug,
            _ => Level::Debug2,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str_token())
    }
}

/// Free-function form matching the `level_from_string`/`level_to_string`
/// pair spec.md exposes at the API boundary.
pub fn level_from_string(s: &str) -> Level {
    Level::from_str_token(&s.to_ascii_lowercase())
}

pub fn level_to_string(level: Level) -> &'static str {
    level.as_str_token()
}

/// Rounds `value` to `signs` decimal places, for log-friendly float
/// formatting (spec.md §6, `round(value, signs)`). Avoids pulling in a
/// formatting crate for what is a single multiply/round/divide.
pub fn round(value: f64, signs: u32) -> f64 {
    let factor = 10f64.powi(signs as i32);
    (value * factor).round() / factor
}
