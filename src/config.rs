//! Run settings: CLI flags, then environment, then `bf-tape.toml`, then
//! defaults.
//!
//! The file lives in the XDG config home and only the `[run]` section is
//! read:
//!
//! ```toml
//! [run]
//! timeout_ms = 2000
//! max_steps = 1000000
//! eof = "unchanged"
//! raw = false
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use cross_xdg::BaseDirs;
use tracing::{debug, warn};

use crate::EofBehavior;

pub const CONFIG_FILE_NAME: &str = "bf-tape.toml";

/// Overrides the config file location; mostly useful for tests.
pub const CONFIG_PATH_ENV: &str = "BF_CONFIG";

/// Values read from the config file. Unset keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSettings {
    pub timeout_ms: Option<u64>,
    pub max_steps: Option<u64>,
    pub eof: Option<EofBehavior>,
    pub raw: Option<bool>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct FlagSettings {
    pub timeout_ms: Option<u64>,
    pub max_steps: Option<u64>,
    pub eof: Option<EofBehavior>,
    pub no_raw: bool,
}

/// Fully resolved settings for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Wall-clock limit; `None` waits forever.
    pub timeout_ms: Option<u64>,
    /// Interpreter step limit; `None` is unlimited.
    pub max_steps: Option<u64>,
    pub eof: EofBehavior,
    /// Whether raw terminal mode may be used when stdin is a TTY.
    pub raw: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            max_steps: None,
            eof: EofBehavior::Zero,
            raw: true,
        }
    }
}

impl Settings {
    /// Resolve settings from flags, the process environment and the config file.
    pub fn load(flags: &FlagSettings) -> Result<Self, String> {
        let file = load_file_settings().unwrap_or_default();
        Self::resolve(flags, |key| env::var(key).ok(), &file)
    }

    /// Resolution order: flags -> env -> file -> defaults.
    pub fn resolve<E>(flags: &FlagSettings, env_var: E, file: &FileSettings) -> Result<Self, String>
    where
        E: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let timeout_ms = match flags.timeout_ms {
            Some(v) => Some(v),
            None => parse_env(&env_var, "BF_TIMEOUT_MS", |s| s.parse::<u64>().ok())?.or(file.timeout_ms),
        };
        let max_steps = match flags.max_steps {
            Some(v) => Some(v),
            None => parse_env(&env_var, "BF_MAX_STEPS", |s| s.parse::<u64>().ok())?.or(file.max_steps),
        };
        let eof = match flags.eof {
            Some(v) => v,
            None => parse_env(&env_var, "BF_EOF", |s| s.parse::<EofBehavior>().ok())?
                .or(file.eof)
                .unwrap_or(defaults.eof),
        };
        let raw = if flags.no_raw {
            false
        } else {
            parse_env(&env_var, "BF_RAW", parse_bool)?
                .or(file.raw)
                .unwrap_or(defaults.raw)
        };

        Ok(Settings { timeout_ms, max_steps, eof, raw })
    }
}

fn parse_env<E, T, P>(env_var: &E, key: &str, parse: P) -> Result<Option<T>, String>
where
    E: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    match env_var(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse(raw.trim())
            .map(Some)
            .ok_or_else(|| format!("invalid {key} value: {raw}")),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Location of the config file: `$BF_CONFIG`, else `<XDG config home>/bf-tape.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(p) = env::var(CONFIG_PATH_ENV) {
        if !p.trim().is_empty() {
            return Some(PathBuf::from(p));
        }
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push(CONFIG_FILE_NAME);
    Some(path)
}

fn load_file_settings() -> Option<FileSettings> {
    let path = config_path()?;
    let content = fs::read_to_string(&path).ok()?;
    debug!(path = %path.display(), "loaded config file");
    Some(parse_settings(&content))
}

/// Parse the `[run]` section of a config file.
///
/// Very small hand-rolled parser: `key = value` pairs, quoted or unquoted,
/// `#` comments. Unknown keys and malformed values are ignored with a warning.
pub fn parse_settings(content: &str) -> FileSettings {
    let mut in_run = false;
    let mut map: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            in_run = line[1..line.len() - 1].trim() == "run";
            continue;
        }
        if !in_run { continue; }
        if let Some(eq) = line.find('=') {
            let key = line[..eq].trim().to_string();
            let val_raw = line[eq + 1..].trim();
            // Accept quoted or unquoted
            let val = if val_raw.starts_with('"') && val_raw.ends_with('"') && val_raw.len() >= 2 {
                val_raw[1..val_raw.len() - 1].to_string()
            } else { val_raw.to_string() };
            map.insert(key, val);
        }
    }

    let mut cfg = FileSettings::default();

    macro_rules! set {
        ($field:ident, $key:literal, $parse:expr) => {
            if let Some(v) = map.get($key) {
                match ($parse)(v.as_str()) {
                    Some(parsed) => cfg.$field = Some(parsed),
                    None => warn!(key = $key, value = %v, "ignoring invalid config value"),
                }
            }
        };
    }

    set!(timeout_ms, "timeout_ms", |s: &str| s.parse::<u64>().ok());
    set!(max_steps, "max_steps", |s: &str| s.parse::<u64>().ok());
    set!(eof, "eof", |s: &str| s.parse::<EofBehavior>().ok());
    set!(raw, "raw", parse_bool);

    cfg
}
