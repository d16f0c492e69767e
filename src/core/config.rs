// ─── Launch Configuration ───
// One immutable value resolved at startup. Components never perform their
// own ambient environment lookups; everything flows through `Config`.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::core::error::{LauncherError, LauncherResult};

/// Property key for the main class to launch. Defaults to finding it via
/// `Start-Class` / `Main-Class` of the primary archive manifest.
pub const THIN_MAIN: &str = "thin.main";

/// Flag for a "dry run" where dependencies are resolved (populating the
/// cache) but the main method is not executed.
pub const THIN_DRYRUN: &str = "thin.dryrun";

/// Flag for a "classpath run" where dependencies are resolved and the
/// output is printed in the form of a classpath, without executing.
pub const THIN_CLASSPATH: &str = "thin.classpath";

/// Path to the root directory where the artifact cache lives.
/// Defaults to `~/.m2/repository`.
pub const THIN_ROOT: &str = "thin.root";

/// Overrides which archive to treat as primary. A file path, an
/// `http(s)://` URL, or a `maven://group:artifact:version` locator.
pub const THIN_ARCHIVE: &str = "thin.archive";

/// A parent archive locator whose descriptor supplies default dependency
/// management for the primary archive.
pub const THIN_PARENT: &str = "thin.parent";

/// Comma-separated search locations for descriptor files (these locations
/// plus a relative `META-INF/` are searched). Defaults to the current
/// directory and the primary archive itself.
pub const THIN_LOCATION: &str = "thin.location";

/// Base name of the descriptor file. Defaults to `thin`, so
/// `thin.properties` is the default file name with no profiles.
pub const THIN_NAME: &str = "thin.name";

/// Comma-separated list of profiles, changing which descriptor files are
/// looked up.
pub const THIN_PROFILE: &str = "thin.profile";

/// Flag to make the loader child-first (parent last). Default false. Needed
/// when the primary archive contains classes in the root that must shadow
/// copies visible in the parent scope (e.g. alongside a Java agent).
pub const THIN_PARENT_LAST: &str = "thin.parentLast";

/// Flag to make the loader parent the platform boot scope rather than the
/// launcher's own scope. Default true.
pub const THIN_USE_BOOT_LOADER: &str = "thin.useBootLoader";

/// Prefix for command-line overrides recognized by the launcher itself.
pub const ARG_PREFIX: &str = "--thin.";

/// Immutable launch configuration with documented lookup precedence per key:
///
/// 1. explicit command-line override (`--thin.key=value`)
/// 2. environment variable (`THIN_KEY`, dots to underscores, uppercased)
/// 3. process property layer (programmatic, used by embedders and tests)
/// 4. caller-supplied default
///
/// A command-line override with an empty value cancels the key entirely
/// (lower layers are not consulted), matching `--thin.archive=` semantics.
#[derive(Debug, Clone, Default)]
pub struct Config {
    cli: HashMap<String, String>,
    properties: HashMap<String, String>,
}

impl Config {
    /// Build a configuration from raw command-line arguments.
    ///
    /// Collects `--thin.key=value` pairs (and bare `--thin.key` flags, which
    /// read as `true`). A literal `--` stops collection: everything after it
    /// belongs to the application.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        let mut cli = HashMap::new();
        for arg in args {
            let arg = arg.as_ref();
            if arg == "--" {
                break;
            }
            let Some(rest) = arg.strip_prefix("--") else {
                continue;
            };
            if !rest.starts_with("thin.") {
                continue;
            }
            match rest.split_once('=') {
                Some((key, value)) => cli.insert(key.to_string(), value.to_string()),
                None => cli.insert(rest.to_string(), "true".to_string()),
            };
        }
        Self {
            cli,
            properties: HashMap::new(),
        }
    }

    /// Set a process-property value (the layer below environment variables).
    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    /// Look up a key through the precedence chain. Returns `None` when the
    /// key is unset everywhere, or cancelled by an empty command-line value.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.cli.get(key) {
            if value.is_empty() {
                return None;
            }
            return Some(value.clone());
        }
        if let Ok(value) = std::env::var(env_key(key)) {
            if !value.is_empty() {
                return Some(value);
            }
        }
        self.properties.get(key).cloned()
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a boolean flag. Absent means `false`.
    pub fn get_flag(&self, key: &str) -> LauncherResult<bool> {
        self.get_flag_or(key, false)
    }

    /// Parse a boolean flag with an explicit default, for flags that are on
    /// unless disabled. `true`/`false` are accepted case-insensitively;
    /// anything else is a configuration error naming the offending key.
    pub fn get_flag_or(&self, key: &str, default: bool) -> LauncherResult<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(LauncherError::Configuration {
                    key: key.to_string(),
                    message: format!("expected true or false, got {raw:?}"),
                }),
            },
        }
    }

    /// Root directory for the artifact cache.
    pub fn cache_root(&self) -> PathBuf {
        match self.get(THIN_ROOT) {
            Some(root) => PathBuf::from(root),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".m2")
                .join("repository"),
        }
    }

    /// Active profiles in caller order. Empty tokens read as "no profile"
    /// and duplicates are dropped, so `thin.profile=,dev,dev` is just `dev`.
    pub fn profiles(&self) -> Vec<String> {
        let raw = self.get_or(THIN_PROFILE, "");
        let mut seen = std::collections::HashSet::new();
        raw.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .filter(|p| seen.insert(p.to_string()))
            .map(str::to_string)
            .collect()
    }

    /// Configured descriptor search locations, if any.
    pub fn locations(&self) -> Option<Vec<String>> {
        self.get(THIN_LOCATION).map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    /// Descriptor base name.
    pub fn name(&self) -> String {
        self.get_or(THIN_NAME, "thin")
    }
}

fn env_key(key: &str) -> String {
    key.replace('.', "_").to_uppercase()
}

/// Remove the launcher's own arguments before handing over to the
/// application. Scans left to right; once a bare `--` is seen, all
/// subsequent arguments pass through untouched even if they match the
/// `--thin.` prefix. The `--` itself is preserved.
pub fn strip_launcher_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    let mut result = Vec::new();
    let mut escaped = false;
    for arg in args {
        let arg = arg.as_ref();
        if !escaped {
            if arg == "--" {
                escaped = true;
            } else if arg.starts_with(ARG_PREFIX) {
                continue;
            }
        }
        result.push(arg.to_string());
    }
    result
}
