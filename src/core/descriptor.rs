// ─── Launch Descriptor ───
// Properties files declaring the dependency set of a thin archive, selected
// by base name + ordered profile list and merged first-defined-wins.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use crate::core::archive::Archive;

/// Key prefix declaring a dependency coordinate: `dependencies.<label>=g:a:v`.
const DEPENDENCIES_PREFIX: &str = "dependencies.";
/// Key prefix pinning a managed version: `managed.<label>=g:a:v`.
const MANAGED_PREFIX: &str = "managed.";
/// Key prefix excluding a transitive dependency: `exclusions.<label>=g:a`.
const EXCLUSIONS_PREFIX: &str = "exclusions.";
/// Comma-separated repository override.
const REPOSITORIES_KEY: &str = "repositories";

/// The effective property set for one launch. Immutable once loaded;
/// a fresh instance is built per launch.
///
/// Merge rule: the first definition of a key wins. Earlier search locations
/// beat later ones, the unqualified descriptor beats profile-qualified ones,
/// and earlier profiles beat later profiles. Later sources may only add keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchDescriptor {
    properties: BTreeMap<String, String>,
}

/// A place descriptor files can live: a directory on disk or inside an
/// already-opened archive. Each location's root and its `META-INF/` are
/// both searched.
#[derive(Debug, Clone)]
pub enum SearchLocation {
    Dir(PathBuf),
    Archive(Archive),
}

impl LaunchDescriptor {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load and merge all descriptor files for `name` + `profiles` across
    /// `locations`. Missing files are skipped silently: an absent descriptor
    /// is a valid, empty dependency set.
    pub fn load(name: &str, profiles: &[String], locations: &[SearchLocation]) -> Self {
        let mut descriptor = Self::empty();
        for location in locations {
            for file in candidate_files(name, profiles) {
                if let Some(text) = read_location(location, &file) {
                    debug!("Descriptor: {} in {:?}", file, location);
                    descriptor.merge_first_wins(parse_properties(&text));
                }
            }
        }
        descriptor
    }

    /// Add entries that are not yet defined; existing keys are never
    /// overridden (caller-priority, not last-write-wins).
    pub fn merge_first_wins(&mut self, properties: BTreeMap<String, String>) {
        for (key, value) in properties {
            self.properties.entry(key).or_insert(value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Declared dependency coordinates, in stable (key-sorted) order.
    pub fn dependencies(&self) -> Vec<String> {
        self.values_with_prefix(DEPENDENCIES_PREFIX)
    }

    /// Managed coordinates pinning versions for transitive resolution.
    pub fn managed(&self) -> Vec<String> {
        self.values_with_prefix(MANAGED_PREFIX)
    }

    /// Excluded `group:artifact` pairs.
    pub fn exclusions(&self) -> Vec<String> {
        self.values_with_prefix(EXCLUSIONS_PREFIX)
    }

    /// Repository override list, if declared.
    pub fn repositories(&self) -> Option<Vec<String>> {
        self.get(REPOSITORIES_KEY).map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    fn values_with_prefix(&self, prefix: &str) -> Vec<String> {
        // BTreeMap iteration is key-sorted, which keeps the declared set in
        // a reproducible order run over run.
        self.properties
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(_, value)| value.clone())
            .collect()
    }
}

/// Candidate file names in priority order: the unqualified descriptor first,
/// then one per profile in caller order.
fn candidate_files(name: &str, profiles: &[String]) -> Vec<String> {
    let mut files = vec![format!("{name}.properties")];
    for profile in profiles {
        if profile.is_empty() {
            continue;
        }
        files.push(format!("{name}-{profile}.properties"));
    }
    files
}

fn read_location(location: &SearchLocation, file: &str) -> Option<String> {
    match location {
        SearchLocation::Dir(dir) => {
            for candidate in [dir.join(file), dir.join("META-INF").join(file)] {
                if candidate.is_file() {
                    return std::fs::read_to_string(&candidate).ok();
                }
            }
            None
        }
        SearchLocation::Archive(archive) => {
            for entry in [file.to_string(), format!("META-INF/{file}")] {
                if let Ok(Some(bytes)) = archive.read_entry(&entry) {
                    return Some(String::from_utf8_lossy(&bytes).into_owned());
                }
            }
            None
        }
    }
}

/// Parse Java-style `.properties` text: `key=value` (or `key: value`),
/// `#`/`!` comments, and trailing-backslash line continuation.
pub fn parse_properties(text: &str) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    let mut pending = String::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
        {
            continue;
        }

        if let Some(continued) = line.strip_suffix('\\') {
            pending.push_str(continued.trim_start());
            continue;
        }
        pending.push_str(if pending.is_empty() {
            line
        } else {
            line.trim_start()
        });

        let logical = std::mem::take(&mut pending);
        let split = logical
            .char_indices()
            .find(|(_, c)| *c == '=' || *c == ':')
            .map(|(i, _)| i);
        if let Some(i) = split {
            let key = logical[..i].trim().to_string();
            let value = logical[i + 1..].trim().to_string();
            if !key.is_empty() {
                properties.insert(key, value);
            }
        }
    }

    properties
}
