// ─── Java Runtime Discovery ───

use std::path::PathBuf;

use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

fn java_binary_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "java.exe"
    } else {
        "java"
    }
}

/// Locate the `java` binary: `$JAVA_HOME/bin/java` when set, otherwise the
/// first match on `PATH`.
pub fn find_java_binary() -> LauncherResult<PathBuf> {
    if let Ok(home) = std::env::var("JAVA_HOME") {
        if !home.trim().is_empty() {
            let candidate = PathBuf::from(home).join("bin").join(java_binary_name());
            if candidate.is_file() {
                debug!("Java from JAVA_HOME: {:?}", candidate);
                return Ok(candidate);
            }
        }
    }

    if let Some(path) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&path) {
            let candidate = dir.join(java_binary_name());
            if candidate.is_file() {
                debug!("Java from PATH: {:?}", candidate);
                return Ok(candidate);
            }
        }
    }

    Err(LauncherError::JavaNotFound)
}

/// Jars shipped with the runtime under `$JAVA_HOME`, for modelling the boot
/// scope of the platform. Empty when `JAVA_HOME` is unset or has no jars.
pub fn runtime_jars() -> Vec<PathBuf> {
    let Ok(home) = std::env::var("JAVA_HOME") else {
        return vec![];
    };
    let mut jars = Vec::new();
    for dir in ["lib", "jre/lib"] {
        let Ok(entries) = std::fs::read_dir(PathBuf::from(&home).join(dir)) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "jar") {
                jars.push(path);
            }
        }
    }
    jars.sort();
    jars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_name_matches_platform() {
        if cfg!(target_os = "windows") {
            assert_eq!(java_binary_name(), "java.exe");
        } else {
            assert_eq!(java_binary_name(), "java");
        }
    }
}
