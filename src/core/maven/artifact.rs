use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{LauncherError, LauncherResult};

/// A fully parsed repository coordinate.
///
/// Accepted forms:
///   `groupId:artifactId:version`
///   `groupId:artifactId:version:classifier`
///   `groupId:artifactId:version:classifier@packaging`
///   `groupId:artifactId:version@packaging`
///
/// A two-segment `groupId:artifactId` form is also parsed, with the version
/// left empty; such a coordinate must be pinned against a dependency
/// management context before it can be located in a repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MavenArtifact {
    pub group_id: String,
    pub artifact_id: String,
    /// Empty until pinned for two-segment coordinates.
    pub version: String,
    pub classifier: Option<String>,
    /// File extension / packaging type. Defaults to `"jar"`.
    pub packaging: String,
}

impl MavenArtifact {
    /// `group:artifact` pair, the identity used for management lookups,
    /// exclusion matching and de-duplication.
    pub fn unversioned_key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// Whether a concrete version is known yet.
    pub fn is_pinned(&self) -> bool {
        !self.version.is_empty()
    }

    /// Same coordinate with a concrete version.
    pub fn pinned_to(&self, version: &str) -> Self {
        let mut pinned = self.clone();
        pinned.version = version.to_string();
        pinned
    }

    /// Same coordinate with different packaging (e.g. `"pom"`).
    pub fn with_packaging(&self, packaging: &str) -> Self {
        let mut changed = self.clone();
        changed.packaging = packaging.to_string();
        changed
    }

    pub fn is_pom(&self) -> bool {
        self.packaging == "pom"
    }

    /// Group segment as a repository path (`com/example/lib`).
    pub fn group_path(&self) -> String {
        self.group_id.replace('.', "/")
    }

    /// `artifactId-version[-classifier].packaging`
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, c, self.packaging
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.packaging),
        }
    }

    /// Path of this artifact relative to a repository root, mirroring the
    /// standard layout: `<group_path>/<artifact_id>/<version>/<filename>`.
    pub fn repository_path(&self) -> PathBuf {
        PathBuf::from(self.group_path())
            .join(&self.artifact_id)
            .join(&self.version)
            .join(self.filename())
    }

    /// Full download URL under the given repository base.
    pub fn url(&self, repo_base: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            repo_base.trim_end_matches('/'),
            self.group_path(),
            self.artifact_id,
            self.version,
            self.filename()
        )
    }
}

impl FromStr for MavenArtifact {
    type Err = LauncherError;

    fn from_str(coord: &str) -> LauncherResult<Self> {
        // Split off @packaging first.
        let (coord_part, packaging) = match coord.rsplit_once('@') {
            Some((left, right)) if !right.is_empty() => (left, right),
            _ => (coord, "jar"),
        };

        let parts: Vec<&str> = coord_part.split(':').map(str::trim).collect();
        if parts.iter().take(2).any(|p| p.is_empty()) {
            return Err(LauncherError::InvalidMavenCoordinate(coord.to_string()));
        }

        let (version, classifier) = match parts.len() {
            2 => (String::new(), None),
            3 => (parts[2].to_string(), None),
            4 => (parts[2].to_string(), Some(parts[3].to_string())),
            _ => return Err(LauncherError::InvalidMavenCoordinate(coord.to_string())),
        };

        Ok(Self {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            version,
            classifier,
            packaging: packaging.to_string(),
        })
    }
}

impl fmt::Display for MavenArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if self.is_pinned() {
            write!(f, ":{}", self.version)?;
        }
        if let Some(c) = &self.classifier {
            write!(f, ":{c}")?;
        }
        if self.packaging != "jar" {
            write!(f, "@{}", self.packaging)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_three_segment_coordinate() {
        let a: MavenArtifact = "com.google.guava:guava:33.0.0-jre".parse().unwrap();
        assert_eq!(a.group_id, "com.google.guava");
        assert_eq!(a.artifact_id, "guava");
        assert_eq!(a.version, "33.0.0-jre");
        assert_eq!(a.classifier, None);
        assert_eq!(a.packaging, "jar");
        assert!(a.is_pinned());
    }

    #[test]
    fn parse_classifier_and_packaging() {
        let a: MavenArtifact = "org.lwjgl:lwjgl:3.3.3:natives-linux@zip".parse().unwrap();
        assert_eq!(a.classifier.as_deref(), Some("natives-linux"));
        assert_eq!(a.packaging, "zip");
    }

    #[test]
    fn parse_unpinned_coordinate() {
        let a: MavenArtifact = "com.example:lib".parse().unwrap();
        assert!(!a.is_pinned());
        assert!(a.pinned_to("2.1").is_pinned());
        assert_eq!(a.unversioned_key(), "com.example:lib");
    }

    #[test]
    fn reject_garbage() {
        assert!("".parse::<MavenArtifact>().is_err());
        assert!("only-one-segment".parse::<MavenArtifact>().is_err());
        assert!("a:b:c:d:e".parse::<MavenArtifact>().is_err());
    }

    #[test]
    fn repository_path_mirrors_standard_layout() {
        let a: MavenArtifact = "com.example.app:demo:1.0.2".parse().unwrap();
        assert_eq!(
            a.repository_path(),
            PathBuf::from("com/example/app/demo/1.0.2/demo-1.0.2.jar")
        );
    }

    #[test]
    fn url_construction() {
        let a: MavenArtifact = "com.example:demo:1.0".parse().unwrap();
        assert_eq!(
            a.url("https://repo1.maven.org/maven2/"),
            "https://repo1.maven.org/maven2/com/example/demo/1.0/demo-1.0.jar"
        );
    }

    #[test]
    fn display_roundtrip() {
        for coord in ["com.example:demo:1.0", "g:a:1:linux@zip", "g:a:1@pom"] {
            let a: MavenArtifact = coord.parse().unwrap();
            assert_eq!(a.to_string(), coord);
        }
    }
}
