use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, warn};

use super::artifact::MavenArtifact;
use super::pom::Pom;
use crate::core::archive::Archive;
use crate::core::descriptor::LaunchDescriptor;
use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};

/// Version pins and exclusions applied during resolution. Built from the
/// parent archive's descriptor (base) merged with the launch's own
/// descriptor, the launch's entries winning.
#[derive(Debug, Clone, Default)]
pub struct DependencyManagement {
    versions: HashMap<String, String>,
    exclusions: HashSet<String>,
}

impl DependencyManagement {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read `managed.*` and `exclusions.*` entries from a descriptor.
    pub fn from_descriptor(descriptor: &LaunchDescriptor) -> LauncherResult<Self> {
        let mut management = Self::empty();
        for coord in descriptor.managed() {
            let artifact: MavenArtifact = coord.parse()?;
            if !artifact.is_pinned() {
                return Err(LauncherError::InvalidMavenCoordinate(format!(
                    "{coord} (managed coordinates must carry a version)"
                )));
            }
            management
                .versions
                .insert(artifact.unversioned_key(), artifact.version);
        }
        for key in descriptor.exclusions() {
            management.exclusions.insert(key.trim().to_string());
        }
        Ok(management)
    }

    /// Fill gaps from a base context (parent archive). Existing pins and
    /// exclusions of `self` are kept.
    pub fn merge_base(&mut self, base: &Self) {
        for (key, version) in &base.versions {
            self.versions
                .entry(key.clone())
                .or_insert_with(|| version.clone());
        }
        self.exclusions.extend(base.exclusions.iter().cloned());
    }

    pub fn version_for(&self, key: &str) -> Option<&str> {
        self.versions.get(key).map(String::as_str)
    }

    pub fn is_excluded(&self, key: &str) -> bool {
        self.exclusions.contains(key)
    }

    /// Parse a declared coordinate, supplying the managed version when the
    /// coordinate itself carries none.
    pub fn pin(&self, coord: &str) -> LauncherResult<MavenArtifact> {
        let artifact: MavenArtifact = coord.parse()?;
        if artifact.is_pinned() {
            return Ok(artifact);
        }
        match self.version_for(&artifact.unversioned_key()) {
            Some(version) => Ok(artifact.pinned_to(version)),
            None => Err(LauncherError::InvalidMavenCoordinate(format!(
                "{coord} (no version declared and none managed)"
            ))),
        }
    }
}

/// The dependency-graph resolution capability, injectable so launches can be
/// driven by a fake in tests or replaced wholesale by an embedder.
///
/// Implementations own transitive closure and version selection; callers
/// treat the returned archive list as authoritative and never post-process
/// it beyond ordering guarantees of their own.
pub trait DependencyResolver {
    /// Resolve the declared coordinate set into a flat, de-duplicated,
    /// transitively-closed list of cached archives.
    fn resolve(
        &mut self,
        declared: &[String],
        management: &DependencyManagement,
        cache_root: &Path,
    ) -> LauncherResult<Vec<Archive>>;

    /// Fetch a single artifact into the cache, without walking its
    /// dependencies. Used by `maven://` locators.
    fn fetch_artifact(
        &mut self,
        artifact: &MavenArtifact,
        cache_root: &Path,
    ) -> LauncherResult<Archive>;

    /// Apply the `repositories` override from the effective descriptor.
    /// Implementations without a repository concept ignore the call.
    fn use_repositories(&mut self, _repositories: Vec<String>) {}
}

/// Default resolver: walks POMs transitively over HTTP, mirroring artifacts
/// into a local repository-layout cache. No version mediation: the first
/// version encountered for a `group:artifact` wins, and a file already
/// present in the cache is never re-fetched.
pub struct MavenResolver {
    repositories: Vec<String>,
    downloader: Downloader,
    /// `group:artifact` keys already placed on the classpath this session.
    visited: HashSet<String>,
}

impl MavenResolver {
    pub fn new(repositories: Vec<String>) -> LauncherResult<Self> {
        Ok(Self {
            repositories,
            downloader: Downloader::new()?,
            visited: HashSet::new(),
        })
    }

    fn resolve_artifact(
        &mut self,
        artifact: &MavenArtifact,
        management: &DependencyManagement,
        inherited_exclusions: &HashSet<String>,
        cache_root: &Path,
        collected: &mut Vec<Archive>,
    ) -> LauncherResult<()> {
        let key = artifact.unversioned_key();
        if !self.visited.insert(key.clone()) {
            return Ok(());
        }

        // 1. The artifact file itself. A declared or transitive dependency
        // that exists in no repository is fatal: a partial classpath would
        // silently change application behavior.
        if !artifact.is_pom() {
            let dest = cache_root.join(artifact.repository_path());
            self.try_download(artifact, &dest)?;
            collected.push(Archive::open(&dest)?);
        }

        // 2. The POM, for transitive dependencies. Absence is non-fatal:
        // plenty of leaf artifacts publish no usable POM.
        let pom_artifact = artifact.with_packaging("pom");
        let pom_dest = cache_root.join(pom_artifact.repository_path());
        if !pom_dest.exists() {
            if let Err(e) = self.try_download(&pom_artifact, &pom_dest) {
                debug!("No POM for {}: {}", artifact, e);
                return Ok(());
            }
        }

        let pom_text = std::fs::read_to_string(&pom_dest).map_err(|e| LauncherError::Io {
            path: pom_dest.clone(),
            source: e,
        })?;
        let pom = match Pom::parse(&pom_text) {
            Ok(pom) => pom,
            Err(e) => {
                warn!("Unparsable POM for {} (treating as leaf): {}", artifact, e);
                return Ok(());
            }
        };

        // 3. Walk classpath-scope dependencies in declaration order.
        for dep in pom.classpath_dependencies() {
            let dep_key = format!("{}:{}", dep.group_id, dep.artifact_id);
            if management.is_excluded(&dep_key) || inherited_exclusions.contains(&dep_key) {
                debug!("Excluded: {}", dep_key);
                continue;
            }

            let version = management
                .version_for(&dep_key)
                .map(str::to_string)
                .or_else(|| dep.version.clone())
                .or_else(|| pom.managed_version(&dep.group_id, &dep.artifact_id));
            let Some(version) = version else {
                warn!("Cannot determine version for {} (skipping)", dep_key);
                continue;
            };

            let child = MavenArtifact {
                group_id: dep.group_id.clone(),
                artifact_id: dep.artifact_id.clone(),
                version,
                classifier: dep.classifier.clone(),
                packaging: dep.dep_type.clone().unwrap_or_else(|| "jar".to_string()),
            };

            // Exclusions declared on this edge shadow the whole subtree.
            let mut subtree_exclusions = inherited_exclusions.clone();
            subtree_exclusions.extend(dep.exclusion_keys());

            self.resolve_artifact(
                &child,
                management,
                &subtree_exclusions,
                cache_root,
                collected,
            )?;
        }

        Ok(())
    }

    /// Try each repository in order until one succeeds. When all fail the
    /// error distinguishes "nowhere to be found" from transport trouble.
    fn try_download(&self, artifact: &MavenArtifact, dest: &Path) -> LauncherResult<()> {
        if dest.exists() {
            return Ok(());
        }
        if self.repositories.is_empty() {
            return Err(LauncherError::NotFound(format!(
                "{artifact}: no repositories configured"
            )));
        }

        let mut last_err: Option<LauncherError> = None;
        let mut all_not_found = true;
        for repo in &self.repositories {
            let url = artifact.url(repo);
            // Repositories publish a `.sha1` sidecar next to each artifact;
            // when present the body is validated against it before caching.
            let checksum = self.downloader.fetch_checksum(&url);
            match self.downloader.download_file(&url, dest, checksum.as_deref()) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    debug!("Repository {} failed for {}: {}", repo, artifact, e);
                    all_not_found &= e.is_not_found();
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) if !all_not_found => Err(e),
            _ => Err(LauncherError::NotFound(format!(
                "artifact {} in {:?}",
                artifact, self.repositories
            ))),
        }
    }
}

impl DependencyResolver for MavenResolver {
    fn resolve(
        &mut self,
        declared: &[String],
        management: &DependencyManagement,
        cache_root: &Path,
    ) -> LauncherResult<Vec<Archive>> {
        self.visited.clear();
        let mut collected = Vec::new();
        let no_exclusions = HashSet::new();
        for coord in declared {
            let artifact = management.pin(coord)?;
            if management.is_excluded(&artifact.unversioned_key()) {
                debug!("Excluded declared dependency: {}", coord);
                continue;
            }
            self.resolve_artifact(
                &artifact,
                management,
                &no_exclusions,
                cache_root,
                &mut collected,
            )?;
        }
        Ok(collected)
    }

    fn fetch_artifact(
        &mut self,
        artifact: &MavenArtifact,
        cache_root: &Path,
    ) -> LauncherResult<Archive> {
        let dest = cache_root.join(artifact.repository_path());
        self.try_download(artifact, &dest)?;
        Archive::open(&dest)
    }

    fn use_repositories(&mut self, repositories: Vec<String>) {
        if !repositories.is_empty() {
            self.repositories = repositories;
        }
    }
}
