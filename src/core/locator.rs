// ─── Locator Resolver ───
// Turns a symbolic archive reference (path, URL, maven:// coordinate, or
// nothing at all) into a concrete opened Archive.

use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};
use tracing::debug;

use crate::core::archive::Archive;
use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::maven::{DependencyResolver, MavenArtifact};

/// Scheme prefix for repository-coordinate locators.
pub const MAVEN_SCHEME: &str = "maven://";

/// A parsed archive locator. Immutable; resolves to exactly one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// No locator given: the archive this launch runs against, which for a
    /// standalone launcher is the current working directory opened as an
    /// exploded archive.
    SelfArchive,
    File(PathBuf),
    Url(String),
    Coordinate(MavenArtifact),
}

impl Locator {
    /// Classify a raw locator string. `None` or empty means self-locate.
    pub fn parse(raw: Option<&str>) -> LauncherResult<Self> {
        let raw = match raw {
            None => return Ok(Self::SelfArchive),
            Some(raw) if raw.trim().is_empty() => return Ok(Self::SelfArchive),
            Some(raw) => raw.trim(),
        };

        if let Some(coord) = raw.strip_prefix(MAVEN_SCHEME) {
            let artifact: MavenArtifact = coord
                .parse()
                .map_err(|_| LauncherError::Locator(raw.to_string()))?;
            if !artifact.is_pinned() {
                return Err(LauncherError::Locator(format!(
                    "{raw} (coordinate locators must carry a version)"
                )));
            }
            return Ok(Self::Coordinate(artifact));
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(Self::Url(raw.to_string()));
        }
        if let Some(path) = raw.strip_prefix("file:") {
            return Ok(Self::File(PathBuf::from(path)));
        }
        if raw.contains("://") {
            return Err(LauncherError::Locator(raw.to_string()));
        }
        Ok(Self::File(PathBuf::from(raw)))
    }

    /// Resolve to an opened archive.
    ///
    /// URL locators are fetched into `<cache_root>/urlcache/<sha1-of-url>/`,
    /// and a cached copy is trusted once written: staleness is
    /// presence-based, never time-based. Coordinate locators delegate to the
    /// dependency resolver's single-artifact path. Nothing in any cache is
    /// ever deleted or mutated here.
    pub fn resolve(
        &self,
        resolver: &mut dyn DependencyResolver,
        downloader: &Downloader,
        cache_root: &Path,
    ) -> LauncherResult<Archive> {
        match self {
            Self::SelfArchive => {
                let cwd = std::env::current_dir().map_err(|e| LauncherError::Io {
                    path: PathBuf::from("."),
                    source: e,
                })?;
                Archive::open(&cwd)
            }
            Self::File(path) => Archive::open(path),
            Self::Coordinate(artifact) => resolver.fetch_artifact(artifact, cache_root),
            Self::Url(url) => {
                let dest = url_cache_path(cache_root, url);
                downloader.download_file(url, &dest, None)?;
                debug!("URL locator {} -> {:?}", url, dest);
                Archive::open(&dest)
            }
        }
    }
}

/// Cache destination for a URL locator, keyed by the SHA-1 of the URL
/// string so distinct URLs with the same file name never collide.
fn url_cache_path(cache_root: &Path, url: &str) -> PathBuf {
    let mut hasher = Sha1::new();
    hasher.update(url.as_bytes());
    let key = hex::encode(hasher.finalize());

    let filename = url
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && !name.contains('?'))
        .unwrap_or("download.jar");

    cache_root.join("urlcache").join(key).join(filename)
}
