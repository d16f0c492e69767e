// ─── Classpath Assembler ───
// Orchestrates locator resolution, descriptor merging and dependency
// resolution into one ordered archive sequence.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::core::archive::{Archive, ArchiveKind};
use crate::core::descriptor::{LaunchDescriptor, SearchLocation};
use crate::core::downloader::Downloader;
use crate::core::error::LauncherResult;
use crate::core::locator::Locator;
use crate::core::maven::{DependencyManagement, DependencyResolver};

/// Nested entry prefixes exposed as first-class classpath roots when present
/// inside the primary archive.
pub const NESTED_CLASSES_PREFIXES: [&str; 2] = ["BOOT-INF/classes/", "classes/"];

/// Platform-specific classpath separator: `;` on Windows, `:` elsewhere.
pub fn path_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

/// An assembled launch classpath.
///
/// Index 0 is always the primary archive, even when the same artifact also
/// appears among the resolved dependencies. The remainder preserves the
/// resolver's order, so identical inputs reproduce identical sequences.
#[derive(Debug, Clone)]
pub struct Classpath {
    entries: Vec<Archive>,
}

impl Classpath {
    pub fn new(primary: Archive, resolved: Vec<Archive>) -> Self {
        let mut entries = Vec::with_capacity(resolved.len() + 1);
        entries.push(primary);
        entries.extend(resolved);
        Self { entries }
    }

    pub fn primary(&self) -> &Archive {
        &self.entries[0]
    }

    pub fn archives(&self) -> &[Archive] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical paths of everything except the primary archive, joined by
    /// the platform separator. This is the `classpath` run-mode output: the
    /// whole dependency list, in order.
    pub fn dependency_string(&self) -> String {
        self.entries[1..]
            .iter()
            .map(|archive| archive.path().display().to_string())
            .collect::<Vec<_>>()
            .join(path_separator())
    }

    /// Every entry the spawned JVM should see, primary first, plus the
    /// primary's nested classes directory when it is exploded on disk.
    pub fn launch_entries(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .entries
            .iter()
            .map(|archive| archive.path().to_path_buf())
            .collect();
        if self.primary().kind() == ArchiveKind::Exploded {
            for prefix in NESTED_CLASSES_PREFIXES {
                let nested = self.primary().path().join(prefix.trim_end_matches('/'));
                if nested.is_dir() {
                    paths.push(nested);
                }
            }
        }
        paths
    }

    pub fn launch_string(&self) -> String {
        self.launch_entries()
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(path_separator())
    }
}

/// Assembles classpaths: loads the effective launch descriptor, merges the
/// parent archive's dependency management, and drives the injected
/// dependency resolver.
pub struct PathAssembler<'r> {
    resolver: &'r mut dyn DependencyResolver,
    downloader: Downloader,
    cache_root: PathBuf,
    locations: Option<Vec<String>>,
}

impl<'r> PathAssembler<'r> {
    pub fn new(resolver: &'r mut dyn DependencyResolver, cache_root: PathBuf) -> LauncherResult<Self> {
        Ok(Self {
            resolver,
            downloader: Downloader::new()?,
            cache_root,
            locations: None,
        })
    }

    /// Override the descriptor search locations (comma-split already done by
    /// the caller). Without this, the current directory is searched.
    pub fn with_locations(mut self, locations: Vec<String>) -> Self {
        self.locations = Some(locations);
        self
    }

    /// Descriptor search order: explicit locations (or the current
    /// directory) first, then the primary archive itself as the embedded
    /// default. Each location's `META-INF/` is searched too.
    pub fn search_locations(&self, primary: &Archive) -> Vec<SearchLocation> {
        let mut locations = Vec::new();
        match &self.locations {
            Some(configured) => {
                for location in configured {
                    locations.push(SearchLocation::Dir(PathBuf::from(location)));
                }
            }
            None => locations.push(SearchLocation::Dir(PathBuf::from("."))),
        }
        locations.push(SearchLocation::Archive(primary.clone()));
        locations
    }

    /// Assemble the ordered classpath for one launch.
    ///
    /// A missing descriptor is a valid empty dependency set: the result is
    /// then just the primary archive. A dependency that fails to resolve
    /// aborts the whole assembly; no partial classpath is ever returned.
    pub fn assemble(
        &mut self,
        parent_locator: Option<&str>,
        primary: &Archive,
        name: &str,
        profiles: &[String],
    ) -> LauncherResult<Classpath> {
        let mut management = DependencyManagement::empty();

        // 1. Parent archive supplies base dependency management.
        if let Some(raw) = parent_locator {
            let parent = Locator::parse(Some(raw))?.resolve(
                self.resolver,
                &self.downloader,
                &self.cache_root,
            )?;
            let parent_descriptor = LaunchDescriptor::load(
                name,
                profiles,
                &[SearchLocation::Archive(parent.clone())],
            );
            debug!("Parent archive: {:?}", parent.path());
            management.merge_base(&DependencyManagement::from_descriptor(&parent_descriptor)?);
        }

        // 2. Effective descriptor, first-defined-wins across the search order.
        let locations = self.search_locations(primary);
        let descriptor = LaunchDescriptor::load(name, profiles, &locations);
        let mut own = DependencyManagement::from_descriptor(&descriptor)?;
        own.merge_base(&management);

        if let Some(repositories) = descriptor.repositories() {
            debug!("Repository override: {:?}", repositories);
            self.resolver.use_repositories(repositories);
        }

        // 3. The resolver's output is authoritative; version conflicts are
        // its business, not ours.
        let declared = descriptor.dependencies();
        let resolved = if declared.is_empty() {
            info!("No dependencies declared for {:?}", name);
            Vec::new()
        } else {
            self.resolver
                .resolve(&declared, &own, &self.cache_root)?
        };

        for archive in &resolved {
            debug!("Archive: {:?}", archive.path());
        }

        // 4. Primary pinned at index 0, never de-duplicated against the
        // resolved set.
        Ok(Classpath::new(primary.clone(), resolved))
    }
}
