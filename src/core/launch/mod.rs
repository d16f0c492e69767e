// ─── Launch Controller ───
// Ties everything together: configuration in, resolved classpath out, then
// one of three run modes (classpath print, dry run, execute).

pub mod task;

use std::path::PathBuf;

use tracing::{debug, info};

use crate::core::archive::Archive;
use crate::core::classpath::{Classpath, PathAssembler};
use crate::core::config::{
    self, Config, THIN_ARCHIVE, THIN_CLASSPATH, THIN_DRYRUN, THIN_MAIN, THIN_PARENT,
    THIN_PARENT_LAST, THIN_USE_BOOT_LOADER,
};
use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::java;
use crate::core::loader::{ArchiveScope, EmptyScope, LoaderPolicy, OrderedLoader, ResourceScope};
use crate::core::locator::Locator;
use crate::core::maven::{default_repositories, MavenResolver};

/// What a launch should actually do once the classpath exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Print the dependency classpath to stdout and exit.
    Classpath,
    /// Resolve everything (warming the cache) but do not execute.
    DryRun,
    /// Resolve and run the application in a spawned JVM.
    Execute,
}

/// One launch: immutable configuration plus the raw argument vector, driven
/// to completion by `run`.
pub struct Launcher {
    config: Config,
    args: Vec<String>,
}

impl Launcher {
    pub fn new(config: Config, args: Vec<String>) -> Self {
        Self { config, args }
    }

    /// Which mode this launch runs in. `classpath` beats `dryrun` when both
    /// flags are set.
    pub fn run_mode(&self) -> LauncherResult<RunMode> {
        if self.config.get_flag(THIN_CLASSPATH)? {
            return Ok(RunMode::Classpath);
        }
        if self.config.get_flag(THIN_DRYRUN)? {
            return Ok(RunMode::DryRun);
        }
        Ok(RunMode::Execute)
    }

    /// Run to completion. Returns the process exit code to report: `0` for
    /// the non-executing modes, the child JVM's code for `Execute`.
    pub fn run(&self) -> LauncherResult<i32> {
        // Flag problems should surface before any resolution work starts.
        let mode = self.run_mode()?;
        let cache_root = self.config.cache_root();
        let name = self.config.name();
        let profiles = self.config.profiles();
        debug!(
            "Launching: name={:?} profiles={:?} cache={:?}",
            name, profiles, cache_root
        );

        let primary = self.locate_primary(&cache_root)?;
        debug!("Primary archive: {:?}", primary.path());

        // The assembler swaps in the descriptor's `repositories` override
        // once it has loaded the effective descriptor.
        let mut resolver = MavenResolver::new(default_repositories())?;

        let mut assembler = PathAssembler::new(&mut resolver, cache_root.clone())?;
        if let Some(locations) = self.config.locations() {
            assembler = assembler.with_locations(locations);
        }
        let parent_locator = self.config.get(THIN_PARENT);
        let classpath =
            assembler.assemble(parent_locator.as_deref(), &primary, &name, &profiles)?;
        info!("Classpath assembled: {} entries", classpath.len());

        match mode {
            RunMode::Classpath => {
                println!("{}", classpath.dependency_string());
                Ok(0)
            }
            RunMode::DryRun => {
                info!("Downloaded dependencies to {:?}", cache_root);
                Ok(0)
            }
            RunMode::Execute => self.execute(&classpath),
        }
    }

    /// Resolve the primary archive from `thin.archive`, defaulting to the
    /// current directory treated as an exploded archive.
    fn locate_primary(&self, cache_root: &std::path::Path) -> LauncherResult<Archive> {
        let raw = self.config.get(THIN_ARCHIVE);
        let locator = Locator::parse(raw.as_deref())?;
        // Locator-level fetches always use the default repository set; the
        // descriptor that could override it lives inside the archive being
        // located.
        let mut resolver = MavenResolver::new(default_repositories())?;
        let downloader = Downloader::new()?;
        locator.resolve(&mut resolver, &downloader, cache_root)
    }

    /// Loader for this launch: delegation policy from `thin.parentLast`,
    /// parent scope from `thin.useBootLoader`.
    pub fn build_loader(&self, classpath: &Classpath) -> LauncherResult<OrderedLoader> {
        let policy = if self.config.get_flag(THIN_PARENT_LAST)? {
            LoaderPolicy::ChildFirst
        } else {
            LoaderPolicy::ParentFirst
        };
        let parent = self.parent_scope()?;
        Ok(OrderedLoader::new(classpath, parent, policy))
    }

    /// The parent scope. With `thin.useBootLoader` (the default) the parent
    /// is the platform runtime, modelled by the jars under `JAVA_HOME`.
    /// Disabled, the parent is whatever `CLASSPATH` names.
    fn parent_scope(&self) -> LauncherResult<Box<dyn ResourceScope>> {
        let use_boot = self.config.get_flag_or(THIN_USE_BOOT_LOADER, true)?;
        let paths: Vec<PathBuf> = if use_boot {
            java::runtime_jars()
        } else {
            std::env::var("CLASSPATH")
                .map(|raw| {
                    std::env::split_paths(&raw)
                        .filter(|p| !p.as_os_str().is_empty())
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut archives = Vec::new();
        for path in paths {
            match Archive::open(&path) {
                Ok(archive) => archives.push(archive),
                Err(e) => debug!("Skipping parent entry {:?}: {}", path, e),
            }
        }
        if archives.is_empty() {
            Ok(Box::new(EmptyScope))
        } else {
            Ok(Box::new(ArchiveScope::new(archives)))
        }
    }

    /// Entry point for execution: an explicit `thin.main` override wins,
    /// otherwise the primary archive's manifest decides.
    pub fn entry_point(&self, classpath: &Classpath) -> LauncherResult<String> {
        if let Some(main) = self.config.get(THIN_MAIN) {
            return Ok(main);
        }
        classpath.primary().main_class()?.ok_or_else(|| {
            LauncherError::EntryPointNotFound(format!(
                "no Start-Class or Main-Class in {:?} and no override given",
                classpath.primary().path()
            ))
        })
    }

    fn execute(&self, classpath: &Classpath) -> LauncherResult<i32> {
        let main_class = self.entry_point(classpath)?;
        let loader = self.build_loader(classpath)?;
        let class_entry = format!("{}.class", main_class.replace('.', "/"));
        match loader.lookup_resource(&class_entry) {
            Some(location) => debug!("Entry point {} at {}", main_class, location),
            None => debug!(
                "Entry point {} not visible before launch; the JVM has the last word",
                main_class
            ),
        }

        let app_args = config::strip_launcher_args(&self.args);
        task::launch(classpath, &main_class, &app_args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classpath_mode_beats_dryrun() {
        let config = Config::from_args(&["--thin.classpath", "--thin.dryrun"]);
        let launcher = Launcher::new(config, vec![]);
        assert_eq!(launcher.run_mode().unwrap(), RunMode::Classpath);
    }

    #[test]
    fn default_mode_is_execute() {
        let launcher = Launcher::new(Config::default(), vec![]);
        assert_eq!(launcher.run_mode().unwrap(), RunMode::Execute);
    }

    #[test]
    fn main_override_beats_manifest() {
        let temp = std::env::temp_dir().join(format!("launch-main-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&temp);
        std::fs::create_dir_all(temp.join("META-INF")).unwrap();
        std::fs::write(
            temp.join("META-INF/MANIFEST.MF"),
            "Main-Class: com.example.FromManifest\r\n",
        )
        .unwrap();

        let primary = Archive::open(&temp).unwrap();
        let classpath = Classpath::new(primary, vec![]);

        let launcher = Launcher::new(
            Config::from_args(&["--thin.main=com.example.Override"]),
            vec![],
        );
        assert_eq!(
            launcher.entry_point(&classpath).unwrap(),
            "com.example.Override"
        );

        let launcher = Launcher::new(Config::default(), vec![]);
        assert_eq!(
            launcher.entry_point(&classpath).unwrap(),
            "com.example.FromManifest"
        );

        let _ = std::fs::remove_dir_all(&temp);
    }

    #[test]
    fn missing_entry_point_is_reported() {
        let temp = std::env::temp_dir().join(format!("launch-nomain-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&temp);
        std::fs::create_dir_all(&temp).unwrap();

        let primary = Archive::open(&temp).unwrap();
        let classpath = Classpath::new(primary, vec![]);
        let launcher = Launcher::new(Config::default(), vec![]);
        let err = launcher.entry_point(&classpath).unwrap_err();
        assert!(matches!(err, LauncherError::EntryPointNotFound(_)));

        let _ = std::fs::remove_dir_all(&temp);
    }

    #[test]
    fn parent_last_flag_flips_policy() {
        let temp = std::env::temp_dir().join(format!("launch-policy-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&temp);
        std::fs::create_dir_all(&temp).unwrap();
        let classpath = Classpath::new(Archive::open(&temp).unwrap(), vec![]);

        let launcher = Launcher::new(Config::from_args(&["--thin.parentLast"]), vec![]);
        assert_eq!(
            launcher.build_loader(&classpath).unwrap().policy(),
            LoaderPolicy::ChildFirst
        );

        let launcher = Launcher::new(Config::default(), vec![]);
        assert_eq!(
            launcher.build_loader(&classpath).unwrap().policy(),
            LoaderPolicy::ParentFirst
        );

        let _ = std::fs::remove_dir_all(&temp);
    }
}
