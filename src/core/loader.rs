// ─── Ordered Loader ───
// Resource lookup across the assembled classpath with an explicit,
// configurable delegation order against a parent scope.

use tracing::debug;

use crate::core::archive::{Archive, ArchiveKind};
use crate::core::classpath::{Classpath, NESTED_CLASSES_PREFIXES};

/// Delegation order between the loader's own entries and its parent scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoaderPolicy {
    /// Consult the parent scope first, then own entries. The conventional
    /// default.
    #[default]
    ParentFirst,
    /// Consult own entries first so archive-root classes shadow copies
    /// visible through the parent (the `thin.parentLast` behavior).
    ChildFirst,
}

/// Anything a lookup can delegate to. Scopes compose; there is no
/// inheritance relationship between them.
pub trait ResourceScope {
    /// Location of the first match for `name`, or `None`.
    fn find_resource(&self, name: &str) -> Option<String>;
}

/// A scope with nothing in it. Used when the platform parent is opaque to
/// the launcher and lookups there cannot be answered locally.
pub struct EmptyScope;

impl ResourceScope for EmptyScope {
    fn find_resource(&self, _name: &str) -> Option<String> {
        None
    }
}

/// A scope backed by an ordered list of archives. First archive containing
/// the entry wins.
pub struct ArchiveScope {
    archives: Vec<Archive>,
}

impl ArchiveScope {
    pub fn new(archives: Vec<Archive>) -> Self {
        Self { archives }
    }

    fn locate(archive: &Archive, prefix: &str, name: &str) -> Option<String> {
        let entry = format!("{prefix}{name}");
        if !archive.contains_entry(&entry) {
            return None;
        }
        Some(match archive.kind() {
            ArchiveKind::Jar => format!("jar:{}!/{}", archive.url(), entry),
            ArchiveKind::Exploded => format!("{}{}", archive.url(), entry),
        })
    }
}

impl ResourceScope for ArchiveScope {
    fn find_resource(&self, name: &str) -> Option<String> {
        self.archives
            .iter()
            .find_map(|archive| Self::locate(archive, "", name))
    }
}

/// One searchable root: an archive, or a nested directory inside one.
enum LoaderRoot {
    Archive(Archive),
    Nested { archive: Archive, prefix: String },
}

impl LoaderRoot {
    fn find(&self, name: &str) -> Option<String> {
        match self {
            Self::Archive(archive) => ArchiveScope::locate(archive, "", name),
            Self::Nested { archive, prefix } => ArchiveScope::locate(archive, prefix, name),
        }
    }
}

/// The launcher's loader: the classpath entries in assembly order, a parent
/// scope, and a delegation policy. Lookups are deterministic; with a single
/// candidate the policy does not change the result.
pub struct OrderedLoader {
    roots: Vec<LoaderRoot>,
    parent: Box<dyn ResourceScope>,
    policy: LoaderPolicy,
}

impl OrderedLoader {
    /// Build from an assembled classpath. Nested `BOOT-INF/classes/` (or
    /// `classes/`) trees inside the primary archive become their own roots,
    /// appended after all resolved locations.
    pub fn new(classpath: &Classpath, parent: Box<dyn ResourceScope>, policy: LoaderPolicy) -> Self {
        let mut roots: Vec<LoaderRoot> = classpath
            .archives()
            .iter()
            .cloned()
            .map(LoaderRoot::Archive)
            .collect();
        for prefix in NESTED_CLASSES_PREFIXES {
            if classpath.primary().contains_entry_prefix(prefix) {
                debug!("Nested root: {}", prefix);
                roots.push(LoaderRoot::Nested {
                    archive: classpath.primary().clone(),
                    prefix: prefix.to_string(),
                });
            }
        }
        Self {
            roots,
            parent,
            policy,
        }
    }

    pub fn policy(&self) -> LoaderPolicy {
        self.policy
    }

    /// First match across own roots and the parent scope, in policy order.
    pub fn lookup_resource(&self, name: &str) -> Option<String> {
        match self.policy {
            LoaderPolicy::ParentFirst => self
                .parent
                .find_resource(name)
                .or_else(|| self.find_local(name)),
            LoaderPolicy::ChildFirst => self
                .find_local(name)
                .or_else(|| self.parent.find_resource(name)),
        }
    }

    fn find_local(&self, name: &str) -> Option<String> {
        self.roots.iter().find_map(|root| root.find(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("loader-test-{}-{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn exploded_with(dir: &Path, entries: &[&str]) -> Archive {
        for entry in entries {
            let path = dir.join(entry);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, b"x").unwrap();
        }
        Archive::open(dir).unwrap()
    }

    #[test]
    fn parent_first_prefers_parent_scope() {
        let temp = temp_dir("parent-first");
        let own = exploded_with(&temp.join("own"), &["config.yml"]);
        let parent = exploded_with(&temp.join("parent"), &["config.yml"]);

        let classpath = Classpath::new(own, vec![]);
        let loader = OrderedLoader::new(
            &classpath,
            Box::new(ArchiveScope::new(vec![parent.clone()])),
            LoaderPolicy::ParentFirst,
        );
        let location = loader.lookup_resource("config.yml").unwrap();
        assert!(location.contains("parent"));

        let _ = std::fs::remove_dir_all(&temp);
    }

    #[test]
    fn child_first_shadows_parent_scope() {
        let temp = temp_dir("child-first");
        let own = exploded_with(&temp.join("own"), &["config.yml"]);
        let parent = exploded_with(&temp.join("parent"), &["config.yml"]);

        let classpath = Classpath::new(own, vec![]);
        let loader = OrderedLoader::new(
            &classpath,
            Box::new(ArchiveScope::new(vec![parent.clone()])),
            LoaderPolicy::ChildFirst,
        );
        let location = loader.lookup_resource("config.yml").unwrap();
        assert!(location.contains("own"));

        let _ = std::fs::remove_dir_all(&temp);
    }

    #[test]
    fn single_candidate_is_policy_independent() {
        let temp = temp_dir("single");
        let own = exploded_with(&temp.join("own"), &["only-here.txt"]);

        let classpath = Classpath::new(own, vec![]);
        let parent_first = OrderedLoader::new(
            &classpath,
            Box::new(EmptyScope),
            LoaderPolicy::ParentFirst,
        );
        let child_first =
            OrderedLoader::new(&classpath, Box::new(EmptyScope), LoaderPolicy::ChildFirst);
        assert_eq!(
            parent_first.lookup_resource("only-here.txt"),
            child_first.lookup_resource("only-here.txt")
        );
        assert!(parent_first.lookup_resource("absent.txt").is_none());

        let _ = std::fs::remove_dir_all(&temp);
    }

    #[test]
    fn classpath_order_decides_among_own_roots() {
        let temp = temp_dir("own-order");
        let primary = exploded_with(&temp.join("app"), &["shared.txt"]);
        let dep = exploded_with(&temp.join("dep"), &["shared.txt", "dep-only.txt"]);

        let classpath = Classpath::new(primary, vec![dep]);
        let loader = OrderedLoader::new(&classpath, Box::new(EmptyScope), LoaderPolicy::default());
        assert!(loader.lookup_resource("shared.txt").unwrap().contains("app"));
        assert!(loader
            .lookup_resource("dep-only.txt")
            .unwrap()
            .contains("dep"));

        let _ = std::fs::remove_dir_all(&temp);
    }

    #[test]
    fn nested_classes_root_is_searched_last() {
        let temp = temp_dir("nested");
        let primary = exploded_with(
            &temp.join("app"),
            &["BOOT-INF/classes/app.properties"],
        );

        let classpath = Classpath::new(primary, vec![]);
        let loader = OrderedLoader::new(&classpath, Box::new(EmptyScope), LoaderPolicy::default());
        // Reachable bare, through the nested root.
        assert!(loader.lookup_resource("app.properties").is_some());

        let _ = std::fs::remove_dir_all(&temp);
    }
}
