// ─── Archive ───
// An opened, read-only bundle of entries: either a jar/zip file or an
// exploded directory. Canonical location fixed at open time.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::core::error::{LauncherError, LauncherResult};

const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// A jar/zip file on disk.
    Jar,
    /// A directory laid out like an extracted archive.
    Exploded,
}

/// An opened archive. Read-only for the lifetime of the process; the path
/// is canonicalized once so classpath entries and printed output are stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    path: PathBuf,
    kind: ArchiveKind,
}

impl Archive {
    /// Open a path as an archive. Regular files are treated as jars,
    /// directories as exploded archives. A missing path is a `NotFound`.
    pub fn open(path: &Path) -> LauncherResult<Self> {
        if !path.exists() {
            return Err(LauncherError::NotFound(format!(
                "archive {}",
                path.display()
            )));
        }
        let canonical = std::fs::canonicalize(path).map_err(|e| LauncherError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let kind = if canonical.is_dir() {
            ArchiveKind::Exploded
        } else {
            ArchiveKind::Jar
        };
        Ok(Self {
            path: canonical,
            kind,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ArchiveKind {
        self.kind
    }

    /// `file:` URL of the archive root.
    pub fn url(&self) -> String {
        match self.kind {
            ArchiveKind::Jar => format!("file:{}", self.path.display()),
            ArchiveKind::Exploded => format!("file:{}/", self.path.display()),
        }
    }

    /// Whether a named entry exists (slash-separated, relative).
    pub fn contains_entry(&self, name: &str) -> bool {
        match self.kind {
            ArchiveKind::Exploded => self.path.join(name).exists(),
            ArchiveKind::Jar => match self.zip_entries() {
                Ok(names) => {
                    let dir = format!("{}/", name.trim_end_matches('/'));
                    names.iter().any(|n| n == name || n == &dir)
                }
                Err(_) => false,
            },
        }
    }

    /// Whether any entry lives under the given prefix (e.g. `BOOT-INF/classes/`).
    pub fn contains_entry_prefix(&self, prefix: &str) -> bool {
        match self.kind {
            ArchiveKind::Exploded => self.path.join(prefix).is_dir(),
            ArchiveKind::Jar => match self.zip_entries() {
                Ok(names) => names.iter().any(|n| n.starts_with(prefix)),
                Err(_) => false,
            },
        }
    }

    /// Read a named entry fully into memory. `Ok(None)` when absent.
    pub fn read_entry(&self, name: &str) -> LauncherResult<Option<Vec<u8>>> {
        match self.kind {
            ArchiveKind::Exploded => {
                let file = self.path.join(name);
                if !file.is_file() {
                    return Ok(None);
                }
                let bytes = std::fs::read(&file).map_err(|e| LauncherError::Io {
                    path: file,
                    source: e,
                })?;
                Ok(Some(bytes))
            }
            ArchiveKind::Jar => {
                let file = File::open(&self.path).map_err(|e| LauncherError::Io {
                    path: self.path.clone(),
                    source: e,
                })?;
                let mut zip = ZipArchive::new(file)?;
                let mut entry = match zip.by_name(name) {
                    Ok(entry) => entry,
                    Err(zip::result::ZipError::FileNotFound) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                std::io::copy(&mut entry, &mut bytes).map_err(|e| LauncherError::Io {
                    path: self.path.clone(),
                    source: e,
                })?;
                Ok(Some(bytes))
            }
        }
    }

    /// Main class declared by the archive manifest: `Start-Class` (thin
    /// executable archives) wins over plain `Main-Class`.
    pub fn main_class(&self) -> LauncherResult<Option<String>> {
        let Some(bytes) = self.read_entry(MANIFEST_PATH)? else {
            return Ok(None);
        };
        let manifest = parse_manifest(&String::from_utf8_lossy(&bytes));
        Ok(manifest
            .get("Start-Class")
            .or_else(|| manifest.get("Main-Class"))
            .cloned())
    }

    fn zip_entries(&self) -> LauncherResult<Vec<String>> {
        let file = File::open(&self.path).map_err(|e| LauncherError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        let zip = ZipArchive::new(file)?;
        Ok(zip.file_names().map(str::to_string).collect())
    }
}

/// Parse a JAR manifest: `Key: Value` lines, with lines starting with a
/// single space continuing the previous value.
fn parse_manifest(text: &str) -> HashMap<String, String> {
    let mut attributes: HashMap<String, String> = HashMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(continuation) = line.strip_prefix(' ') {
            if let Some(key) = &current {
                if let Some(value) = attributes.get_mut(key) {
                    value.push_str(continuation);
                }
            }
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_string();
            attributes.insert(key.clone(), value.trim().to_string());
            current = Some(key);
        }
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("archive-test-{}-{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, bytes) in entries {
            writer.start_file(*name, options).unwrap();
            std::io::Write::write_all(&mut writer, bytes).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn open_missing_path_is_not_found() {
        let err = Archive::open(Path::new("/nonexistent/app.jar")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn exploded_directory_entries() {
        let dir = temp_dir("exploded");
        std::fs::create_dir_all(dir.join("META-INF")).unwrap();
        std::fs::write(
            dir.join("META-INF/MANIFEST.MF"),
            "Manifest-Version: 1.0\r\nMain-Class: com.example.App\r\n",
        )
        .unwrap();

        let archive = Archive::open(&dir).unwrap();
        assert_eq!(archive.kind(), ArchiveKind::Exploded);
        assert!(archive.contains_entry("META-INF/MANIFEST.MF"));
        assert!(!archive.contains_entry("missing.txt"));
        assert_eq!(
            archive.main_class().unwrap().as_deref(),
            Some("com.example.App")
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn jar_entries_and_start_class_priority() {
        let dir = temp_dir("jar");
        let jar = dir.join("app.jar");
        write_jar(
            &jar,
            &[(
                "META-INF/MANIFEST.MF",
                b"Manifest-Version: 1.0\r\nMain-Class: org.loader.Wrapper\r\nStart-Class: com.example.App\r\n" as &[u8],
            ),
            ("BOOT-INF/classes/application.properties", b"k=v")],
        );

        let archive = Archive::open(&jar).unwrap();
        assert_eq!(archive.kind(), ArchiveKind::Jar);
        assert!(archive.contains_entry_prefix("BOOT-INF/classes/"));
        assert_eq!(
            archive.main_class().unwrap().as_deref(),
            Some("com.example.App")
        );
        assert_eq!(
            archive
                .read_entry("BOOT-INF/classes/application.properties")
                .unwrap()
                .as_deref(),
            Some(b"k=v" as &[u8])
        );
        assert_eq!(archive.read_entry("absent").unwrap(), None);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn manifest_continuation_lines() {
        let manifest = parse_manifest(
            "Manifest-Version: 1.0\r\nStart-Class: com.example.averylong\r\n .package.App\r\n",
        );
        assert_eq!(
            manifest.get("Start-Class").map(String::as_str),
            Some("com.example.averylong.package.App")
        );
    }
}
