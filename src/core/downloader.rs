use std::io::Write;
use std::path::Path;

use reqwest::blocking::Client;
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;

/// Blocking, SHA-1 validated downloader.
///
/// Downloads are idempotent: a destination file that already exists is
/// trusted and never re-fetched or mutated, so the cache it writes into is
/// append-only.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new() -> LauncherResult<Self> {
        let client = build_http_client()?;
        Ok(Self { client })
    }

    /// Download a single file to `dest`, optionally validating SHA-1.
    ///
    /// Creates parent directories as needed. If `dest` already exists the
    /// cached copy is reused and no request is made.
    pub fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
    ) -> LauncherResult<()> {
        if dest.exists() {
            debug!("Cached: {:?}", dest);
            return Ok(());
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LauncherError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes()?;

        // Validate before writing so a bad body never lands in the cache.
        check_integrity(&bytes, sha1_expected, dest)?;

        {
            let mut file = std::fs::File::create(dest).map_err(|e| LauncherError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;
            file.write_all(&bytes).map_err(|e| LauncherError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;
            file.flush().map_err(|e| LauncherError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;
            // handle must close here so the cached file is readable on Windows
        }

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }

    /// Expected SHA-1 for an artifact URL, from the repository's `.sha1`
    /// sidecar. Repositories are not required to publish one, so any failure
    /// here reads as "no checksum available".
    pub fn fetch_checksum(&self, url: &str) -> Option<String> {
        let response = self.client.get(format!("{url}.sha1")).send().ok()?;
        if !response.status().is_success() {
            return None;
        }
        parse_checksum_text(&response.text().ok()?)
    }
}

/// First token of a `.sha1` sidecar body; some repositories append the file
/// name after the digest.
fn parse_checksum_text(text: &str) -> Option<String> {
    let token = text.split_whitespace().next()?;
    if token.len() == 40 && token.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(token.to_ascii_lowercase())
    } else {
        None
    }
}

fn check_integrity(bytes: &[u8], expected: Option<&str>, dest: &Path) -> LauncherResult<()> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    let actual = hex::encode(hasher.finalize());
    if actual != expected {
        return Err(LauncherError::Sha1Mismatch {
            path: dest.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}
