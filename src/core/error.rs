use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the entire launcher.
/// Every module returns `Result<T, LauncherError>`.
///
/// All of these abort the launch. A partial classpath would silently change
/// application behavior, so there is no degraded-mode fallback anywhere.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Locators ────────────────────────────────────────
    #[error("Malformed or unsupported locator: {0}")]
    Locator(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ── Maven ───────────────────────────────────────────
    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    #[error("POM parse error: {0}")]
    PomParse(String),

    // ── Launch ──────────────────────────────────────────
    #[error("No main class found: {0}")]
    EntryPointNotFound(String),

    #[error("Java execution failed: {0}")]
    JavaExecution(String),

    #[error("Java not found (set JAVA_HOME or put java on PATH)")]
    JavaNotFound,

    // ── Configuration ───────────────────────────────────
    #[error("Invalid value for {key}: {message}")]
    Configuration { key: String, message: String },

    // ── Archive ─────────────────────────────────────────
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl LauncherError {
    /// Whether this error means "does not exist anywhere searched",
    /// as opposed to a transport failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LauncherError::NotFound(_) | LauncherError::DownloadFailed { status: 404, .. }
        )
    }
}
