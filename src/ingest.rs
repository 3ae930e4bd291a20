// 🧹 Ingestion & Sanitization - raw text → typed dataset
//
// Each source is fetched as TEXT by an external collaborator, repaired, then parsed:
// 1. `: NaN` → `: null` (Python's json writer emits bare NaN, which is not JSON)
// 2. structural parse into the dataset schema
//
// Mandatory sources abort a load on failure. Optional sources degrade to "absent".

use crate::error::{EngineError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

static NAN_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\s*NaN").expect("NaN sentinel pattern is valid"));

// ============================================================================
// SOURCE KIND
// ============================================================================

/// The JSON resources the engine consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Dependency,
    Consumption,
    Prices,
    Eco,
}

impl SourceKind {
    /// Load order: mandatory first
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Dependency,
        SourceKind::Consumption,
        SourceKind::Prices,
        SourceKind::Eco,
    ];

    /// Short name for logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Dependency => "dependency",
            SourceKind::Consumption => "consumption",
            SourceKind::Prices => "prices",
            SourceKind::Eco => "eco",
        }
    }

    /// Candidate file names, preferred first
    ///
    /// Later dataset variants ship dependency/trade merged with production and
    /// consumption as `energy_mix.json`.
    pub fn file_names(&self) -> &'static [&'static str] {
        match self {
            SourceKind::Dependency => {
                &["energy_imports_exports_dependency.json", "energy_mix.json"]
            }
            SourceKind::Consumption => &["energy_consumptions_by_sector.json"],
            SourceKind::Prices => &["energy_prices.json"],
            SourceKind::Eco => &["eco_data.json"],
        }
    }

    /// Failure of a mandatory source aborts the whole load
    pub fn is_mandatory(&self) -> bool {
        matches!(self, SourceKind::Dependency | SourceKind::Consumption)
    }
}

// ============================================================================
// SANITIZATION + PARSE
// ============================================================================

/// Rewrite every `:` + optional whitespace + `NaN` as `: null`
pub fn sanitize(text: &str) -> Cow<'_, str> {
    NAN_TOKEN.replace_all(text, ": null")
}

/// Sanitize and parse one source
pub fn parse_source<T: DeserializeOwned>(kind: SourceKind, text: &str) -> Result<T> {
    let cleaned = sanitize(text);
    if let Cow::Owned(_) = cleaned {
        debug!(source = kind.name(), "repaired NaN tokens before parsing");
    }
    serde_json::from_str(&cleaned).map_err(|e| EngineError::parse(kind.name(), e))
}

// ============================================================================
// FETCH COLLABORATOR
// ============================================================================

/// Transport boundary: returns the raw text of a named resource
///
/// HTTP, caching and retries live behind this trait.
pub trait SourceFetcher: Send + Sync {
    fn fetch_text(&self, file_name: &str) -> Result<String>;

    /// Try each candidate file name in order, returning the first that fetches
    fn fetch_source(&self, kind: SourceKind) -> Result<String> {
        let mut last_error = None;
        for file_name in kind.file_names() {
            match self.fetch_text(file_name) {
                Ok(text) => return Ok(text),
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or_else(|| EngineError::unavailable(kind.name(), "no file names")))
    }
}

/// Reads resources from `<base_path>/<file_name>`
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    base_path: PathBuf,
}

impl DirectoryFetcher {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        DirectoryFetcher {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl SourceFetcher for DirectoryFetcher {
    fn fetch_text(&self, file_name: &str) -> Result<String> {
        let path = self.base_path.join(file_name);
        fs::read_to_string(&path)
            .map_err(|e| EngineError::unavailable(file_name, format!("{}: {}", path.display(), e)))
    }
}

/// In-memory resources (embedding, fixtures)
///
/// Counts fetches so callers can observe single-flight behaviour.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    files: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file_name: &str, text: &str) -> Self {
        self.files.insert(file_name.to_string(), text.to_string());
        self
    }

    /// Number of fetch attempts so far (hits and misses)
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl SourceFetcher for MemoryFetcher {
    fn fetch_text(&self, file_name: &str) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(file_name)
            .cloned()
            .ok_or_else(|| EngineError::unavailable(file_name, "not found"))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::io::Write;

    #[test]
    fn test_sanitize_replaces_nan_values() {
        let text = r#"{"a": NaN, "b":NaN, "c":   NaN, "d": 1.5}"#;
        assert_eq!(
            sanitize(text),
            r#"{"a": null, "b": null, "c": null, "d": 1.5}"#
        );
    }

    #[test]
    fn test_sanitize_leaves_clean_text_borrowed() {
        let text = r#"{"a": 1}"#;
        assert!(matches!(sanitize(text), Cow::Borrowed(_)));
    }

    #[test]
    fn test_nan_round_trip_matches_null_parse() {
        let with_nan = r#"{"x": {"y": NaN, "z": [1, 2]}, "w":NaN}"#;
        let with_null = r#"{"x": {"y": null, "z": [1, 2]}, "w":null}"#;

        let repaired: Value = parse_source(SourceKind::Consumption, with_nan).unwrap();
        let direct: Value = serde_json::from_str(with_null).unwrap();
        assert_eq!(repaired, direct);
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = parse_source::<Value>(SourceKind::Dependency, "{not json").unwrap_err();
        match err {
            EngineError::Parse { source_name, .. } => assert_eq!(source_name, "dependency"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_mandatory_sources() {
        assert!(SourceKind::Dependency.is_mandatory());
        assert!(SourceKind::Consumption.is_mandatory());
        assert!(!SourceKind::Prices.is_mandatory());
        assert!(!SourceKind::Eco.is_mandatory());
    }

    #[test]
    fn test_directory_fetcher_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("eco_data.json")).unwrap();
        write!(file, r#"{{"countries": {{}}}}"#).unwrap();

        let fetcher = DirectoryFetcher::new(dir.path());
        let text = fetcher.fetch_source(SourceKind::Eco).unwrap();
        assert_eq!(text, r#"{"countries": {}}"#);

        let missing = fetcher.fetch_source(SourceKind::Prices).unwrap_err();
        assert!(matches!(missing, EngineError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_directory_fetcher_falls_back_to_energy_mix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("energy_mix.json"), "{}").unwrap();

        let fetcher = DirectoryFetcher::new(dir.path());
        assert_eq!(fetcher.fetch_source(SourceKind::Dependency).unwrap(), "{}");
    }
}
