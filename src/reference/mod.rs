// src/reference/mod.rs
//! Reference list loading: SDN XML or JSON files, in-memory lists, and (feature
//! `sdn-http`) the published OFAC feed.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::index::ReferenceEntry;

#[cfg(feature = "sdn-http")]
pub mod http;
pub mod sdn;

#[cfg(feature = "sdn-http")]
pub use http::HttpSdnSource;
pub use sdn::parse_sdn_xml;

/// Provenance of one successful load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceMeta {
    /// RFC 3339, UTC.
    pub fetched_at_utc: String,
    pub entries: usize,
    pub source: String,
}

impl ReferenceMeta {
    pub fn now(source: &str, entries: usize) -> Self {
        Self {
            fetched_at_utc: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            entries,
            source: source.to_string(),
        }
    }
}

#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<ReferenceEntry>>;
    fn name(&self) -> &'static str;

    /// Entries plus where they actually came from. Sources with several possible
    /// origins (mirrors, archive vs. plain file) override this.
    async fn fetch_with_origin(&self) -> Result<(Vec<ReferenceEntry>, String)> {
        let entries = self.fetch_entries().await?;
        Ok((entries, self.name().to_string()))
    }
}

/// Fetch from any source and stamp the result.
pub async fn fetch_with_meta(
    source: &dyn ReferenceSource,
) -> Result<(Vec<ReferenceEntry>, ReferenceMeta)> {
    let (entries, origin) = source.fetch_with_origin().await?;
    let meta = ReferenceMeta::now(&origin, entries.len());
    Ok((entries, meta))
}

/// Parse raw bytes according to a file extension (`xml` or `json`).
pub fn parse_entries(bytes: &[u8], ext: &str) -> Result<Vec<ReferenceEntry>> {
    match ext {
        "xml" => parse_sdn_xml(bytes),
        "json" => serde_json::from_slice(bytes).context("parsing reference json"),
        other => bail!("unsupported reference format: {other:?} (expected .xml or .json)"),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Load reference entries from an SDN XML or JSON file.
pub fn load_entries_from(path: &Path) -> Result<Vec<ReferenceEntry>> {
    let ext = extension_of(path);
    let bytes =
        std::fs::read(path).with_context(|| format!("reading reference list {}", path.display()))?;
    parse_entries(&bytes, &ext).with_context(|| format!("loading {}", path.display()))
}

/// Reads a local file on every fetch, so edits are picked up by the next refresh.
#[derive(Debug, Clone)]
pub struct FileReferenceSource {
    path: PathBuf,
}

impl FileReferenceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReferenceSource for FileReferenceSource {
    async fn fetch_entries(&self) -> Result<Vec<ReferenceEntry>> {
        let ext = extension_of(&self.path);
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("reading reference list {}", self.path.display()))?;
        parse_entries(&bytes, &ext).with_context(|| format!("loading {}", self.path.display()))
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Fixed in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceSource {
    entries: Vec<ReferenceEntry>,
}

impl StaticReferenceSource {
    pub fn new(entries: Vec<ReferenceEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl ReferenceSource for StaticReferenceSource {
    async fn fetch_entries(&self) -> Result<Vec<ReferenceEntry>> {
        Ok(self.entries.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
