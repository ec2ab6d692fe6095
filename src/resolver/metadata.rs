use std::path::Path;

use log::{debug, trace};
use serde::Deserialize;

/// Metadata file names, in lookup order.
const METADATA_FILES: [&str; 2] = ["maven-metadata-local.xml", "maven-metadata.xml"];

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    versioning: RawVersioning,
}

#[derive(Debug, Default, Deserialize)]
struct RawVersioning {
    latest: Option<String>,
    release: Option<String>,
    snapshot: Option<RawSnapshot>,
    #[serde(default)]
    versions: RawVersions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    timestamp: Option<String>,
    build_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawVersions {
    #[serde(default)]
    version: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub release: Option<String>,
    pub latest: Option<String>,
    pub versions: Vec<String>,
    pub snapshot_timestamp: Option<String>,
    pub snapshot_build_number: Option<u32>,
}

impl Metadata {
    pub fn from_xml_str(contents: &str) -> Option<Metadata> {
        let raw: RawMetadata = match serde_xml_rs::from_str(contents) {
            Ok(raw) => raw,
            Err(error) => {
                debug!("Ignoring unreadable repository metadata: {}", error);
                return None;
            }
        };
        let snapshot = raw.versioning.snapshot.unwrap_or_default();
        let trimmed = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Some(Metadata {
            release: trimmed(raw.versioning.release),
            latest: trimmed(raw.versioning.latest),
            versions: raw
                .versioning
                .versions
                .version
                .into_iter()
                .map(|v| v.trim().to_string())
                .collect(),
            snapshot_build_number: snapshot
                .build_number
                .and_then(|n| n.trim().parse::<u32>().ok()),
            snapshot_timestamp: trimmed(snapshot.timestamp),
        })
    }

    /// Reads the first metadata file found in `directory`.
    pub fn find_in(directory: &Path) -> Option<Metadata> {
        METADATA_FILES.iter().find_map(|name| {
            let path = directory.join(name);
            let contents = std::fs::read_to_string(&path).ok()?;
            trace!("Reading repository metadata {}", path.display());
            Metadata::from_xml_str(&contents)
        })
    }

    /// Preferred version to use when none was requested.
    pub fn preferred_version(&self) -> Option<&str> {
        self.release
            .as_deref()
            .or(self.latest.as_deref())
            .or(self.versions.last().map(String::as_str))
    }

    /// `1.0-SNAPSHOT` becomes `1.0-<timestamp>-<build number>` when the metadata names a
    /// deployed snapshot.
    pub fn expand_snapshot(&self, base_version: &str) -> Option<String> {
        let prefix = base_version.strip_suffix("-SNAPSHOT")?;
        let timestamp = self.snapshot_timestamp.as_deref()?;
        Some(match self.snapshot_build_number {
            Some(build_number) => format!("{}-{}-{}", prefix, timestamp, build_number),
            None => format!("{}-{}", prefix, timestamp),
        })
    }
}
