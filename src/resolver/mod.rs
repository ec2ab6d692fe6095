mod local;
mod metadata;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    filter::ResolutionFilter,
    model::{Coordinate, Dependency, DependencyManagement, ScopeType},
};

pub use local::LocalRepositoryEngine;

pub const MAVEN_CENTRAL_ID: &str = "central";
pub const MAVEN_CENTRAL_URL: &str = "https://repo1.maven.org/maven2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub id: String,
    pub url: String,
}

impl RemoteRepository {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        RemoteRepository {
            id: id.into(),
            url: url.into(),
        }
    }

    pub fn maven_central() -> Self {
        RemoteRepository::new(MAVEN_CENTRAL_ID, MAVEN_CENTRAL_URL)
    }

    /// Directory backing a `file:` repository url.
    pub fn local_path(&self) -> Option<PathBuf> {
        self.url
            .strip_prefix("file://")
            .or_else(|| self.url.strip_prefix("file:"))
            .map(PathBuf::from)
    }
}

/// Everything a resolution engine needs to collect and resolve a dependency graph.
#[derive(Debug, Clone, Default)]
pub struct CollectRequest {
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: DependencyManagement,
    pub repositories: Vec<RemoteRepository>,
    /// Only the local repository may be used.
    pub offline: bool,
}

/// A graph node that passed the filter, with its artifact located on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// Carries the resolved version, snapshot versions expanded to their timestamped form.
    pub coordinate: Coordinate,
    /// Version as requested, `-SNAPSHOT` kept.
    pub base_version: String,
    pub scope: ScopeType,
    pub optional: bool,
    pub file: PathBuf,
}

impl ResolvedArtifact {
    pub fn resolved_version(&self) -> &str {
        self.coordinate.version().unwrap_or(&self.base_version)
    }

    pub fn is_snapshot(&self) -> bool {
        self.base_version.ends_with("-SNAPSHOT")
    }
}

#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("Failed to collect dependencies of {root}: {reason}")]
    Collection { root: String, reason: String },
    #[error("Dependency {0} has no version and none is managed")]
    MissingVersion(String),
    #[error("Artifact {coordinate} was not found in any of the repositories: {repositories}")]
    ArtifactNotFound {
        coordinate: String,
        repositories: String,
    },
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

/// The seam between the staged API and whatever actually walks the dependency graph.
pub trait ResolutionEngine: Send + Sync {
    /// Collects the graph rooted at the request's dependencies and resolves the artifact of every
    /// node accepted by `filter`.
    fn resolve(
        &self,
        request: &CollectRequest,
        filter: &dyn ResolutionFilter,
    ) -> Result<Vec<ResolvedArtifact>, ResolutionError>;

    /// Resolves the version `coordinate` would be resolved at, without touching its artifact.
    fn resolve_version(
        &self,
        coordinate: &Coordinate,
        repositories: &[RemoteRepository],
    ) -> Result<String, ResolutionError>;
}
