use thiserror::Error;

pub mod coordinate;
pub mod dependency;
pub mod exclusion;
pub mod lock;
pub mod management;
pub mod packaging;
pub mod scope;

pub use coordinate::{ArtifactKey, Coordinate};
pub use dependency::Dependency;
pub use exclusion::Exclusion;
pub use lock::{LockFile, LockFileError, LockedArtifact};
pub use management::DependencyManagement;
pub use packaging::PackagingType;
pub use scope::ScopeType;

/// Rejected input at the API boundary, raised before any state is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("Scope `{0}` is not supported")]
    UnknownScope(String),
    #[error("Packaging `{0}` is not supported")]
    UnknownPackaging(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid coordinate `{input}`, expected groupId:artifactId[:packaging[:classifier]]:version: {reason}")]
    Coordinate { input: String, reason: String },
    #[error("Invalid coordinate `{input}`: {source}")]
    CoordinateField {
        input: String,
        #[source]
        source: ArgumentError,
    },
    #[error("Invalid exclusion `{0}`, expected groupId:artifactId")]
    Exclusion(String),
    #[error(transparent)]
    Argument(#[from] ArgumentError),
}
