use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resolver::ResolvedArtifact;

use super::ScopeType;

#[derive(Error, Debug)]
pub enum LockFileError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unsupported lock file version {0}")]
    UnsupportedVersion(toml::Value),
    #[error("Lock file has no version")]
    MissingVersion,
}

/// Outcome of a resolution, written next to a project so the same artifact set can be checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockFile {
    #[serde(default)]
    pub artifacts: Vec<LockedArtifact>,
}

const VERSION: i64 = 1;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct VersionedLockFile<'a> {
    pub version: i64,
    #[serde(flatten)]
    pub content: &'a LockFile,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockedArtifact {
    pub coordinate: String,
    pub scope: ScopeType,
    #[serde(default)]
    pub optional: bool,
    pub file: PathBuf,
}

impl LockFile {
    pub fn from_file(file: &Path) -> Result<LockFile, LockFileError> {
        LockFile::from_str(&std::fs::read_to_string(file)?)
    }

    pub fn from_str(s: &str) -> Result<LockFile, LockFileError> {
        let mut table = toml::from_str::<toml::Table>(s)?;
        match table.remove("version") {
            Some(toml::Value::Integer(VERSION)) => table.try_into::<LockFile>().map_err(Into::into),
            Some(other) => Err(LockFileError::UnsupportedVersion(other)),
            None => Err(LockFileError::MissingVersion),
        }
    }

    pub fn to_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&VersionedLockFile {
            version: VERSION,
            content: self,
        })
    }
}

impl<'a> FromIterator<&'a ResolvedArtifact> for LockFile {
    fn from_iter<T: IntoIterator<Item = &'a ResolvedArtifact>>(iter: T) -> Self {
        LockFile {
            artifacts: iter
                .into_iter()
                .map(|artifact| LockedArtifact {
                    coordinate: artifact.coordinate.to_string(),
                    scope: artifact.scope,
                    optional: artifact.optional,
                    file: artifact.file.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use toml::toml;

    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn load_save_lock_file() {
        let text = toml::to_string_pretty(&toml! {
            version = 1

            [[artifacts]]
            coordinate = "org.example:app:jar:1.0"
            scope = "compile"
            optional = false
            file = "/m2/org/example/app/1.0/app-1.0.jar"

            [[artifacts]]
            coordinate = "org.example:junit:jar:tests:4.13"
            scope = "test"
            optional = true
            file = "/m2/org/example/junit/4.13/junit-4.13-tests.jar"
        })
        .unwrap();
        let data = LockFile {
            artifacts: vec![
                LockedArtifact {
                    coordinate: "org.example:app:jar:1.0".to_owned(),
                    scope: ScopeType::Compile,
                    optional: false,
                    file: "/m2/org/example/app/1.0/app-1.0.jar".into(),
                },
                LockedArtifact {
                    coordinate: "org.example:junit:jar:tests:4.13".to_owned(),
                    scope: ScopeType::Test,
                    optional: true,
                    file: "/m2/org/example/junit/4.13/junit-4.13-tests.jar".into(),
                },
            ],
        };
        let parsed = LockFile::from_str(&text).unwrap();
        let formatted = data.to_string().unwrap();
        assert_eq!(parsed, data);
        assert_eq!(formatted, text);
    }

    #[test]
    fn reject_other_versions() {
        let text = toml::to_string_pretty(&toml! {
            version = 2
        })
        .unwrap();
        assert!(matches!(
            LockFile::from_str(&text),
            Err(LockFileError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            LockFile::from_str("artifacts = []"),
            Err(LockFileError::MissingVersion)
        ));
    }
}
