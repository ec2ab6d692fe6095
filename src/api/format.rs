use std::{fs::File, io::BufReader, path::PathBuf};

use thiserror::Error;

use crate::{model::LockFile, resolver::ResolvedArtifact};

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Unable to resolve dependencies, none of them were resolved: {0}")]
    NoResolvedResult(String),
    #[error("Expected a single resolved artifact for {requested}, found {count}: {artifacts}")]
    NonUniqueResult {
        requested: String,
        count: usize,
        artifacts: String,
    },
    #[error("Artifact file {0} does not exist")]
    MissingFile(PathBuf),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Unable to format {artifact}: {reason}")]
    Processor { artifact: String, reason: String },
}

/// Turns a resolved artifact into what the caller asked for.
pub trait FormatProcessor {
    type Output;

    fn process(&self, artifact: &ResolvedArtifact) -> Result<Self::Output, FormatError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileFormatProcessor;

impl FormatProcessor for FileFormatProcessor {
    type Output = PathBuf;

    fn process(&self, artifact: &ResolvedArtifact) -> Result<PathBuf, FormatError> {
        if !artifact.file.is_file() {
            return Err(FormatError::MissingFile(artifact.file.clone()));
        }
        Ok(artifact.file.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolvedArtifactFormatProcessor;

impl FormatProcessor for ResolvedArtifactFormatProcessor {
    type Output = ResolvedArtifact;

    fn process(&self, artifact: &ResolvedArtifact) -> Result<ResolvedArtifact, FormatError> {
        Ok(artifact.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderFormatProcessor;

impl FormatProcessor for ReaderFormatProcessor {
    type Output = BufReader<File>;

    fn process(&self, artifact: &ResolvedArtifact) -> Result<BufReader<File>, FormatError> {
        Ok(BufReader::new(File::open(&artifact.file)?))
    }
}

/// Last stage: the resolved artifacts, in resolution order.
#[derive(Debug, Clone)]
pub struct FormatStage {
    requested: Vec<String>,
    artifacts: Vec<ResolvedArtifact>,
}

impl FormatStage {
    pub(crate) fn new(requested: Vec<String>, artifacts: Vec<ResolvedArtifact>) -> Self {
        FormatStage {
            requested,
            artifacts,
        }
    }

    pub fn artifacts(&self) -> &[ResolvedArtifact] {
        &self.artifacts
    }

    pub fn as_with<P: FormatProcessor>(
        &self,
        processor: &P,
    ) -> Result<Vec<P::Output>, FormatError> {
        self.artifacts
            .iter()
            .map(|artifact| processor.process(artifact))
            .collect()
    }

    /// Fails unless exactly one artifact was resolved.
    pub fn as_single_with<P: FormatProcessor>(
        &self,
        processor: &P,
    ) -> Result<P::Output, FormatError> {
        match self.artifacts.as_slice() {
            [] => Err(FormatError::NoResolvedResult(self.requested.join(", "))),
            [artifact] => processor.process(artifact),
            artifacts => Err(FormatError::NonUniqueResult {
                requested: self.requested.join(", "),
                count: artifacts.len(),
                artifacts: artifacts
                    .iter()
                    .map(|artifact| artifact.coordinate.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    pub fn as_files(&self) -> Result<Vec<PathBuf>, FormatError> {
        self.as_with(&FileFormatProcessor)
    }

    pub fn as_single_file(&self) -> Result<PathBuf, FormatError> {
        self.as_single_with(&FileFormatProcessor)
    }

    pub fn as_resolved_artifacts(&self) -> Result<Vec<ResolvedArtifact>, FormatError> {
        self.as_with(&ResolvedArtifactFormatProcessor)
    }

    pub fn as_single_resolved_artifact(&self) -> Result<ResolvedArtifact, FormatError> {
        self.as_single_with(&ResolvedArtifactFormatProcessor)
    }

    pub fn as_readers(&self) -> Result<Vec<BufReader<File>>, FormatError> {
        self.as_with(&ReaderFormatProcessor)
    }

    pub fn as_single_reader(&self) -> Result<BufReader<File>, FormatError> {
        self.as_single_with(&ReaderFormatProcessor)
    }

    pub fn as_lock_file(&self) -> LockFile {
        self.artifacts.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::model::{Coordinate, ScopeType};

    use pretty_assertions::assert_eq;

    fn artifact(directory: &std::path::Path, coordinate: &str) -> ResolvedArtifact {
        let coordinate = Coordinate::parse(coordinate).unwrap();
        let file = directory.join(format!("{}.jar", coordinate.artifact_id));
        std::fs::write(&file, coordinate.artifact_id.as_bytes()).unwrap();
        ResolvedArtifact {
            base_version: coordinate.version().unwrap().to_string(),
            coordinate,
            scope: ScopeType::Compile,
            optional: false,
            file,
        }
    }

    #[test]
    fn single_result() {
        let directory = tempfile::tempdir().unwrap();
        let stage = FormatStage::new(
            vec!["g:a:1".to_owned()],
            vec![artifact(directory.path(), "g:a:1")],
        );
        assert_eq!(stage.as_single_file().unwrap(), directory.path().join("a.jar"));
        assert_eq!(stage.as_single_resolved_artifact().unwrap().resolved_version(), "1");
        let mut contents = String::new();
        stage
            .as_single_reader()
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "a");
    }

    #[test]
    fn no_result_and_non_unique_result_differ() {
        let directory = tempfile::tempdir().unwrap();
        let empty = FormatStage::new(vec!["g:a:1".to_owned()], Vec::new());
        assert!(matches!(
            empty.as_single_file(),
            Err(FormatError::NoResolvedResult(requested)) if requested == "g:a:1"
        ));
        assert!(empty.as_files().unwrap().is_empty());

        let many = FormatStage::new(
            vec!["g:a:1".to_owned()],
            vec![
                artifact(directory.path(), "g:a:1"),
                artifact(directory.path(), "g:b:1"),
            ],
        );
        assert!(matches!(
            many.as_single_resolved_artifact(),
            Err(FormatError::NonUniqueResult { count: 2, .. })
        ));
        assert_eq!(many.as_files().unwrap().len(), 2);
    }

    #[test]
    fn missing_file() {
        let directory = tempfile::tempdir().unwrap();
        let mut missing = artifact(directory.path(), "g:a:1");
        std::fs::remove_file(&missing.file).unwrap();
        missing.file = directory.path().join("gone.jar");
        let stage = FormatStage::new(vec![], vec![missing]);
        assert!(matches!(stage.as_files(), Err(FormatError::MissingFile(_))));
        assert!(matches!(stage.as_readers(), Err(FormatError::IO(_))));
    }

    #[test]
    fn lock_file_follows_resolution_order() {
        let directory = tempfile::tempdir().unwrap();
        let stage = FormatStage::new(
            vec![],
            vec![
                artifact(directory.path(), "g:b:1"),
                artifact(directory.path(), "g:a:1"),
            ],
        );
        let coordinates: Vec<String> = stage
            .as_lock_file()
            .artifacts
            .into_iter()
            .map(|artifact| artifact.coordinate)
            .collect();
        assert_eq!(coordinates, vec!["g:b:1", "g:a:1"]);
    }
}
