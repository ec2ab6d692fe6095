use std::{
    collections::{HashMap, VecDeque},
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;
use log::{debug, info, trace, warn};

use crate::{
    filter::ResolutionFilter,
    model::{ArtifactKey, Coordinate, Dependency, Exclusion},
    pom::{Pom, PomError},
};

use super::{
    metadata::Metadata, CollectRequest, RemoteRepository, ResolutionEngine, ResolutionError,
    ResolvedArtifact,
};

/// Resolves over directories laid out like a Maven repository: the local repository first,
/// then every `file:` remote repository of the request.
///
/// Collection is breadth first, so the nearest declaration of an artifact wins and, at equal
/// depth, the first one declared.
pub struct LocalRepositoryEngine {
    local_repository: PathBuf,
    poms: DashMap<PathBuf, Arc<Pom>>,
}

struct Node {
    dependency: Dependency,
    ancestors: Vec<Dependency>,
    exclusions: Vec<Exclusion>,
}

impl LocalRepositoryEngine {
    pub fn new(local_repository: impl Into<PathBuf>) -> Self {
        LocalRepositoryEngine {
            local_repository: local_repository.into(),
            poms: DashMap::new(),
        }
    }

    fn search_roots(&self, repositories: &[RemoteRepository]) -> Vec<PathBuf> {
        let mut roots = vec![self.local_repository.clone()];
        for repository in repositories {
            match repository.local_path() {
                Some(path) => roots.push(path),
                None => trace!(
                    "Skipping repository {} ({}), only file repositories are searched",
                    repository.id,
                    repository.url
                ),
            }
        }
        roots
    }

    fn load_pom(
        &self,
        coordinate: &Coordinate,
        version: &str,
        roots: &[PathBuf],
    ) -> Result<Option<Arc<Pom>>, PomError> {
        let file_name = format!("{}-{}.pom", coordinate.artifact_id, version);
        let Some(path) = roots
            .iter()
            .map(|root| version_directory(root, coordinate, version).join(&file_name))
            .find(|path| path.is_file())
        else {
            return Ok(None);
        };
        if let Some(pom) = self.poms.get(&path) {
            return Ok(Some(Arc::clone(pom.value())));
        }
        let pom = Arc::new(Pom::from_file(&path, &[])?);
        self.poms.insert(path, Arc::clone(&pom));
        Ok(Some(pom))
    }

    /// Locates the artifact file of `coordinate`, expanding snapshot versions.
    fn locate(
        &self,
        coordinate: &Coordinate,
        version: &str,
        roots: &[PathBuf],
    ) -> Option<(PathBuf, String)> {
        let extension = coordinate.packaging.extension();
        let classifier = if coordinate.classifier.is_empty() {
            String::new()
        } else {
            format!("-{}", coordinate.classifier)
        };
        for root in roots {
            let directory = version_directory(root, coordinate, version);
            if !directory.is_dir() {
                continue;
            }
            let expanded = Metadata::find_in(&directory)
                .and_then(|metadata| metadata.expand_snapshot(version));
            let candidates = expanded.into_iter().chain(Some(version.to_string()));
            for candidate in candidates {
                let file = directory.join(format!(
                    "{}-{}{}.{}",
                    coordinate.artifact_id, candidate, classifier, extension
                ));
                if file.is_file() {
                    return Some((file, candidate));
                }
            }
        }
        None
    }

    fn collect(
        &self,
        request: &CollectRequest,
        roots: &[PathBuf],
    ) -> Result<Vec<Node>, ResolutionError> {
        let mut queue: VecDeque<Node> = request
            .dependencies
            .iter()
            .map(|dependency| Node {
                dependency: dependency.clone(),
                ancestors: Vec::new(),
                exclusions: Vec::new(),
            })
            .collect();
        let mut selected: HashMap<ArtifactKey, String> = HashMap::new();
        let mut collected = Vec::new();

        while let Some(node) = queue.pop_front() {
            let key = node.dependency.key();
            let version = node
                .dependency
                .version()
                .ok_or_else(|| ResolutionError::MissingVersion(node.dependency.to_string()))?
                .to_string();
            if let Some(winner) = selected.get(&key) {
                if winner != &version {
                    debug!(
                        "Omitting {} for conflict with {}",
                        node.dependency.coordinate, winner
                    );
                }
                continue;
            }
            selected.insert(key, version.clone());

            let pom = self
                .load_pom(&node.dependency.coordinate, &version, roots)
                .map_err(|error| ResolutionError::Collection {
                    root: root_of(&node).to_string(),
                    reason: error.to_string(),
                })?;
            match pom {
                Some(pom) => self.expand(&node, &pom, request, &mut queue)?,
                None => debug!(
                    "The POM for {} is missing, no dependency information available",
                    node.dependency.coordinate
                ),
            }
            collected.push(node);
        }
        Ok(collected)
    }

    fn expand(
        &self,
        node: &Node,
        pom: &Pom,
        request: &CollectRequest,
        queue: &mut VecDeque<Node>,
    ) -> Result<(), ResolutionError> {
        let mut exclusions = node.exclusions.clone();
        exclusions.extend(node.dependency.exclusions.iter().cloned());

        let mut ancestors = node.ancestors.clone();
        ancestors.push(node.dependency.clone());

        for child in &pom.dependencies {
            if child.optional {
                trace!("Skipping optional {} of {}", child, node.dependency);
                continue;
            }
            let Some(scope) = node.dependency.scope.derive_transitive(child.scope) else {
                continue;
            };
            if exclusions.iter().any(|e| e.matches(&child.coordinate)) {
                trace!("Excluding {} below {}", child.coordinate, node.dependency);
                continue;
            }

            let key = child.key();
            let version = request
                .managed_dependencies
                .version_of(&key)
                .or_else(|| child.version())
                .or_else(|| {
                    pom.dependency_management
                        .iter()
                        .find(|managed| managed.key() == key)
                        .and_then(|managed| managed.version())
                })
                .ok_or_else(|| ResolutionError::Collection {
                    root: root_of(node).to_string(),
                    reason: format!(
                        "{} declares {} without a version",
                        pom.coordinate, child.coordinate
                    ),
                })?;

            let mut dependency = child.clone().with_scope(scope);
            dependency.coordinate = child.coordinate.with_version(version);
            queue.push_back(Node {
                dependency,
                ancestors: ancestors.clone(),
                exclusions: exclusions.clone(),
            });
        }
        Ok(())
    }
}

impl ResolutionEngine for LocalRepositoryEngine {
    fn resolve(
        &self,
        request: &CollectRequest,
        filter: &dyn ResolutionFilter,
    ) -> Result<Vec<ResolvedArtifact>, ResolutionError> {
        let roots = if request.offline {
            debug!("Working offline, searching {} only", self.local_repository.display());
            vec![self.local_repository.clone()]
        } else {
            self.search_roots(&request.repositories)
        };
        let nodes = self.collect(request, &roots)?;
        debug!("Collected {} dependencies", nodes.len());

        let mut artifacts = Vec::new();
        for node in nodes {
            if !filter.accepts(&node.dependency, &request.dependencies, &node.ancestors) {
                trace!("Filtered out {}", node.dependency);
                continue;
            }
            let coordinate = &node.dependency.coordinate;
            let base_version = coordinate.version().unwrap_or_default().to_string();
            let (file, version) = self
                .locate(coordinate, &base_version, &roots)
                .ok_or_else(|| ResolutionError::ArtifactNotFound {
                    coordinate: coordinate.to_string(),
                    repositories: describe(&roots),
                })?;
            info!("Resolved {}", coordinate);
            artifacts.push(ResolvedArtifact {
                coordinate: coordinate.with_version(version),
                base_version,
                scope: node.dependency.scope,
                optional: node.dependency.optional,
                file,
            });
        }
        Ok(artifacts)
    }

    fn resolve_version(
        &self,
        coordinate: &Coordinate,
        repositories: &[RemoteRepository],
    ) -> Result<String, ResolutionError> {
        let roots = self.search_roots(repositories);
        match coordinate.version() {
            Some(version) if coordinate.is_snapshot() => Ok(roots
                .iter()
                .filter_map(|root| Metadata::find_in(&version_directory(root, coordinate, version)))
                .find_map(|metadata| metadata.expand_snapshot(version))
                .unwrap_or_else(|| version.to_string())),
            Some(version) => Ok(version.to_string()),
            None => roots
                .iter()
                .filter_map(|root| Metadata::find_in(&artifact_directory(root, coordinate)))
                .find_map(|metadata| metadata.preferred_version().map(str::to_string))
                .ok_or_else(|| {
                    warn!("No version metadata found for {}", coordinate.key());
                    ResolutionError::ArtifactNotFound {
                        coordinate: coordinate.to_string(),
                        repositories: describe(&roots),
                    }
                }),
        }
    }
}

fn artifact_directory(root: &Path, coordinate: &Coordinate) -> PathBuf {
    let mut directory = root.to_path_buf();
    directory.extend(coordinate.group_id.split('.'));
    directory.push(&coordinate.artifact_id);
    directory
}

fn version_directory(root: &Path, coordinate: &Coordinate, version: &str) -> PathBuf {
    artifact_directory(root, coordinate).join(version)
}

fn root_of(node: &Node) -> &Coordinate {
    node.ancestors
        .first()
        .map(|root| &root.coordinate)
        .unwrap_or(&node.dependency.coordinate)
}

fn describe(roots: &[PathBuf]) -> String {
    roots
        .iter()
        .map(|root| root.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
