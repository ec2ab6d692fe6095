use std::path::{Path, PathBuf};

use log::{debug, trace};
use thiserror::Error;

use crate::{
    model::{ArgumentError, ArtifactKey, Dependency, DependencyManagement, ParseError},
    pom::{Pom, PomError},
    resolver::{CollectRequest, RemoteRepository},
    settings::Settings,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Unable to get version for dependency {0}, it was not set and is not present in dependency management")]
    UnresolvedVersion(ArtifactKey),
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// State shared by every resolution started from one configuration: settings, repositories,
/// the loaded POM with its dependency management, and the declarations waiting to be resolved.
#[derive(Debug, Clone)]
pub struct WorkingSession {
    settings: Settings,
    local_repository: PathBuf,
    offline: bool,
    active_profiles: Vec<String>,
    remote_repositories: Vec<RemoteRepository>,
    use_maven_central: bool,
    pom: Option<Pom>,
    dependency_management: DependencyManagement,
    pending: Vec<Dependency>,
}

impl WorkingSession {
    pub fn new(settings: Settings, local_repository: PathBuf) -> Self {
        WorkingSession {
            offline: settings.offline,
            settings,
            local_repository,
            active_profiles: Vec::new(),
            remote_repositories: Vec::new(),
            use_maven_central: true,
            pom: None,
            dependency_management: DependencyManagement::new(),
            pending: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn local_repository(&self) -> &Path {
        &self.local_repository
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn set_active_profiles(&mut self, profiles: Vec<String>) {
        self.active_profiles = profiles;
    }

    pub fn set_use_maven_central(&mut self, use_maven_central: bool) {
        self.use_maven_central = use_maven_central;
    }

    pub fn add_remote_repository(&mut self, repository: RemoteRepository) {
        self.remote_repositories.push(repository);
    }

    pub fn pom(&self) -> Option<&Pom> {
        self.pom.as_ref()
    }

    pub fn load_pom(&mut self, path: &Path, profiles: &[String]) -> Result<(), PomError> {
        let pom = Pom::from_file(path, profiles)?;
        debug!(
            "Loaded {} with {} dependencies and {} managed dependencies",
            pom.coordinate,
            pom.dependencies.len(),
            pom.dependency_management.len()
        );
        self.dependency_management
            .extend(pom.dependency_management.iter().cloned());
        self.pom = Some(pom);
        Ok(())
    }

    pub fn add_managed_dependency(&mut self, dependency: Dependency) -> bool {
        self.dependency_management.insert(dependency)
    }

    /// Declared dependencies of the loaded POM.
    pub fn declared_dependencies(&self) -> &[Dependency] {
        self.pom
            .as_ref()
            .map(|pom| pom.dependencies.as_slice())
            .unwrap_or_default()
    }

    /// Fills in a missing version from dependency management, then from the versions declared
    /// in the loaded POM. A dependency whose version stays unknown is rejected.
    pub fn complete(&self, mut dependency: Dependency) -> Result<Dependency, BuildError> {
        if dependency.coordinate.has_version() {
            return Ok(dependency);
        }
        let key = dependency.key();
        let version = self
            .dependency_management
            .version_of(&key)
            .or_else(|| {
                self.declared_dependencies()
                    .iter()
                    .find(|declared| declared.key() == key)
                    .and_then(|declared| declared.version())
            })
            .ok_or_else(|| BuildError::UnresolvedVersion(key.clone()))?;
        trace!("Version {} of {} inferred", version, key);
        dependency.coordinate = dependency.coordinate.with_version(version);
        Ok(dependency)
    }

    pub fn push_dependency(&mut self, dependency: Dependency) {
        self.pending.push(dependency);
    }

    pub fn push_dependencies(&mut self, dependencies: impl IntoIterator<Item = Dependency>) {
        self.pending.extend(dependencies);
    }

    pub fn pending_dependencies(&self) -> &[Dependency] {
        &self.pending
    }

    /// Empties the declaration stack, handing its content to the caller.
    pub fn take_pending(&mut self) -> Vec<Dependency> {
        std::mem::take(&mut self.pending)
    }

    /// Explicit repositories, then those of active settings profiles, then the POM's, then
    /// Maven Central. The first repository with a given id wins.
    pub fn remote_repositories(&self) -> Vec<RemoteRepository> {
        let mut repositories: Vec<RemoteRepository> = Vec::new();
        let settings_repositories = self.settings.remote_repositories(&self.active_profiles);
        let pom_repositories = self
            .pom
            .as_ref()
            .map(|pom| pom.repositories.clone())
            .unwrap_or_default();
        let central = self
            .use_maven_central
            .then(RemoteRepository::maven_central);

        for repository in self
            .remote_repositories
            .iter()
            .cloned()
            .chain(settings_repositories)
            .chain(pom_repositories)
            .chain(central)
        {
            if !repositories.iter().any(|r| r.id == repository.id) {
                repositories.push(repository);
            }
        }
        repositories
    }

    pub fn collect_request(&self, dependencies: Vec<Dependency>) -> CollectRequest {
        CollectRequest {
            dependencies,
            managed_dependencies: self.dependency_management.clone(),
            repositories: self.remote_repositories(),
            offline: self.offline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinate;

    use pretty_assertions::assert_eq;

    fn session() -> WorkingSession {
        WorkingSession::new(Settings::default(), PathBuf::from("/tmp/repository"))
    }

    fn dependency(coordinate: &str) -> Dependency {
        Dependency::new(Coordinate::parse(coordinate).unwrap())
    }

    #[test]
    fn version_inferred_from_management() {
        let mut session = session();
        session.add_managed_dependency(dependency("g:a:1.2.3"));
        let completed = session.complete(dependency("g:a:?")).unwrap();
        assert_eq!(completed.version(), Some("1.2.3"));
    }

    #[test]
    fn unresolved_version_fails() {
        let session = session();
        let expected = BuildError::UnresolvedVersion(Coordinate::parse("g:a:?").unwrap().key());
        assert_eq!(session.complete(dependency("g:a:?")), Err(expected.clone()));
        assert_eq!(session.complete(dependency("g:a:")), Err(expected.clone()));
        assert!(expected.to_string().contains("g:a"));
    }

    #[test]
    fn explicit_version_is_kept() {
        let mut session = session();
        session.add_managed_dependency(dependency("g:a:1.2.3"));
        assert_eq!(session.complete(dependency("g:a:2.0")).unwrap().version(), Some("2.0"));
    }

    #[test]
    fn pending_dependencies_are_taken_once() {
        let mut session = session();
        session.push_dependency(dependency("g:a:1"));
        session.push_dependency(dependency("g:b:1"));
        assert_eq!(session.take_pending().len(), 2);
        assert!(session.take_pending().is_empty());
    }

    #[test]
    fn repository_order_and_central() {
        let mut session = session();
        session.add_remote_repository(RemoteRepository::new("mine", "file:///srv/mine"));
        session.add_remote_repository(RemoteRepository::new("mine", "file:///srv/other"));
        assert_eq!(
            session.remote_repositories(),
            vec![
                RemoteRepository::new("mine", "file:///srv/mine"),
                RemoteRepository::maven_central()
            ]
        );
        session.set_use_maven_central(false);
        assert_eq!(session.remote_repositories().len(), 1);
    }
}
