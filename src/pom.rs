use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use log::{debug, trace};
use regex_lite::{Captures, Regex};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    model::{
        ArgumentError, Coordinate, Dependency, Exclusion, PackagingType, ParseError, ScopeType,
    },
    resolver::RemoteRepository,
    xml::{self, RawActivation, RawRepositories},
};

#[derive(Error, Debug)]
pub enum PomError {
    #[error("POM file {0} does not exist")]
    NotFound(PathBuf),
    #[error("POM file {path} cannot be read: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("POM file {path} is not a valid pom.xml, root element is {found:?}")]
    WrongRoot { path: PathBuf, found: Option<String> },
    #[error("Failed to parse POM file {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: serde_xml_rs::Error,
    },
    #[error("POM file {path} does not declare `{element}`")]
    MissingElement { path: PathBuf, element: &'static str },
    #[error("POM file {path} declares an invalid dependency {dependency}: {source}")]
    InvalidDependency {
        path: PathBuf,
        dependency: String,
        #[source]
        source: ParseError,
    },
}

/// The parts of a project object model the resolver works with.
#[derive(Debug, Clone)]
pub struct Pom {
    pub path: PathBuf,
    pub coordinate: Coordinate,
    pub properties: HashMap<String, String>,
    pub dependencies: Vec<Dependency>,
    pub dependency_management: Vec<Dependency>,
    pub repositories: Vec<RemoteRepository>,
}

impl Pom {
    pub fn from_file(path: &Path, active_profiles: &[String]) -> Result<Pom, PomError> {
        debug!("Loading POM from {}", path.display());
        if !path.is_file() {
            return Err(PomError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(|source| PomError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path, active_profiles)
    }

    pub fn from_xml_str(contents: &str, active_profiles: &[String]) -> Result<Pom, PomError> {
        Self::parse(contents, Path::new("<memory>"), active_profiles)
    }

    fn parse(contents: &str, path: &Path, active_profiles: &[String]) -> Result<Pom, PomError> {
        match xml::root_element(contents) {
            Some("project") => {}
            found => {
                return Err(PomError::WrongRoot {
                    path: path.to_path_buf(),
                    found: found.map(str::to_string),
                })
            }
        }
        let raw: RawProject = serde_xml_rs::from_str(contents).map_err(|source| PomError::Xml {
            path: path.to_path_buf(),
            source,
        })?;
        raw.into_pom(path, active_profiles)
    }

    /// File name of the archive a build of this project produces.
    pub fn archive_file_name(&self) -> String {
        format!(
            "{}-{}.{}",
            self.coordinate.artifact_id,
            self.coordinate.version().unwrap_or_default(),
            self.coordinate.packaging.extension()
        )
    }

    /// Declared dependencies in any of `scopes`, all of them when `scopes` is empty.
    pub fn dependencies_in_scopes<'a>(
        &'a self,
        scopes: &'a [ScopeType],
    ) -> impl Iterator<Item = &'a Dependency> + 'a {
        self.dependencies
            .iter()
            .filter(move |dependency| scopes.is_empty() || scopes.contains(&dependency.scope))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProject {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    packaging: Option<String>,
    parent: Option<RawParent>,
    #[serde(default)]
    properties: HashMap<String, String>,
    #[serde(default)]
    dependencies: RawDependencies,
    #[serde(default)]
    dependency_management: RawDependencyManagement,
    #[serde(default)]
    repositories: RawRepositories,
    #[serde(default)]
    profiles: RawProfiles,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParent {
    group_id: Option<String>,
    version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDependencies {
    #[serde(default)]
    dependency: Vec<RawDependency>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDependencyManagement {
    #[serde(default)]
    dependencies: RawDependencies,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDependency {
    group_id: String,
    artifact_id: String,
    version: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    classifier: Option<String>,
    scope: Option<String>,
    optional: Option<String>,
    #[serde(default)]
    exclusions: RawExclusions,
}

#[derive(Debug, Default, Deserialize)]
struct RawExclusions {
    #[serde(default)]
    exclusion: Vec<RawExclusion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExclusion {
    group_id: Option<String>,
    artifact_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProfiles {
    #[serde(default)]
    profile: Vec<RawProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProfile {
    id: String,
    #[serde(default)]
    activation: RawActivation,
    #[serde(default)]
    dependencies: RawDependencies,
    #[serde(default)]
    dependency_management: RawDependencyManagement,
    #[serde(default)]
    repositories: RawRepositories,
}

impl RawProject {
    fn into_pom(self, path: &Path, active_profiles: &[String]) -> Result<Pom, PomError> {
        let parent = self.parent.unwrap_or_default();
        let group_id = self
            .group_id
            .or(parent.group_id)
            .map(|g| g.trim().to_string())
            .ok_or_else(|| PomError::MissingElement {
                path: path.to_path_buf(),
                element: "groupId",
            })?;
        let artifact_id = self
            .artifact_id
            .map(|a| a.trim().to_string())
            .ok_or_else(|| PomError::MissingElement {
                path: path.to_path_buf(),
                element: "artifactId",
            })?;
        let version = self.version.or(parent.version).map(|v| v.trim().to_string());

        let mut properties: HashMap<String, String> = self
            .properties
            .into_iter()
            .map(|(k, v)| (k, v.trim().to_string()))
            .collect();
        for prefix in ["project", "pom"] {
            properties.insert(format!("{prefix}.groupId"), group_id.clone());
            properties.insert(format!("{prefix}.artifactId"), artifact_id.clone());
            if let Some(version) = &version {
                properties.insert(format!("{prefix}.version"), version.clone());
            }
        }

        let packaging = match self.packaging.as_deref().map(str::trim) {
            None | Some("") => PackagingType::Jar,
            Some(packaging) => {
                packaging
                    .parse()
                    .map_err(|source: ArgumentError| PomError::InvalidDependency {
                        path: path.to_path_buf(),
                        dependency: format!("{}:{}", group_id, artifact_id),
                        source: source.into(),
                    })?
            }
        };

        let coordinate = Coordinate::new(
            interpolate(&group_id, &properties),
            interpolate(&artifact_id, &properties),
            version.map(|v| interpolate(&v, &properties)),
            packaging,
            "",
        )
        .map_err(|source| PomError::InvalidDependency {
            path: path.to_path_buf(),
            dependency: "<project>".to_string(),
            source: source.into(),
        })?;

        let mut raw_dependencies = self.dependencies.dependency;
        let mut raw_managed = self.dependency_management.dependencies.dependency;
        let mut repositories = self.repositories.into_repositories();

        for profile in self.profiles.profile {
            let id = profile.id.trim();
            let active = active_profiles.iter().any(|p| p == id)
                || xml::is_true(profile.activation.active_by_default.as_deref());
            if !active {
                continue;
            }
            trace!("Activating POM profile {}", id);
            raw_dependencies.extend(profile.dependencies.dependency);
            raw_managed.extend(profile.dependency_management.dependencies.dependency);
            repositories.extend(profile.repositories.into_repositories());
        }

        let convert = |raw: Vec<RawDependency>| -> Result<Vec<Dependency>, PomError> {
            raw.into_iter()
                .map(|dependency| dependency.into_dependency(path, &properties))
                .collect()
        };

        Ok(Pom {
            path: path.to_path_buf(),
            coordinate,
            dependencies: convert(raw_dependencies)?,
            dependency_management: convert(raw_managed)?,
            repositories,
            properties,
        })
    }
}

impl RawDependency {
    fn into_dependency(
        self,
        path: &Path,
        properties: &HashMap<String, String>,
    ) -> Result<Dependency, PomError> {
        let value = |s: &str| interpolate(s.trim(), properties);
        let group_id = value(&self.group_id);
        let artifact_id = value(&self.artifact_id);
        let invalid = |source: ParseError| PomError::InvalidDependency {
            path: path.to_path_buf(),
            dependency: format!("{}:{}", group_id, artifact_id),
            source,
        };

        let mut classifier = self.classifier.as_deref().map(value).unwrap_or_default();
        let packaging = match self.kind.as_deref().map(value).as_deref() {
            None | Some("") => PackagingType::Jar,
            Some("test-jar") => {
                if classifier.is_empty() {
                    classifier = "tests".to_string();
                }
                PackagingType::Jar
            }
            Some(kind) => kind.parse().map_err(|e: ArgumentError| invalid(e.into()))?,
        };
        let scope = ScopeType::from_scope_type(self.scope.as_deref().map(value).as_deref())
            .map_err(|e| invalid(e.into()))?;

        let coordinate = Coordinate::new(
            group_id.clone(),
            artifact_id.clone(),
            self.version.as_deref().map(value),
            packaging,
            classifier,
        )
        .map_err(|e| invalid(e.into()))?;

        let exclusions = self.exclusions.exclusion.into_iter().map(|exclusion| {
            Exclusion::new(
                exclusion.group_id.as_deref().map(value).as_deref(),
                exclusion.artifact_id.as_deref().map(value).as_deref(),
            )
        });

        Ok(Dependency::new(coordinate)
            .with_scope(scope)
            .with_optional(xml::is_true(self.optional.as_deref()))
            .with_exclusions(exclusions))
    }
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap())
}

/// Replaces `${name}` with the named property, leaving unknown placeholders untouched.
pub(crate) fn interpolate(value: &str, properties: &HashMap<String, String>) -> String {
    if !value.contains("${") {
        return value.to_string();
    }
    placeholder()
        .replace_all(value, |captures: &Captures| {
            let name = &captures[1];
            properties
                .get(name)
                .cloned()
                .unwrap_or_else(|| captures[0].to_string())
        })
        .into_owned()
}
