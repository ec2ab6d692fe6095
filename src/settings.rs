use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    resolver::RemoteRepository,
    xml::{self, RawActivation, RawRepositories},
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings file {0} does not exist")]
    NotFound(PathBuf),
    #[error("Settings file {path} cannot be read: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Settings file {path} is not a valid settings.xml, root element is {found:?}")]
    WrongRoot { path: PathBuf, found: Option<String> },
    #[error("Failed to parse settings file {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: serde_xml_rs::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub local_repository: Option<PathBuf>,
    pub offline: bool,
    pub profiles: Vec<SettingsProfile>,
    pub active_profiles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsProfile {
    pub id: String,
    pub active_by_default: bool,
    pub repositories: Vec<RemoteRepository>,
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Settings, SettingsError> {
        debug!("Loading settings from {}", path.display());
        if !path.is_file() {
            return Err(SettingsError::NotFound(path.to_path_buf()));
        }
        let contents =
            std::fs::read_to_string(path).map_err(|source| SettingsError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&contents, path)
    }

    pub fn from_xml_str(contents: &str) -> Result<Settings, SettingsError> {
        Self::parse(contents, Path::new("<memory>"))
    }

    fn parse(contents: &str, path: &Path) -> Result<Settings, SettingsError> {
        match xml::root_element(contents) {
            Some("settings") => {}
            found => {
                return Err(SettingsError::WrongRoot {
                    path: path.to_path_buf(),
                    found: found.map(str::to_string),
                })
            }
        }
        let raw: RawSettings =
            serde_xml_rs::from_str(contents).map_err(|source| SettingsError::Xml {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(raw.into())
    }

    /// Layers `user` over `global`: scalar values of `user` win, profiles are concatenated.
    pub fn merge(global: Settings, user: Settings) -> Settings {
        let mut profiles = user.profiles;
        for profile in global.profiles {
            if !profiles.iter().any(|p| p.id == profile.id) {
                profiles.push(profile);
            }
        }
        let mut active_profiles = user.active_profiles;
        for id in global.active_profiles {
            if !active_profiles.contains(&id) {
                active_profiles.push(id);
            }
        }
        Settings {
            local_repository: user.local_repository.or(global.local_repository),
            offline: user.offline || global.offline,
            profiles,
            active_profiles,
        }
    }

    /// Repositories of the profiles active by settings, by default, or listed in `extra_profiles`.
    pub fn remote_repositories(&self, extra_profiles: &[String]) -> Vec<RemoteRepository> {
        let mut repositories: Vec<RemoteRepository> = Vec::new();
        for profile in &self.profiles {
            let active = profile.active_by_default
                || self.active_profiles.contains(&profile.id)
                || extra_profiles.contains(&profile.id);
            if !active {
                continue;
            }
            for repository in &profile.repositories {
                if !repositories.iter().any(|r| r.id == repository.id) {
                    repositories.push(repository.clone());
                }
            }
        }
        repositories
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSettings {
    local_repository: Option<String>,
    offline: Option<String>,
    #[serde(default)]
    profiles: RawProfiles,
    #[serde(default)]
    active_profiles: RawActiveProfiles,
}

#[derive(Debug, Default, Deserialize)]
struct RawProfiles {
    #[serde(default)]
    profile: Vec<RawProfile>,
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    id: String,
    #[serde(default)]
    activation: RawActivation,
    #[serde(default)]
    repositories: RawRepositories,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActiveProfiles {
    #[serde(default)]
    active_profile: Vec<String>,
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        Settings {
            local_repository: raw
                .local_repository
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            offline: xml::is_true(raw.offline.as_deref()),
            profiles: raw
                .profiles
                .profile
                .into_iter()
                .map(|p| SettingsProfile {
                    id: p.id.trim().to_string(),
                    active_by_default: xml::is_true(p.activation.active_by_default.as_deref()),
                    repositories: p.repositories.into_repositories(),
                })
                .collect(),
            active_profiles: raw
                .active_profiles
                .active_profile
                .into_iter()
                .map(|id| id.trim().to_string())
                .collect(),
        }
    }
}
