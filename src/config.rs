use std::{collections::HashMap, path::PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use home::home_dir;
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "shrinkwrap.toml";

/// Where settings and repositories come from, instead of process-wide properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Explicitly configured user settings; a missing file is an error.
    pub user_settings: Option<PathBuf>,
    pub global_settings: Option<PathBuf>,
    pub local_repository: Option<PathBuf>,
    pub offline: bool,
}

impl ResolverConfig {
    /// Reads `shrinkwrap.toml` from the working directory, if present, overridden by
    /// `SHRINKWRAP_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(RawConfig::load(None, Some(CONFIG_FILE_NAME))?.into())
    }

    /// `$HOME/.m2/settings.xml`, picked up when it exists and no settings are configured.
    pub fn default_user_settings() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".m2").join("settings.xml"))
    }

    pub fn default_local_repository() -> PathBuf {
        match home_dir() {
            Some(home) => home.join(".m2").join("repository"),
            None => PathBuf::from(".m2").join("repository"),
        }
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    settings: SettingsConfig,
    #[serde(default)]
    repository: RepositoryConfig,
    offline: Option<bool>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct SettingsConfig {
    user: Option<PathBuf>,
    global: Option<PathBuf>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RepositoryConfig {
    local: Option<PathBuf>,
}

impl RawConfig {
    fn load(
        env: Option<HashMap<String, String>>,
        file: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(File::new(file, FileFormat::Toml).required(false));
        }
        builder
            .add_source(
                Environment::with_prefix("SHRINKWRAP")
                    .separator("_")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}

impl From<RawConfig> for ResolverConfig {
    fn from(raw: RawConfig) -> Self {
        ResolverConfig {
            user_settings: raw.settings.user,
            global_settings: raw.settings.global,
            local_repository: raw.repository.local,
            offline: raw.offline.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn load_empty() {
        let env = HashMap::from([]);
        let config = RawConfig::load(Some(env), None).unwrap();
        assert_eq!(config, RawConfig::default());
        assert_eq!(ResolverConfig::from(config), ResolverConfig::default());
    }

    #[test]
    fn load_environment() {
        let env = HashMap::from([
            (
                "SHRINKWRAP_SETTINGS_USER".to_owned(),
                "/home/me/settings.xml".to_owned(),
            ),
            ("SHRINKWRAP_REPOSITORY_LOCAL".to_owned(), "/m2".to_owned()),
            ("SHRINKWRAP_OFFLINE".to_owned(), "true".to_owned()),
        ]);
        let config = ResolverConfig::from(RawConfig::load(Some(env), None).unwrap());
        assert_eq!(
            config,
            ResolverConfig {
                user_settings: Some("/home/me/settings.xml".into()),
                global_settings: None,
                local_repository: Some("/m2".into()),
                offline: true,
            }
        )
    }

    #[test]
    fn load_file() {
        let directory = tempfile::tempdir().unwrap();
        let file = directory.path().join("shrinkwrap.toml");
        std::fs::write(
            &file,
            "offline = true\n[repository]\nlocal = \"/from/file\"\n",
        )
        .unwrap();
        let env = HashMap::from([("SHRINKWRAP_REPOSITORY_LOCAL".to_owned(), "/env".to_owned())]);
        let config = RawConfig::load(Some(env), file.to_str()).unwrap();
        assert_eq!(config.offline, Some(true));
        assert_eq!(config.repository.local, Some(PathBuf::from("/env")));
    }
}
