use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::debug;

use crate::{
    config::ResolverConfig,
    resolver::{LocalRepositoryEngine, RemoteRepository, ResolutionEngine},
    session::WorkingSession,
    settings::Settings,
};

use super::{ResolveStage, ResolverError};

/// First stage: where settings, repositories and the resolution engine come from.
#[derive(Default)]
pub struct ConfigurationStage {
    user_settings: Option<PathBuf>,
    global_settings: Option<PathBuf>,
    local_repository: Option<PathBuf>,
    offline: Option<bool>,
    use_maven_central: Option<bool>,
    remote_repositories: Vec<RemoteRepository>,
    profiles: Vec<String>,
    engine: Option<Arc<dyn ResolutionEngine>>,
    // Settings picked up implicitly are skipped when missing.
    implicit_user_settings: Option<PathBuf>,
}

impl ConfigurationStage {
    pub fn from_config(config: ResolverConfig) -> Self {
        let implicit_user_settings = match config.user_settings {
            Some(_) => None,
            None => ResolverConfig::default_user_settings(),
        };
        ConfigurationStage {
            user_settings: config.user_settings,
            global_settings: config.global_settings,
            local_repository: config.local_repository,
            offline: config.offline.then_some(true),
            implicit_user_settings,
            ..Default::default()
        }
    }

    /// User settings.xml to load.
    pub fn from_file(mut self, user_settings: impl Into<PathBuf>) -> Self {
        self.user_settings = Some(user_settings.into());
        self.implicit_user_settings = None;
        self
    }

    pub fn from_global_file(mut self, global_settings: impl Into<PathBuf>) -> Self {
        self.global_settings = Some(global_settings.into());
        self
    }

    pub fn from_files(
        self,
        global_settings: impl Into<PathBuf>,
        user_settings: impl Into<PathBuf>,
    ) -> Self {
        self.from_global_file(global_settings).from_file(user_settings)
    }

    /// Local repository directory.
    ///
    /// Defaults to the settings' `localRepository`, then `$HOME/.m2/repository`.
    pub fn local_repository(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_repository = Some(path.into());
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = Some(offline);
        self
    }

    pub fn work_offline(self) -> Self {
        self.offline(true)
    }

    pub fn with_remote_repo(mut self, id: impl Into<String>, url: impl Into<String>) -> Self {
        self.remote_repositories.push(RemoteRepository::new(id, url));
        self
    }

    pub fn with_maven_central_repo(mut self, use_maven_central: bool) -> Self {
        self.use_maven_central = Some(use_maven_central);
        self
    }

    /// Settings and POM profiles to activate in addition to the ones active by default.
    pub fn active_profiles<S: Into<String>>(
        mut self,
        profiles: impl IntoIterator<Item = S>,
    ) -> Self {
        self.profiles = profiles.into_iter().map(Into::into).collect();
        self
    }

    /// Resolution engine to use instead of the local repository engine.
    pub fn engine(mut self, engine: Arc<dyn ResolutionEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn load_pom_from_file(
        self,
        path: impl AsRef<Path>,
    ) -> Result<ResolveStage, ResolverError> {
        let profiles = self.profiles.clone();
        let mut stage = self.into_resolve_stage()?;
        stage.session.load_pom(path.as_ref(), &profiles)?;
        Ok(stage)
    }

    pub fn load_pom_from_file_with_profiles<S: Into<String>>(
        self,
        path: impl AsRef<Path>,
        profiles: impl IntoIterator<Item = S>,
    ) -> Result<ResolveStage, ResolverError> {
        self.active_profiles(profiles).load_pom_from_file(path)
    }

    pub fn into_resolve_stage(self) -> Result<ResolveStage, ResolverError> {
        let Self {
            user_settings,
            global_settings,
            local_repository,
            offline,
            use_maven_central,
            remote_repositories,
            profiles,
            engine,
            implicit_user_settings,
        } = self;

        let global = global_settings
            .map(|path| Settings::from_file(&path))
            .transpose()?
            .unwrap_or_default();
        let user = match (user_settings, implicit_user_settings) {
            (Some(path), _) => Settings::from_file(&path)?,
            (None, Some(path)) if path.is_file() => Settings::from_file(&path)?,
            _ => Settings::default(),
        };
        let settings = Settings::merge(global, user);

        let local_repository = local_repository
            .or_else(|| settings.local_repository.clone())
            .unwrap_or_else(ResolverConfig::default_local_repository);
        debug!("Using local repository {}", local_repository.display());

        let engine = engine
            .unwrap_or_else(|| Arc::new(LocalRepositoryEngine::new(local_repository.clone())));

        let mut session = WorkingSession::new(settings, local_repository);
        if let Some(offline) = offline {
            session.set_offline(offline);
        }
        if let Some(use_maven_central) = use_maven_central {
            session.set_use_maven_central(use_maven_central);
        }
        for repository in remote_repositories {
            session.add_remote_repository(repository);
        }
        session.set_active_profiles(profiles);

        Ok(ResolveStage::new(session, engine))
    }
}
