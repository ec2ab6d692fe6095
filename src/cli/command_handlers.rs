use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use log::{debug, info};

use crate::{
    api::{ConfigurationStage, FormatStage, Resolvers, StrategyStage},
    embedded::{EmbeddedBuild, EmbeddedBuildError},
    filter::{AcceptScopesStrategy, CombinedStrategy, NonTransitiveStrategy, TransitiveStrategy},
    model::ScopeType,
};

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct CommonOptions {
    pub settings: Option<PathBuf>,
    pub global_settings: Option<PathBuf>,
    pub profiles: Vec<String>,
    pub offline: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub pom: Option<PathBuf>,
    pub local_repository: Option<PathBuf>,
    pub repositories: Vec<(String, String)>,
    pub without_transitivity: bool,
    pub scopes: Vec<ScopeType>,
    pub import_pom_dependencies: bool,
    pub lock_file: Option<PathBuf>,
    pub coordinates: Vec<String>,
}

/// Handler to resolve command
/// Returns the resolved files, in resolution order
pub fn do_resolve(
    common: &CommonOptions,
    options: &ResolveOptions,
) -> anyhow::Result<Vec<PathBuf>> {
    if options.coordinates.is_empty() && !options.import_pom_dependencies {
        bail!("Nothing to resolve, pass coordinates or --import-pom-dependencies");
    }

    let mut configuration = configure(common)?;
    if let Some(local_repository) = &options.local_repository {
        configuration = configuration.local_repository(local_repository);
    }
    for (id, url) in &options.repositories {
        configuration = configuration.with_remote_repo(id, url);
    }
    let mut stage = match &options.pom {
        Some(pom) => configuration
            .load_pom_from_file(pom)
            .with_context(|| format!("Unable to load {}", pom.display()))?,
        None => configuration.into_resolve_stage()?,
    };

    if options.import_pom_dependencies {
        stage.add_pom_dependencies(&[])?;
    }
    for coordinate in &options.coordinates {
        stage.add_coordinate(coordinate)?;
    }
    let resolved = apply_strategy(stage.resolve_added(), options)?;
    let files = resolved.as_files()?;

    if let Some(lock_file) = &options.lock_file {
        write_lock_file(&resolved, lock_file)?;
    }
    Ok(files)
}

fn configure(common: &CommonOptions) -> anyhow::Result<ConfigurationStage> {
    let mut configuration = Resolvers::configure()?;
    configuration = match (&common.global_settings, &common.settings) {
        (Some(global), Some(user)) => configuration.from_files(global, user),
        (None, Some(user)) => configuration.from_file(user),
        (Some(global), None) => configuration.from_global_file(global),
        (None, None) => configuration,
    };
    if common.offline {
        configuration = configuration.work_offline();
    }
    Ok(configuration.active_profiles(common.profiles.iter().cloned()))
}

fn apply_strategy(stage: StrategyStage, options: &ResolveOptions) -> anyhow::Result<FormatStage> {
    let mut strategy = CombinedStrategy::default();
    strategy = if options.without_transitivity {
        strategy.and(NonTransitiveStrategy)
    } else {
        strategy.and(TransitiveStrategy)
    };
    if !options.scopes.is_empty() {
        strategy = strategy.and(AcceptScopesStrategy::new(options.scopes.iter().copied()));
    }
    debug!("Resolving with {:?}", strategy);
    Ok(stage.using(&strategy)?)
}

fn write_lock_file(resolved: &FormatStage, lock_file: &Path) -> anyhow::Result<()> {
    let lock = resolved.as_lock_file();
    std::fs::write(lock_file, lock.to_string()?)
        .with_context(|| format!("Unable to write {}", lock_file.display()))?;
    info!("Wrote lockfile to {}", lock_file.display());
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub directory: PathBuf,
    pub goals: Vec<String>,
    pub properties: Vec<(String, String)>,
    pub ignore_failure: bool,
    pub executable: Option<PathBuf>,
}

/// Handler to build command
/// Prints the build log when the build fails
pub fn do_build(
    common: &CommonOptions,
    options: &BuildOptions,
) -> anyhow::Result<Option<PathBuf>> {
    let mut build = EmbeddedBuild::for_project(&options.directory)?
        .goals(options.goals.iter().cloned())
        .profiles(common.profiles.iter().cloned())
        .offline(common.offline)
        .ignore_failure(options.ignore_failure);
    for (key, value) in &options.properties {
        build = build.property(key, value);
    }
    if let Some(settings) = &common.settings {
        build = build.user_settings(settings);
    }
    if let Some(settings) = &common.global_settings {
        build = build.global_settings(settings);
    }
    if let Some(executable) = &options.executable {
        build = build.executable(executable);
    }

    match build.build() {
        Ok(built) => {
            if built.exit_code != Some(0) {
                eprintln!("{}", built.log);
            }
            match &built.default_archive {
                Some(archive) => info!("Built {}", archive.display()),
                None => info!("Build of {} finished", options.directory.display()),
            }
            Ok(built.default_archive)
        }
        Err(EmbeddedBuildError::Failed { exit_code, log }) => {
            eprintln!("{}", log);
            bail!(
                "Build of {} failed with exit code {:?}",
                options.directory.display(),
                exit_code
            )
        }
        Err(error) => Err(error.into()),
    }
}
