use std::sync::Arc;

use log::debug;
use thiserror::Error;

use crate::{
    config::ResolverConfig,
    filter::{NonTransitiveStrategy, ResolutionStrategy, TransitiveStrategy},
    model::{ArgumentError, Coordinate, Dependency, ParseError, ScopeType},
    pom::PomError,
    resolver::{ResolutionEngine, ResolutionError},
    session::{BuildError, WorkingSession},
    settings::SettingsError,
};

mod builder;
mod declaration;
mod format;

pub use builder::ConfigurationStage;
pub use declaration::DeclarationBuilder;
pub use format::{
    FileFormatProcessor, FormatError, FormatProcessor, FormatStage, ReaderFormatProcessor,
    ResolvedArtifactFormatProcessor,
};

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Pom(#[from] PomError),
    #[error("Invalid resolver configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("No POM file was loaded, load one with `load_pom_from_file` first")]
    NoPomLoaded,
}

/// Entry point of the staged API.
pub struct Resolvers;

impl Resolvers {
    /// Starts configuring a resolver from the environment (`SHRINKWRAP_*`, `shrinkwrap.toml`).
    pub fn configure() -> Result<ConfigurationStage, ResolverError> {
        Ok(ConfigurationStage::from_config(ResolverConfig::load()?))
    }

    pub fn configure_with(config: ResolverConfig) -> ConfigurationStage {
        ConfigurationStage::from_config(config)
    }

    /// A resolver with the environment's configuration and nothing else.
    pub fn use_default() -> Result<ResolveStage, ResolverError> {
        Self::configure()?.into_resolve_stage()
    }
}

/// Declares what to resolve. Every resolution starts from the session's persistent state and
/// takes the declarations added so far with it, leaving the stage ready for the next one.
#[derive(Clone)]
pub struct ResolveStage {
    session: WorkingSession,
    engine: Arc<dyn ResolutionEngine>,
}

impl ResolveStage {
    pub(crate) fn new(session: WorkingSession, engine: Arc<dyn ResolutionEngine>) -> Self {
        ResolveStage { session, engine }
    }

    pub fn session(&self) -> &WorkingSession {
        &self.session
    }

    pub fn resolve(&mut self, coordinate: &str) -> Result<StrategyStage, ResolverError> {
        self.add_coordinate(coordinate)?;
        Ok(self.resolve_added())
    }

    pub fn resolve_all<S: AsRef<str>>(
        &mut self,
        coordinates: &[S],
    ) -> Result<StrategyStage, ResolverError> {
        if coordinates.is_empty() {
            return Err(ArgumentError::Empty("coordinates").into());
        }
        let dependencies = coordinates
            .iter()
            .map(|coordinate| Coordinate::parse(coordinate.as_ref()).map(Dependency::new))
            .collect::<Result<Vec<_>, _>>()?;
        self.add_dependencies(dependencies)?;
        Ok(self.resolve_added())
    }

    /// Resolves the dependencies added with [`add_dependency`](Self::add_dependency) or
    /// [`declare`](Self::declare).
    pub fn resolve_added(&mut self) -> StrategyStage {
        let dependencies = self.session.take_pending();
        StrategyStage {
            session: self.session.clone(),
            engine: Arc::clone(&self.engine),
            dependencies,
        }
    }

    pub fn add_dependency(&mut self, dependency: Dependency) -> Result<&mut Self, ResolverError> {
        let dependency = self.session.complete(dependency)?;
        self.session.push_dependency(dependency);
        Ok(self)
    }

    /// Adds all of `dependencies` or, when one of them fails, none.
    pub fn add_dependencies(
        &mut self,
        dependencies: impl IntoIterator<Item = Dependency>,
    ) -> Result<&mut Self, ResolverError> {
        let completed = dependencies
            .into_iter()
            .map(|dependency| self.session.complete(dependency))
            .collect::<Result<Vec<_>, _>>()?;
        self.session.push_dependencies(completed);
        Ok(self)
    }

    pub fn declare(&mut self) -> DeclarationBuilder<'_> {
        DeclarationBuilder::new(self)
    }

    /// Resolves the POM's `compile`, `runtime` and `system` dependencies.
    pub fn import_compile_and_runtime_dependencies(
        &mut self,
    ) -> Result<StrategyStage, ResolverError> {
        self.import_dependencies(&[ScopeType::Compile, ScopeType::Runtime, ScopeType::System])
    }

    pub fn import_runtime_dependencies(&mut self) -> Result<StrategyStage, ResolverError> {
        self.import_dependencies(&[ScopeType::Runtime])
    }

    pub fn import_test_dependencies(&mut self) -> Result<StrategyStage, ResolverError> {
        self.import_dependencies(&[ScopeType::Test])
    }

    /// Resolves the POM's dependencies declared in any of `scopes`, every scope when empty.
    pub fn import_dependencies(
        &mut self,
        scopes: &[ScopeType],
    ) -> Result<StrategyStage, ResolverError> {
        self.add_pom_dependencies(scopes)?;
        Ok(self.resolve_added())
    }

    /// Adds the POM's dependencies declared in any of `scopes`, every scope when empty.
    pub fn add_pom_dependencies(
        &mut self,
        scopes: &[ScopeType],
    ) -> Result<&mut Self, ResolverError> {
        let pom = self.session.pom().ok_or(ResolverError::NoPomLoaded)?;
        let imported: Vec<Dependency> = pom.dependencies_in_scopes(scopes).cloned().collect();
        debug!(
            "Importing {} dependencies from {}",
            imported.len(),
            pom.path.display()
        );
        self.add_dependencies(imported)
    }

    /// Version `coordinate` resolves to, through dependency management first and the engine
    /// otherwise.
    pub fn resolve_version(&self, coordinate: &str) -> Result<String, ResolverError> {
        let coordinate = Coordinate::parse(coordinate)?;
        let coordinate = match self.session.complete(Dependency::new(coordinate.clone())) {
            Ok(completed) => completed.coordinate,
            Err(BuildError::UnresolvedVersion(_)) => coordinate,
            Err(error) => return Err(error.into()),
        };
        let repositories = if self.session.is_offline() {
            Vec::new()
        } else {
            self.session.remote_repositories()
        };
        Ok(self.engine.resolve_version(&coordinate, &repositories)?)
    }

    /// Adds a `compile` dependency on `coordinate`, resolved with the next resolution.
    pub fn add_coordinate(&mut self, coordinate: &str) -> Result<&mut Self, ResolverError> {
        self.add_dependency(Dependency::new(Coordinate::parse(coordinate)?))
    }
}

/// Picks how the declared dependencies are expanded into a graph.
pub struct StrategyStage {
    session: WorkingSession,
    engine: Arc<dyn ResolutionEngine>,
    dependencies: Vec<Dependency>,
}

impl StrategyStage {
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn with_transitivity(self) -> Result<FormatStage, ResolverError> {
        self.using(&TransitiveStrategy)
    }

    pub fn without_transitivity(self) -> Result<FormatStage, ResolverError> {
        self.using(&NonTransitiveStrategy)
    }

    pub fn using(self, strategy: &dyn ResolutionStrategy) -> Result<FormatStage, ResolverError> {
        let requested = self
            .dependencies
            .iter()
            .map(|dependency| dependency.coordinate.to_string())
            .collect();
        let filter = strategy.resolution_filter();
        debug!(
            "Resolving {} dependencies using {:?}",
            self.dependencies.len(),
            strategy
        );
        let request = self.session.collect_request(self.dependencies);
        let artifacts = self.engine.resolve(&request, filter.as_ref())?;
        Ok(FormatStage::new(requested, artifacts))
    }
}
