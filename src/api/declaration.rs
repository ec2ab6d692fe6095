use std::collections::BTreeSet;

use crate::model::{Coordinate, Dependency, Exclusion, PackagingType, ScopeType};

use super::{ResolveStage, ResolverError, StrategyStage};

/// Field-by-field dependency declaration.
///
/// Nothing is pending until a field is set. [`and`](Self::and) finishes the pending declaration,
/// if any, and starts over, so chaining never adds empty declarations. The finished declarations
/// reach the resolve stage together in [`done`](Self::done); a chain that fails adds none of them.
///
/// ```no_run
/// # use shrinkwrap_resolver::{api::Resolvers, model::ScopeType};
/// # fn main() -> Result<(), shrinkwrap_resolver::api::ResolverError> {
/// let mut resolver = Resolvers::use_default()?;
/// let files = resolver
///     .declare()
///     .group_id("junit")
///     .artifact_id("junit")
///     .version("4.13.2")
///     .scope(ScopeType::Test)
///     .and()?
///     .coordinate("org.slf4j:slf4j-api:2.0.9")?
///     .resolve()?
///     .with_transitivity()?
///     .as_files()?;
/// # Ok(())
/// # }
/// ```
pub struct DeclarationBuilder<'a> {
    stage: &'a mut ResolveStage,
    finished: Vec<Dependency>,
    pending: Option<PendingDeclaration>,
}

#[derive(Debug, Default)]
struct PendingDeclaration {
    group_id: String,
    artifact_id: String,
    version: Option<String>,
    packaging: PackagingType,
    classifier: String,
    scope: ScopeType,
    optional: bool,
    exclusions: BTreeSet<Exclusion>,
}

impl<'a> DeclarationBuilder<'a> {
    pub(super) fn new(stage: &'a mut ResolveStage) -> Self {
        DeclarationBuilder {
            stage,
            finished: Vec::new(),
            pending: None,
        }
    }

    fn pending(&mut self) -> &mut PendingDeclaration {
        self.pending.get_or_insert_with(PendingDeclaration::default)
    }

    pub fn group_id(mut self, group_id: impl Into<String>) -> Self {
        self.pending().group_id = group_id.into();
        self
    }

    pub fn artifact_id(mut self, artifact_id: impl Into<String>) -> Self {
        self.pending().artifact_id = artifact_id.into();
        self
    }

    /// `?` or an empty version leaves the version to dependency management.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.pending().version = Some(version.into());
        self
    }

    pub fn packaging(mut self, packaging: PackagingType) -> Self {
        self.pending().packaging = packaging;
        self
    }

    pub fn classifier(mut self, classifier: impl Into<String>) -> Self {
        self.pending().classifier = classifier.into();
        self
    }

    pub fn scope(mut self, scope: ScopeType) -> Self {
        self.pending().scope = scope;
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.pending().optional = optional;
        self
    }

    pub fn exclusion(mut self, exclusion: Exclusion) -> Self {
        self.pending().exclusions.insert(exclusion);
        self
    }

    pub fn exclusions(mut self, exclusions: impl IntoIterator<Item = Exclusion>) -> Self {
        self.pending().exclusions.extend(exclusions);
        self
    }

    /// Sets every coordinate field at once from its canonical form.
    pub fn coordinate(mut self, coordinate: &str) -> Result<Self, ResolverError> {
        let coordinate = Coordinate::parse(coordinate)?;
        let pending = self.pending();
        pending.group_id = coordinate.group_id;
        pending.artifact_id = coordinate.artifact_id;
        pending.version = coordinate.version;
        pending.packaging = coordinate.packaging;
        pending.classifier = coordinate.classifier;
        Ok(self)
    }

    /// Finishes the pending declaration and starts a new one.
    pub fn and(mut self) -> Result<Self, ResolverError> {
        self.finish()?;
        Ok(self)
    }

    /// Finishes the pending declaration and returns to the resolve stage.
    pub fn done(mut self) -> Result<&'a mut ResolveStage, ResolverError> {
        self.finish()?;
        self.stage.session.push_dependencies(self.finished);
        Ok(self.stage)
    }

    pub fn resolve(self) -> Result<StrategyStage, ResolverError> {
        Ok(self.done()?.resolve_added())
    }

    fn finish(&mut self) -> Result<(), ResolverError> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        let coordinate = Coordinate::new(
            pending.group_id,
            pending.artifact_id,
            pending.version,
            pending.packaging,
            pending.classifier,
        )?;
        let dependency = Dependency::new(coordinate)
            .with_scope(pending.scope)
            .with_optional(pending.optional)
            .with_exclusions(pending.exclusions);
        let dependency = self.stage.session.complete(dependency)?;
        self.finished.push(dependency);
        Ok(())
    }
}
