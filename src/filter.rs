use std::{collections::BTreeSet, fmt::Debug};

use crate::model::{Coordinate, Dependency, ScopeType};

/// Decides whether a node of the dependency graph ends up in the resolution result.
///
/// `declared` holds the dependencies the resolution was started from, `ancestors` the path from
/// the declared root down to the candidate's parent (empty for declared dependencies).
pub trait ResolutionFilter: Debug + Send + Sync {
    fn accepts(&self, candidate: &Dependency, declared: &[Dependency], ancestors: &[Dependency])
        -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl ResolutionFilter for AcceptAllFilter {
    fn accepts(&self, _: &Dependency, _: &[Dependency], _: &[Dependency]) -> bool {
        true
    }
}

/// Keeps only the dependencies that were declared directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonTransitiveFilter;

impl ResolutionFilter for NonTransitiveFilter {
    fn accepts(&self, _: &Dependency, _: &[Dependency], ancestors: &[Dependency]) -> bool {
        ancestors.is_empty()
    }
}

/// Keeps dependencies whose scope is in the accepted set. `compile` implies `runtime`, and an
/// empty set accepts everything.
#[derive(Debug, Clone, Default)]
pub struct ScopeFilter {
    accepted: BTreeSet<ScopeType>,
}

impl ScopeFilter {
    pub fn new(scopes: impl IntoIterator<Item = ScopeType>) -> Self {
        let mut accepted: BTreeSet<ScopeType> = scopes.into_iter().collect();
        if accepted.contains(&ScopeType::Compile) {
            accepted.insert(ScopeType::Runtime);
        }
        ScopeFilter { accepted }
    }

    pub fn accepted(&self) -> &BTreeSet<ScopeType> {
        &self.accepted
    }
}

impl ResolutionFilter for ScopeFilter {
    fn accepts(&self, candidate: &Dependency, _: &[Dependency], _: &[Dependency]) -> bool {
        self.accepted.is_empty() || self.accepted.contains(&candidate.scope)
    }
}

/// Drops the listed group/artifact pairs, and with `reject_transitives` everything reached
/// through them.
#[derive(Debug, Clone)]
pub struct RejectDependenciesFilter {
    rejected: Vec<Coordinate>,
    reject_transitives: bool,
}

impl RejectDependenciesFilter {
    pub fn new(rejected: Vec<Coordinate>, reject_transitives: bool) -> Self {
        RejectDependenciesFilter {
            rejected,
            reject_transitives,
        }
    }

    fn is_rejected(&self, dependency: &Dependency) -> bool {
        self.rejected
            .iter()
            .any(|rejected| rejected.same_group_artifact(&dependency.coordinate))
    }
}

impl ResolutionFilter for RejectDependenciesFilter {
    fn accepts(&self, candidate: &Dependency, _: &[Dependency], ancestors: &[Dependency]) -> bool {
        if self.is_rejected(candidate) {
            return false;
        }
        !(self.reject_transitives && ancestors.iter().any(|ancestor| self.is_rejected(ancestor)))
    }
}

/// Logical AND of its filters, evaluated in order and stopping at the first rejection.
#[derive(Debug, Default)]
pub struct CombinedFilter {
    filters: Vec<Box<dyn ResolutionFilter>>,
}

impl CombinedFilter {
    pub fn new(filters: Vec<Box<dyn ResolutionFilter>>) -> Self {
        CombinedFilter { filters }
    }

    pub fn and(mut self, filter: impl ResolutionFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }
}

impl ResolutionFilter for CombinedFilter {
    fn accepts(
        &self,
        candidate: &Dependency,
        declared: &[Dependency],
        ancestors: &[Dependency],
    ) -> bool {
        self.filters
            .iter()
            .all(|filter| filter.accepts(candidate, declared, ancestors))
    }
}

/// Produces the filter a resolution runs with.
pub trait ResolutionStrategy: Debug + Send + Sync {
    fn resolution_filter(&self) -> Box<dyn ResolutionFilter>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransitiveStrategy;

impl ResolutionStrategy for TransitiveStrategy {
    fn resolution_filter(&self) -> Box<dyn ResolutionFilter> {
        Box::new(AcceptAllFilter)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NonTransitiveStrategy;

impl ResolutionStrategy for NonTransitiveStrategy {
    fn resolution_filter(&self) -> Box<dyn ResolutionFilter> {
        Box::new(NonTransitiveFilter)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AcceptScopesStrategy {
    scopes: Vec<ScopeType>,
}

impl AcceptScopesStrategy {
    pub fn new(scopes: impl IntoIterator<Item = ScopeType>) -> Self {
        AcceptScopesStrategy {
            scopes: scopes.into_iter().collect(),
        }
    }
}

impl ResolutionStrategy for AcceptScopesStrategy {
    fn resolution_filter(&self) -> Box<dyn ResolutionFilter> {
        Box::new(ScopeFilter::new(self.scopes.iter().copied()))
    }
}

#[derive(Debug, Clone)]
pub struct RejectDependenciesStrategy {
    rejected: Vec<Coordinate>,
    reject_transitives: bool,
}

impl RejectDependenciesStrategy {
    pub fn new(rejected: Vec<Coordinate>) -> Self {
        RejectDependenciesStrategy {
            rejected,
            reject_transitives: true,
        }
    }

    pub fn reject_transitives(mut self, reject_transitives: bool) -> Self {
        self.reject_transitives = reject_transitives;
        self
    }
}

impl ResolutionStrategy for RejectDependenciesStrategy {
    fn resolution_filter(&self) -> Box<dyn ResolutionFilter> {
        Box::new(RejectDependenciesFilter::new(
            self.rejected.clone(),
            self.reject_transitives,
        ))
    }
}

#[derive(Debug, Default)]
pub struct CombinedStrategy {
    strategies: Vec<Box<dyn ResolutionStrategy>>,
}

impl CombinedStrategy {
    pub fn new(strategies: Vec<Box<dyn ResolutionStrategy>>) -> Self {
        CombinedStrategy { strategies }
    }

    pub fn and(mut self, strategy: impl ResolutionStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }
}

impl ResolutionStrategy for CombinedStrategy {
    fn resolution_filter(&self) -> Box<dyn ResolutionFilter> {
        Box::new(CombinedFilter::new(
            self.strategies
                .iter()
                .map(|strategy| strategy.resolution_filter())
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn dep(coordinate: &str, scope: ScopeType) -> Dependency {
        Dependency::new(Coordinate::parse(coordinate).unwrap()).with_scope(scope)
    }

    #[test]
    fn non_transitive_accepts_roots_only() {
        let root = dep("g:root:1", ScopeType::Compile);
        let child = dep("g:child:1", ScopeType::Compile);
        let declared = vec![root.clone()];
        assert!(NonTransitiveFilter.accepts(&root, &declared, &[]));
        assert!(!NonTransitiveFilter.accepts(&child, &declared, &[root]));
    }

    #[test]
    fn scope_filter_compile_implies_runtime() {
        let filter = ScopeFilter::new([ScopeType::Compile]);
        assert!(filter.accepts(&dep("g:a:1", ScopeType::Runtime), &[], &[]));
        assert!(filter.accepts(&dep("g:a:1", ScopeType::Compile), &[], &[]));
        assert!(!filter.accepts(&dep("g:a:1", ScopeType::Test), &[], &[]));
        assert_eq!(filter.accepted().len(), 2);
    }

    #[test]
    fn empty_scope_filter_accepts_everything() {
        let filter = ScopeFilter::new(Vec::<ScopeType>::new());
        for scope in ScopeType::ALL {
            assert!(filter.accepts(&dep("g:a:1", scope), &[], &[]));
        }
    }

    #[test]
    fn combined_filter_requires_all() {
        let filter = CombinedFilter::default()
            .and(NonTransitiveFilter)
            .and(ScopeFilter::new([ScopeType::Test]));
        let root = dep("g:root:1", ScopeType::Test);
        let declared = vec![root.clone()];

        assert!(filter.accepts(&root, &declared, &[]));
        assert!(!filter.accepts(&dep("g:c:1", ScopeType::Test), &declared, &[root.clone()]));
        assert!(!filter.accepts(&dep("g:d:1", ScopeType::Compile), &declared, &[]));
    }

    #[derive(Debug, Default)]
    struct CountingFilter {
        calls: std::sync::atomic::AtomicUsize,
    }

    impl ResolutionFilter for &'static CountingFilter {
        fn accepts(&self, _: &Dependency, _: &[Dependency], _: &[Dependency]) -> bool {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            true
        }
    }

    #[test]
    fn combined_filter_short_circuits() {
        let counter: &'static CountingFilter = Box::leak(Box::new(CountingFilter::default()));
        let filter = CombinedFilter::default()
            .and(ScopeFilter::new([ScopeType::Test]))
            .and(counter);
        assert!(!filter.accepts(&dep("g:a:1", ScopeType::Compile), &[], &[]));
        assert_eq!(counter.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(filter.accepts(&dep("g:a:1", ScopeType::Test), &[], &[]));
        assert_eq!(counter.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn reject_dependencies_and_their_subtree() {
        let rejected = dep("g:rejected:1", ScopeType::Compile);
        let filter = RejectDependenciesStrategy::new(vec![rejected.coordinate.clone()])
            .resolution_filter();
        assert!(!filter.accepts(&rejected, &[], &[]));
        assert!(!filter.accepts(&dep("g:child:1", ScopeType::Compile), &[], &[rejected.clone()]));
        assert!(filter.accepts(&dep("g:other:1", ScopeType::Compile), &[], &[]));

        let shallow = RejectDependenciesStrategy::new(vec![rejected.coordinate.clone()])
            .reject_transitives(false)
            .resolution_filter();
        assert!(shallow.accepts(&dep("g:child:1", ScopeType::Compile), &[], &[rejected]));
    }

    #[test]
    fn combined_strategy() {
        let strategy = CombinedStrategy::default()
            .and(NonTransitiveStrategy)
            .and(AcceptScopesStrategy::new([ScopeType::Test]));
        let filter = strategy.resolution_filter();
        let root = dep("g:root:1", ScopeType::Test);
        assert!(filter.accepts(&root, &[], &[]));
        assert!(!filter.accepts(&dep("g:a:1", ScopeType::Test), &[], &[root]));
    }
}
