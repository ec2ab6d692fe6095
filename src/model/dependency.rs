use std::{
    collections::BTreeSet,
    fmt::Display,
    hash::{Hash, Hasher},
};

use super::{ArtifactKey, Coordinate, Exclusion, ScopeType};

/// A coordinate together with the way it is depended upon.
///
/// Equality and hashing follow [`Coordinate`]: only group, artifact, packaging and classifier
/// are compared, which is what dependency management lookups rely on.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub coordinate: Coordinate,
    pub scope: ScopeType,
    pub optional: bool,
    pub exclusions: BTreeSet<Exclusion>,
}

impl Dependency {
    pub fn new(coordinate: Coordinate) -> Dependency {
        Dependency {
            coordinate,
            scope: ScopeType::Compile,
            optional: false,
            exclusions: BTreeSet::new(),
        }
    }

    pub fn with_scope(mut self, scope: ScopeType) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_exclusions(mut self, exclusions: impl IntoIterator<Item = Exclusion>) -> Self {
        self.exclusions.extend(exclusions);
        self
    }

    pub fn key(&self) -> ArtifactKey {
        self.coordinate.key()
    }

    pub fn version(&self) -> Option<&str> {
        self.coordinate.version()
    }

    pub fn is_excluded(&self, coordinate: &Coordinate) -> bool {
        self.exclusions
            .iter()
            .any(|exclusion| exclusion.matches(coordinate))
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.coordinate == other.coordinate
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coordinate.hash(state);
    }
}

impl Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.coordinate, self.scope)?;
        if self.optional {
            f.write_str(" (optional)")?;
        }
        Ok(())
    }
}
