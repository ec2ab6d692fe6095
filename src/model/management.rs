use std::collections::HashMap;

use log::trace;

use super::{ArtifactKey, Dependency};

/// Managed dependencies keyed by group, artifact, packaging and classifier.
///
/// The first entry registered for a key wins; later duplicates are ignored.
#[derive(Debug, Clone, Default)]
pub struct DependencyManagement {
    entries: Vec<Dependency>,
    index: HashMap<ArtifactKey, usize>,
}

impl DependencyManagement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when an entry with the same key is already managed.
    pub fn insert(&mut self, dependency: Dependency) -> bool {
        let key = dependency.key();
        if self.index.contains_key(&key) {
            trace!("Ignoring duplicate managed dependency {}", dependency);
            return false;
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(dependency);
        true
    }

    pub fn get(&self, key: &ArtifactKey) -> Option<&Dependency> {
        self.index.get(key).and_then(|&i| self.entries.get(i))
    }

    pub fn contains(&self, candidate: &Dependency) -> bool {
        self.index.contains_key(&candidate.key())
    }

    pub fn version_of(&self, key: &ArtifactKey) -> Option<&str> {
        self.get(key).and_then(|managed| managed.version())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<Dependency> for DependencyManagement {
    fn extend<T: IntoIterator<Item = Dependency>>(&mut self, iter: T) {
        for dependency in iter {
            self.insert(dependency);
        }
    }
}

impl FromIterator<Dependency> for DependencyManagement {
    fn from_iter<T: IntoIterator<Item = Dependency>>(iter: T) -> Self {
        let mut management = DependencyManagement::new();
        management.extend(iter);
        management
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinate;

    use pretty_assertions::assert_eq;

    fn managed(coordinate: &str) -> Dependency {
        Dependency::new(Coordinate::parse(coordinate).unwrap())
    }

    #[test]
    fn lookup_ignores_version() {
        let management: DependencyManagement = [managed("g:a:1.2.3")].into_iter().collect();
        let key = Coordinate::parse("g:a:?").unwrap().key();
        assert_eq!(management.version_of(&key), Some("1.2.3"));
        assert!(management.contains(&managed("g:a:9.9")));
        assert!(!management.contains(&managed("g:a:war:1.2.3")));
    }

    #[test]
    fn first_entry_wins() {
        let mut management = DependencyManagement::new();
        assert!(management.insert(managed("g:a:1.0")));
        assert!(!management.insert(managed("g:a:2.0")));
        assert_eq!(management.len(), 1);
        assert_eq!(
            management.version_of(&Coordinate::parse("g:a:?").unwrap().key()),
            Some("1.0")
        );
    }
}
