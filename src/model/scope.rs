use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use super::ArgumentError;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ScopeType {
    #[default]
    Compile,
    Provided,
    Runtime,
    Test,
    System,
    Import,
}

impl ScopeType {
    pub const ALL: [ScopeType; 6] = [
        ScopeType::Compile,
        ScopeType::Provided,
        ScopeType::Runtime,
        ScopeType::Test,
        ScopeType::System,
        ScopeType::Import,
    ];

    /// Absent or empty scopes are `compile`, anything else must be a known token.
    pub fn from_scope_type(value: Option<&str>) -> Result<Self, ArgumentError> {
        let value = match value {
            Some(value) if !value.is_empty() => value,
            _ => return Ok(ScopeType::Compile),
        };
        let lowercase = value.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|scope| scope.id() == lowercase)
            .ok_or_else(|| ArgumentError::UnknownScope(value.to_string()))
    }

    pub fn id(&self) -> &'static str {
        match self {
            ScopeType::Compile => "compile",
            ScopeType::Provided => "provided",
            ScopeType::Runtime => "runtime",
            ScopeType::Test => "test",
            ScopeType::System => "system",
            ScopeType::Import => "import",
        }
    }

    /// Scope a dependency reached through a parent of scope `self` ends up with, or `None` when
    /// a dependency declared with `declared` is not followed transitively at all.
    pub fn derive_transitive(&self, declared: ScopeType) -> Option<ScopeType> {
        match declared {
            ScopeType::Provided | ScopeType::Test | ScopeType::System | ScopeType::Import => None,
            ScopeType::Compile => Some(*self),
            ScopeType::Runtime => match self {
                ScopeType::Compile => Some(ScopeType::Runtime),
                other => Some(*other),
            },
        }
    }
}

impl FromStr for ScopeType {
    type Err = ArgumentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_scope_type(Some(value))
    }
}

impl Display for ScopeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn empty_scope_defaults_to_compile() {
        assert_eq!(ScopeType::from_scope_type(None), Ok(ScopeType::Compile));
        assert_eq!(ScopeType::from_scope_type(Some("")), Ok(ScopeType::Compile));
    }

    #[test]
    fn unknown_scope() {
        assert_eq!(
            ScopeType::from_scope_type(Some("bogus")),
            Err(ArgumentError::UnknownScope("bogus".to_string()))
        );
    }

    #[test]
    fn known_scopes() {
        assert_eq!("test".parse::<ScopeType>(), Ok(ScopeType::Test));
        assert_eq!("Provided".parse::<ScopeType>(), Ok(ScopeType::Provided));
        assert_eq!(ScopeType::Import.to_string(), "import");
    }

    #[test]
    fn transitive_scope_derivation() {
        assert_eq!(
            ScopeType::Compile.derive_transitive(ScopeType::Compile),
            Some(ScopeType::Compile)
        );
        assert_eq!(
            ScopeType::Compile.derive_transitive(ScopeType::Runtime),
            Some(ScopeType::Runtime)
        );
        assert_eq!(
            ScopeType::Test.derive_transitive(ScopeType::Runtime),
            Some(ScopeType::Test)
        );
        assert_eq!(
            ScopeType::Runtime.derive_transitive(ScopeType::Compile),
            Some(ScopeType::Runtime)
        );
        assert_eq!(ScopeType::Compile.derive_transitive(ScopeType::Test), None);
        assert_eq!(ScopeType::Compile.derive_transitive(ScopeType::Provided), None);
    }
}
