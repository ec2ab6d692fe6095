use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use super::ArgumentError;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PackagingType {
    #[default]
    Jar,
    Pom,
    War,
    Ear,
    Ejb,
    Rar,
    Par,
    MavenPlugin,
}

impl PackagingType {
    pub const ALL: [PackagingType; 8] = [
        PackagingType::Jar,
        PackagingType::Pom,
        PackagingType::War,
        PackagingType::Ear,
        PackagingType::Ejb,
        PackagingType::Rar,
        PackagingType::Par,
        PackagingType::MavenPlugin,
    ];

    /// Looks up a packaging by its Maven token.
    ///
    /// Unlike scopes there is no default here: an absent or empty token is an error.
    pub fn from_packaging_type(value: Option<&str>) -> Result<Self, ArgumentError> {
        let value = match value {
            Some(value) if !value.is_empty() => value,
            _ => return Err(ArgumentError::Empty("packaging")),
        };
        let lowercase = value.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|packaging| packaging.id() == lowercase)
            .ok_or_else(|| ArgumentError::UnknownPackaging(value.to_string()))
    }

    pub fn id(&self) -> &'static str {
        match self {
            PackagingType::Jar => "jar",
            PackagingType::Pom => "pom",
            PackagingType::War => "war",
            PackagingType::Ear => "ear",
            PackagingType::Ejb => "ejb",
            PackagingType::Rar => "rar",
            PackagingType::Par => "par",
            PackagingType::MavenPlugin => "maven-plugin",
        }
    }

    /// File extension of the archive this packaging produces in a repository.
    pub fn extension(&self) -> &'static str {
        match self {
            PackagingType::Ejb | PackagingType::MavenPlugin => "jar",
            other => other.id(),
        }
    }
}

impl FromStr for PackagingType {
    type Err = ArgumentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_packaging_type(Some(value))
    }
}

impl Display for PackagingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn parse_known_tokens() {
        for packaging in PackagingType::ALL {
            assert_eq!(packaging.id().parse::<PackagingType>(), Ok(packaging));
        }
        assert_eq!("WAR".parse::<PackagingType>(), Ok(PackagingType::War));
    }

    #[test]
    fn empty_packaging_is_not_defaulted() {
        assert_eq!(
            PackagingType::from_packaging_type(None),
            Err(ArgumentError::Empty("packaging"))
        );
        assert_eq!(
            PackagingType::from_packaging_type(Some("")),
            Err(ArgumentError::Empty("packaging"))
        );
    }

    #[test]
    fn unknown_packaging() {
        assert_eq!(
            "zip".parse::<PackagingType>(),
            Err(ArgumentError::UnknownPackaging("zip".to_string()))
        );
    }

    #[test]
    fn extensions() {
        assert_eq!(PackagingType::MavenPlugin.extension(), "jar");
        assert_eq!(PackagingType::Ejb.extension(), "jar");
        assert_eq!(PackagingType::War.extension(), "war");
    }
}
