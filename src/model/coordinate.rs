use std::{
    fmt::Display,
    hash::{Hash, Hasher},
    str::FromStr,
};

use super::{ArgumentError, PackagingType, ParseError};

/// Version token meaning "take the version from dependency management".
pub const UNRESOLVED_VERSION: &str = "?";

/// The version-less part of a coordinate. Two coordinates with the same key address the same
/// artifact slot and are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactKey {
    pub group_id: String,
    pub artifact_id: String,
    pub packaging: PackagingType,
    pub classifier: String,
}

impl Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        match (self.packaging, self.classifier.is_empty()) {
            (PackagingType::Jar, true) => Ok(()),
            (packaging, true) => write!(f, ":{}", packaging),
            (packaging, false) => write!(f, ":{}:{}", packaging, self.classifier),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    /// `None` until the version is known, rendered as `?`.
    pub version: Option<String>,
    pub packaging: PackagingType,
    pub classifier: String,
}

impl Coordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: Option<String>,
        packaging: PackagingType,
        classifier: impl Into<String>,
    ) -> Result<Coordinate, ArgumentError> {
        let group_id = group_id.into();
        let artifact_id = artifact_id.into();
        if group_id.is_empty() {
            return Err(ArgumentError::Empty("groupId"));
        }
        if artifact_id.is_empty() {
            return Err(ArgumentError::Empty("artifactId"));
        }
        Ok(Coordinate {
            group_id,
            artifact_id,
            version: normalize_version(version),
            packaging,
            classifier: classifier.into(),
        })
    }

    /// Parses `groupId:artifactId[:packaging[:classifier]]:version`.
    pub fn parse(input: &str) -> Result<Coordinate, ParseError> {
        if input.trim().is_empty() {
            return Err(ArgumentError::Empty("coordinate").into());
        }
        let tokens: Vec<&str> = input.trim().split(':').collect();
        let (group_id, artifact_id, packaging, classifier, version) = match tokens.as_slice() {
            [g, a, v] => (*g, *a, "", "", *v),
            [g, a, p, v] => (*g, *a, *p, "", *v),
            [g, a, p, c, v] => (*g, *a, *p, *c, *v),
            _ => {
                return Err(ParseError::Coordinate {
                    input: input.to_string(),
                    reason: format!("found {} tokens", tokens.len()),
                })
            }
        };

        if group_id.is_empty() || artifact_id.is_empty() {
            return Err(ParseError::Coordinate {
                input: input.to_string(),
                reason: "groupId and artifactId must not be empty".to_string(),
            });
        }

        let packaging = if packaging.is_empty() {
            PackagingType::Jar
        } else {
            packaging
                .parse::<PackagingType>()
                .map_err(|source| ParseError::CoordinateField {
                    input: input.to_string(),
                    source,
                })?
        };

        Ok(Coordinate {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: normalize_version(Some(version.to_string())),
            packaging,
            classifier: classifier.to_string(),
        })
    }

    pub fn key(&self) -> ArtifactKey {
        ArtifactKey {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            packaging: self.packaging,
            classifier: self.classifier.clone(),
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }

    pub fn with_version(&self, version: impl Into<String>) -> Coordinate {
        Coordinate {
            version: normalize_version(Some(version.into())),
            ..self.clone()
        }
    }

    /// `true` when both coordinates name the same group and artifact, whatever the
    /// packaging, classifier or version.
    pub fn same_group_artifact(&self, other: &Coordinate) -> bool {
        self.group_id == other.group_id && self.artifact_id == other.artifact_id
    }

    pub fn is_snapshot(&self) -> bool {
        self.version
            .as_deref()
            .is_some_and(|version| version.ends_with("-SNAPSHOT"))
    }
}

fn normalize_version(version: Option<String>) -> Option<String> {
    version.filter(|v| !v.is_empty() && v != UNRESOLVED_VERSION)
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.packaging == other.packaging
            && self.classifier == other.classifier
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group_id.hash(state);
        self.artifact_id.hash(state);
        self.packaging.hash(state);
        self.classifier.hash(state);
    }
}

impl FromStr for Coordinate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Coordinate::parse(s)
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}",
            self.key(),
            self.version.as_deref().unwrap_or(UNRESOLVED_VERSION)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn coordinate(version: &str, packaging: PackagingType, classifier: &str) -> Coordinate {
        Coordinate::new("g", "a", Some(version.to_string()), packaging, classifier).unwrap()
    }

    #[rstest]
    #[case::gav("g:a:1.0", "jar", "", Some("1.0"))]
    #[case::gatv("g:a:war:1.0", "war", "", Some("1.0"))]
    #[case::gatcv("g:a:war:sources:1.0", "war", "sources", Some("1.0"))]
    #[case::empty_packaging("g:a::tests:1.0", "jar", "tests", Some("1.0"))]
    #[case::unresolved("g:a:?", "jar", "", None)]
    #[case::empty_version("g:a:", "jar", "", None)]
    #[case::plugin("org.apache:plugin:maven-plugin:2.1", "maven-plugin", "", Some("2.1"))]
    fn parse_valid(
        #[case] input: &str,
        #[case] packaging: &str,
        #[case] classifier: &str,
        #[case] version: Option<&str>,
    ) {
        let parsed = Coordinate::parse(input).unwrap();
        assert_eq!(parsed.packaging.id(), packaging);
        assert_eq!(parsed.classifier, classifier);
        assert_eq!(parsed.version(), version);
    }

    #[rstest]
    #[case::too_short("g:a")]
    #[case::too_long("g:a:jar:c:1.0:extra")]
    #[case::no_group(":a:1.0")]
    #[case::no_artifact("g::1.0")]
    #[case::bad_packaging("g:a:zip:1.0")]
    #[case::blank("  ")]
    fn parse_invalid(#[case] input: &str) {
        assert!(Coordinate::parse(input).is_err());
    }

    #[test]
    fn parse_fields() {
        let parsed = Coordinate::parse("g:a:war:sources:1.0").unwrap();
        assert_eq!(parsed.group_id, "g");
        assert_eq!(parsed.artifact_id, "a");
        assert_eq!(parsed.packaging, PackagingType::War);
        assert_eq!(parsed.classifier, "sources");
        assert_eq!(parsed.version(), Some("1.0"));
    }

    #[test]
    fn unknown_packaging_wraps_argument_error() {
        assert_eq!(
            Coordinate::parse("g:a:zip:1.0"),
            Err(ParseError::CoordinateField {
                input: "g:a:zip:1.0".to_string(),
                source: ArgumentError::UnknownPackaging("zip".to_string()),
            })
        );
    }

    #[rstest]
    #[case("g:a:1.0")]
    #[case("g:a:war:1.0")]
    #[case("g:a:jar:tests:1.0")]
    #[case("g:a:?")]
    fn canonical_round_trip(#[case] input: &str) {
        let rendered = Coordinate::parse(input).unwrap().to_string();
        assert_eq!(rendered, input);
        assert_eq!(Coordinate::parse(&rendered).unwrap().to_string(), rendered);
    }

    #[test]
    fn equality_ignores_version() {
        assert_eq!(
            coordinate("1.0", PackagingType::Jar, ""),
            coordinate("2.0", PackagingType::Jar, "")
        );
        assert_ne!(
            coordinate("1.0", PackagingType::Jar, ""),
            coordinate("1.0", PackagingType::War, "")
        );
        assert_ne!(
            coordinate("1.0", PackagingType::Jar, ""),
            coordinate("1.0", PackagingType::Jar, "tests")
        );
        assert_ne!(
            coordinate("1.0", PackagingType::Jar, ""),
            Coordinate::new("g", "b", Some("1.0".into()), PackagingType::Jar, "").unwrap()
        );
    }

    #[test]
    fn new_rejects_empty_fields() {
        assert_eq!(
            Coordinate::new("", "a", None, PackagingType::Jar, ""),
            Err(ArgumentError::Empty("groupId"))
        );
        assert_eq!(
            Coordinate::new("g", "", None, PackagingType::Jar, ""),
            Err(ArgumentError::Empty("artifactId"))
        );
    }

    #[test]
    fn snapshot_detection() {
        assert!(Coordinate::parse("g:a:1.0-SNAPSHOT").unwrap().is_snapshot());
        assert!(!Coordinate::parse("g:a:1.0").unwrap().is_snapshot());
    }
}
