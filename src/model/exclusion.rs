use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{ArgumentError, Coordinate, ParseError};

pub const WILDCARD: &str = "*";

/// Suppresses transitively reached dependencies matching a group/artifact pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

impl Exclusion {
    /// Missing or empty parts become the `*` wildcard.
    pub fn new(group_id: Option<&str>, artifact_id: Option<&str>) -> Exclusion {
        Exclusion {
            group_id: or_wildcard(group_id),
            artifact_id: or_wildcard(artifact_id),
        }
    }

    pub fn parse(input: &str) -> Result<Exclusion, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ArgumentError::Empty("exclusion").into());
        }
        match input.split(':').collect::<Vec<_>>().as_slice() {
            [group_id, artifact_id] => Ok(Exclusion::new(Some(group_id), Some(artifact_id))),
            _ => Err(ParseError::Exclusion(input.to_string())),
        }
    }

    pub fn matches(&self, coordinate: &Coordinate) -> bool {
        (self.group_id == WILDCARD || self.group_id == coordinate.group_id)
            && (self.artifact_id == WILDCARD || self.artifact_id == coordinate.artifact_id)
    }
}

fn or_wildcard(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => WILDCARD.to_string(),
    }
}

impl FromStr for Exclusion {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Exclusion::parse(s)
    }
}

impl Display for Exclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}
