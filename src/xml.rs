//! Pieces shared by the settings.xml and pom.xml readers.

use serde::Deserialize;

use crate::resolver::RemoteRepository;

/// Name of the document element, skipping the prolog, comments and doctype.
pub(crate) fn root_element(document: &str) -> Option<&str> {
    let mut rest = document.trim_start_matches('\u{feff}');
    loop {
        rest = rest.trim_start();
        if let Some(r) = rest.strip_prefix("<?") {
            rest = &r[r.find("?>")? + 2..];
        } else if let Some(r) = rest.strip_prefix("<!--") {
            rest = &r[r.find("-->")? + 3..];
        } else if let Some(r) = rest.strip_prefix("<!") {
            rest = &r[r.find('>')? + 1..];
        } else if let Some(r) = rest.strip_prefix('<') {
            let end = r.find(|c: char| c.is_whitespace() || c == '>' || c == '/')?;
            return Some(&r[..end]);
        } else {
            return None;
        }
    }
}

/// `"true"`, compared case-insensitively, after trimming.
pub(crate) fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawRepositories {
    #[serde(rename = "repository", default)]
    pub repository: Vec<RawRepository>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRepository {
    pub id: String,
    pub url: String,
}

impl RawRepositories {
    pub fn into_repositories(self) -> Vec<RemoteRepository> {
        self.repository
            .into_iter()
            .map(|r| RemoteRepository::new(r.id.trim(), r.url.trim()))
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawActivation {
    pub active_by_default: Option<String>,
}
