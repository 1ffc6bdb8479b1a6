// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Team project addressing

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::DomainError;

/// A team project on the git host, identified by its base URL
///
/// The URL never ends with `/`; every REST path is appended to it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamProject {
    pub url: String,
    pub name: String,
}

impl TeamProject {
    /// Parse a team project URL such as `https://tfs.example.com/tfs/Collection/Payments/`.
    ///
    /// Trailing slashes are removed and the project name is the last path
    /// segment, percent-decoded (`My%20Project` is the project `My Project`).
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim().trim_end_matches('/');
        let invalid = |reason: &str| DomainError::InvalidTeamProjectUrl {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }

        let segment = parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .ok_or_else(|| invalid("URL has no team project path segment"))?;
        let name = percent_decode_str(segment)
            .decode_utf8()
            .map_err(|_| invalid("team project name is not valid UTF-8"))?
            .into_owned();

        // The parsed form is already percent-encoded and safe to embed in job configs
        Ok(Self {
            url: parsed.as_str().trim_end_matches('/').to_string(),
            name,
        })
    }

    /// Base URL of the git REST API for this project
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/_apis/{}", self.url, path.trim_start_matches('/'))
    }
}

impl std::fmt::Display for TeamProject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_removed() {
        let project = TeamProject::parse("https://tfs.example.com/tfs/DefaultCollection/Payments/")
            .unwrap();
        assert_eq!(project.url, "https://tfs.example.com/tfs/DefaultCollection/Payments");
        assert_eq!(project.name, "Payments");
    }

    #[test]
    fn api_url_joins_without_double_slash() {
        let project = TeamProject::parse("https://dev.azure.com/org/Proj").unwrap();
        assert_eq!(
            project.api_url("/git/repositories?api-version=1"),
            "https://dev.azure.com/org/Proj/_apis/git/repositories?api-version=1"
        );
    }

    #[test]
    fn spaced_project_name_is_decoded() {
        let project = TeamProject::parse("https://dev.azure.com/org/My Project").unwrap();
        assert_eq!(project.name, "My Project");
        assert_eq!(project.url, "https://dev.azure.com/org/My%20Project");

        let encoded = TeamProject::parse("https://dev.azure.com/org/My%20Project/").unwrap();
        assert_eq!(encoded, project);
    }

    #[test]
    fn non_utf8_project_name_is_rejected() {
        let err = TeamProject::parse("https://dev.azure.com/org/%FF%FE").unwrap_err();
        assert!(matches!(err, DomainError::InvalidTeamProjectUrl { .. }));
    }

    #[test]
    fn url_without_path_is_rejected() {
        let err = TeamProject::parse("https://tfs.example.com/").unwrap_err();
        assert!(matches!(err, DomainError::InvalidTeamProjectUrl { .. }));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        assert!(TeamProject::parse("ftp://tfs.example.com/Proj").is_err());
    }
}
