// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Job configuration templates
//!
//! A template is plain text with `#token#` placeholders. [`materialize`]
//! replaces the known tokens in a single pass; anything else between `#`
//! signs is left alone. `#guid#` receives a fresh id on every call.
//!
//! Values are XML-escaped unless [`Escaping::None`] is asked for, and a value
//! that itself contains a known placeholder is refused.

use mbp_domain_types::{JobDescriptor, JobKind};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Multibranch pipeline project, one per repository
pub const MULTIBRANCH_TEMPLATE: &str = include_str!("../templates/multibranch.xml");

/// Single-branch pipeline job, one per ad hoc pipeline file
pub const AD_HOC_TEMPLATE: &str = include_str!("../templates/ad_hoc_pipeline.xml");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Repo,
    Guid,
    CredentialsId,
    Url,
    FileType,
    Team,
    Branch,
}

impl Token {
    pub const ALL: [Token; 7] = [
        Token::Repo,
        Token::Guid,
        Token::CredentialsId,
        Token::Url,
        Token::FileType,
        Token::Team,
        Token::Branch,
    ];

    pub fn placeholder(self) -> &'static str {
        match self {
            Token::Repo => "#repo#",
            Token::Guid => "#guid#",
            Token::CredentialsId => "#credentialsId#",
            Token::Url => "#url#",
            Token::FileType => "#fileType#",
            Token::Team => "#team#",
            Token::Branch => "#branch#",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Escaping {
    #[default]
    Xml,
    /// Insert values verbatim
    None,
}

/// Values for every token except `#guid#`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenValues {
    pub repo: String,
    pub credentials_id: String,
    pub url: String,
    pub file_type: String,
    pub team: String,
    pub branch: String,
}

impl From<&JobDescriptor> for TokenValues {
    fn from(d: &JobDescriptor) -> Self {
        Self {
            repo: d.repository_name.clone(),
            credentials_id: d.credential_reference.clone(),
            url: d.base_url.clone(),
            file_type: d.target_file_path.clone(),
            team: d.team.clone(),
            branch: d.branch.clone(),
        }
    }
}

/// A filled-in template and the id that went into `#guid#`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    pub document: String,
    pub unique_id: Uuid,
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("value for {token} contains the placeholder {found}")]
    TokenInValue {
        token: &'static str,
        found: &'static str,
    },

    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fill `template` with `values` and a fresh `#guid#`
pub fn materialize(
    template: &str,
    values: &TokenValues,
    escaping: Escaping,
) -> Result<Materialized, TemplateError> {
    let unique_id = Uuid::new_v4();
    let guid = unique_id.to_string();

    let mut replacements = Vec::with_capacity(Token::ALL.len());
    for token in Token::ALL {
        let raw = match token {
            Token::Repo => values.repo.as_str(),
            Token::Guid => guid.as_str(),
            Token::CredentialsId => values.credentials_id.as_str(),
            Token::Url => values.url.as_str(),
            Token::FileType => values.file_type.as_str(),
            Token::Team => values.team.as_str(),
            Token::Branch => values.branch.as_str(),
        };
        if let Some(found) = Token::ALL.iter().find(|t| raw.contains(t.placeholder())) {
            return Err(TemplateError::TokenInValue {
                token: token.placeholder(),
                found: found.placeholder(),
            });
        }
        let value = match escaping {
            Escaping::Xml => escape_xml(raw),
            Escaping::None => raw.to_string(),
        };
        replacements.push((token.placeholder(), value));
    }

    let mut document = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('#') {
        document.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match replacements.iter().find(|(placeholder, _)| tail.starts_with(placeholder)) {
            Some((placeholder, value)) => {
                document.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            None => {
                document.push('#');
                rest = &tail[1..];
            }
        }
    }
    document.push_str(rest);

    Ok(Materialized {
        document,
        unique_id,
    })
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// The template used for each job kind
#[derive(Debug, Clone)]
pub struct TemplateSet {
    multibranch: String,
    ad_hoc: String,
    escaping: Escaping,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateSet {
    pub fn builtin() -> Self {
        Self {
            multibranch: MULTIBRANCH_TEMPLATE.to_string(),
            ad_hoc: AD_HOC_TEMPLATE.to_string(),
            escaping: Escaping::default(),
        }
    }

    /// Built-in templates, each replaced by a file when a path is given
    pub async fn load(
        multibranch: Option<&Path>,
        ad_hoc: Option<&Path>,
    ) -> Result<Self, TemplateError> {
        let mut set = Self::builtin();
        if let Some(path) = multibranch {
            set.multibranch = read_template(path).await?;
        }
        if let Some(path) = ad_hoc {
            set.ad_hoc = read_template(path).await?;
        }
        Ok(set)
    }

    pub fn with_escaping(mut self, escaping: Escaping) -> Self {
        self.escaping = escaping;
        self
    }

    pub fn template(&self, kind: JobKind) -> &str {
        match kind {
            JobKind::Multibranch => &self.multibranch,
            JobKind::AdHoc => &self.ad_hoc,
        }
    }

    pub fn render(&self, descriptor: &JobDescriptor) -> Result<Materialized, TemplateError> {
        materialize(
            self.template(descriptor.kind),
            &TokenValues::from(descriptor),
            self.escaping,
        )
    }
}

async fn read_template(path: &Path) -> Result<String, TemplateError> {
    tracing::debug!(path = %path.display(), "loading job template");
    tokio::fs::read_to_string(path).await.map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbp_domain_types::{AdHocJobRequest, Repository, TeamProject};

    fn values() -> TokenValues {
        TokenValues {
            repo: "Foo".into(),
            credentials_id: "tfs-cred".into(),
            url: "https://tfs.example.com/tfs/Coll/Bar".into(),
            file_type: "Jenkinsfile".into(),
            team: "Bar".into(),
            branch: "master".into(),
        }
    }

    fn has_known_token(text: &str) -> bool {
        Token::ALL.iter().any(|t| text.contains(t.placeholder()))
    }

    #[test]
    fn every_known_token_is_replaced() {
        let all: String = Token::ALL.iter().map(|t| t.placeholder()).collect::<Vec<_>>().join("|");
        let out = materialize(&all, &values(), Escaping::Xml).unwrap();
        assert!(!has_known_token(&out.document), "{}", out.document);
        assert!(out.document.starts_with("Foo|"));
        assert!(out.document.contains(&out.unique_id.to_string()));
    }

    #[test]
    fn repeated_tokens_get_the_same_value() {
        let out = materialize("#repo#/#guid#/#repo#/#guid#", &values(), Escaping::Xml).unwrap();
        let parts: Vec<_> = out.document.split('/').collect();
        assert_eq!(parts[0], "Foo");
        assert_eq!(parts[2], "Foo");
        assert_eq!(parts[1], parts[3]);
    }

    #[test]
    fn guid_is_fresh_on_every_call() {
        let a = materialize("#guid#", &values(), Escaping::Xml).unwrap();
        let b = materialize("#guid#", &values(), Escaping::Xml).unwrap();
        assert_ne!(a.document, b.document);
        assert_ne!(a.unique_id, b.unique_id);
    }

    #[test]
    fn unknown_placeholders_and_lone_hashes_are_kept() {
        let out = materialize("#nope# # #repo##", &values(), Escaping::Xml).unwrap();
        assert_eq!(out.document, "#nope# # Foo#");
    }

    #[test]
    fn values_are_xml_escaped_by_default() {
        let mut v = values();
        v.repo = "a&b <c>".into();
        let out = materialize("<remote>#repo#</remote>", &v, Escaping::Xml).unwrap();
        assert_eq!(out.document, "<remote>a&amp;b &lt;c&gt;</remote>");

        let raw = materialize("<remote>#repo#</remote>", &v, Escaping::None).unwrap();
        assert_eq!(raw.document, "<remote>a&b <c></remote>");
    }

    #[test]
    fn value_containing_a_token_is_rejected() {
        let mut v = values();
        v.team = "x#repo#y".into();
        let err = materialize("#team#", &v, Escaping::None).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::TokenInValue { token: "#team#", found: "#repo#" }
        ));
    }

    #[test]
    fn builtin_multibranch_template_is_fully_filled() {
        let project = TeamProject::parse("https://tfs.example.com/tfs/Coll/Bar").unwrap();
        let candidate = mbp_domain_types::CandidateRepository {
            repository: Repository::new("r1", "svc-a"),
            branch: mbp_domain_types::BranchRef::new("refs/heads/master"),
        };
        let descriptor = JobDescriptor::multibranch(&project, &candidate, "tfs-cred", "Jenkinsfile");

        let out = TemplateSet::builtin().render(&descriptor).unwrap();

        assert!(!has_known_token(&out.document));
        assert!(out.document.contains(
            "<remote>https://tfs.example.com/tfs/Coll/Bar/_git/svc-a</remote>"
        ));
        assert!(out.document.contains("<credentialsId>tfs-cred</credentialsId>"));
        assert!(out.document.contains(&format!("<id>{}</id>", out.unique_id)));
        assert!(out.document.contains("<scriptPath>Jenkinsfile</scriptPath>"));
        assert!(out.document.contains("<spec>H H/4 * * *</spec>"));
    }

    #[test]
    fn builtin_ad_hoc_template_builds_the_default_branch() {
        let project = TeamProject::parse("https://tfs.example.com/tfs/Coll/Bar").unwrap();
        let request = AdHocJobRequest::new(Repository::new("r1", "svc-a"), "deploy.Jenkinsfile");
        let descriptor = JobDescriptor::ad_hoc(&project, &request, "tfs-cred", "main");

        let out = TemplateSet::builtin().render(&descriptor).unwrap();

        assert!(!has_known_token(&out.document));
        assert!(out.document.starts_with("<?xml"));
        assert!(out.document.contains("<name>*/main</name>"));
        assert!(out.document.contains("<scriptPath>deploy.Jenkinsfile</scriptPath>"));
        assert!(out.document.contains("<lightweight>true</lightweight>"));
    }

    #[tokio::test]
    async fn template_files_override_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mb.xml");
        std::fs::write(&path, "<job name=\"#repo#\" team=\"#team#\"/>").unwrap();

        let set = TemplateSet::load(Some(&path), None).await.unwrap();

        assert_eq!(set.template(JobKind::Multibranch), "<job name=\"#repo#\" team=\"#team#\"/>");
        assert_eq!(set.template(JobKind::AdHoc), AD_HOC_TEMPLATE);
    }

    #[tokio::test]
    async fn missing_template_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TemplateSet::load(None, Some(&dir.path().join("absent.xml")))
            .await
            .unwrap_err();
        assert!(matches!(err, TemplateError::Io { .. }));
        assert!(err.to_string().contains("absent.xml"));
    }
}
