//! App spec data model.
//!
//! Only the fields this action reads or rewrites are modeled. Everything
//! else the platform accepts (instance sizes, routes, per-component env
//! vars, databases, ...) is kept verbatim in `extra` maps so a spec
//! survives a load/submit round trip untouched.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::env::{Environment, Expansion, expand};

/// Declarative description of an application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ComponentSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workers: Vec<ComponentSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<ComponentSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub static_sites: Vec<ComponentSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<ComponentSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub databases: Vec<DatabaseSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<DomainSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<AlertSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub envs: Vec<EnvVarSpec>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A buildable component: service, worker, job, static site or function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    #[serde(flatten)]
    pub source: Source,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where a component's code or image comes from.
///
/// On the wire each variant is its own optional key (`git`, `github`,
/// `gitlab`, `image`); at most one of them may be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SourceFields", into = "SourceFields")]
pub enum Source {
    #[default]
    None,
    Git(GitSource),
    GitHub(GitHubSource),
    GitLab(GitLabSource),
    Image(ImageSource),
}

impl Source {
    pub fn image(&self) -> Option<&ImageSource> {
        match self {
            Source::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn image_mut(&mut self) -> Option<&mut ImageSource> {
        match self {
            Source::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn github_mut(&mut self) -> Option<&mut GitHubSource> {
        match self {
            Source::GitHub(github) => Some(github),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SourceFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    git: Option<GitSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    github: Option<GitHubSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gitlab: Option<GitLabSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<ImageSource>,
}

impl TryFrom<SourceFields> for Source {
    type Error = crate::Error;

    fn try_from(fields: SourceFields) -> crate::Result<Self> {
        let mut sources = Vec::with_capacity(1);
        if let Some(git) = fields.git {
            sources.push(("git", Source::Git(git)));
        }
        if let Some(github) = fields.github {
            sources.push(("github", Source::GitHub(github)));
        }
        if let Some(gitlab) = fields.gitlab {
            sources.push(("gitlab", Source::GitLab(gitlab)));
        }
        if let Some(image) = fields.image {
            sources.push(("image", Source::Image(image)));
        }

        match sources.len() {
            0 => Ok(Source::None),
            1 => Ok(sources.remove(0).1),
            _ => Err(crate::Error::MultipleSources {
                kinds: sources.iter().map(|(kind, _)| *kind).collect(),
            }),
        }
    }
}

impl From<Source> for SourceFields {
    fn from(source: Source) -> Self {
        let mut fields = SourceFields::default();
        match source {
            Source::None => {}
            Source::Git(git) => fields.git = Some(git),
            Source::GitHub(github) => fields.github = Some(github),
            Source::GitLab(gitlab) => fields.gitlab = Some(gitlab),
            Source::Image(image) => fields.image = Some(image),
        }
        fields
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitSource {
    pub repo_clone_url: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub branch: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubSource {
    pub repo: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub branch: String,
    #[serde(default)]
    pub deploy_on_push: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitLabSource {
    pub repo: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub branch: String,
    #[serde(default)]
    pub deploy_on_push: bool,
}

/// A container image reference.
///
/// `tag` and `digest` are mutually exclusive; use [`ImageSource::pin_tag`]
/// and [`ImageSource::pin_digest`] to switch between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    pub registry_type: RegistryType,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub registry: String,
    pub repository: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub tag: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub digest: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageSource {
    pub fn pin_tag(&mut self, tag: &str) {
        self.digest.clear();
        self.tag = tag.to_owned();
    }

    pub fn pin_digest(&mut self, digest: &str) {
        self.tag.clear();
        self.digest = digest.to_owned();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegistryType {
    #[default]
    Docr,
    DockerHub,
    Ghcr,
    Unspecified,
    /// A registry kind this version does not model; written back verbatim.
    Other(String),
}

impl From<String> for RegistryType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "DOCR" => Self::Docr,
            "DOCKER_HUB" => Self::DockerHub,
            "GHCR" => Self::Ghcr,
            "UNSPECIFIED" => Self::Unspecified,
            _ => Self::Other(value),
        }
    }
}

impl From<RegistryType> for String {
    fn from(value: RegistryType) -> Self {
        match value {
            RegistryType::Docr => "DOCR".to_owned(),
            RegistryType::DockerHub => "DOCKER_HUB".to_owned(),
            RegistryType::Ghcr => "GHCR".to_owned(),
            RegistryType::Unspecified => "UNSPECIFIED".to_owned(),
            RegistryType::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSpec {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainSpec {
    pub domain: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertSpec {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub rule: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvVarSpec {
    pub key: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub value: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppSpec {
    /// Parse a spec from YAML (or JSON, which is a YAML subset) and validate it.
    pub fn from_yaml(content: &str) -> crate::Result<Self> {
        let spec: AppSpec =
            serde_yaml::from_str(content).map_err(|e| crate::Error::SpecParse { source: e })?;
        spec.validate()?;
        Ok(spec)
    }

    /// Read a spec file, expanding `${VAR}` references against `env` first.
    pub fn load(path: &Path, env: &impl Environment, expansion: Expansion) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| crate::Error::SpecRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let expanded = expand(&raw, env, expansion);
        tracing::debug!(path = %path.display(), ?expansion, "loaded app spec");
        Self::from_yaml(&expanded)
    }

    /// Component names must be unique across all component kinds.
    pub fn validate(&self) -> crate::Result<()> {
        let mut seen = HashSet::new();
        let names = self
            .components()
            .map(|c| c.name.as_str())
            .chain(self.databases.iter().map(|d| d.name.as_str()));
        for name in names {
            if !seen.insert(name) {
                return Err(crate::Error::DuplicateComponent {
                    name: name.to_owned(),
                });
            }
        }
        Ok(())
    }

    /// All buildable components in declaration order, kind by kind.
    pub fn components(&self) -> impl Iterator<Item = &ComponentSpec> {
        self.services
            .iter()
            .chain(&self.workers)
            .chain(&self.jobs)
            .chain(&self.static_sites)
            .chain(&self.functions)
    }

    pub fn components_mut(&mut self) -> impl Iterator<Item = &mut ComponentSpec> {
        self.services
            .iter_mut()
            .chain(&mut self.workers)
            .chain(&mut self.jobs)
            .chain(&mut self.static_sites)
            .chain(&mut self.functions)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentSpec> {
        self.components().find(|c| c.name == name)
    }
}

/// Unset references expand to nothing, which YAML reads as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
