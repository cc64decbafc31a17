//! Per-component image overrides.
//!
//! A pipeline that just pushed `ghcr.io/acme/web:abc123` points the `web`
//! component at it by exporting `IMAGE_TAG_WEB=abc123` (or
//! `IMAGE_DIGEST_WEB=sha256:...`). Only components that already use an
//! image source are touched; git-sourced components keep building from git.

use std::collections::HashSet;

use serde::Deserialize;

use crate::env::Environment;
use crate::spec::AppSpec;

const TAG_PREFIX: &str = "IMAGE_TAG_";
const DIGEST_PREFIX: &str = "IMAGE_DIGEST_";

/// The image reference a component should be pinned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePin {
    Tag(String),
    Digest(String),
}

/// An explicit override for one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOverride {
    pub component: String,
    pub pin: ImagePin,
}

/// What to do with explicit overrides that name no component in the spec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnmatchedPolicy {
    #[default]
    Ignore,
    Fail,
}

/// A pin that was written into the spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedOverride {
    pub component: String,
    pub pin: ImagePin,
}

/// Convert a component name into the suffix of its override variables.
///
/// ```
/// use app_action_core::images::component_env_key;
/// assert_eq!(component_env_key("fancy-worker"), "FANCY_WORKER");
/// ```
pub fn component_env_key(name: &str) -> String {
    name.replace('-', "_").to_uppercase()
}

/// Apply `IMAGE_DIGEST_<KEY>` / `IMAGE_TAG_<KEY>` from `env` to every
/// image-sourced component. A digest wins over a tag.
pub fn apply_env_overrides(spec: &mut AppSpec, env: &impl Environment) -> Vec<AppliedOverride> {
    let mut applied = Vec::new();

    for component in spec.components_mut() {
        let Some(image) = component.source.image_mut() else {
            continue;
        };

        let key = component_env_key(&component.name);
        let pin = match non_empty(env.var(&format!("{DIGEST_PREFIX}{key}"))) {
            Some(digest) => ImagePin::Digest(digest),
            None => match non_empty(env.var(&format!("{TAG_PREFIX}{key}"))) {
                Some(tag) => ImagePin::Tag(tag),
                None => continue,
            },
        };

        match &pin {
            ImagePin::Digest(digest) => image.pin_digest(digest),
            ImagePin::Tag(tag) => image.pin_tag(tag),
        }
        tracing::debug!(component = %component.name, ?pin, "image override from environment");
        applied.push(AppliedOverride {
            component: component.name.clone(),
            pin,
        });
    }

    applied
}

/// Apply an explicit list of overrides.
///
/// Overrides for components without an image source are skipped. Overrides
/// naming components that don't exist are handled according to `policy`.
pub fn apply_overrides(
    spec: &mut AppSpec,
    overrides: &[ImageOverride],
    policy: UnmatchedPolicy,
) -> crate::Result<Vec<AppliedOverride>> {
    let known: HashSet<&str> = spec.components().map(|c| c.name.as_str()).collect();
    let unmatched: Vec<String> = overrides
        .iter()
        .filter(|o| !known.contains(o.component.as_str()))
        .map(|o| o.component.clone())
        .collect();

    if !unmatched.is_empty() {
        match policy {
            UnmatchedPolicy::Fail => {
                return Err(crate::Error::UnmatchedImageOverrides { names: unmatched });
            }
            UnmatchedPolicy::Ignore => {
                tracing::warn!(
                    components = ?unmatched,
                    "ignoring image overrides for unknown components"
                );
            }
        }
    }

    let mut applied = Vec::new();
    for o in overrides {
        let Some(component) = spec.components_mut().find(|c| c.name == o.component) else {
            continue;
        };
        let Some(image) = component.source.image_mut() else {
            continue;
        };
        match &o.pin {
            ImagePin::Digest(digest) => image.pin_digest(digest),
            ImagePin::Tag(tag) => image.pin_tag(tag),
        }
        applied.push(AppliedOverride {
            component: o.component.clone(),
            pin: o.pin.clone(),
        });
    }

    Ok(applied)
}

#[derive(Deserialize)]
struct RawOverride {
    name: String,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    digest: Option<String>,
}

/// Parse the `images` input: a JSON array of `{"name", "tag" | "digest"}`.
///
/// A digest wins over a tag in the same entry; an entry with neither is dropped.
pub fn parse_overrides(json: &str) -> crate::Result<Vec<ImageOverride>> {
    let raw: Vec<RawOverride> = serde_json::from_str(json)
        .map_err(|e| crate::Error::ImageOverridesParse { source: e })?;

    let mut overrides = Vec::with_capacity(raw.len());
    for entry in raw {
        let pin = match (non_empty(entry.tag), non_empty(entry.digest)) {
            (_, Some(digest)) => ImagePin::Digest(digest),
            (Some(tag), None) => ImagePin::Tag(tag),
            (None, None) => continue,
        };
        overrides.push(ImageOverride {
            component: entry.name,
            pin,
        });
    }
    Ok(overrides)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
