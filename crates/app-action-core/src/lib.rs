//! Core types for app-action.
//!
//! This crate defines the app spec model ([`AppSpec`]) and the pure
//! transformations applied to it before submission: environment expansion,
//! image overrides and pull request preview sanitizing. It also speaks the
//! GitHub Actions runner protocol ([`GitHubActions`]).

pub mod actions;
pub mod env;
pub mod error;
pub mod github;
pub mod images;
pub mod inputs;
pub mod preview;
pub mod spec;

pub use actions::{GitHubActions, Reporter};
pub use env::{Environment, Expansion, ProcessEnv};
pub use error::{Error, Result};
pub use github::GitHubContext;
pub use images::{ImageOverride, ImagePin, UnmatchedPolicy};
pub use inputs::DeleteTarget;
pub use preview::{PreviewTarget, generate_app_name, sanitize_for_preview};
pub use spec::{AppSpec, ComponentSpec, ImageSource, RegistryType, Source};
