//! App Platform side of app-action.
//!
//! [`AppsApi`] is the capability the orchestrators are written against;
//! [`DoClient`] implements it over HTTPS.

pub mod api;
pub mod client;
pub mod delete;
pub mod deploy;
pub mod error;
pub mod logs;
pub mod poll;
pub mod resolver;
pub mod spec_builder;

pub use api::{
    App, AppsApi, Deployment, DeploymentPhase, LogDescriptor, LogKind, LogQuery, Page,
    PageRequest,
};
pub use client::{DEFAULT_API_URL, DoClient};
pub use delete::{DeleteError, DeleteOutcome, Deleter};
pub use deploy::{DeployError, DeployOptions, Deployer};
pub use error::{ApiError, FetchError, LogError};
pub use logs::{HttpFetcher, LogFetcher, fetch_logs};
pub use poll::{CancelHandle, Cancellation, DEFAULT_POLL_INTERVAL, cancellation};
pub use resolver::find_app_by_name;
pub use spec_builder::{BuildOptions, SpecError, SpecSource, build_spec};
