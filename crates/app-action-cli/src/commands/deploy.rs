use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use app_action_cloud::{
    App, BuildOptions, Cancellation, DEFAULT_API_URL, DeployOptions, Deployer, DoClient,
    HttpFetcher, SpecSource, build_spec,
};
use app_action_core::images::parse_overrides;
use app_action_core::{
    Expansion, GitHubContext, PreviewTarget, ProcessEnv, Reporter, UnmatchedPolicy,
    sanitize_for_preview,
};
use clap::Args;

use super::{flag, secret_token};

#[derive(Args)]
pub struct DeployArgs {
    /// DigitalOcean personal access token
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: String,

    /// Path to the app spec to deploy
    #[arg(long, env = "INPUT_APP_SPEC_LOCATION", default_value = ".do/app.yaml")]
    app_spec_location: PathBuf,

    /// Redeploy the current spec of this existing app instead of a local file
    #[arg(long, env = "INPUT_APP_NAME", default_value = "")]
    app_name: String,

    /// Print build logs into the step log
    #[arg(long, env = "INPUT_PRINT_BUILD_LOGS", default_value = "false")]
    print_build_logs: String,

    /// Print deploy logs into the step log
    #[arg(long, env = "INPUT_PRINT_DEPLOY_LOGS", default_value = "false")]
    print_deploy_logs: String,

    /// Deploy a preview of the triggering pull request
    #[arg(long, env = "INPUT_DEPLOY_PR_PREVIEW", default_value = "false")]
    deploy_pr_preview: String,

    /// Keep unset ${component.VAR} and app-wide references for the platform to bind
    #[arg(long, env = "INPUT_RETAIN_BINDABLES", default_value = "false")]
    retain_bindables: String,

    /// JSON list of {"name", "tag" | "digest"} image overrides
    #[arg(long, env = "INPUT_IMAGES", default_value = "")]
    images: String,

    /// Fail if an image override names a component that is not in the spec
    #[arg(long, env = "INPUT_FAIL_ON_UNMATCHED_IMAGES", default_value = "false")]
    fail_on_unmatched_images: String,

    /// App Platform API base URL
    #[arg(long, env = "INPUT_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Seconds between status checks
    #[arg(long, env = "INPUT_POLL_INTERVAL", default_value_t = 2, hide = true)]
    poll_interval: u64,
}

struct DeployInputs {
    source: SpecSource,
    build: BuildOptions,
    deploy: DeployOptions,
    pr_preview: bool,
}

impl DeployArgs {
    fn inputs(&self) -> anyhow::Result<DeployInputs> {
        let source = if self.app_name.is_empty() {
            SpecSource::File(self.app_spec_location.clone())
        } else {
            SpecSource::ExistingApp(self.app_name.clone())
        };

        let expansion = if flag("retain_bindables", &self.retain_bindables)? {
            Expansion::RetainBindables
        } else {
            Expansion::Plain
        };
        let overrides = if self.images.trim().is_empty() {
            Vec::new()
        } else {
            parse_overrides(&self.images)?
        };
        let unmatched = if flag("fail_on_unmatched_images", &self.fail_on_unmatched_images)? {
            UnmatchedPolicy::Fail
        } else {
            UnmatchedPolicy::Ignore
        };

        if self.poll_interval == 0 {
            anyhow::bail!("poll_interval must be at least one second");
        }

        Ok(DeployInputs {
            source,
            build: BuildOptions {
                expansion,
                overrides,
                unmatched,
            },
            deploy: DeployOptions {
                print_build_logs: flag("print_build_logs", &self.print_build_logs)?,
                print_deploy_logs: flag("print_deploy_logs", &self.print_deploy_logs)?,
                poll_interval: Duration::from_secs(self.poll_interval),
            },
            pr_preview: flag("deploy_pr_preview", &self.deploy_pr_preview)?,
        })
    }
}

/// Build the spec, deploy it and publish the resulting app.
pub async fn deploy(
    mut args: DeployArgs,
    reporter: &impl Reporter,
    cancel: Cancellation,
) -> anyhow::Result<()> {
    let token = secret_token(reporter, std::mem::take(&mut args.token))?;
    let inputs = args.inputs().context("failed to get inputs")?;
    let client = DoClient::with_base_url(token, args.api_url);
    let env = ProcessEnv;

    let mut spec = build_spec(&client, &inputs.source, &env, &inputs.build)
        .await
        .context("failed to create spec")?;

    if inputs.pr_preview {
        let ctx = GitHubContext::from_env(&env).context("failed to get GitHub context")?;
        let target = PreviewTarget::from_context(&ctx)
            .context("failed to sanitize spec for PR preview")?;
        sanitize_for_preview(&mut spec, &target);
        tracing::info!(
            name = %spec.name,
            branch = %target.head_branch,
            "deploying pull request preview"
        );
    }

    let deployer = Deployer::new(client, HttpFetcher::new(), reporter, inputs.deploy)
        .with_cancellation(cancel);
    let result = deployer.deploy(&spec).await;

    // Surface the app even when the deployment failed.
    let app = match &result {
        Ok(app) => Some(app),
        Err(e) => e.app(),
    };
    if let Some(Err(e)) = app.map(|app| publish_app(reporter, app)) {
        reporter.error(&format!("{e:#}"));
    }

    let app = result.context("failed to deploy")?;
    reporter.info(&format!("App is now live under URL: {}", app.live_url));
    Ok(())
}

fn publish_app(reporter: &impl Reporter, app: &App) -> anyhow::Result<()> {
    let json = serde_json::to_string(app).context("failed to marshal app")?;
    reporter.set_output("app", &json)?;
    Ok(())
}
