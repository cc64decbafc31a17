use anyhow::Context;
use app_action_cloud::{DEFAULT_API_URL, DeleteOutcome, Deleter, DoClient};
use app_action_core::{DeleteTarget, GitHubContext, ProcessEnv, Reporter};
use clap::Args;

use super::{flag, secret_token};

#[derive(Args)]
pub struct DeleteArgs {
    /// DigitalOcean personal access token
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: String,

    /// Name of the app to delete
    #[arg(long, env = "INPUT_APP_NAME", default_value = "")]
    app_name: String,

    /// Id of the app to delete; takes precedence over the name
    #[arg(long, env = "INPUT_APP_ID", default_value = "")]
    app_id: String,

    /// Delete the preview app of the triggering pull request
    #[arg(long, env = "INPUT_FROM_PR_PREVIEW", default_value = "false")]
    from_pr_preview: String,

    /// Succeed if the app does not exist
    #[arg(long, env = "INPUT_IGNORE_NOT_FOUND", default_value = "false")]
    ignore_not_found: String,

    /// App Platform API base URL
    #[arg(long, env = "INPUT_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
}

pub async fn delete(args: DeleteArgs, reporter: &impl Reporter) -> anyhow::Result<()> {
    let token = secret_token(reporter, args.token)?;
    let from_pr_preview =
        flag("from_pr_preview", &args.from_pr_preview).context("failed to get inputs")?;
    let ignore_not_found =
        flag("ignore_not_found", &args.ignore_not_found).context("failed to get inputs")?;

    let target = DeleteTarget::resolve(&args.app_id, &args.app_name, from_pr_preview, || {
        GitHubContext::from_env(&ProcessEnv)
    })?;

    let client = DoClient::with_base_url(token, args.api_url);
    match Deleter::new(client, reporter)
        .delete(&target, ignore_not_found)
        .await?
    {
        DeleteOutcome::Deleted { app_id } => reporter.info(&format!("deleted app {app_id}")),
        DeleteOutcome::NotFound => {}
    }
    Ok(())
}
