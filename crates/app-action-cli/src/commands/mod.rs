mod delete;
mod deploy;

use app_action_core::Reporter;
use app_action_core::inputs::parse_bool;
use secrecy::{ExposeSecret, SecretString};

pub use delete::{DeleteArgs, delete};
pub use deploy::{DeployArgs, deploy};

/// Take ownership of the API token and redact it from the step log.
fn secret_token(reporter: &impl Reporter, token: String) -> anyhow::Result<SecretString> {
    let token = SecretString::from(token);
    if token.expose_secret().is_empty() {
        anyhow::bail!("input token is required");
    }
    reporter.add_mask(token.expose_secret());
    Ok(token)
}

fn flag(input: &str, value: &str) -> anyhow::Result<bool> {
    Ok(parse_bool(input, value.trim())?)
}
