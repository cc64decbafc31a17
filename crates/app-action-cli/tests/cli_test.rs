use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary with no inherited `INPUT_*` or `GITHUB_*` variables.
fn app_action() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("app-action");
    cmd.env_clear();
    cmd
}

// ── Help / Version ──

#[test]
fn shows_help() {
    app_action()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("App Platform"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn shows_version() {
    app_action()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("app-action"));
}

#[test]
fn poll_interval_is_hidden() {
    app_action()
        .args(["deploy", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--app-spec-location"))
        .stdout(predicate::str::contains("--poll-interval").not());
}

// ── Inputs ──

#[test]
fn token_is_required() {
    app_action()
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--token"));
}

#[test]
fn token_is_masked_first() {
    app_action()
        .arg("delete")
        .env("INPUT_TOKEN", "dop_v1_secret")
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("::add-mask::dop_v1_secret\n"));
}

#[test]
fn delete_requires_an_identifier() {
    app_action()
        .arg("delete")
        .env("INPUT_TOKEN", "t")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "::error::invalid configuration: either app_id, app_name, or from_pr_preview must be set",
        ));
}

#[test]
fn invalid_boolean_input_is_rejected() {
    app_action()
        .arg("delete")
        .env("INPUT_TOKEN", "t")
        .env("INPUT_APP_ID", "app-id")
        .env("INPUT_IGNORE_NOT_FOUND", "maybe")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("::error::failed to get inputs"))
        .stdout(predicate::str::contains("\"maybe\""));
}

#[test]
fn delete_from_preview_needs_a_repository() {
    app_action()
        .arg("delete")
        .env("INPUT_TOKEN", "t")
        .env("INPUT_FROM_PR_PREVIEW", "true")
        .env("GITHUB_REPOSITORY", "not-a-repo")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("malformed repository \"not-a-repo\""));
}

#[test]
fn deploy_reports_missing_spec_file() {
    let tmp = TempDir::new().unwrap();

    app_action()
        .arg("deploy")
        .env("INPUT_TOKEN", "t")
        .env("INPUT_APP_SPEC_LOCATION", tmp.path().join("app.yaml"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "::error::failed to create spec: failed to read app spec from",
        ));
}

#[test]
fn deploy_rejects_malformed_image_overrides() {
    app_action()
        .arg("deploy")
        .env("INPUT_TOKEN", "t")
        .env("INPUT_IMAGES", "web=v1")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "::error::failed to get inputs: failed to parse image overrides",
        ));
}

#[test]
fn unreachable_api_fails_the_step() {
    app_action()
        .arg("delete")
        .env("INPUT_TOKEN", "t")
        .env("INPUT_APP_ID", "app-id")
        .env("INPUT_API_URL", "http://127.0.0.1:1")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "::error::failed to delete app: DELETE /v2/apps/app-id failed",
        ));
}
