use app_action_core::preview::MAX_APP_NAME_LEN;
use app_action_core::spec::{AlertSpec, ComponentSpec, DomainSpec, GitHubSource, Source};
use app_action_core::{
    AppSpec, Error, GitHubContext, PreviewTarget, generate_app_name, sanitize_for_preview,
};
use proptest::prelude::*;
use serde_json::json;

fn github_component(name: &str, repo: &str) -> ComponentSpec {
    ComponentSpec {
        name: name.to_owned(),
        source: Source::GitHub(GitHubSource {
            repo: repo.to_owned(),
            branch: "main".to_owned(),
            deploy_on_push: true,
        }),
        ..Default::default()
    }
}

fn retargeted(name: &str, repo: &str, branch: &str) -> ComponentSpec {
    ComponentSpec {
        name: name.to_owned(),
        source: Source::GitHub(GitHubSource {
            repo: repo.to_owned(),
            branch: branch.to_owned(),
            deploy_on_push: false,
        }),
        ..Default::default()
    }
}

fn target() -> PreviewTarget {
    PreviewTarget {
        repo_owner: "foo".to_owned(),
        repo_name: "bar".to_owned(),
        pr_ref: "3/merge".to_owned(),
        head_branch: "feature-branch".to_owned(),
    }
}

#[test]
fn sanitizes_spec_for_preview() {
    let mut spec = AppSpec {
        name: "foo".to_owned(),
        domains: vec![DomainSpec {
            domain: "foo.com".to_owned(),
            ..Default::default()
        }],
        alerts: vec![AlertSpec {
            rule: "CPU_UTILIZATION".to_owned(),
            ..Default::default()
        }],
        services: vec![
            github_component("web", "foo/bar"),
            github_component("web2", "another/repo"),
        ],
        workers: vec![github_component("worker", "foo/bar")],
        jobs: vec![github_component("job", "foo/bar")],
        functions: vec![github_component("function", "foo/bar")],
        ..Default::default()
    };

    sanitize_for_preview(&mut spec, &target());

    let expected = AppSpec {
        name: "foo-bar-3-merge-adb46530".to_owned(),
        services: vec![
            retargeted("web", "foo/bar", "feature-branch"),
            github_component("web2", "another/repo"),
        ],
        workers: vec![retargeted("worker", "foo/bar", "feature-branch")],
        jobs: vec![retargeted("job", "foo/bar", "feature-branch")],
        functions: vec![retargeted("function", "foo/bar", "feature-branch")],
        ..Default::default()
    };
    assert_eq!(spec, expected);
}

#[test]
fn repo_match_is_case_sensitive() {
    let mut spec = AppSpec {
        name: "foo".to_owned(),
        services: vec![github_component("web", "Foo/Bar")],
        ..Default::default()
    };

    sanitize_for_preview(&mut spec, &target());

    assert_eq!(spec.services[0], github_component("web", "Foo/Bar"));
}

#[test]
fn generates_known_names() {
    assert_eq!(
        generate_app_name("foo", "bar", "3/merge"),
        "foo-bar-3-merge-adb46530"
    );
    assert_eq!(
        generate_app_name("thisisanextremelylongrepohostname", "bar", "3/merge"),
        "thisisanextremelylongre-92da974b"
    );
    assert_eq!(
        generate_app_name("foo", "thisisanextremelylongreponame", "3/merge"),
        "foo-thisisanextremelylo-67dbc40d"
    );
}

#[test]
fn name_is_lowercase_without_illegal_characters() {
    let name = generate_app_name("My_Org", "Repo", "feat:x/y");
    assert!(name.starts_with("my-org-repo-featx-y-"), "{name}");
}

#[test]
fn target_from_pull_request_context() {
    let ctx = GitHubContext {
        repository: "foo/bar".to_owned(),
        ref_name: "ignored".to_owned(),
        head_ref: "feature-branch".to_owned(),
        event: json!({ "pull_request": { "number": 3 } }),
    };

    assert_eq!(PreviewTarget::from_context(&ctx).unwrap(), target());
}

#[test]
fn target_requires_pull_request_event() {
    let ctx = GitHubContext {
        repository: "foo/bar".to_owned(),
        event: json!({}),
        ..Default::default()
    };

    assert!(matches!(
        PreviewTarget::from_context(&ctx),
        Err(Error::MissingPullRequest)
    ));
}

proptest! {
    #[test]
    fn name_never_exceeds_limit(
        owner in "\\PC{0,40}",
        repo in "\\PC{0,40}",
        git_ref in "\\PC{0,40}",
    ) {
        let name = generate_app_name(&owner, &repo, &git_ref);
        prop_assert!(name.len() <= MAX_APP_NAME_LEN, "{} is {} bytes", name, name.len());
    }

    #[test]
    fn name_is_deterministic(
        owner in "[a-z]{1,20}",
        repo in "[a-z]{1,20}",
        git_ref in "[0-9]{1,4}/merge",
    ) {
        prop_assert_eq!(
            generate_app_name(&owner, &repo, &git_ref),
            generate_app_name(&owner, &repo, &git_ref)
        );
    }

    #[test]
    fn changing_the_ref_changes_the_suffix(
        owner in "[a-z]{1,20}",
        repo in "[a-z]{1,20}",
        a in 1u32..10_000,
        b in 1u32..10_000,
    ) {
        prop_assume!(a != b);
        let name_a = generate_app_name(&owner, &repo, &format!("{a}/merge"));
        let name_b = generate_app_name(&owner, &repo, &format!("{b}/merge"));
        prop_assert_ne!(&name_a[name_a.len() - 8..], &name_b[name_b.len() - 8..]);
    }
}
