use app_action_core::actions::DELIMITER_PREFIX;
use app_action_core::{Error, GitHubActions, Reporter};
use tempfile::TempDir;

/// Split a written output file into `(name, delimiter, value)` entries.
fn heredocs(written: &str) -> Vec<(String, String, String)> {
    let mut lines = written.lines();
    let mut entries = Vec::new();
    while let Some(header) = lines.next() {
        let (name, delimiter) = header.split_once("<<").unwrap();
        let value: Vec<&str> = lines.by_ref().take_while(|l| *l != delimiter).collect();
        entries.push((name.to_owned(), delimiter.to_owned(), value.join("\n")));
    }
    entries
}

#[test]
fn outputs_are_appended_as_heredocs() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("output");
    let actions = GitHubActions::with_writer(Vec::new(), Some(output.clone()));

    actions.set_output("build_logs", "line 1\nline 2").unwrap();
    actions.set_output("deploy_logs", "deploy log").unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.ends_with('\n'));
    let entries = heredocs(&written);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, "build_logs");
    assert_eq!(entries[0].2, "line 1\nline 2");
    assert_eq!(entries[1].0, "deploy_logs");
    assert_eq!(entries[1].2, "deploy log");

    for (_, delimiter, _) in &entries {
        assert!(delimiter.starts_with(DELIMITER_PREFIX));
        assert!(delimiter.len() > DELIMITER_PREFIX.len());
    }
    assert_ne!(entries[0].1, entries[1].1);
    assert!(actions.into_writer().is_empty());
}

#[test]
fn value_resembling_a_delimiter_is_written_verbatim() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("output");
    let actions = GitHubActions::with_writer(Vec::new(), Some(output.clone()));

    let value = "x\n_GitHubActionsFileCommandDelimeter_\nghadelimiter_0\ninjected=1";
    actions.set_output("build_logs", value).unwrap();

    let entries = heredocs(&std::fs::read_to_string(&output).unwrap());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "build_logs");
    assert_eq!(entries[0].2, value);
}

#[test]
fn unwritable_output_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("missing-dir").join("output");
    let actions = GitHubActions::with_writer(Vec::new(), Some(output));

    let err = actions.set_output("app", "{}").unwrap_err();
    assert!(matches!(err, Error::OutputWrite { .. }));
}

#[test]
fn reporter_works_through_references() {
    fn log_via(reporter: impl Reporter) {
        reporter.info("via reference");
    }

    let actions = GitHubActions::with_writer(Vec::new(), None);
    log_via(&actions);
    assert_eq!(
        String::from_utf8(actions.into_writer()).unwrap(),
        "via reference\n"
    );
}
