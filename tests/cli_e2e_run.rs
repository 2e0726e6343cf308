//! End-to-end tests for `repo-sweep run` and `repo-sweep select`.
//!
//! A local HTTP stub stands in for the GitHub API and local bare
//! repositories stand in for the remotes. Tests return early when `git` is
//! not installed.

mod common;
use common::prelude::*;
use serde_json::json;

fn listing(repos: &[(&str, &str, &str)]) -> String {
    let repos: Vec<_> = repos
        .iter()
        .map(|(name, url, default_branch)| {
            json!({
                "name": name,
                "ssh_url": url,
                "default_branch": default_branch,
                "archived": false,
            })
        })
        .collect();
    serde_json::Value::Array(repos).to_string()
}

fn with_git_identity(cmd: &mut assert_cmd::Command) -> &mut assert_cmd::Command {
    cmd.env("GIT_AUTHOR_NAME", "Sweep Test")
        .env("GIT_AUTHOR_EMAIL", "sweep@example.com")
        .env("GIT_COMMITTER_NAME", "Sweep Test")
        .env("GIT_COMMITTER_EMAIL", "sweep@example.com")
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
}

#[test]
fn test_run_local_changes_matching_repo_only() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new().with_config(configs::LOCAL);
    let svc_a = init_remote(fixture.path(), "svc-a", &[("deps.txt", "tool==1.2.3\n")]);
    let svc_b = init_remote(fixture.path(), "svc-b", &[("README.md", "nothing\n")]);
    let (api_url, server) = serve_json(vec![listing(&[
        ("svc-a", &svc_a, "main"),
        ("web", "/never/cloned", "main"),
        ("svc-b", &svc_b, "main"),
    ])]);

    let mut cmd = fixture.command();
    with_git_identity(&mut cmd)
        .args(["--color", "never", "run", "--search", "builtin"])
        .args(["--api-url", &api_url, "--workspace", "ws"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] svc-a: committed"))
        .stdout(predicate::str::contains("[--] svc-b: no match"))
        .stdout(predicate::str::contains("Changed files (1):\n   svc-a/deps.txt"))
        .stdout(predicate::str::contains("   web").not());

    fixture
        .child("ws/svc-a/deps.txt")
        .assert(predicate::str::contains("tool==1.3.0"));
    fixture.child("ws/web").assert(predicate::path::missing());

    let requests = server.join().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET /orgs/acme/repos?"));
}

#[test]
fn test_run_rejects_branch_equal_to_default_before_clone() {
    if !git_available() {
        return;
    }
    let fixture = TestFixture::new().with_config(configs::LOCAL);
    let svc_a = init_remote(fixture.path(), "svc-a", &[("deps.txt", "tool==1.2.3\n")]);
    let (api_url, server) = serve_json(vec![listing(&[("svc-a", &svc_a, "bump-tool")])]);

    fixture
        .command()
        .args(["run", "--api-url", &api_url, "--workspace", "ws"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("default branch of svc-a"));

    fixture.child("ws").assert(predicate::path::missing());
    server.join().unwrap();
}

#[test]
fn test_select_lists_without_cloning() {
    let fixture = TestFixture::new().with_config(configs::LOCAL);
    let (api_url, server) = serve_json(vec![listing(&[
        ("svc-a", "git@github.com:acme/svc-a.git", "main"),
        ("svc-b", "git@github.com:acme/svc-b.git", "trunk"),
        ("web", "git@github.com:acme/web.git", "main"),
    ])]);

    fixture
        .command()
        .args(["--color", "never", "select", "--api-url", &api_url])
        .args(["--ignore", "svc-b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 repositories selected in acme"))
        .stdout(predicate::str::contains("svc-a (main)"))
        .stdout(predicate::str::contains("svc-b").not());

    server.join().unwrap();
}
