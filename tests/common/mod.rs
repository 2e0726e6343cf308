//! Shared test utilities for the CLI end-to-end tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_config(configs::LOCAL);
//!     fixture.command().arg("validate").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::Command;
use std::thread::{self, JoinHandle};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    #[allow(unused_imports)]
    pub use super::{git_available, init_remote, serve_json};
    pub use super::TestFixture;
}

/// Common configuration YAML snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// A complete local-only sweep selected by name.
    pub const LOCAL: &str = r#"
org: acme
name-contains: svc-
branch: bump-tool
message: Bump tool to 1.3.0
target: "1.2.3"
replacement: "1.3.0"
"#;

    /// Explicit list combined with a rule.
    pub const CONFLICTING_SELECTION: &str = r#"
org: acme
repos: [svc-a]
name-contains: svc-
branch: bump-tool
message: Bump
target: "1.2.3"
replacement: "1.3.0"
"#;

    /// Topic branch named like a protected branch.
    pub const PROTECTED_BRANCH: &str = r#"
org: acme
name-contains: svc-
branch: main
message: Bump
target: "1.2.3"
replacement: "1.3.0"
"#;

    /// Key the schema does not know.
    pub const UNKNOWN_KEY: &str = r#"
org: acme
repo-regex: "svc-.*"
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "invalid: yaml: content:";
}

/// A temporary directory with an optional `.repo-sweep.yaml`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.repo-sweep.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child(".repo-sweep.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A command running in this fixture's directory with a clean environment
    /// for the sweep's own variables.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repo-sweep");
        cmd.current_dir(self.path())
            .env_remove("REPO_SWEEP_CONFIG")
            .env_remove("GITHUB_TOKEN")
            .env_remove("GITHUB_API_URL")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.name=Fixture",
            "-c",
            "user.email=fixture@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .status()
        .expect("failed to run git");
    assert!(status.success(), "git {:?} failed", args);
}

/// Create a bare repository `<root>/remotes/<name>.git` whose `main` holds
/// `files`, returning its path for use as a clone URL.
#[allow(dead_code)]
pub fn init_remote(root: &Path, name: &str, files: &[(&str, &str)]) -> String {
    let bare = root.join("remotes").join(format!("{}.git", name));
    std::fs::create_dir_all(&bare).unwrap();
    git(&bare, &["init", "--quiet", "--bare", "--initial-branch=main"]);

    let seed = root.join("seeds").join(name);
    std::fs::create_dir_all(&seed).unwrap();
    git(&seed, &["init", "--quiet", "--initial-branch=main"]);
    for (path, content) in files {
        std::fs::write(seed.join(path), content).unwrap();
    }
    git(&seed, &["add", "--all"]);
    git(&seed, &["commit", "--quiet", "-m", "seed"]);
    let url = bare.to_string_lossy().to_string();
    git(&seed, &["push", "--quiet", &url, "main"]);
    url
}

/// Answer one request per canned JSON body, returning the base URL and the
/// request lines received.
#[allow(dead_code)]
pub fn serve_json(bodies: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for body in bodies {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line.trim_end().is_empty() {
                    break;
                }
            }
            seen.push(request_line.trim_end().to_string());

            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )
            .unwrap();
            stream.flush().unwrap();
        }
        seen
    });
    (url, handle)
}
