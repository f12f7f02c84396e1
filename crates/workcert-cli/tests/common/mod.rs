// crates/workcert-cli/tests/common/mod.rs
// ============================================================================
// Module: CLI Test Harness
// Description: Runs the `workcert` binary against a scripted local server.
// Purpose: Exercise the composition root end to end.
// Dependencies: tiny_http, tempfile
// ============================================================================

//! ## Overview
//! [`Workspace`] owns a temporary directory holding `workcert.toml` and the
//! session file, and runs the compiled binary inside it. [`serve`] answers a
//! fixed list of JSON or raw responses and returns the request paths it saw.

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Shared test helpers may be unused in some cases."
)]

use std::fs;
use std::path::Path;
use std::process::Command;
use std::process::Output;
use std::thread;

use tempfile::TempDir;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// Scripted response: status, headers, body.
pub type Reply = (u16, Vec<(&'static str, &'static str)>, Vec<u8>);

/// JSON reply with `status`.
pub fn json_reply(status: u16, body: &serde_json::Value) -> Reply {
    (status, vec![("Content-Type", "application/json")], body.to_string().into_bytes())
}

/// Starts a server answering `replies` in order; join to get request paths.
pub fn serve(replies: Vec<Reply>) -> (String, thread::JoinHandle<Vec<String>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = thread::spawn(move || {
        let mut paths = Vec::new();
        for (status, headers, body) in replies {
            let Ok(request) = server.recv() else {
                break;
            };
            paths.push(format!("{} {}", request.method(), request.url()));
            let mut response = Response::from_data(body).with_status_code(status);
            for (name, value) in headers {
                response = response
                    .with_header(Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap());
            }
            let _ = request.respond(response);
        }
        paths
    });
    (format!("http://{addr}"), handle)
}

/// Temporary working directory with a config pointing at `base_url`.
pub struct Workspace {
    /// Directory holding config, session, and downloads.
    pub dir: TempDir,
}

impl Workspace {
    /// Creates a workspace for `base_url`.
    pub fn new(base_url: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = format!(
            "[api]\nbase_url = \"{base_url}\"\ntimeout_ms = 5000\n\n[session]\npath = \"session.json\"\n"
        );
        fs::write(dir.path().join("workcert.toml"), config).unwrap();
        Self {
            dir,
        }
    }

    /// Path inside the workspace.
    pub fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    /// Runs the binary with `args` in the workspace.
    pub fn run(&self, args: &[&str]) -> Output {
        run_in(self.dir.path(), args)
    }
}

/// Runs the binary in `dir`.
pub fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_workcert"))
        .args(args)
        .current_dir(dir)
        .env_remove("WORKCERT_CONFIG")
        .env_remove("WORKCERT_API_BASE_URL")
        .output()
        .unwrap()
}

/// Stdout as text.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr as text.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
