use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{KuboError, Result};

/// Default name of the Kubo binary.
pub const DEFAULT_IPFS_BIN: &str = "ipfs";

/// Drives a local Kubo node through its command-line interface.
///
/// Objects are transferred through temporary files created under the data
/// path. Every call spawns one `ipfs` process; the process is killed if the
/// calling future is dropped, so a request deadline also stops the backend
/// work it started.
#[derive(Clone, Debug)]
pub struct KuboClient {
    program: OsString,
    base_args: Vec<OsString>,
    data_path: PathBuf,
    repo_path: Option<PathBuf>,
}

impl KuboClient {
    /// Create a client that uses `ipfs` from `PATH` and stages files under
    /// `data_path`.
    pub fn new(data_path: impl AsRef<Path>) -> Self {
        // Rebuilding from components drops any trailing separator.
        let data_path = data_path.as_ref().components().collect();
        Self {
            program: DEFAULT_IPFS_BIN.into(),
            base_args: Vec::new(),
            data_path,
            repo_path: None,
        }
    }

    /// Use a different binary.
    pub fn with_binary(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self.base_args.clear();
        self
    }

    /// Run the node through a wrapper command, e.g. `docker exec node ipfs`.
    pub fn with_command<I, S>(mut self, program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.program = program.into();
        self.base_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Point the binary at a specific repository (`IPFS_PATH`).
    pub fn with_repo(mut self, repo_path: impl Into<PathBuf>) -> Self {
        self.repo_path = Some(repo_path.into());
        self
    }

    /// Directory used for staging files.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Run `ipfs <args>` and return its standard output.
    pub(crate) async fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        let command = args
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.base_args)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(repo) = &self.repo_path {
            cmd.env("IPFS_PATH", repo);
        }

        debug!(command = %command, "running ipfs");
        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(KuboError::Command {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
