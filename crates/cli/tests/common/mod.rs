//! Helpers for running the `autobackup` binary

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Command builder around the compiled binary
pub struct AutobackupCommand {
    working_dir: PathBuf,
    config_home: PathBuf,
    args: Vec<String>,
    stdin_data: String,
}

impl AutobackupCommand {
    /// Run in `working_dir`; the user config dir is redirected into it
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        let working_dir = working_dir.as_ref().to_path_buf();
        Self {
            config_home: working_dir.join(".config"),
            working_dir,
            args: Vec::new(),
            stdin_data: String::new(),
        }
    }

    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Text fed to stdin before it is closed
    pub fn stdin(&mut self, data: &str) -> &mut Self {
        self.stdin_data = data.to_string();
        self
    }

    pub fn execute(&self) -> CommandResult {
        let mut child = Command::new(env!("CARGO_BIN_EXE_autobackup"))
            .args(&self.args)
            .current_dir(&self.working_dir)
            .env("XDG_CONFIG_HOME", &self.config_home)
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn autobackup");

        if let Some(mut stdin) = child.stdin.take() {
            // The process may exit before reading stdin
            let _ = stdin.write_all(self.stdin_data.as_bytes());
        }

        let output = child.wait_with_output().expect("failed to wait for autobackup");
        CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        }
    }
}

#[derive(Debug)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
