use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Isolated home for CLI tests: its own save directory, config file, and
/// HOME/XDG dirs so nothing leaks from the host.
pub struct TestHome {
    dir: TempDir,
}

#[allow(dead_code)]
impl TestHome {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        fs::write(dir.path().join("trak.toml"), "").expect("write empty config");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn save_dir(&self) -> PathBuf {
        self.dir.path().join("tasks")
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.path().join("trak.toml")
    }

    /// A command with the save directory pinned to this home.
    pub fn cmd(&self) -> Command {
        let mut cmd = self.cmd_config_only();
        cmd.env("TRAK_SAVE_DIR", self.save_dir());
        cmd
    }

    /// A command that resolves its save directory through the config file,
    /// for save-dir switching tests.
    pub fn cmd_config_only(&self) -> Command {
        let mut cmd = trak_cmd();
        cmd.env("HOME", self.dir.path());
        cmd.env("XDG_CONFIG_HOME", self.dir.path().join(".config"));
        cmd.env("XDG_DATA_HOME", self.dir.path().join(".local-share"));
        cmd.env("TRAK_CONFIG", self.config_file());
        cmd
    }

    pub fn read_file(&self, rel_path: &str) -> String {
        fs::read_to_string(self.dir.path().join(rel_path)).expect("read file")
    }
}

pub fn trak_cmd() -> Command {
    Command::cargo_bin("trak").expect("binary")
}
