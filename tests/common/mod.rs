use assert_cmd::{Command, cargo::cargo_bin_cmd};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub fn treeseal_cmd(root: &Path, mode: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("treeseal");
    cmd.env_remove("RUST_LOG")
        .env_remove("TREESEAL_DIRECTORY")
        .env_remove("TREESEAL_MODE")
        .arg("-d")
        .arg(root)
        .arg("-m")
        .arg(mode);
    cmd
}

/// `a.txt` = "hello", `sub/b.txt` = "world".
pub fn hello_world_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), "hello").unwrap();
    fs::create_dir(temp.path().join("sub")).unwrap();
    fs::write(temp.path().join("sub/b.txt"), "world").unwrap();
    temp
}

// Each integration test file is compiled as its own crate, and not all of
// them initialize a tree before running.
#[allow(dead_code)]
pub fn initialized_tree() -> TempDir {
    let temp = hello_world_tree();
    treeseal_cmd(temp.path(), "init").assert().success();
    temp
}
