use crate::common::redirect_temp_dir;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const AUTHOR_NAME: &str = "fake_user";
pub const AUTHOR_EMAIL: &str = "fake_email@email.com";
/// `%Y-%m-%d %H:%M:%S %z`, i.e. epoch 1672574400
pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    redirect_temp_dir();
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_nib_command(repository_dir.path(), &["init", "."])
        .assert()
        .success();

    repository_dir
}

pub fn run_nib_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("nib").expect("Failed to find nib binary");
    cmd.current_dir(dir);
    cmd.env_remove("NIB_LOG");
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn nib_commit(dir: &Path, message: &str) -> Command {
    let mut cmd = run_nib_command(dir, &["commit", "-m", message]);
    cmd.envs(vec![
        ("GIT_AUTHOR_NAME", AUTHOR_NAME),
        ("GIT_AUTHOR_EMAIL", AUTHOR_EMAIL),
        ("GIT_AUTHOR_DATE", AUTHOR_DATE),
    ]);
    cmd
}
