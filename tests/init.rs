use crate::common::command::{repository_dir, run_nib_command};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn init_creates_git_skeleton(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir_absolute_path = repository_dir.path().canonicalize()?.display().to_string();

    run_nib_command(repository_dir.path(), &["init", "."])
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^initialized empty repository: .+\n$",
        )?)
        .stdout(predicate::str::contains(dir_absolute_path));

    let git_dir = repository_dir.path().join(".git");
    assert!(git_dir.join("objects").is_dir());
    assert!(git_dir.join("refs").join("heads").is_dir());
    assert_eq!(
        std::fs::read_to_string(git_dir.join("HEAD"))?,
        "ref: refs/heads/master"
    );
    assert!(!git_dir.join("refs/heads/master").exists());

    Ok(())
}

#[rstest]
fn init_creates_missing_repository_directory(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_nib_command(repository_dir.path(), &["init", "project"])
        .assert()
        .success();

    assert!(repository_dir.path().join("project/.git/HEAD").is_file());

    Ok(())
}

#[rstest]
fn init_refuses_existing_repository(repository_dir: TempDir) {
    run_nib_command(repository_dir.path(), &["init", "."])
        .assert()
        .success();

    run_nib_command(repository_dir.path(), &["init", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
