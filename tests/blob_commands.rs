use crate::common::command::{init_repository_dir, run_nib_command};
use crate::common::file::{FileSpec, write_file};
use crate::common::read_loose_object;
use assert_fs::TempDir;
use fake::Fake;
use fake::faker::lorem::en::{Word, Words};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

const HELLO_OID: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

fn write_hello(dir: &TempDir) {
    write_file(FileSpec::new(dir.path().join("hello.txt"), "hello\n".to_string()));
}

#[rstest]
fn hash_object_with_write_stores_the_blob(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write_hello(&init_repository_dir);

    run_nib_command(init_repository_dir.path(), &["hash-object", "-w", "hello.txt"])
        .assert()
        .success()
        .stdout(format!("{HELLO_OID}\n"));

    assert_eq!(
        read_loose_object(init_repository_dir.path(), HELLO_OID)?,
        b"blob 6\0hello\n"
    );

    Ok(())
}

#[rstest]
fn hash_object_without_write_touches_nothing(init_repository_dir: TempDir) {
    write_hello(&init_repository_dir);

    run_nib_command(init_repository_dir.path(), &["hash-object", "hello.txt"])
        .assert()
        .success()
        .stdout(format!("{HELLO_OID}\n"));

    assert!(!init_repository_dir.path().join(".git/objects/ce").exists());
}

#[rstest]
fn hash_object_respects_the_requested_kind(init_repository_dir: TempDir) {
    write_hello(&init_repository_dir);

    // same payload, different header, different identity
    run_nib_command(
        init_repository_dir.path(),
        &["hash-object", "-t", "commit", "hello.txt"],
    )
    .assert()
    .success()
    .stdout(predicate::str::is_match(r"^[0-9a-f]{40}\n$").unwrap())
    .stdout(predicate::str::contains(HELLO_OID).not());

    run_nib_command(
        init_repository_dir.path(),
        &["hash-object", "-t", "bogus", "hello.txt"],
    )
    .assert()
    .failure();
}

#[rstest]
fn cat_file_reads_back_by_prefix(init_repository_dir: TempDir) {
    let file_name = format!("{}.txt", Word().fake::<String>());
    let file_content = Words(5..10).fake::<Vec<String>>().join(" ");
    write_file(FileSpec::new(
        init_repository_dir.path().join(&file_name),
        file_content.clone(),
    ));

    let output = run_nib_command(init_repository_dir.path(), &["hash-object", "-w", &file_name])
        .output()
        .unwrap();
    let oid = String::from_utf8(output.stdout).unwrap().trim().to_string();

    run_nib_command(init_repository_dir.path(), &["cat-file", "blob", &oid[..6]])
        .assert()
        .success()
        .stdout(file_content.clone());

    run_nib_command(init_repository_dir.path(), &["cat-file", "pretty", &oid])
        .assert()
        .success()
        .stdout(file_content.clone());

    run_nib_command(init_repository_dir.path(), &["cat-file", "type", &oid[..4]])
        .assert()
        .success()
        .stdout("blob\n");

    run_nib_command(init_repository_dir.path(), &["cat-file", "size", &oid[..4]])
        .assert()
        .success()
        .stdout(format!("{}\n", file_content.len()));
}

#[rstest]
fn cat_file_checks_the_object_kind(init_repository_dir: TempDir) {
    write_hello(&init_repository_dir);
    run_nib_command(init_repository_dir.path(), &["hash-object", "-w", "hello.txt"])
        .assert()
        .success();

    run_nib_command(init_repository_dir.path(), &["cat-file", "commit", "ce0136"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected commit, found blob"));
}

#[rstest]
fn cat_file_reports_unknown_and_too_short_prefixes(init_repository_dir: TempDir) {
    run_nib_command(init_repository_dir.path(), &["cat-file", "blob", "abcdef"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("object not found"));

    run_nib_command(init_repository_dir.path(), &["cat-file", "blob", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 or more characters"));
}
