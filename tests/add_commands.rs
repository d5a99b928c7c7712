use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

use common::command::{init_repository_dir, jot_commit, repository_dir, run_jot_command};
use common::file::{FileSpec, write_file};

#[rstest]
fn add_stages_files_from_nested_directories(repository_dir: TempDir) {
    run_jot_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("top.txt"),
        "top".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("nested").join("deep").join("leaf.txt"),
        "leaf".to_string(),
    ));

    run_jot_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    run_jot_command(repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("new file:   top.txt"))
        .stdout(predicate::str::contains("new file:   nested/deep/leaf.txt"));
}

#[rstest]
fn adding_an_untracked_missing_path_fails(init_repository_dir: TempDir) {
    run_jot_command(init_repository_dir.path(), &["add", "ghost.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("did not match any files"));
}

#[rstest]
fn adding_a_deleted_tracked_file_stages_its_removal(init_repository_dir: TempDir) {
    std::fs::remove_file(init_repository_dir.path().join("1.txt")).unwrap();

    run_jot_command(init_repository_dir.path(), &["add", "1.txt"])
        .assert()
        .success();

    run_jot_command(init_repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted: "))
        .stdout(predicate::str::contains("1.txt"));

    jot_commit(init_repository_dir.path(), "Remove 1.txt")
        .assert()
        .success();
}

#[rstest]
fn restaging_unchanged_content_produces_the_same_object(init_repository_dir: TempDir) {
    let objects_dir = init_repository_dir.path().join(".jot").join("objects");

    let count_objects = || {
        walkdir::WalkDir::new(&objects_dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .count()
    };

    let before = count_objects();

    run_jot_command(init_repository_dir.path(), &["add", "."])
        .assert()
        .success();

    assert_eq!(count_objects(), before);
}
