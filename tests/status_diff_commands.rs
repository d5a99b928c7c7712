use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

mod common;

use common::command::{init_repository_dir, run_jot_command};
use common::file::{FileSpec, write_file};

#[rstest]
fn a_clean_repository_reports_only_the_branch(init_repository_dir: TempDir) {
    run_jot_command(init_repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("On branch master"))
        .stdout(predicate::str::contains("Changes").not())
        .stdout(predicate::str::contains("Untracked").not());
}

#[rstest]
fn workspace_edits_show_as_unstaged_changes(init_repository_dir: TempDir) {
    write_file(FileSpec::new(
        init_repository_dir.path().join("1.txt"),
        "one, edited".to_string(),
    ));

    run_jot_command(init_repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Changes not staged for commit:"))
        .stdout(predicate::str::contains("modified:   1.txt"));
}

#[rstest]
fn new_files_show_as_untracked_until_staged(init_repository_dir: TempDir) {
    write_file(FileSpec::new(
        init_repository_dir.path().join("new.txt"),
        "fresh".to_string(),
    ));

    run_jot_command(init_repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Untracked files:"))
        .stdout(predicate::str::contains("new.txt"));

    run_jot_command(init_repository_dir.path(), &["add", "new.txt"])
        .assert()
        .success();

    run_jot_command(init_repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Changes to be committed:"))
        .stdout(predicate::str::contains("new file:   new.txt"));
}

#[rstest]
fn diff_reports_workspace_changes_by_name_status(init_repository_dir: TempDir) {
    write_file(FileSpec::new(
        init_repository_dir.path().join("1.txt"),
        "one, edited".to_string(),
    ));
    std::fs::remove_file(init_repository_dir.path().join("a").join("2.txt")).unwrap();
    write_file(FileSpec::new(
        init_repository_dir.path().join("4.txt"),
        "four".to_string(),
    ));

    run_jot_command(init_repository_dir.path(), &["diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("M\t1.txt"))
        .stdout(predicate::str::contains("D\ta/2.txt"))
        .stdout(predicate::str::contains("A\t4.txt"));
}

#[rstest]
fn diff_cached_compares_head_against_the_staging_area(init_repository_dir: TempDir) {
    write_file(FileSpec::new(
        init_repository_dir.path().join("1.txt"),
        "one, edited".to_string(),
    ));

    run_jot_command(init_repository_dir.path(), &["diff", "--cached"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    run_jot_command(init_repository_dir.path(), &["add", "1.txt"])
        .assert()
        .success();

    run_jot_command(init_repository_dir.path(), &["diff", "--cached"])
        .assert()
        .success()
        .stdout(predicate::str::contains("M\t1.txt"));
}

#[rstest]
fn staged_and_unstaged_changes_are_reported_together(init_repository_dir: TempDir) {
    write_file(FileSpec::new(
        init_repository_dir.path().join("1.txt"),
        "one, staged".to_string(),
    ));
    run_jot_command(init_repository_dir.path(), &["add", "1.txt"])
        .assert()
        .success();

    write_file(FileSpec::new(
        init_repository_dir.path().join("a").join("2.txt"),
        "two, edited".to_string(),
    ));

    run_jot_command(init_repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Changes to be committed:"))
        .stdout(predicate::str::contains("modified:   1.txt"))
        .stdout(predicate::str::contains("Changes not staged for commit:"))
        .stdout(predicate::str::contains("modified:   a/2.txt"));
}

#[rstest]
fn diff_with_one_revision_compares_against_the_working_tree(init_repository_dir: TempDir) {
    write_file(FileSpec::new(
        init_repository_dir.path().join("1.txt"),
        "one, edited".to_string(),
    ));
    write_file(FileSpec::new(
        init_repository_dir.path().join("4.txt"),
        "four".to_string(),
    ));

    run_jot_command(init_repository_dir.path(), &["diff", "master"])
        .assert()
        .success()
        .stdout(predicate::str::contains("M\t1.txt"))
        .stdout(predicate::str::contains("A\t4.txt"));
}

#[rstest]
fn diff_between_two_revisions_uses_their_snapshots(init_repository_dir: TempDir) {
    run_jot_command(init_repository_dir.path(), &["branch", "before"])
        .assert()
        .success();

    common::command::commit_file_change(
        init_repository_dir.path(),
        "1.txt",
        "one, rewritten",
        "Rewrite 1.txt",
    );

    run_jot_command(init_repository_dir.path(), &["diff", "before", "master"])
        .assert()
        .success()
        .stdout(predicate::str::contains("M\t1.txt"));
}
