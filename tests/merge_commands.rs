use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

mod common;

use common::command::{commit_file_change, init_repository_dir, run_jot_command};
use common::file::{FileSpec, write_file};

fn read_ref(dir: &std::path::Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(".jot").join("refs").join("heads").join(name))
        .unwrap()
        .trim()
        .to_string()
}

/// A branch `feature` that edits `a/2.txt`, with `master` checked out again
fn diverge_on_feature(dir: &std::path::Path, feature_content: &str) {
    run_jot_command(dir, &["branch", "feature"]).assert().success();
    run_jot_command(dir, &["checkout", "feature"]).assert().success();
    commit_file_change(dir, "a/2.txt", feature_content, "Change a/2.txt on feature");
    run_jot_command(dir, &["checkout", "master"]).assert().success();
}

#[rstest]
fn merging_an_already_contained_branch_is_a_no_op(init_repository_dir: TempDir) {
    run_jot_command(init_repository_dir.path(), &["branch", "feature"])
        .assert()
        .success();

    commit_file_change(
        init_repository_dir.path(),
        "1.txt",
        "one, ahead",
        "Move master ahead",
    );

    run_jot_command(init_repository_dir.path(), &["merge", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already up to date."));
}

#[rstest]
fn a_descendant_giver_fast_forwards_the_current_branch(init_repository_dir: TempDir) {
    diverge_on_feature(init_repository_dir.path(), "two, improved");

    run_jot_command(init_repository_dir.path(), &["merge", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fast-forward"));

    assert_eq!(
        read_ref(init_repository_dir.path(), "master"),
        read_ref(init_repository_dir.path(), "feature")
    );

    let content =
        std::fs::read_to_string(init_repository_dir.path().join("a").join("2.txt")).unwrap();
    assert_eq!(content, "two, improved");
}

#[rstest]
fn divergent_branches_without_conflicts_merge_automatically(init_repository_dir: TempDir) {
    diverge_on_feature(init_repository_dir.path(), "two, from feature");

    commit_file_change(
        init_repository_dir.path(),
        "1.txt",
        "one, from master",
        "Change 1.txt on master",
    );

    run_jot_command(init_repository_dir.path(), &["merge", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merge feature into master"));

    // modified paths take the giver's content, so the receiver-side edit to
    // 1.txt is replaced by the giver's unchanged copy
    let one = std::fs::read_to_string(init_repository_dir.path().join("1.txt")).unwrap();
    let two =
        std::fs::read_to_string(init_repository_dir.path().join("a").join("2.txt")).unwrap();
    assert_eq!(one, "one");
    assert_eq!(two, "two, from feature");

    // the merge commit records both parents
    let merge_oid = read_ref(init_repository_dir.path(), "master");
    let output = run_jot_command(init_repository_dir.path(), &["cat-file", "-p", &merge_oid])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let commit_text = String::from_utf8(output).unwrap();
    assert_eq!(commit_text.matches("parent ").count(), 2);

    // no merge is left in progress
    assert!(
        !init_repository_dir
            .path()
            .join(".jot")
            .join("MERGE_HEAD")
            .exists()
    );
}

#[rstest]
fn conflicting_edits_stop_the_merge_for_resolution(init_repository_dir: TempDir) {
    run_jot_command(init_repository_dir.path(), &["branch", "feature"])
        .assert()
        .success();
    run_jot_command(init_repository_dir.path(), &["checkout", "feature"])
        .assert()
        .success();
    commit_file_change(
        init_repository_dir.path(),
        "1.txt",
        "one, from feature",
        "Edit 1.txt on feature",
    );
    run_jot_command(init_repository_dir.path(), &["checkout", "master"])
        .assert()
        .success();
    commit_file_change(
        init_repository_dir.path(),
        "1.txt",
        "one, from master",
        "Edit 1.txt on master",
    );

    run_jot_command(init_repository_dir.path(), &["merge", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "CONFLICT (content): Merge conflict in 1.txt",
        ))
        .stdout(predicate::str::contains("Automatic merge failed"));

    // the working copy holds both sides between conflict markers
    let conflicted = std::fs::read_to_string(init_repository_dir.path().join("1.txt")).unwrap();
    assert!(conflicted.contains("<<<<<<< HEAD"));
    assert!(conflicted.contains("one, from master"));
    assert!(conflicted.contains("======="));
    assert!(conflicted.contains("one, from feature"));
    assert!(conflicted.contains(">>>>>>> feature"));

    // committing is refused while the conflict is unresolved
    run_jot_command(init_repository_dir.path(), &["commit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unresolved conflicts"));

    run_jot_command(init_repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("You have unmerged paths."))
        .stdout(predicate::str::contains("both modified:   1.txt"));

    // starting another merge in this state is refused
    run_jot_command(init_repository_dir.path(), &["merge", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already in progress"));

    // resolving and committing completes the merge with the recorded message
    write_file(FileSpec::new(
        init_repository_dir.path().join("1.txt"),
        "one, reconciled".to_string(),
    ));
    run_jot_command(init_repository_dir.path(), &["add", "1.txt"])
        .assert()
        .success();
    run_jot_command(init_repository_dir.path(), &["commit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merge feature into master"));

    assert!(
        !init_repository_dir
            .path()
            .join(".jot")
            .join("MERGE_HEAD")
            .exists()
    );
}

#[rstest]
fn aborting_a_merge_restores_the_pre_merge_state(init_repository_dir: TempDir) {
    run_jot_command(init_repository_dir.path(), &["branch", "feature"])
        .assert()
        .success();
    run_jot_command(init_repository_dir.path(), &["checkout", "feature"])
        .assert()
        .success();
    commit_file_change(
        init_repository_dir.path(),
        "1.txt",
        "one, from feature",
        "Edit 1.txt on feature",
    );
    run_jot_command(init_repository_dir.path(), &["checkout", "master"])
        .assert()
        .success();
    commit_file_change(
        init_repository_dir.path(),
        "1.txt",
        "one, from master",
        "Edit 1.txt on master",
    );

    run_jot_command(init_repository_dir.path(), &["merge", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CONFLICT"));

    run_jot_command(init_repository_dir.path(), &["merge", "--abort"])
        .assert()
        .success();

    let content = std::fs::read_to_string(init_repository_dir.path().join("1.txt")).unwrap();
    assert_eq!(content, "one, from master");

    assert!(
        !init_repository_dir
            .path()
            .join(".jot")
            .join("MERGE_HEAD")
            .exists()
    );

    run_jot_command(init_repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unmerged").not());
}

#[rstest]
fn aborting_a_merge_leaves_untracked_files_alone(init_repository_dir: TempDir) {
    run_jot_command(init_repository_dir.path(), &["branch", "feature"])
        .assert()
        .success();
    run_jot_command(init_repository_dir.path(), &["checkout", "feature"])
        .assert()
        .success();
    commit_file_change(
        init_repository_dir.path(),
        "1.txt",
        "one, from feature",
        "Edit 1.txt on feature",
    );
    run_jot_command(init_repository_dir.path(), &["checkout", "master"])
        .assert()
        .success();
    commit_file_change(
        init_repository_dir.path(),
        "1.txt",
        "one, from master",
        "Edit 1.txt on master",
    );

    run_jot_command(init_repository_dir.path(), &["merge", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CONFLICT"));

    write_file(FileSpec::new(
        init_repository_dir.path().join("notes.txt"),
        "scratch notes".to_string(),
    ));

    run_jot_command(init_repository_dir.path(), &["merge", "--abort"])
        .assert()
        .success();

    let notes = std::fs::read_to_string(init_repository_dir.path().join("notes.txt")).unwrap();
    assert_eq!(notes, "scratch notes");
}

#[rstest]
fn aborting_without_a_merge_in_progress_fails(init_repository_dir: TempDir) {
    run_jot_command(init_repository_dir.path(), &["merge", "--abort"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no merge to abort"));
}
