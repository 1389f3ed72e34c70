use crate::common::command::{bit_stdout, init_repository_dir, object_files, run_bit_command};
use assert_fs::TempDir;
use assert_fs::prelude::{FileWriteStr, PathChild};
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn adding_an_ignored_file_writes_no_entry_and_no_blob(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    init_repository_dir.child(".bitignore").write_str("*.log\n")?;
    init_repository_dir.child("app.log").write_str("noise")?;

    run_bit_command(dir, &["add", "app.log"])
        .assert()
        .success()
        .stdout("ignored: app.log\n");

    assert_eq!(bit_stdout(dir, &["ls-files"]), "");
    assert!(object_files(dir).is_empty());

    Ok(())
}

#[rstest]
fn adding_a_directory_skips_ignored_files_inside_it(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    init_repository_dir.child(".bitignore").write_str("*.log\nbuild\n")?;
    init_repository_dir.child("a/debug.log").write_str("noise")?;
    init_repository_dir.child("a/build/out.o").write_str("obj")?;
    init_repository_dir.child("a/catalogue.txt").write_str("kept")?;

    run_bit_command(dir, &["add", "a"]).assert().success();

    assert_eq!(
        bit_stdout(dir, &["ls-files"]),
        "a/2.txt\na/b/3.txt\na/catalogue.txt\n"
    );

    Ok(())
}

#[rstest]
fn anchored_patterns_only_match_from_the_root(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    init_repository_dir.child(".bitignore").write_str("/a/b\n")?;
    init_repository_dir.child("c/a/b/kept.txt").write_str("kept")?;

    run_bit_command(dir, &["add", "a", "c"]).assert().success();

    assert_eq!(bit_stdout(dir, &["ls-files"]), "a/2.txt\nc/a/b/kept.txt\n");

    Ok(())
}

#[rstest]
fn default_ignore_file_skips_build_output(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    init_repository_dir.child("target/debug/app").write_str("binary")?;
    init_repository_dir.child("node_modules/pkg/index.js").write_str("js")?;

    run_bit_command(dir, &["add", "."]).assert().success();

    assert_eq!(
        bit_stdout(dir, &["ls-files"]),
        ".bitignore\n1.txt\na/2.txt\na/b/3.txt\n"
    );

    Ok(())
}
