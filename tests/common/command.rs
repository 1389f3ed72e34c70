use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Initialized repository with `1.txt`, `a/2.txt` and `a/b/3.txt` in the workspace
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_bit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    ));

    repository_dir
}

/// Same as `init_repository_dir`, with its three files staged
#[fixture]
pub fn staged_repository_dir(init_repository_dir: TempDir) -> TempDir {
    run_bit_command(init_repository_dir.path(), &["add", "1.txt", "a"])
        .assert()
        .success();

    init_repository_dir
}

pub fn run_bit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("bitstage").expect("Failed to find bitstage binary");
    cmd.env_remove("BITSTAGE_DIR");
    cmd.env_remove("BITSTAGE_IGNORE_FILE");
    cmd.env_remove("BITSTAGE_COMPRESSION");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Run a command that must succeed and return its standard output
pub fn bit_stdout(dir: &Path, args: &[&str]) -> String {
    let output = run_bit_command(dir, args).assert().success();

    String::from_utf8(output.get_output().stdout.clone()).expect("stdout is not UTF-8")
}

pub fn object_files(dir: &Path) -> Vec<std::path::PathBuf> {
    walkdir::WalkDir::new(dir.join(".bit").join("objects"))
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}
