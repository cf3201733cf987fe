//! End-to-end tests that drive the real `xmk` binary against the real
//! filesystem and shell, in a throwaway directory. These exist alongside
//! the in-memory `MockWorld` unit tests (see `src/testutil.rs`) to confirm
//! that the mock and the real `LocalWorld` agree on the literal scenarios
//! spec.md §8 calls out (S1-S6).

use std::fs;
use std::process::Command;

use tempfile::tempdir;
use test_log::test;

fn xmk() -> Command {
    Command::new(env!("CARGO_BIN_EXE_xmk"))
}

#[test]
fn s1_hello_build() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("default.xmk"),
        r#"
        build hello
        target hello {
          created using { echo hi > hello }
        }
        "#,
    )
    .unwrap();

    let status = xmk().current_dir(dir.path()).status().unwrap();
    assert!(status.success());

    let contents = fs::read_to_string(dir.path().join("hello")).unwrap();
    assert_eq!(contents, "hi\n");
}

#[test]
fn s2_incremental_skip_runs_no_commands_and_reports_up_to_date() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("default.xmk"),
        r#"
        build hello
        target hello {
          created using { echo hi > hello }
        }
        "#,
    )
    .unwrap();

    let status = xmk().current_dir(dir.path()).status().unwrap();
    assert!(status.success());

    let output = xmk().arg("-v").current_dir(dir.path()).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Target \"hello\" is up to date"));
}

#[test]
fn s3_dep_driven_rebuild_runs_in_order() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("default.xmk"),
        r#"
        build app
        target app {
          depends on { a.o }
          created using { cat a.o > app }
        }
        target a.o {
          depends on { a.c }
          created using { cp a.c a.o }
        }
        "#,
    )
    .unwrap();
    fs::write(dir.path().join("a.c"), "int main() {}\n").unwrap();

    let status = xmk().current_dir(dir.path()).status().unwrap();
    assert!(status.success());

    assert!(dir.path().join("a.o").exists());
    assert!(dir.path().join("app").exists());
    let app = fs::read_to_string(dir.path().join("app")).unwrap();
    let a_o = fs::read_to_string(dir.path().join("a.o")).unwrap();
    assert_eq!(app, a_o);
}

#[test]
fn s4_define_and_target_macro_expansion() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("default.xmk"),
        r#"
        define CC as true
        build out
        target out {
          created using { $CC -o $(target) main.c && echo built > out }
        }
        "#,
    )
    .unwrap();

    let status = xmk().current_dir(dir.path()).status().unwrap();
    assert!(status.success());
    assert!(dir.path().join("out").exists());
}

#[test]
fn s5_dep_index_macro_expansion() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("default.xmk"),
        r#"
        build link
        target link {
          depends on { a.o b.o }
          created using { cat a.o b.o > link }
        }
        target a.o { created using { echo a > a.o } }
        target b.o { created using { echo b > b.o } }
        "#,
    )
    .unwrap();

    let status = xmk().current_dir(dir.path()).status().unwrap();
    assert!(status.success());
    let link = fs::read_to_string(dir.path().join("link")).unwrap();
    assert_eq!(link, "a\nb\n");
}

#[test]
fn s6_missing_build_directive_is_fatal() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("default.xmk"),
        r#"
        target lonely {
          created using { echo hi }
        }
        "#,
    )
    .unwrap();

    let output = xmk().current_dir(dir.path()).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No build target") || stderr.to_lowercase().contains("build target"));
}

#[test]
fn preprocess_only_prints_expanded_source_without_building() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("default.xmk"),
        r#"
        define CC as gcc
        build out
        target out {
          created using { $CC -o $(target) main.c }
        }
        "#,
    )
    .unwrap();

    let output = xmk().arg("-E").current_dir(dir.path()).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("gcc -o out main.c"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn quiet_flag_suppresses_command_echo() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("default.xmk"),
        r#"
        build hello
        target hello {
          created using { echo hi > hello }
        }
        "#,
    )
    .unwrap();

    let output = xmk().arg("-q").current_dir(dir.path()).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("echo hi > hello"));
}

#[test]
fn custom_input_file_flag() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("build.xmk"),
        r#"
        build hello
        target hello {
          created using { echo hi > hello }
        }
        "#,
    )
    .unwrap();

    let status = xmk()
        .arg("-f")
        .arg("build.xmk")
        .current_dir(dir.path())
        .status()
        .unwrap();
    assert!(status.success());
    assert!(dir.path().join("hello").exists());
}

#[test]
fn nonzero_child_exit_is_fatal_with_exit_code_one() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("default.xmk"),
        r#"
        build hello
        target hello {
          created using { false }
        }
        "#,
    )
    .unwrap();

    let output = xmk().current_dir(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[error]"));
}
