#![cfg(all(feature = "filesys", feature = "userprog", feature = "vm"))]

mod common;

use common::{Recorder, args};
use kernel_boot::actions::run_actions;
use kernel_boot::shutdown::finalize;
use kernel_boot::{Arg, BootConfiguration, BootError};

fn self_tests() -> BootConfiguration {
    BootConfiguration {
        thread_tests: true,
        ..BootConfiguration::default()
    }
}

#[test]
fn run_in_self_test_mode_only_calls_the_test_runner() {
    let mut rec = Recorder::new();
    run_actions(&args(&["run", "echoTest"]), &self_tests(), &mut rec).expect("run");

    assert_eq!(rec.calls, ["run_test echoTest"]);
    assert_eq!(
        rec.console,
        "Executing 'echoTest':\nExecution of 'echoTest' complete.\n"
    );
}

#[test]
fn run_starts_and_waits_for_a_user_program() {
    let mut rec = Recorder::new();
    let script = args(&["run", "echo x y"]);
    run_actions(&script, &BootConfiguration::default(), &mut rec).expect("run");

    assert_eq!(rec.calls, ["process_create_initd echo x y", "process_wait 3"]);
    assert!(rec.console.starts_with("Executing 'echo x y':\n"));
}

#[test]
fn missing_operand_is_fatal() {
    let mut rec = Recorder::new();
    let err = run_actions(&args(&["cat"]), &self_tests(), &mut rec).expect_err("no file");

    assert_eq!(
        err,
        BootError::MissingArguments {
            name: Arg::new(b"cat"),
            required: 1
        }
    );
    assert_eq!(err.to_string(), "action `cat' requires 1 argument(s)");
    assert!(rec.calls.is_empty());
}

#[test]
fn filesystem_actions_delegate_in_order() {
    let mut rec = Recorder::new();
    let script = args(&["put", "a", "ls", "cat", "a", "get", "b", "rm", "a"]);
    run_actions(&script, &self_tests(), &mut rec).expect("script");

    assert_eq!(
        rec.calls,
        [
            "fsutil_put a",
            "fsutil_ls",
            "fsutil_cat a",
            "fsutil_get b",
            "fsutil_rm a"
        ]
    );
}

#[test]
fn action_names_can_be_operands() {
    let mut rec = Recorder::new();
    run_actions(&args(&["cat", "ls", "run", "rm"]), &self_tests(), &mut rec).expect("script");
    assert_eq!(rec.calls, ["fsutil_cat ls", "run_test rm"]);
}

#[test]
fn options_after_actions_are_unknown_actions() {
    let mut rec = Recorder::new();
    let err = run_actions(&args(&["ls", "-q"]), &self_tests(), &mut rec).expect_err("-q");

    assert_eq!(err, BootError::UnknownAction(Arg::new(b"-q")));
    assert_eq!(rec.calls, ["fsutil_ls"]);
}

#[test]
fn empty_script_does_nothing() {
    let mut rec = Recorder::new();
    run_actions(&[], &self_tests(), &mut rec).expect("empty");
    assert!(rec.calls.is_empty());
}

#[test]
fn finalize_flushes_reports_and_announces() {
    let mut rec = Recorder::new();
    finalize(&mut rec);

    assert_eq!(rec.calls.first().map(String::as_str), Some("filesys_done"));
    assert_eq!(rec.calls.len(), 7);
    assert_eq!(rec.console, "Powering off...\n");
}
