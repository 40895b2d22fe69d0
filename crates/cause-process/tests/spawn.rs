// SPDX-License-Identifier: (MIT OR Apache-2.0)
#![cfg(unix)]

use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use cause_process::{start, Cancel, ChildEvent, ProcessError, Start, DRAIN_TIMEOUT};
use serde_json::json;

const TIMEOUT: Duration = Duration::from_secs(10);

fn launch(child: Start) -> (Option<Cancel>, Receiver<ChildEvent>) {
    let (tx, rx) = mpsc::channel();
    let cancel = start(child, move |event| {
        let _ = tx.send(event);
    });
    (cancel, rx)
}

fn next(rx: &Receiver<ChildEvent>) -> ChildEvent {
    rx.recv_timeout(TIMEOUT).expect("no event from child")
}

fn sh(script: &str) -> Start {
    Start::new("/bin/sh", ["-c", script])
}

#[test]
fn reports_start_and_exit_code() {
    let (cancel, rx) = launch(sh("exit 3"));
    assert!(cancel.is_some());
    assert!(matches!(next(&rx), ChildEvent::Started { .. }));
    assert!(matches!(next(&rx), ChildEvent::Exited { exit_code: Some(3) }));
}

#[test]
fn missing_program_is_an_error_event() {
    let (cancel, rx) = launch(Start::new("/definitely/not/a/program", Vec::<String>::new()));
    assert!(cancel.is_none());
    assert!(matches!(next(&rx), ChildEvent::Error { error: ProcessError::Spawn { .. } }));
}

#[test]
fn messages_flow_both_ways() {
    let script = r#"read line; echo "$line"; echo '{"fromKeyPath": [0], "done": true}'"#;
    let (_cancel, rx) = launch(sh(script).with_messaging());

    let ChildEvent::Started { send, .. } = next(&rx) else {
        panic!("expected the child to start");
    };
    send.send(&json!({ "type": "ping" })).unwrap();

    assert!(matches!(next(&rx), ChildEvent::Message { event } if event == json!({ "type": "ping" })));
    assert!(matches!(next(&rx), ChildEvent::Message { event } if event == json!({ "done": true })));
    assert!(matches!(next(&rx), ChildEvent::Exited { exit_code: Some(0) }));
}

#[test]
fn malformed_output_is_reported() {
    let (_cancel, rx) = launch(sh("echo not-json").with_messaging());
    assert!(matches!(next(&rx), ChildEvent::Started { .. }));
    assert!(matches!(next(&rx), ChildEvent::Error { error: ProcessError::Decode(_) }));
    assert!(matches!(next(&rx), ChildEvent::Exited { exit_code: Some(0) }));
}

#[test]
fn send_without_messaging_is_closed() {
    let (_cancel, rx) = launch(sh("exit 0"));
    let ChildEvent::Started { send, .. } = next(&rx) else {
        panic!("expected the child to start");
    };
    assert!(matches!(send.send(&json!(1)), Err(ProcessError::Closed)));
}

#[test]
fn cancel_interrupts_the_group() {
    let (cancel, rx) = launch(sh("exec sleep 30"));
    let cancel = cancel.unwrap();
    let ChildEvent::Started { pid, .. } = next(&rx) else {
        panic!("expected the child to start");
    };
    assert_eq!(cancel.pgid(), pid);

    std::thread::sleep(Duration::from_millis(100));
    cancel.cancel().unwrap();
    assert!(matches!(next(&rx), ChildEvent::Exited { exit_code: None }));
}

#[test]
fn exit_is_reported_while_a_descendant_holds_output_open() {
    // The background `sleep` inherits stdout and outlives the shell.
    let (_cancel, rx) = launch(sh("sleep 5 & echo '{\"early\": true}'").with_messaging());
    assert!(matches!(next(&rx), ChildEvent::Started { .. }));
    assert!(matches!(next(&rx), ChildEvent::Message { event } if event == json!({ "early": true })));

    let exited = rx.recv_timeout(DRAIN_TIMEOUT + Duration::from_secs(2)).expect("no exit event");
    assert!(matches!(exited, ChildEvent::Exited { exit_code: Some(0) }));
}
