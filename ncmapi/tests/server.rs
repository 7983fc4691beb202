//! Process supervisor tests. They spawn real processes, so Unix only.
#![cfg(unix)]

mod common;

use common::StubGateway;
use ncmapi::{ApiConfig, Args, Gateway, NcmApiError, ServerHandle, start_server, stop_server};
use std::fs;
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

fn wait_for_file(path: &Path) -> String {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Ok(s) = fs::read_to_string(path) {
            if !s.is_empty() {
                return s;
            }
        }
        thread::sleep(Duration::from_millis(20));
    }
    panic!("{} never written", path.display());
}

#[test]
fn child_sees_host_and_port() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("env.txt");
    let script = format!("printf '%s:%s' \"$HOST\" \"$PORT\" > '{}'", out.display());
    let handle = start_server(&["sh", "-c", script.as_str()], 3456, "127.0.0.1").unwrap();
    assert!(handle.pid() > 0);
    assert_eq!(wait_for_file(&out), "127.0.0.1:3456");
    let _ = stop_server(handle);
}

#[test]
fn stop_running_server() {
    let mut handle = start_server(&["sleep", "30"], 3000, "localhost").unwrap();
    assert!(handle.is_running());
    stop_server(handle).unwrap();
}

#[test]
fn stop_exited_child_is_no_such_process() {
    let mut handle = start_server(&["true"], 3000, "localhost").unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while handle.is_running() {
        assert!(Instant::now() < deadline, "`true` did not exit");
        thread::sleep(Duration::from_millis(10));
    }
    let err = stop_server(handle).unwrap_err();
    assert!(err.is_no_such_process(), "{err}");
}

#[test]
fn stop_unknown_pid_leaves_other_processes_alone() {
    let mut bystander = start_server(&["sleep", "30"], 3000, "localhost").unwrap();

    // A pid that existed and was reaped, so nothing owns it now.
    let mut gone = Command::new("true").spawn().unwrap();
    let pid = gone.id();
    gone.wait().unwrap();

    let err = stop_server(ServerHandle::from_pid(pid)).unwrap_err();
    assert!(matches!(err, NcmApiError::NoSuchProcess { pid: p } if p == pid), "{err}");

    assert!(bystander.is_running());
    stop_server(bystander).unwrap();
}

#[test]
fn stop_pid_zero_does_not_signal_the_process_group() {
    let mut bystander = start_server(&["sleep", "30"], 3000, "localhost").unwrap();

    let err = stop_server(ServerHandle::from_pid(0)).unwrap_err();
    assert!(matches!(err, NcmApiError::NoSuchProcess { pid: 0 }), "{err}");

    assert!(bystander.is_running());
    stop_server(bystander).unwrap();
}

#[test]
fn stop_reaps_the_child() {
    let handle = start_server(&["sleep", "30"], 3000, "localhost").unwrap();
    let pid = handle.pid();
    stop_server(handle).unwrap();
    assert!(!ServerHandle::from_pid(pid).is_running());
}

#[test]
fn gateway_drop_logs_out_once_then_stops_process() {
    let stub = StubGateway::standard();
    let gw = Gateway::start(&["sleep", "30"], stub.port, "127.0.0.1").unwrap();
    let pid = gw.pid().unwrap();
    gw.banner(Args::new()).unwrap();
    assert!(ServerHandle::from_pid(pid).is_running());
    assert_eq!(stub.count("/logout"), 0);

    drop(gw);

    assert_eq!(stub.count("/logout"), 1);
    assert!(!ServerHandle::from_pid(pid).is_running());
}

#[test]
fn gateway_teardown_tolerates_dead_client_and_process() {
    // Nothing serves HTTP here, so the logout on teardown fails; the process
    // exits on its own before teardown. Neither may surface.
    let gw = Gateway::start(&["true"], 9, "127.0.0.1").unwrap();
    assert!(gw.pid().is_some());
    thread::sleep(Duration::from_millis(100));
    gw.shutdown();
}

#[test]
fn gateway_from_config_stops_process_when_not_ready() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("pid");
    let script = format!("echo $$ > '{}'; exec sleep 30", pid_file.display());
    let config = ApiConfig {
        host: "127.0.0.1".into(),
        port: 9,
        server_command: vec!["sh".into(), "-c".into(), script],
        ready_timeout_secs: Some(1),
        ..ApiConfig::default()
    };
    let err = Gateway::start_with_config(&config).unwrap_err();
    assert!(matches!(err, NcmApiError::NotReady { .. }), "{err}");

    let pid: u32 = wait_for_file(&pid_file).trim().parse().unwrap();
    assert!(!ServerHandle::from_pid(pid).is_running());
}
