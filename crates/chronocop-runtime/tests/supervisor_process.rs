//! Supervisor behaviour against real child processes.
#![cfg(unix)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chronocop_core::{AppMode, LogStream, NoopLogSink, ServerLogSinkPort};
use chronocop_runtime::process::BackendCommand;
use chronocop_runtime::{BackendLogManager, BackendSupervisor, LaunchError};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct CollectingSink(Mutex<Vec<(LogStream, String)>>);

impl ServerLogSinkPort for CollectingSink {
    fn append(&self, _port: u16, stream: LogStream, line: String) {
        self.0.lock().unwrap().push((stream, line));
    }
}

async fn wait_for_exit(supervisor: &BackendSupervisor) -> chronocop_runtime::BackendExit {
    let mut rx = supervisor.subscribe_exit();
    timeout(WAIT, rx.wait_for(Option::is_some))
        .await
        .unwrap()
        .unwrap();
    supervisor.last_exit().unwrap()
}

#[tokio::test]
async fn passes_port_and_mode_through_env() {
    let sink = Arc::new(CollectingSink::default());
    let supervisor = BackendSupervisor::new(sink.clone());
    let command = BackendCommand::new("sh")
        .arg("-c")
        .arg("echo \"$PORT $CHRONOCOP_PORT $CHRONOCOP_ENV $EXTRA\"; echo oops >&2")
        .env("EXTRA", "x");

    supervisor
        .spawn(&command, 31340, AppMode::Production)
        .unwrap();
    let exit = wait_for_exit(&supervisor).await;
    assert_eq!(exit.code, Some(0));
    assert!(!exit.is_crash());

    // Readers may finish slightly after the exit is recorded
    tokio::time::sleep(Duration::from_millis(100)).await;
    let lines = sink.0.lock().unwrap().clone();
    assert!(lines.contains(&(LogStream::Stdout, "31340 31340 production x".to_string())));
    assert!(lines.contains(&(LogStream::Stderr, "oops".to_string())));
}

#[tokio::test]
async fn runs_in_the_requested_working_dir() {
    let dir = tempfile::tempdir().unwrap();
    let logs = Arc::new(BackendLogManager::new());
    let supervisor = BackendSupervisor::new(logs.clone());
    let command = BackendCommand::new("sh")
        .arg("-c")
        .arg("touch marker")
        .working_dir(dir.path());

    supervisor
        .spawn(&command, 31341, AppMode::Development)
        .unwrap();
    wait_for_exit(&supervisor).await;
    assert!(dir.path().join("marker").exists());
}

#[tokio::test]
async fn second_spawn_while_live_is_rejected() {
    let supervisor = BackendSupervisor::new(Arc::new(NoopLogSink));
    let command = BackendCommand::new("sleep").arg("30");

    supervisor
        .spawn(&command, 31342, AppMode::Development)
        .unwrap();
    assert!(supervisor.is_running());
    assert!(supervisor.pid().is_some());

    let err = supervisor
        .spawn(&command, 31343, AppMode::Development)
        .unwrap_err();
    assert!(matches!(err, LaunchError::AlreadyRunning { port: 31342 }));

    assert!(supervisor.kill());
    assert!(!supervisor.kill());
    let exit = wait_for_exit(&supervisor).await;
    assert!(exit.kill_requested);
    assert_eq!(exit.code, None);
}

#[tokio::test]
async fn respawn_after_exit_is_allowed() {
    let supervisor = BackendSupervisor::new(Arc::new(NoopLogSink));
    let command = BackendCommand::new("sh").arg("-c").arg("exit 7");

    supervisor
        .spawn(&command, 31344, AppMode::Development)
        .unwrap();
    let exit = wait_for_exit(&supervisor).await;
    assert_eq!(exit.code, Some(7));
    assert!(exit.is_crash());

    supervisor
        .spawn(&BackendCommand::new("sleep").arg("30"), 31344, AppMode::Development)
        .unwrap();
    let exit = timeout(WAIT, supervisor.kill_and_wait())
        .await
        .unwrap()
        .unwrap();
    assert!(exit.kill_requested);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exit_is_visible_as_soon_as_kill_and_wait_returns() {
    let supervisor = BackendSupervisor::new(Arc::new(NoopLogSink));
    let command = BackendCommand::new("sleep").arg("30");

    for _ in 0..20 {
        supervisor
            .spawn(&command, 31345, AppMode::Development)
            .unwrap();
        assert!(supervisor.is_running());

        let exit = timeout(WAIT, supervisor.kill_and_wait())
            .await
            .unwrap()
            .unwrap();
        assert!(exit.kill_requested);
        assert!(!supervisor.is_running());
        assert!(supervisor.pid().is_none());
        assert!(!supervisor.kill());
    }
}
