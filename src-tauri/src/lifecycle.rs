//! Application lifecycle and shutdown orchestration.

use std::sync::Arc;
use std::time::Duration;

use chronocop_runtime::Launcher;
use tauri::{AppHandle, Manager};
use tracing::{error, info, warn};

const WATCHDOG: Duration = Duration::from_secs(5);
const REAP_TIMEOUT: Duration = Duration::from_secs(3);

/// Kill the backend and wait for it to be reaped, bounded by a watchdog.
///
/// # Shutdown sequence
/// 1. Spawn watchdog thread (force exit after 5s)
/// 2. Run the launcher's shutdown hook and wait for the child (3s timeout)
/// 3. Cancel watchdog and return
///
/// Called for window close, app exit requests and the Quit menu item;
/// the launcher makes repeat calls harmless.
pub async fn perform_shutdown(launcher: &Launcher) {
    info!("Starting graceful shutdown");

    let (watchdog_cancel_tx, mut watchdog_cancel_rx) = tokio::sync::oneshot::channel::<()>();
    std::thread::spawn(move || {
        std::thread::sleep(WATCHDOG);
        if watchdog_cancel_rx.try_recv().is_err() {
            eprintln!("SHUTDOWN WATCHDOG: backend cleanup exceeded {WATCHDOG:?} - forcing exit");
            std::process::exit(1);
        }
    });

    match tokio::time::timeout(REAP_TIMEOUT, launcher.shutdown_and_wait()).await {
        Ok(Some(exit)) => info!(%exit, "Backend stopped"),
        Ok(None) => info!("No backend was running"),
        Err(_) => {
            error!("Backend did not exit within {REAP_TIMEOUT:?}");
            // Still signalled; kill_on_drop covers the rest
            warn!("Proceeding with exit");
        }
    }

    let _ = watchdog_cancel_tx.send(());
    info!("Graceful shutdown complete");
}

/// Run the shutdown hook, then exit the application.
pub fn shutdown_then_exit(app_handle: &AppHandle) {
    let Some(launcher) = app_handle.try_state::<Arc<Launcher>>() else {
        app_handle.exit(0);
        return;
    };
    let launcher = Arc::clone(&launcher);
    let app_handle = app_handle.clone();
    tauri::async_runtime::spawn(async move {
        perform_shutdown(&launcher).await;
        app_handle.exit(0);
    });
}
