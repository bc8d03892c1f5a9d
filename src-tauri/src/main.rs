// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod lifecycle;
mod menu;
mod window_host;

use std::sync::Arc;

use chronocop_core::WindowHostPort;
use chronocop_runtime::launcher::STARTUP_ERROR_TITLE;
use chronocop_runtime::{BackendLogManager, Launcher, LauncherConfig};
use dotenvy::dotenv;
use lifecycle::shutdown_then_exit;
use tauri::Manager;
use tracing::{error, info, warn};
use window_host::{MAIN_WINDOW, TauriWindowHost};

/// Initialize tracing with file appender for persistent logs.
///
/// Logs are written to:
/// - stdout (for console viewing)
/// - {data_dir}/logs/chronocop.{date} (daily rotation via tracing-appender)
///
/// Log level is controlled by RUST_LOG environment variable (default: warn).
fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let log_dir = match chronocop_core::logs_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to resolve log directory: {e}");
            std::path::PathBuf::from(".")
        }
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create log directory: {e}");
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, "chronocop");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .compact(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .compact(),
        )
        .try_init()
        .ok();

    // Keep the writer alive for the whole process
    std::mem::forget(guard);
}

/// Build the launcher and start the backend in the background.
///
/// Configuration errors are reported like any other startup failure.
fn setup_app(app: &mut tauri::App) -> Result<(), Box<dyn std::error::Error>> {
    let handle = app.handle().clone();

    match menu::build_app_menu(&handle) {
        Ok(app_menu) => {
            if let Err(e) = app.set_menu(app_menu) {
                warn!(error = %e, "Failed to attach application menu");
            }
        }
        Err(e) => warn!(error = %e, "Failed to build application menu"),
    }

    let host = Arc::new(TauriWindowHost::new(handle.clone()));

    let resource_dir = app.path().resource_dir().ok();
    let config = match LauncherConfig::from_env(resource_dir.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid launcher configuration");
            tauri::async_runtime::spawn(async move {
                host.show_error_dialog(STARTUP_ERROR_TITLE, &e.to_string());
                host.quit();
            });
            return Ok(());
        }
    };
    info!(
        mode = %config.mode,
        backend = %config.backend.program.display(),
        "Launcher configured"
    );

    let logs = Arc::new(BackendLogManager::new());
    let launcher = Arc::new(Launcher::new(config, host, logs)?);
    app.manage(Arc::clone(&launcher));

    tauri::async_runtime::spawn(async move {
        match launcher.start().await {
            Ok(port) => info!(port, "Application ready"),
            // Already reported to the user by the launcher
            Err(e) => error!(error = %e, "Startup failed"),
        }
    });

    Ok(())
}

fn main() {
    let _ = dotenv();

    init_tracing();

    info!("CHRONOCOP desktop shell starting");

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(setup_app)
        .on_menu_event(menu::handlers::handle_menu_event)
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::CloseRequested { api, .. } = event {
                if window.label() != MAIN_WINDOW {
                    return;
                }
                info!("Window close requested - stopping backend");
                api.prevent_close();

                // Hide window immediately so user sees instant feedback
                let _ = window.hide();
                shutdown_then_exit(window.app_handle());
            }
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            // Requested by the user (Cmd+Q, last window gone); our own exit(0) carries a code
            tauri::RunEvent::ExitRequested { api, code, .. } if code.is_none() => {
                info!("App exit requested - stopping backend");
                api.prevent_exit();

                if let Some(window) = app_handle.get_webview_window(MAIN_WINDOW) {
                    let _ = window.hide();
                }
                shutdown_then_exit(app_handle);
            }
            tauri::RunEvent::ExitRequested { .. } => {
                if let Some(launcher) = app_handle.try_state::<Arc<Launcher>>() {
                    launcher.shutdown();
                }
            }
            #[cfg(target_os = "macos")]
            tauri::RunEvent::Reopen { .. } => {
                if let Some(launcher) = app_handle.try_state::<Arc<Launcher>>() {
                    if let Err(e) = launcher.activate() {
                        error!(error = %e, "Failed to reopen main window");
                    }
                }
            }
            tauri::RunEvent::Exit => {
                info!("App exiting");
            }
            _ => {}
        });
}
