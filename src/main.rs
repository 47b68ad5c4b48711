//! jupyter-fs - commit/revert endpoints for filesystem-aware notebooks
//!
//! # Usage
//! ```bash
//! jupyter-fs --token s3cret               # Serve /jupyter-fs/* on 127.0.0.1:8888
//! jupyter-fs --no-auth --base-url /user/a # Serve under /user/a/jupyter-fs/*
//! jupyter-fs status                       # Check if running
//! jupyter-fs kill                         # Stop running instance
//! ```

mod auth;
mod config;
mod error;
mod exec;
mod models;
mod routes;

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{ServeArgs, Settings};
use exec::{ScriptExecutor, SystemRunner};
use routes::AppState;

/// Serve the jupyter-fs commit and revert endpoints
#[derive(Parser)]
#[command(name = "jupyter-fs")]
#[command(about = "Commit and revert endpoints for filesystem-aware notebooks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Check if jupyter-fs is currently running
    Status,
    /// Stop the running jupyter-fs instance
    Kill,
}

/// PID file info stored as JSON
#[derive(serde::Serialize, serde::Deserialize)]
struct PidInfo {
    pid: u32,
    work_dir: String,
    url: String,
}

fn get_pid_file_path() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push("jupyter-fs.pid");
    path
}

fn read_pid_info() -> Option<PidInfo> {
    let mut file = fs::File::open(get_pid_file_path()).ok()?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    serde_json::from_str(&contents).ok()
}

fn write_pid_info(info: &PidInfo) -> anyhow::Result<()> {
    let path = get_pid_file_path();
    let mut file = fs::File::create(&path).with_context(|| format!("cannot write {}", path.display()))?;
    file.write_all(serde_json::to_string(info)?.as_bytes())?;
    Ok(())
}

fn remove_pid_file() {
    let _ = fs::remove_file(get_pid_file_path());
}

/// Sends `signal` to `pid`; signal 0 only probes that the process exists.
#[cfg(unix)]
fn signal_pid(pid: u32, signal: libc::c_int) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    unsafe { libc::kill(pid, signal) == 0 }
}

#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    signal_pid(pid, 0)
}

#[cfg(unix)]
fn kill_process(pid: u32) -> bool {
    signal_pid(pid, libc::SIGTERM)
}

#[cfg(windows)]
fn is_process_running(pid: u32) -> bool {
    std::process::Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH", "/FO", "CSV"])
        .output()
        .map(|output| String::from_utf8_lossy(&output.stdout).contains(&format!("\"{}\"", pid)))
        .unwrap_or(false)
}

#[cfg(windows)]
fn kill_process(pid: u32) -> bool {
    std::process::Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/F"])
        .status()
        .is_ok_and(|status| status.success())
}

/// Returns the recorded instance if its process is still alive, clearing a stale PID file.
fn running_instance() -> Option<PidInfo> {
    let info = read_pid_info()?;
    if is_process_running(info.pid) {
        Some(info)
    } else {
        remove_pid_file();
        None
    }
}

fn handle_status() {
    match running_instance() {
        Some(info) => {
            println!("✓ jupyter-fs is running");
            println!("  PID:      {}", info.pid);
            println!("  Work dir: {}", info.work_dir);
            println!("  URL:      {}", info.url);
        }
        None => println!("✗ jupyter-fs is not running"),
    }
}

fn handle_kill() {
    match running_instance() {
        Some(info) if kill_process(info.pid) => {
            println!("✓ Stopped jupyter-fs (PID {})", info.pid);
            remove_pid_file();
        }
        Some(info) => println!("✗ Failed to stop jupyter-fs (PID {})", info.pid),
        None => println!("✗ jupyter-fs is not running"),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn,jupyter_fs=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolves on Ctrl+C or SIGTERM (sent by `jupyter-fs kill`).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to register SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("shutting down");
    remove_pid_file();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Status) => {
            handle_status();
            return Ok(());
        }
        Some(Commands::Kill) => {
            handle_kill();
            return Ok(());
        }
        None => {}
    }

    if let Some(info) = running_instance() {
        eprintln!("✗ jupyter-fs is already running (PID {})", info.pid);
        eprintln!("  URL: {}", info.url);
        eprintln!();
        eprintln!("Run 'jupyter-fs kill' to stop it first.");
        std::process::exit(1);
    }

    init_tracing();

    let settings = Settings::from_args(&cli.serve)?;

    let executor = ScriptExecutor::new(settings.scripts.clone(), settings.work_dir.clone(), Arc::new(SystemRunner));
    let state = Arc::new(AppState {
        executor: Arc::new(executor),
        strict_exit: settings.strict_exit,
    });

    let app = routes::create_router(&settings.base_url, state, Arc::new(settings.auth.clone()))
        .layer(TraceLayer::new_for_http());

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {} (try a different port with --port)", addr))?;

    let url = format!("http://{}{}{}/", addr, settings.base_url, routes::NAMESPACE);
    write_pid_info(&PidInfo {
        pid: std::process::id(),
        work_dir: settings.work_dir.display().to_string(),
        url: url.clone(),
    })?;

    tracing::info!(
        url = %url,
        work_dir = %settings.work_dir.display(),
        interpreter = %settings.scripts.interpreter,
        commit_script = %settings.scripts.commit.display(),
        revert_script = %settings.scripts.revert.display(),
        strict_exit = settings.strict_exit,
        "jupyter-fs listening"
    );
    if settings.auth == auth::Auth::Disabled {
        tracing::warn!("authentication is disabled");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
