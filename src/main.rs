// SPDX-License-Identifier: GPL-3.0-or-later
use std::fs::OpenOptions;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context as _;
use structopt::StructOpt;
use tracing::{error, info};
use tracing_subscriber::filter::EnvFilter;

mod camera;
mod error;
mod image_buffer;
mod pipeline;
mod render;
mod settings;
mod sink;
mod util;

use crate::pipeline::FrameLoop;
use crate::settings::{Args, LogSettings, Settings};
use crate::util::flatten_join_result;

/// Route diagnostics to the configured log file.
///
/// stdout and stderr both carry frame bytes, so the usual console writers are
/// off the table; without a configured file, log events are discarded.
fn init_logging(settings: &LogSettings) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    match &settings.path {
        Some(path) => {
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Unable to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Arc::new(log_file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::from_args();
    // Configuration problems are reported on stderr: no frame bytes have been
    // written yet, so the channel is still readable.
    let settings = match Settings::load(&args) {
        Ok(settings) => settings,
        Err(config_error) => {
            eprintln!("{}", config_error);
            process::exit(config_error.exit_code());
        }
    };
    if let Err(log_error) = init_logging(&settings.log) {
        eprintln!("{:#}", log_error);
        process::exit(2);
    }
    info!(
        frame_rate = settings.camera.frame_rate().as_fps(),
        "Starting frame loop"
    );
    let running = Arc::new(AtomicBool::new(true));
    let frame_loop = match FrameLoop::new(&settings, Arc::clone(&running)) {
        Ok(frame_loop) => frame_loop,
        Err(setup_error) => {
            eprintln!("{:#}", setup_error);
            error!("{:#}", setup_error);
            process::exit(1);
        }
    };
    let mut loop_task = tokio::task::spawn_blocking(move || frame_loop.run());
    let result = tokio::select! {
        join_result = &mut loop_task => flatten_join_result(join_result),
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, finishing the current frame");
            running.store(false, Ordering::Relaxed);
            flatten_join_result((&mut loop_task).await)
        }
    };
    if let Err(runtime_error) = result {
        error!("{:#}", runtime_error);
        process::exit(1);
    }
}
