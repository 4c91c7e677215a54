//! Star Tracker - Binary Entry Point
//!
//! Runs the control loop: polls the schedule every cycle and appends a status
//! line to the log at a fixed interval until Ctrl+C.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use tracker_core::clock::SystemClock;
use tracker_core::log_store::LogStore;
use tracker_core::schedule::{status_line, LoadOutcome, ScheduleEvaluator};
use tracker_core::settings::Settings;
use tracker_core::storage::FsStorage;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::from_env();
    info!(version = tracker_core::VERSION, data_dir = %settings.data_dir.display(), "starting tracker");

    let storage = FsStorage::new(&settings.data_dir);
    let clock = SystemClock::new();

    let mut log = LogStore::new(storage.clone(), clock.clone(), settings.log_store.clone());
    if let Err(e) = log.initialize() {
        warn!(error = %e, "log store unavailable, continuing without a current segment");
    }
    log.log_info("System startup initiated");

    let mut schedule = ScheduleEvaluator::new(storage, clock, settings.schedule.clone());
    match schedule.initialize() {
        Ok(LoadOutcome::Loaded) => {}
        Ok(LoadOutcome::DefaultInstalled(cause)) => {
            log.log_info(&format!("Default configuration installed ({})", cause));
        }
        Err(e) => {
            log.log_error(&format!("Failed to save configuration: {}", e));
        }
    }

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
            warn!(error = %e, "failed to install Ctrl+C handler");
        }
    }

    log.log_info("System startup completed");

    let mut last_status_log = Instant::now();
    while running.load(Ordering::SeqCst) {
        let status = status_line(&mut schedule);
        debug!(%status, "schedule status");

        if last_status_log.elapsed() >= settings.status_log_interval {
            log.log_info(&status);
            last_status_log = Instant::now();
        }

        thread::sleep(settings.poll_interval);
    }

    log.log_info("System shutdown");
    match log.stats() {
        Ok(stats) => info!("log store: {}", stats.summary()),
        Err(e) => warn!(error = %e, "log store stats unavailable"),
    }
    println!("{}", log.read_tail(5));
}
