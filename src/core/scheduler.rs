//! Cron-based scheduler for periodic scans

use crate::core::scanner::Scanner;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("scan interval of {0} minutes cannot be expressed as a schedule")]
    InvalidInterval(u64),

    #[error("invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },
}

/// Cron expression (with seconds field) firing every `minutes` minutes.
///
/// Only evenly spaced intervals are accepted: minutes dividing an hour, or
/// whole hours dividing a day.
pub fn cron_expression(minutes: u64) -> Result<String, ScheduleError> {
    match minutes {
        0 => Err(ScheduleError::InvalidInterval(0)),
        m if m < 60 && 60 % m == 0 => Ok(format!("0 */{} * * * *", m)),
        1440 => Ok("0 0 0 * * *".to_string()),
        m if m % 60 == 0 && m < 1440 && 24 % (m / 60) == 0 => {
            Ok(format!("0 0 */{} * * *", m / 60))
        }
        m => Err(ScheduleError::InvalidInterval(m)),
    }
}

/// Runs a scan immediately and then on every cron tick until stopped.
pub struct ScanScheduler {
    scanner: Arc<Scanner>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl ScanScheduler {
    pub fn new(scanner: Arc<Scanner>, interval_minutes: u64) -> Result<Self, ScheduleError> {
        let cron_expr = cron_expression(interval_minutes)?;
        let schedule = Schedule::from_str(&cron_expr).map_err(|e| ScheduleError::InvalidCron {
            expr: cron_expr.clone(),
            reason: e.to_string(),
        })?;

        info!(
            interval_minutes,
            cron = %cron_expr,
            "ScanScheduler: created with interval {}m (cron: {})",
            interval_minutes,
            cron_expr
        );

        Ok(Self {
            scanner,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub async fn start(&self) {
        let scanner = self.scanner.clone();
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            info!("ScanScheduler: started, running initial scan");
            let report = scanner.scan().await;
            info!(signals = report.signals.len(), "ScanScheduler: initial scan finished");

            loop {
                let Some(next_tick) = schedule.upcoming(chrono::Utc).next() else {
                    warn!("ScanScheduler: schedule has no upcoming ticks, retrying in 60s");
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                };
                let now = chrono::Utc::now();
                if next_tick > now {
                    let duration = (next_tick - now).to_std().unwrap_or_default();
                    info!(next = %next_tick, "ScanScheduler: next scan at {}", next_tick);
                    tokio::time::sleep(duration).await;
                }

                let report = scanner.scan().await;
                info!(
                    signals = report.signals.len(),
                    skipped = report.skipped,
                    "ScanScheduler: cron tick finished with {} signals",
                    report.signals.len()
                );
            }
        });

        let mut h = self.handle.write().await;
        if let Some(previous) = h.replace(handle) {
            previous.abort();
        }
        info!("ScanScheduler: started successfully");
    }

    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("ScanScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start, block until Ctrl-C, then stop.
    pub async fn run_until_shutdown(&self) -> std::io::Result<()> {
        self.start().await;
        tokio::signal::ctrl_c().await?;
        info!("ScanScheduler: shutdown signal received");
        self.stop().await;
        Ok(())
    }
}
