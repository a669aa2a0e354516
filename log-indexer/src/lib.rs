//! # Log Indexer
//!
//! Main library for the log indexer.
//!
//! This crate provides the entry point and configuration for running the
//! ingest pipeline once or on a schedule.

pub mod config;

pub use config::{Cli, Dependencies, Settings};

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use log_indexer_ingest::{IngestError, PipelineReport, SchedulerError};
use log_indexer_repository::SinkError;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] IngestError),

    /// Scheduler error.
    #[error("Scheduler error: {0}")]
    SchedulerError(#[from] SchedulerError),

    /// Sink error.
    #[error("Sink error: {0}")]
    SinkError(#[from] SinkError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

/// Run the indexer as described by `cli`.
///
/// Without `--every` the pipeline runs once and its failure is returned.
/// With `--every` the pipeline runs under the scheduler until the schedule
/// is exhausted, aborted, or cancelled with ctrl-c.
pub async fn run(cli: Cli) -> Result<(), IndexingError> {
    let schedule = cli.schedule();
    let deps = Dependencies::new(&cli).await?;

    let Some(runner) = schedule else {
        let report = deps.pipeline.run_once().await?;
        log_report(&report);
        return Ok(());
    };

    let pipeline = Arc::new(deps.pipeline);
    let handle = runner.run(move || {
        let pipeline = pipeline.clone();
        async move {
            let report = pipeline.run_once().await?;
            log_report(&report);
            Ok::<_, IngestError>(())
        }
    });

    let canceller = handle.canceller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            canceller.cancel();
        }
    });

    let summary = handle.wait().await?;

    info!(
        invocations = summary.invocations,
        failures = summary.failures,
        outcome = ?summary.outcome,
        "Schedule finished"
    );

    Ok(())
}

fn log_report(report: &PipelineReport) {
    if report.load.is_clean() {
        info!(
            documents = report.documents,
            dropped = report.dropped,
            indexed_total = ?report.load.indexed_total,
            "Indexed documents"
        );
    } else {
        warn!(
            documents = report.documents,
            dropped = report.dropped,
            chunks_failed = report.load.chunks_failed(),
            item_failures = report.load.item_failures().count(),
            indexed_total = ?report.load.indexed_total,
            "Indexed documents with failures"
        );
    }
}
