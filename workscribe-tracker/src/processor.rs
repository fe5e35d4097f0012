//! Runs operations with tracing and retry of retryable failures

use crate::context::TrackerContext;
use crate::error::{ErrorSeverity, Result, TrackerError};
use crate::operation::{Execute, Operation};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, info_span, warn, Instrument};
use workscribe_config::StoreConfig;

/// Executes tracker operations, retrying [`TrackerError::Contention`] with
/// linear backoff before giving up
#[derive(Debug, Clone)]
pub struct TrackerOperationProcessor {
    max_retries: u32,
    backoff: Duration,
}

impl Default for TrackerOperationProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerOperationProcessor {
    pub fn new() -> Self {
        Self::from_config(&StoreConfig::default())
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Execute `op`, retrying while it fails with a retryable error
    pub async fn process<O>(&self, op: &O, ctx: &TrackerContext) -> Result<Value>
    where
        O: Execute<TrackerContext, TrackerError> + Operation + ?Sized,
    {
        let span = info_span!("operation", op = %op.op_string());
        self.run(op, ctx).instrument(span).await
    }

    async fn run<O>(&self, op: &O, ctx: &TrackerContext) -> Result<Value>
    where
        O: Execute<TrackerContext, TrackerError> + Operation + ?Sized,
    {
        let started = Instant::now();
        let mut attempt: u32 = 0;
        loop {
            match op.execute(ctx).await {
                Ok(value) => {
                    debug!(
                        attempts = attempt + 1,
                        duration_ms = started.elapsed().as_millis() as u64,
                        "operation completed"
                    );
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff * attempt;
                    warn!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    match e.severity() {
                        ErrorSeverity::Warning => debug!(error = %e, "operation rejected"),
                        ErrorSeverity::Error => warn!(error = %e, "operation failed"),
                        ErrorSeverity::Critical => error!(error = %e, "operation failed"),
                    }
                    return Err(e);
                }
            }
        }
    }
}
