//! Operator acknowledgment for challenges automation could not clear.

use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use std::io::{BufRead, Write};

/// Blocks until a human confirms the page is usable.
#[async_trait]
pub trait OperatorAck: Send + Sync {
    /// Show `prompt` and wait for confirmation.
    async fn acknowledge(&self, prompt: &str) -> Result<()>;
}

/// Waits for ENTER on standard input.
pub struct ConsoleOperator;

#[async_trait]
impl OperatorAck for ConsoleOperator {
    async fn acknowledge(&self, prompt: &str) -> Result<()> {
        let prompt = prompt.to_string();
        let read = tokio::task::spawn_blocking(move || -> std::io::Result<usize> {
            let mut stderr = std::io::stderr().lock();
            writeln!(stderr, "{prompt}")?;
            write!(stderr, "Press ENTER after completing the challenge: ")?;
            stderr.flush()?;

            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)
        })
        .await
        .map_err(|e| ScrapeError::OperatorUnavailable(e.to_string()))??;

        if read == 0 {
            return Err(ScrapeError::OperatorUnavailable(
                "standard input is closed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Confirms immediately.
pub struct AutoAcknowledge;

#[async_trait]
impl OperatorAck for AutoAcknowledge {
    async fn acknowledge(&self, prompt: &str) -> Result<()> {
        tracing::debug!("Auto-acknowledging: {}", prompt);
        Ok(())
    }
}

/// Never confirms; used for unattended runs.
pub struct DeclineOperator;

#[async_trait]
impl OperatorAck for DeclineOperator {
    async fn acknowledge(&self, _prompt: &str) -> Result<()> {
        Err(ScrapeError::OperatorUnavailable(
            "running non-interactively".to_string(),
        ))
    }
}
