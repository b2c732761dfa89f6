//! Hand-off of parsed signals to the external coin monitor

use crate::error::{RelayError, Result};
use crate::types::{format_price, Exchange, Signal};
use std::process::Stdio;

/// Arguments passed to the coin monitor, in positional order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardRequest {
    pub coin: String,
    pub exchange: String,
    pub buy_price: String,
    /// First two targets joined with `,`
    pub targets: String,
    pub stop_loss: String,
}

impl ForwardRequest {
    pub fn new(signal: &Signal, exchange: Exchange) -> Self {
        let targets = signal
            .targets
            .iter()
            .take(2)
            .map(|t| format_price(*t))
            .collect::<Vec<_>>()
            .join(",");

        Self {
            coin: signal.coin_pair.alt.clone(),
            exchange: exchange.id().to_string(),
            buy_price: format_price(signal.buy_price),
            targets,
            stop_loss: format_price(signal.stop_loss),
        }
    }

    pub fn args(&self) -> [&str; 5] {
        [
            self.coin.as_str(),
            self.exchange.as_str(),
            self.buy_price.as_str(),
            self.targets.as_str(),
            self.stop_loss.as_str(),
        ]
    }
}

/// Side effect invoked for every structured report. Must not block.
#[cfg_attr(test, mockall::automock)]
pub trait Forwarder: Send + Sync {
    fn forward(&self, request: &ForwardRequest) -> Result<()>;
}

/// Spawns the coin monitor executable and does not wait for it
pub struct MonitorCommand {
    program: String,
}

impl MonitorCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Forwarder for MonitorCommand {
    fn forward(&self, request: &ForwardRequest) -> Result<()> {
        let mut child = tokio::process::Command::new(&self.program)
            .args(request.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| RelayError::Forward(format!("{}: {}", self.program, e)))?;

        tracing::info!(
            "Forwarded {} to coin monitor (pid {:?})",
            request.coin,
            child.id()
        );

        let coin = request.coin.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    tracing::warn!("Coin monitor for {} exited with {}", coin, status);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Coin monitor for {} not reaped: {}", coin, e),
            }
        });

        Ok(())
    }
}

/// Used when no monitor command is configured
pub struct NoopForwarder;

impl Forwarder for NoopForwarder {
    fn forward(&self, request: &ForwardRequest) -> Result<()> {
        tracing::debug!("Coin monitor disabled, not forwarding {}", request.coin);
        Ok(())
    }
}
