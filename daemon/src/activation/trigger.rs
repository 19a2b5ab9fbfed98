//! Manual activation sources
//!
//! The hotkey listener and the terminal reader both push into one
//! channel; [`ChannelTrigger`] is the receiving end the controller waits on.

use std::io::BufRead;
use std::thread;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Where a manual activation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    #[cfg(target_os = "macos")]
    Hotkey,
    Terminal,
}

/// Every trigger source has gone away
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("activation trigger source closed")]
pub struct TriggerClosed;

/// Blocks until the user asks to be heard
#[async_trait]
pub trait ActivationTrigger: Send {
    async fn wait(&mut self) -> Result<(), TriggerClosed>;

    /// Forget activations that arrived while a command was being handled
    fn discard_pending(&mut self) {}
}

pub struct ChannelTrigger {
    rx: mpsc::Receiver<TriggerSource>,
}

impl ChannelTrigger {
    pub fn new(rx: mpsc::Receiver<TriggerSource>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl ActivationTrigger for ChannelTrigger {
    async fn wait(&mut self) -> Result<(), TriggerClosed> {
        let source = self.rx.recv().await.ok_or(TriggerClosed)?;
        info!(?source, "manual trigger");
        Ok(())
    }

    fn discard_pending(&mut self) {
        let mut stale = 0;
        while self.rx.try_recv().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            debug!(stale, "dropped triggers received while busy");
        }
    }
}

/// Forward every line read from stdin as a terminal trigger
pub fn spawn_terminal_reader(tx: mpsc::Sender<TriggerSource>) -> std::io::Result<()> {
    thread::Builder::new()
        .name("terminal-trigger".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                if let Err(e) = line {
                    warn!(error = %e, "stdin read failed");
                    break;
                }
                if tx.blocking_send(TriggerSource::Terminal).is_err() {
                    break;
                }
            }
            debug!("terminal trigger reader stopped");
        })?;
    Ok(())
}
