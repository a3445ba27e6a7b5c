//! Shared outbound sink.
//!
//! Every car loop and the dispatcher write through one [`CommandWriter`]. The mutex makes
//! each command line a single uninterrupted write; the timeout turns a stalled peer into a
//! transport error instead of a stuck car.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::time::timeout;

use super::Command;

type BoxedWrite = Pin<Box<dyn AsyncWrite + Send>>;

/// Cloneable handle to the serialized outbound sink.
#[derive(Clone)]
pub struct CommandWriter {
    inner: Arc<Mutex<BoxedWrite>>,
    write_timeout: Duration,
}

impl CommandWriter {
    /// Wraps the write half of the rig connection.
    pub fn new<W>(write: W, write_timeout: Duration) -> Self
    where
        W: AsyncWrite + Send + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Box::pin(write))),
            write_timeout,
        }
    }

    /// Writes one command as a newline-terminated line and flushes it.
    ///
    /// ## Errors
    /// Any write error or a write that does not finish within the timeout. Both mean the
    /// connection is gone.
    pub async fn send(&self, command: Command) -> Result<()> {
        let line = format!("{}\n", command);
        let mut sink = self.inner.lock().await;
        let write = async {
            sink.write_all(line.as_bytes()).await?;
            sink.flush().await
        };
        match timeout(self.write_timeout, write).await {
            Ok(result) => result.with_context(|| format!("failed to send '{}'", command)),
            Err(_) => Err(anyhow!("sending '{}' timed out after {:?}", command, self.write_timeout)),
        }
    }
}
