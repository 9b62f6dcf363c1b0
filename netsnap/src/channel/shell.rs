//! The interactive shell surface the driver talks through.

use std::future::Future;
use std::time::Duration;

use log::debug;
use regex::bytes::Regex;

use super::pty::{PtyChannel, PtyConfig};
use crate::error::Result;
use crate::transport::{SshConfig, SshTransport};

/// A line-oriented shell on a device.
///
/// The driver only sends lines and waits for prompts, so anything that
/// can do both (an SSH PTY, a recorded transcript) can stand in here.
pub trait Shell: Send + Sized {
    /// Connect and start the shell.
    fn connect(config: &SshConfig, pty: PtyConfig) -> impl Future<Output = Result<Self>> + Send;

    /// Send a line of input followed by the return character.
    fn send(&mut self, input: &str) -> impl Future<Output = Result<()>> + Send;

    /// Read until the output ends with `pattern`, returning everything read.
    fn read_until(
        &mut self,
        pattern: &Regex,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// End the shell and its connection.
    fn close(self) -> impl Future<Output = Result<()>> + Send;
}

/// A PTY shell on its own SSH connection.
pub struct SshShell {
    transport: SshTransport,
    channel: PtyChannel,
}

impl Shell for SshShell {
    async fn connect(config: &SshConfig, pty: PtyConfig) -> Result<Self> {
        let transport = SshTransport::connect(config).await?;
        let channel = match transport.open_channel().await {
            Ok(channel) => channel,
            Err(e) => {
                let _ = transport.close().await;
                return Err(e);
            }
        };
        Ok(Self {
            transport,
            channel: PtyChannel::new(channel, pty),
        })
    }

    async fn send(&mut self, input: &str) -> Result<()> {
        self.channel.send(input).await
    }

    async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<Vec<u8>> {
        self.channel.read_until(pattern, timeout).await
    }

    async fn close(self) -> Result<()> {
        if let Err(e) = self.channel.close().await {
            debug!("channel close: {e}");
        }
        self.transport.close().await
    }
}
