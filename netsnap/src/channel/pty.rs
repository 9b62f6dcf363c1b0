//! PTY channel abstraction for interactive sessions.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use super::buffer::PatternBuffer;
use crate::error::{ChannelError, Result};

/// Configuration for PTY channel behavior.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// Search depth for pattern matching.
    pub search_depth: usize,

    /// Line terminator sent after each input.
    pub return_char: &'static str,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            search_depth: 1000,
            return_char: "\n",
        }
    }
}

/// High-level PTY channel for interactive device sessions.
///
/// Wraps the russh shell channel and provides pattern-based reads
/// with timeout handling.
pub struct PtyChannel {
    channel: Channel<Msg>,
    config: PtyConfig,
    buffer: PatternBuffer,
}

impl PtyChannel {
    pub fn new(channel: Channel<Msg>, config: PtyConfig) -> Self {
        Self {
            buffer: PatternBuffer::new(config.search_depth),
            channel,
            config,
        }
    }

    /// Send a line of input followed by the return character.
    pub async fn send(&mut self, input: &str) -> Result<()> {
        self.send_raw(&format!("{}{}", input, self.config.return_char))
            .await
    }

    /// Send raw input without a line terminator.
    pub async fn send_raw(&mut self, input: &str) -> Result<()> {
        self.channel
            .data(input.as_bytes())
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Read until the buffer ends with `pattern`, returning everything read.
    ///
    /// The buffer is drained on success; output following the match stays
    /// with the returned data.
    pub async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<Vec<u8>> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if self.buffer.ends_with_match(pattern) {
                return Ok(self.buffer.take());
            }

            let msg = tokio::time::timeout_at(deadline, self.channel.wait())
                .await
                .map_err(|_| ChannelError::PatternTimeout(timeout))?;

            match msg {
                Some(ChannelMsg::Data { data }) => {
                    trace!("read {} bytes", data.len());
                    self.buffer.extend(&data);
                }
                Some(ChannelMsg::ExtendedData { data, .. }) => {
                    self.buffer.extend(&data);
                }
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    return Err(ChannelError::Closed.into());
                }
                Some(_) => {}
            }
        }
    }

    /// Close the channel.
    pub async fn close(self) -> Result<()> {
        self.channel.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}
