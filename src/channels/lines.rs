//! Newline-delimited JSON channel — one message object per line.

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::channels::{MessageSink, MessageSource};
use crate::config::DEFAULT_MAX_LINE_BYTES;
use crate::error::ChannelError;
use crate::pipeline::schema::json_kind;
use crate::pipeline::types::{EnrichedMessage, RawMessage};

/// One physical line pulled off the reader.
enum RawLine {
    Bytes(Vec<u8>),
    /// Line exceeded the cap; holds the number of bytes discarded.
    TooLong(usize),
}

/// Reads one JSON object per line. Blank lines are skipped.
///
/// Lines are read as bytes, so invalid UTF-8 or an over-long line is a
/// `Malformed` message rather than a reader failure.
pub struct JsonLinesSource<R> {
    name: String,
    reader: R,
    max_line_bytes: usize,
}

impl<R: AsyncBufRead + Unpin> JsonLinesSource<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }

    /// Cap the length of a single line, newline excluded.
    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    async fn read_line(&mut self) -> std::io::Result<Option<RawLine>> {
        let mut buf = Vec::new();
        let limit = self.max_line_bytes as u64 + 1;
        let n = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut buf)
            .await?;
        if n == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        } else if buf.len() > self.max_line_bytes {
            let skipped = buf.len() + self.skip_rest_of_line().await?;
            return Ok(Some(RawLine::TooLong(skipped)));
        }
        Ok(Some(RawLine::Bytes(buf)))
    }

    /// Discard input up to and including the next newline.
    async fn skip_rest_of_line(&mut self) -> std::io::Result<usize> {
        let mut skipped = 0;
        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(skipped);
            }
            let (consumed, done) = match available.iter().position(|b| *b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), false),
            };
            self.reader.consume(consumed);
            skipped += consumed;
            if done {
                return Ok(skipped);
            }
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> ChannelError {
        ChannelError::Malformed {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }

    fn decode(&self, line: &str) -> Result<RawMessage, ChannelError> {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(self.malformed(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(self.malformed(e.to_string())),
        }
    }
}

#[async_trait]
impl<R> MessageSource for JsonLinesSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_message(&mut self) -> Option<Result<RawMessage, ChannelError>> {
        loop {
            let bytes = match self.read_line().await {
                Ok(None) => return None,
                Ok(Some(RawLine::Bytes(bytes))) => bytes,
                Ok(Some(RawLine::TooLong(skipped))) => {
                    return Some(Err(self.malformed(format!(
                        "line of {skipped} bytes exceeds limit of {}",
                        self.max_line_bytes
                    ))));
                }
                Err(e) => return Some(Err(ChannelError::Io(e))),
            };

            let line = match std::str::from_utf8(&bytes) {
                Ok(line) => line.trim(),
                Err(e) => return Some(Err(self.malformed(format!("invalid UTF-8: {e}")))),
            };
            if line.is_empty() {
                continue;
            }
            return Some(self.decode(line));
        }
    }
}

/// Writes each enriched message as compact JSON followed by a newline.
pub struct JsonLinesSink<W> {
    name: String,
    writer: W,
}

impl<W: AsyncWrite + Unpin> JsonLinesSink<W> {
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer,
        }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> MessageSink for JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&mut self, message: &EnrichedMessage) -> Result<(), ChannelError> {
        let mut bytes = serde_json::to_vec(message).map_err(|e| ChannelError::Encode {
            name: self.name.clone(),
            reason: e.to_string(),
        })?;
        bytes.push(b'\n');
        self.writer.write_all(&bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
