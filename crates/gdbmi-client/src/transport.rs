//! Line transport for the MI wire format.
//!
//! Batches raw lines into output units delimited by the `(gdb)` prompt.
//! A background task owns the blocking reads; lines reach the consumer
//! one at a time through a capacity-1 channel, so a wait that times out
//! leaves the undelivered line in the slot for the next `receive`, and
//! the reader cannot run ahead while a line is undelivered.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::time::timeout;

use gdbmi_protocol::END_MARKER;

use crate::error::ClientError;

/// A line-oriented connection to a debugger's MI interpreter.
#[derive(Debug)]
pub struct MiTransport {
    lines_rx: mpsc::Receiver<String>,
    writer_tx: Option<mpsc::Sender<String>>,
    child: Option<Child>,
}

impl MiTransport {
    /// Wire a transport over an arbitrary reader/writer pair.
    ///
    /// Spawns the background reader and writer tasks; must run inside a
    /// tokio runtime.
    pub fn from_streams<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let (lines_tx, lines_rx) = mpsc::channel::<String>(1);
        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        tracing::debug!("debugger output stream reached EOF");
                        break;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::debug!("debugger output stream failed: {err}");
                        break;
                    }
                }
                if line.ends_with('\n') {
                    line.pop();
                }
                if line.ends_with('\r') {
                    line.pop();
                }
                // Blocks until the consumer takes the previous line.
                if lines_tx.send(line.clone()).await.is_err() {
                    break;
                }
            }
        });

        let (writer_tx, mut writer_rx) = mpsc::channel::<String>(1);
        tokio::spawn(async move {
            let mut writer = writer;
            while let Some(command) = writer_rx.recv().await {
                if writer.write_all(command.as_bytes()).await.is_err() {
                    break;
                }
                if writer.write_all(b"\n").await.is_err() {
                    break;
                }
                if writer.flush().await.is_err() {
                    break;
                }
            }
        });

        Self {
            lines_rx,
            writer_tx: Some(writer_tx),
            child: None,
        }
    }

    /// Wire a transport over the stdio pipes of an already-spawned
    /// debugger process. Launching the process is the caller's job; the
    /// child must have been spawned with piped stdin and stdout.
    pub fn from_child(mut child: Child) -> Result<Self, ClientError> {
        let stdin = child.stdin.take().ok_or(ClientError::MissingPipe("stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or(ClientError::MissingPipe("stdout"))?;
        tracing::debug!("wired transport over debugger child pipes");
        let mut transport = Self::from_streams(stdout, stdin);
        transport.child = Some(child);
        Ok(transport)
    }

    /// Connect to a debugger's MI interpreter over TCP.
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        tracing::debug!("connected to debugger at {addr}");
        let (read_half, write_half) = stream.into_split();
        Ok(Self::from_streams(read_half, write_half))
    }

    /// Consume the initial prompt. Returns true iff the first output
    /// unit is exactly the single prompt line, which guarantees the
    /// debugger is ready for commands.
    pub async fn handshake(&mut self, wait: Option<Duration>) -> Result<bool, ClientError> {
        match self.receive(wait).await? {
            Some(lines) => Ok(lines.len() == 1),
            None => Ok(false),
        }
    }

    /// Send one command line.
    pub async fn send(&self, command: &str) -> Result<(), ClientError> {
        let writer_tx = self.writer_tx.as_ref().ok_or(ClientError::Closed)?;
        writer_tx
            .send(command.to_string())
            .await
            .map_err(|_| ClientError::Closed)
    }

    /// Receive one output unit: every raw line up to and including the
    /// prompt. Returns `Ok(None)` on end of stream.
    ///
    /// The timeout bounds each line wait; `None` waits forever. On
    /// expiry the lines gathered so far are dropped with the failed
    /// operation, but a line still in flight stays buffered for the
    /// next call.
    pub async fn receive(
        &mut self,
        wait: Option<Duration>,
    ) -> Result<Option<Vec<String>>, ClientError> {
        let mut lines = Vec::new();
        loop {
            let line = match self.next_line(wait).await? {
                Some(line) => line,
                None => return Ok(None),
            };
            let done = line == END_MARKER;
            lines.push(line);
            if done {
                return Ok(Some(lines));
            }
        }
    }

    async fn next_line(&mut self, wait: Option<Duration>) -> Result<Option<String>, ClientError> {
        match wait {
            None => Ok(self.lines_rx.recv().await),
            Some(duration) => match timeout(duration, self.lines_rx.recv()).await {
                Ok(line) => Ok(line),
                Err(_) => Err(ClientError::Timeout(duration)),
            },
        }
    }

    /// Close the connection. Drops the write side, stops accepting
    /// lines, and reaps the child process if this transport owns one.
    pub async fn close(&mut self) {
        self.writer_tx = None;
        self.lines_rx.close();
        if let Some(mut child) = self.child.take() {
            let _ = child.wait().await;
        }
    }
}
