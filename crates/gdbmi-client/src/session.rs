//! MI session: one in-flight command, a pending-event queue, and
//! filter-based waits for asynchronous debugger state changes.

use std::collections::VecDeque;
use std::time::Duration;

use gdbmi_protocol::{parse_output, OutOfBandRecord, Output, ProtocolError, ResultRecord};

use crate::error::ClientError;
use crate::transport::MiTransport;

/// Timeouts applied when a call does not name one. `None` waits forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Per-line timeout for `request` and `is_event_received`.
    pub receive_timeout: Option<Duration>,
    /// Timeout for the initial prompt handshake.
    pub handshake_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            receive_timeout: None,
            handshake_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// A debugger session over one MI transport.
///
/// Serializes commands: exactly one may be outstanding at a time, which
/// `&mut self` on [`request`](MiSession::request) enforces. Out-of-band
/// records arriving on the wire are queued in arrival order and stay
/// queued across requests until a filter claims or discards them.
#[derive(Debug)]
pub struct MiSession {
    transport: MiTransport,
    pending: VecDeque<OutOfBandRecord>,
    config: SessionConfig,
}

impl MiSession {
    /// Create a session with default timeouts.
    pub fn new(transport: MiTransport) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    /// Create a session with explicit timeouts.
    pub fn with_config(transport: MiTransport, config: SessionConfig) -> Self {
        Self {
            transport,
            pending: VecDeque::new(),
            config,
        }
    }

    /// Consume the debugger's initial prompt. Returns true iff the
    /// debugger is ready for commands.
    pub async fn handshake(&mut self) -> Result<bool, ClientError> {
        let wait = self.config.handshake_timeout;
        self.transport.handshake(wait).await
    }

    /// Send a command and wait for its result record, using the
    /// session's default timeout.
    pub async fn request(&mut self, command: &str) -> Result<ResultRecord, ClientError> {
        let wait = self.config.receive_timeout;
        self.request_timeout(command, wait).await
    }

    /// Send a command and wait for its result record.
    ///
    /// Every out-of-band record received along the way is queued for
    /// [`is_event_received`](MiSession::is_event_received), in arrival
    /// order. Correlation is positional: the first result record to
    /// arrive answers this command.
    pub async fn request_timeout(
        &mut self,
        command: &str,
        wait: Option<Duration>,
    ) -> Result<ResultRecord, ClientError> {
        tracing::debug!("> {command}");
        self.transport.send(command).await?;

        loop {
            let output = self.receive_output(wait).await?;
            let (records, result) = output.into_parts();
            self.pending.extend(records);
            if let Some(result) = result {
                return Ok(result);
            }
        }
    }

    /// Wait for an out-of-band record accepted by `filter`, using the
    /// session's default timeout.
    pub async fn is_event_received<F>(&mut self, filter: F) -> Result<bool, ClientError>
    where
        F: FnMut(&OutOfBandRecord) -> bool,
    {
        let wait = self.config.receive_timeout;
        self.is_event_received_timeout(filter, wait).await
    }

    /// Wait for an out-of-band record accepted by `filter`.
    ///
    /// Queued records are tested first, in FIFO order; a record the
    /// filter rejects is discarded, not requeued, so unmatched events
    /// cannot pile up. A match from the queue returns without touching
    /// the wire. Otherwise one more output unit is received and parsed
    /// (a result record there is a protocol violation, since no command
    /// is outstanding), its records are queued, and the queue is drained
    /// once more.
    pub async fn is_event_received_timeout<F>(
        &mut self,
        mut filter: F,
        wait: Option<Duration>,
    ) -> Result<bool, ClientError>
    where
        F: FnMut(&OutOfBandRecord) -> bool,
    {
        if self.drain_pending(&mut filter) {
            return Ok(true);
        }

        let output = self.receive_output(wait).await?;
        let (records, result) = output.into_parts();
        if result.is_some() {
            return Err(ProtocolError::UnexpectedResultRecord.into());
        }
        self.pending.extend(records);

        Ok(self.drain_pending(&mut filter))
    }

    /// How many out-of-band records are queued.
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    /// Close the underlying transport.
    pub async fn close(&mut self) {
        self.transport.close().await;
    }

    /// Receive and parse one output unit. Units holding nothing but the
    /// prompt are skipped.
    async fn receive_output(&mut self, wait: Option<Duration>) -> Result<Output, ClientError> {
        loop {
            let lines = self
                .transport
                .receive(wait)
                .await?
                .ok_or(ClientError::NotResponding)?;
            for line in &lines {
                tracing::debug!("< {line}");
            }
            if lines.len() == 1 {
                tracing::warn!("skipping output unit holding only the prompt");
                continue;
            }
            return Ok(parse_output(&lines)?);
        }
    }

    /// Pop queued records in FIFO order until `filter` accepts one.
    /// Rejected records are dropped.
    fn drain_pending<F>(&mut self, filter: &mut F) -> bool
    where
        F: FnMut(&OutOfBandRecord) -> bool,
    {
        while let Some(record) = self.pending.pop_front() {
            if filter(&record) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, split, AsyncWriteExt};

    fn session_pair() -> (MiSession, tokio::io::DuplexStream) {
        let (local, remote) = duplex(4096);
        let (reader, writer) = split(local);
        (MiSession::new(MiTransport::from_streams(reader, writer)), remote)
    }

    #[test]
    fn session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.receive_timeout, None);
        assert_eq!(config.handshake_timeout, Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn session_handshake() {
        let (mut session, mut remote) = session_pair();
        remote.write_all(b"(gdb)\n").await.unwrap();
        assert!(session.handshake().await.unwrap());
    }

    #[tokio::test]
    async fn session_request_returns_result_record() {
        let (mut session, mut remote) = session_pair();
        remote.write_all(b"^done,value=\"5\"\n(gdb)\n").await.unwrap();

        let record = session.request("-var-evaluate-expression v").await.unwrap();
        assert_eq!(record.class, gdbmi_protocol::ResultClass::Done);
        assert_eq!(record.get("value").unwrap().as_const().unwrap().raw(), "5");
        assert_eq!(session.pending_events(), 0);
    }

    #[tokio::test]
    async fn session_request_skips_prompt_only_units() {
        let (mut session, mut remote) = session_pair();
        remote.write_all(b"(gdb)\n^done\n(gdb)\n").await.unwrap();

        let record = session.request("-break-delete 1").await.unwrap();
        assert_eq!(record.class, gdbmi_protocol::ResultClass::Done);
    }

    #[tokio::test]
    async fn session_request_eof_is_not_responding() {
        let (mut session, remote) = session_pair();
        drop(remote);

        let err = session.request("-exec-run").await.unwrap_err();
        assert!(matches!(err, ClientError::NotResponding));
    }

    #[tokio::test(start_paused = true)]
    async fn session_request_times_out() {
        let (mut session, _remote) = session_pair();

        let err = session
            .request_timeout("-exec-run", Some(Duration::from_millis(200)))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));
    }

    #[tokio::test]
    async fn session_request_parse_error_propagates() {
        let (mut session, mut remote) = session_pair();
        remote.write_all(b"^done\ngarbage\n(gdb)\n").await.unwrap();

        let err = session.request("-exec-run").await.unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
    }
}
