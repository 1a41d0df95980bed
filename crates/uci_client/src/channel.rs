//! Transports that carry protocol lines to and from one engine instance.
//!
//! A channel is owned by exactly one session at a time and supports exactly
//! one conversation. Sending on a dead transport is a logged no-op; the
//! owning session recovers through its step timeout instead of blocking.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::EngineError;

/// Duplex line channel to one running engine.
#[async_trait]
pub trait EngineChannel: Send {
    /// Transmit one protocol line. Best-effort: failures are logged and
    /// swallowed, and the session's step timeout does the recovery.
    async fn send(&mut self, line: &str);

    /// Next inbound line, in arrival order. `None` means the transport is
    /// gone and no further line will ever arrive.
    async fn recv(&mut self) -> Option<String>;

    /// Release the transport. No line is delivered after this returns.
    async fn close(&mut self);
}

/// Read lines off a transport into a queue the channel hands out one at a
/// time. Blank lines are dropped; a read error ends the pump like EOF.
fn spawn_line_pump<R>(reader: R) -> mpsc::UnboundedReceiver<String>
where
    R: tokio::io::AsyncRead + Send + Unpin + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if tx.send(trimmed.to_string()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Stop accepting new lines and throw away anything still queued, so that
/// `recv` after `close` is `None` and never a stale line.
fn drain(lines: &mut mpsc::UnboundedReceiver<String>) {
    lines.close();
    while lines.try_recv().is_ok() {}
}

/// Engine spawned as a child process, spoken to over piped stdio.
pub struct WorkerChannel {
    child: Child,
    stdin: Option<ChildStdin>,
    lines: mpsc::UnboundedReceiver<String>,
}

impl WorkerChannel {
    pub async fn spawn(command: &Path) -> Result<Self, EngineError> {
        let mut child = Command::new(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::TransportUnavailable(format!("spawn {}: {e}", command.display()))
            })?;
        let stdin = child.stdin.take().ok_or_else(|| {
            EngineError::TransportUnavailable("engine stdin was not captured".into())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            EngineError::TransportUnavailable("engine stdout was not captured".into())
        })?;
        debug!(command = %command.display(), "engine process started");
        Ok(Self {
            child,
            stdin: Some(stdin),
            lines: spawn_line_pump(stdout),
        })
    }
}

#[async_trait]
impl EngineChannel for WorkerChannel {
    async fn send(&mut self, line: &str) {
        debug!(%line, "-> engine");
        let Some(stdin) = self.stdin.as_mut() else {
            return;
        };
        let mut framed = line.to_owned();
        framed.push('\n');
        let wrote = stdin.write_all(framed.as_bytes()).await;
        if let Err(e) = wrote.and(stdin.flush().await) {
            warn!("engine stdin write failed: {e}");
            self.stdin = None;
        }
    }

    async fn recv(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    async fn close(&mut self) {
        self.send("quit").await;
        self.stdin = None;
        // An already-exited engine makes kill report an error; that is fine.
        if let Err(e) = self.child.kill().await {
            debug!("engine process reaping: {e}");
        }
        drain(&mut self.lines);
    }
}

/// Engine reached over a TCP endpoint.
pub struct SocketChannel {
    writer: Option<OwnedWriteHalf>,
    lines: mpsc::UnboundedReceiver<String>,
}

impl SocketChannel {
    pub async fn connect(addr: &str) -> Result<Self, EngineError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| EngineError::TransportUnavailable(format!("connect {addr}: {e}")))?;
        let (read_half, write_half) = stream.into_split();
        debug!(%addr, "engine endpoint connected");
        Ok(Self {
            writer: Some(write_half),
            lines: spawn_line_pump(read_half),
        })
    }
}

#[async_trait]
impl EngineChannel for SocketChannel {
    async fn send(&mut self, line: &str) {
        debug!(%line, "-> engine");
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let mut framed = line.to_owned();
        framed.push('\n');
        if let Err(e) = writer.write_all(framed.as_bytes()).await {
            warn!("engine socket write failed: {e}");
            self.writer = None;
        }
    }

    async fn recv(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    async fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.shutdown().await;
        }
        drain(&mut self.lines);
    }
}

/// Where the engine lives. Opening the endpoint picks the transport by
/// capability: a runnable local engine binary wins, a configured network
/// address is the fallback.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineEndpoint {
    pub command: Option<PathBuf>,
    pub address: Option<String>,
}

impl EngineEndpoint {
    pub async fn open(&self) -> Result<Box<dyn EngineChannel>, EngineError> {
        if let Some(command) = &self.command {
            if command.is_file() {
                let channel = WorkerChannel::spawn(command).await?;
                return Ok(Box::new(channel));
            }
            warn!(
                command = %command.display(),
                "engine command not found, falling back to the network endpoint"
            );
        }
        if let Some(address) = &self.address {
            let channel = SocketChannel::connect(address).await?;
            return Ok(Box::new(channel));
        }
        Err(EngineError::TransportUnavailable(
            "no engine command or address configured".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn echo_listener() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        (listener, addr)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn worker_channel_round_trips_lines() {
        let mut channel = WorkerChannel::spawn(Path::new("/bin/cat")).await.unwrap();
        channel.send("hello engine").await;
        assert_eq!(channel.recv().await.as_deref(), Some("hello engine"));

        channel.close().await;
        assert_eq!(channel.recv().await, None, "closed channels stay silent");
    }

    #[tokio::test]
    async fn worker_channel_reports_missing_binary() {
        let err = WorkerChannel::spawn(Path::new("/no/such/engine"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::TransportUnavailable(_)));
    }

    #[tokio::test]
    async fn socket_channel_round_trips_lines() {
        let (listener, addr) = echo_listener().await;
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.split();
            let mut lines = BufReader::new(read_half).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let reply = format!("{line}\n");
                if write_half.write_all(reply.as_bytes()).await.is_err() {
                    break;
                }
            }
        });

        let mut channel = SocketChannel::connect(&addr).await.unwrap();
        channel.send("isready").await;
        assert_eq!(channel.recv().await.as_deref(), Some("isready"));

        channel.close().await;
        assert_eq!(channel.recv().await, None);
    }

    #[tokio::test]
    async fn endpoint_refuses_when_nothing_is_configured() {
        let err = EngineEndpoint::default().open().await.err().unwrap();
        assert!(matches!(err, EngineError::TransportUnavailable(_)));
    }

    #[tokio::test]
    async fn endpoint_falls_back_from_missing_binary_to_address() {
        let (listener, addr) = echo_listener().await;
        tokio::spawn(async move {
            let _keep_alive = listener.accept().await;
        });

        let endpoint = EngineEndpoint {
            command: Some(PathBuf::from("/no/such/engine")),
            address: Some(addr),
        };
        assert!(endpoint.open().await.is_ok());
    }

    #[tokio::test]
    async fn endpoint_fails_when_nobody_listens() {
        let endpoint = EngineEndpoint {
            command: None,
            // Reserved port on localhost that nothing binds during tests.
            address: Some("127.0.0.1:1".into()),
        };
        let err = endpoint.open().await.err().unwrap();
        assert!(matches!(err, EngineError::TransportUnavailable(_)));
    }
}
