//! PTY session lifecycle
//!
//! `Idle -> Starting -> Running -> Stopping -> Idle`. Stop is a hard
//! teardown and always lands back on Idle; a stopped session is discarded
//! and recreated, never restarted in place.

use crate::channel::{OutputChannel, DEFAULT_CHANNEL_CAPACITY};
use crate::config::SessionConfig;
use crate::pty::{
    reap_process, set_winsize, terminate_process, AsyncPtyMaster, Pty,
};
use crate::PtyError;
use bytes::Bytes;
use nix::unistd::Pid;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

const READ_CHUNK_SIZE: usize = 8192;
const IDLE_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    Starting,
    Running,
    Stopping,
}

pub struct PtySession {
    config: SessionConfig,
    output: OutputChannel,
    state: SessionState,
    running: Option<RunningSession>,
}

struct RunningSession {
    pid: Pid,
    /// Raw master fd, valid while the async halves are alive; used only
    /// for the resize ioctl.
    master_fd: RawFd,
    /// Cleared by the output pump when the stream ends.
    alive: Arc<AtomicBool>,
    input_tx: mpsc::UnboundedSender<Bytes>,
    shutdown_tx: watch::Sender<bool>,
    output_pump: JoinHandle<()>,
    input_pump: JoinHandle<()>,
}

impl PtySession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            output: OutputChannel::new(DEFAULT_CHANNEL_CAPACITY),
            state: SessionState::Idle,
            running: None,
        }
    }

    /// Handle for the consumer context that drains raw output chunks.
    pub fn output(&self) -> OutputChannel {
        self.output.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
            && self
                .running
                .as_ref()
                .is_some_and(|r| r.alive.load(Ordering::SeqCst))
    }

    /// Spawn the configured shell and begin pumping I/O. No-op when
    /// already running; on failure the session stays Idle.
    pub async fn start(&mut self) -> Result<(), PtyError> {
        if self.state == SessionState::Running {
            debug!("session already running");
            return Ok(());
        }
        self.state = SessionState::Starting;

        match self.spawn_shell() {
            Ok(running) => {
                debug!(pid = %running.pid, shell = %self.config.shell.display(), "session started");
                self.running = Some(running);
                self.state = SessionState::Running;
                Ok(())
            }
            Err(e) => {
                error!("failed to start shell: {e}");
                self.state = SessionState::Idle;
                Err(e)
            }
        }
    }

    fn spawn_shell(&self) -> Result<RunningSession, PtyError> {
        let pty = Pty::open(self.config.cols, self.config.rows)?;

        let mut command = Command::new(&self.config.shell);
        command
            .args(&self.config.args)
            .current_dir(&self.config.working_dir)
            .env_clear()
            .envs(self.config.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let child = pty.spawn(command)?;
        let (pid, master) = child.into_parts();

        let master_fd = master.as_raw_fd();
        let async_master = AsyncPtyMaster::new(master)?;
        let (read_half, write_half) = tokio::io::split(async_master);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let alive = Arc::new(AtomicBool::new(true));

        let output_pump = tokio::spawn(output_pump(
            read_half,
            self.output.clone(),
            shutdown_rx,
            alive.clone(),
        ));
        let input_pump = tokio::spawn(input_pump(write_half, input_rx));

        Ok(RunningSession {
            pid,
            master_fd,
            alive,
            input_tx,
            shutdown_tx,
            output_pump,
            input_pump,
        })
    }

    /// Enqueue raw bytes for the child's stdin. Non-blocking, strictly
    /// ordered, never dropped; silently ignored unless running.
    pub fn send_input(&self, text: &str) {
        if !self.is_running() {
            return;
        }
        if let Some(running) = &self.running {
            let _ = running.input_tx.send(Bytes::copy_from_slice(text.as_bytes()));
        }
    }

    /// `send_input` with the line terminator appended.
    pub fn send_command(&self, command: &str) {
        self.send_input(&format!("{command}\r"));
    }

    /// Propagate new dimensions to the PTY device. Best effort: failures
    /// are logged, never raised.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.config.cols = cols;
        self.config.rows = rows;
        if let Some(running) = &self.running {
            match set_winsize(running.master_fd, cols, rows) {
                Ok(()) => debug!(cols, rows, "resized PTY"),
                Err(e) => warn!("PTY resize failed: {e}"),
            }
        }
    }

    /// Hard teardown, idempotent. After this returns no further chunks
    /// reach the output channel and the child is no longer running.
    pub async fn stop(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        self.state = SessionState::Stopping;
        debug!("stopping session");

        if let Some(running) = self.running.take() {
            // The output pump exits first so nothing else can reach the
            // channel, then the channel reports end-of-stream.
            let _ = running.shutdown_tx.send(true);
            let _ = running.output_pump.await;
            self.output.close();

            // Closing the queue ends the input pump; killing the child
            // unblocks any write still in flight.
            drop(running.input_tx);
            terminate_process(running.pid);
            let _ = running.input_pump.await;

            let pid = running.pid;
            match tokio::task::spawn_blocking(move || reap_process(pid)).await {
                Ok(code) => debug!(code, "child reaped"),
                Err(e) => warn!("failed to join reap task: {e}"),
            }
        }

        self.state = SessionState::Idle;
        debug!("session stopped");
    }
}

impl Drop for PtySession {
    fn drop(&mut self) {
        // Best effort if the owner never called stop; the child must not
        // outlive the session.
        if let Some(running) = self.running.take() {
            let _ = running.shutdown_tx.send(true);
            terminate_process(running.pid);
        }
    }
}

async fn output_pump(
    mut reader: ReadHalf<AsyncPtyMaster>,
    output: OutputChannel,
    mut shutdown: watch::Receiver<bool>,
    alive: Arc<AtomicBool>,
) {
    let mut buffer = vec![0u8; READ_CHUNK_SIZE];
    debug!("output pump started");

    loop {
        tokio::select! {
            result = reader.read(&mut buffer) => match result {
                Ok(0) => {
                    debug!("PTY closed (EOF)");
                    break;
                }
                Ok(n) => output.push(Bytes::copy_from_slice(&buffer[..n])),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    // Master is non-blocking; idle until the child has
                    // more to say.
                    tokio::time::sleep(IDLE_POLL).await;
                }
                Err(e) => {
                    error!("PTY read error: {e}");
                    break;
                }
            },
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    debug!("output pump shutting down");
                    break;
                }
            }
        }
    }

    alive.store(false, Ordering::SeqCst);
    debug!("output pump stopped");
}

async fn input_pump(
    mut writer: WriteHalf<AsyncPtyMaster>,
    mut input_rx: mpsc::UnboundedReceiver<Bytes>,
) {
    debug!("input pump started");
    while let Some(chunk) = input_rx.recv().await {
        if let Err(e) = write_fully(&mut writer, &chunk).await {
            error!("PTY write error: {e}");
            break;
        }
    }
    debug!("input pump stopped");
}

/// Write one chunk completely before the next is taken; a partial write
/// must never interleave with later input.
async fn write_fully(
    writer: &mut WriteHalf<AsyncPtyMaster>,
    chunk: &[u8],
) -> io::Result<()> {
    let mut offset = 0;
    while offset < chunk.len() {
        match writer.write(&chunk[offset..]).await {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => offset += n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            Err(e) => return Err(e),
        }
    }
    writer.flush().await
}
