//! Low-level PTY allocation and process spawning
//!
//! Unix only: openpty plus fork/exec with the slave side wired up as the
//! child's controlling terminal.

use crate::PtyError;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::pty::{openpty, OpenptyResult, Winsize};
use nix::unistd::{fork, setsid, ForkResult, Pid};
use std::io;
use std::os::unix::io::{AsRawFd, FromRawFd, IntoRawFd, RawFd};
use std::os::unix::process::CommandExt;
use std::process::Command;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::warn;

fn winsize(cols: u16, rows: u16) -> Winsize {
    Winsize {
        ws_row: rows,
        ws_col: cols,
        ws_xpixel: 0,
        ws_ypixel: 0,
    }
}

/// Apply new dimensions to a PTY master descriptor.
pub(crate) fn set_winsize(fd: RawFd, cols: u16, rows: u16) -> Result<(), PtyError> {
    let size = winsize(cols, rows);
    let ret = unsafe { libc::ioctl(fd, libc::TIOCSWINSZ, &size as *const Winsize) };
    if ret < 0 {
        return Err(PtyError::Io(io::Error::last_os_error()));
    }
    Ok(())
}

/// An allocated PTY pair, not yet attached to a process.
pub struct Pty {
    master: RawFd,
    slave: RawFd,
}

impl Pty {
    /// Allocate a PTY with an initial window size. The master side is
    /// switched to non-blocking for the output pump.
    pub fn open(cols: u16, rows: u16) -> Result<Self, PtyError> {
        let size = winsize(cols, rows);
        let OpenptyResult { master, slave } = openpty(Some(&size), None)
            .map_err(|e| PtyError::AllocationFailed(format!("openpty failed: {e}")))?;

        let master_fd = master.into_raw_fd();
        let slave_fd = slave.into_raw_fd();

        fcntl(master_fd, FcntlArg::F_SETFL(OFlag::O_NONBLOCK)).map_err(|e| {
            PtyError::AllocationFailed(format!("failed to set non-blocking: {e}"))
        })?;

        Ok(Self {
            master: master_fd,
            slave: slave_fd,
        })
    }

    pub fn resize(&self, cols: u16, rows: u16) -> Result<(), PtyError> {
        set_winsize(self.master, cols, rows)
    }

    /// Fork and exec `command` with the slave side as stdin/stdout/stderr
    /// and controlling terminal. Consumes the pair; the slave end lives on
    /// only in the child.
    pub fn spawn(mut self, mut command: Command) -> Result<PtyChild, PtyError> {
        let master_fd = self.master;
        let slave_fd = self.slave;
        // Both fds are manually managed from here on.
        self.master = -1;
        self.slave = -1;

        match unsafe { fork() }.map_err(|e| PtyError::SpawnFailed(format!("fork failed: {e}")))? {
            ForkResult::Parent { child } => {
                unsafe {
                    libc::close(slave_fd);
                }
                Ok(PtyChild {
                    pid: child,
                    master: PtyMaster { fd: master_fd },
                })
            }
            ForkResult::Child => {
                unsafe {
                    libc::close(master_fd);
                }

                // New session, slave as the standard streams, then make it
                // the controlling terminal.
                setsid().expect("setsid failed");
                unsafe {
                    libc::dup2(slave_fd, 0);
                    libc::dup2(slave_fd, 1);
                    libc::dup2(slave_fd, 2);
                    libc::close(slave_fd);
                    if libc::ioctl(0, libc::TIOCSCTTY as libc::c_ulong, 0) < 0 {
                        eprintln!("TIOCSCTTY failed: {}", io::Error::last_os_error());
                        std::process::exit(1);
                    }
                }

                let err = command.exec();
                eprintln!("failed to execute command: {err}");
                std::process::exit(1);
            }
        }
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        for fd in [self.master, self.slave] {
            if fd != -1 {
                unsafe {
                    libc::close(fd);
                }
            }
        }
    }
}

/// Master side of a PTY, closed exactly once on drop.
pub struct PtyMaster {
    fd: RawFd,
}

impl AsRawFd for PtyMaster {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for PtyMaster {
    fn drop(&mut self) {
        if self.fd != -1 {
            unsafe {
                libc::close(self.fd);
            }
        }
    }
}

/// A process attached to a PTY.
pub struct PtyChild {
    pid: Pid,
    master: PtyMaster,
}

impl PtyChild {
    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn master(&self) -> &PtyMaster {
        &self.master
    }

    pub fn into_parts(self) -> (Pid, PtyMaster) {
        (self.pid, self.master)
    }
}

/// Forcibly terminate a child. A process that already exited is fine.
pub fn terminate_process(pid: Pid) {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};

    match kill(pid, Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!("failed to signal child {pid}: {e}"),
    }
}

/// Reap a terminated child, returning its exit code (128 + signal for a
/// signaled exit, -1 when the status is unavailable).
pub fn reap_process(pid: Pid) -> i32 {
    use nix::sys::wait::{waitpid, WaitStatus};

    match waitpid(pid, None) {
        Ok(WaitStatus::Exited(_, code)) => code,
        Ok(WaitStatus::Signaled(_, signal, _)) => 128 + signal as i32,
        Ok(_) => -1,
        Err(e) => {
            warn!("waitpid failed for {pid}: {e}");
            -1
        }
    }
}

/// The master side wrapped for async I/O on the tokio runtime.
pub struct AsyncPtyMaster {
    inner: tokio::fs::File,
}

impl AsyncPtyMaster {
    pub fn new(master: PtyMaster) -> io::Result<Self> {
        let fd = master.as_raw_fd();
        // Ownership moves to the tokio File; PtyMaster's Drop must not
        // close the fd a second time.
        std::mem::forget(master);

        let file = unsafe { std::fs::File::from_raw_fd(fd) };
        Ok(Self {
            inner: tokio::fs::File::from_std(file),
        })
    }
}

impl AsRawFd for AsyncPtyMaster {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }
}

impl AsyncRead for AsyncPtyMaster {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for AsyncPtyMaster {
    fn poll_write(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> std::task::Poll<io::Result<usize>> {
        std::pin::Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
