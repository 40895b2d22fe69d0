// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Child process lifecycle.
//!
//! [`start`] spawns a program in its own process group and reports what
//! happens to it as [`ChildEvent`]s. With messaging enabled the child's
//! stdin and stdout carry one JSON value per line in each direction.

mod event;

pub use event::{ChildEvent, Sender};

use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

/// Key stripped from incoming message objects.
const FROM_KEY_PATH: &str = "fromKeyPath";

/// How long an exited child's output may stay open before `Exited` is sent
/// without it.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// What to run.
#[derive(Debug, Clone)]
pub struct Start {
    pub path: PathBuf,
    pub args: Vec<String>,
    /// Talk to the child over newline-delimited JSON on stdin/stdout.
    /// Otherwise the child inherits this process's stdio.
    pub messaging: bool,
}

impl Start {
    pub fn new(path: impl Into<PathBuf>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            path: path.into(),
            args: args.into_iter().map(Into::into).collect(),
            messaging: false,
        }
    }

    pub fn with_messaging(mut self) -> Self {
        self.messaging = true;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to start {path}: {source}")]
    Spawn { path: String, source: io::Error },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("the child's input is closed")]
    Closed,

    #[error("could not signal process group {pgid}: {source}")]
    Signal { pgid: u32, source: io::Error },
}

/// Interrupts a started child and everything it spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancel {
    pgid: u32,
}

impl Cancel {
    pub fn pgid(&self) -> u32 {
        self.pgid
    }

    /// Send `SIGINT` to the child's process group.
    #[cfg(unix)]
    pub fn cancel(&self) -> Result<(), ProcessError> {
        info!("interrupting process group {}", self.pgid);
        let pgid = libc::pid_t::try_from(self.pgid)
            .map_err(|_| ProcessError::Signal { pgid: self.pgid, source: io::ErrorKind::InvalidInput.into() })?;
        // A negative pid addresses the whole group.
        let ret = unsafe { libc::kill(-pgid, libc::SIGINT) };
        if ret < 0 {
            return Err(ProcessError::Signal { pgid: self.pgid, source: io::Error::last_os_error() });
        }
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn cancel(&self) -> Result<(), ProcessError> {
        Err(ProcessError::Signal { pgid: self.pgid, source: io::ErrorKind::Unsupported.into() })
    }
}

/// Start the child described by `start`, reporting events to `push`.
///
/// Returns `None` if the child never started; `push` has then received a
/// single [`ChildEvent::Error`]. Otherwise `push` receives `Started`, any
/// messages, and then `Exited`, from background threads. Output that is
/// held open past the child's exit is the exception; see [`DRAIN_TIMEOUT`].
pub fn start<F>(start: Start, push: F) -> Option<Cancel>
where
    F: FnMut(ChildEvent) + Send + 'static,
{
    let push = Arc::new(Mutex::new(push));
    let emit = move |event: ChildEvent| {
        let mut push = push.lock().unwrap_or_else(PoisonError::into_inner);
        (*push)(event);
    };

    let mut child = match spawn(&start) {
        Ok(child) => child,
        Err(error) => {
            emit(ChildEvent::Error { error });
            return None;
        }
    };

    let pid = child.id();
    info!("started {} (pid {})", start.path.display(), pid);

    let send = Sender::new(child.stdin.take());
    emit(ChildEvent::Started { pid, send });

    let reader = child.stdout.take().map(|stdout| {
        let emit = emit.clone();
        let (done, drained) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            read_messages(stdout, emit);
            let _ = done.send(());
        });
        (handle, drained)
    });

    thread::spawn(move || {
        let status = child.wait();
        if let Some((handle, drained)) = reader {
            drain(pid, handle, drained);
        }
        match status {
            Ok(status) => {
                debug!("pid {} exited with {}", pid, status);
                emit(ChildEvent::Exited { exit_code: status.code() });
            }
            Err(error) => emit(ChildEvent::Error { error: error.into() }),
        }
    });

    Some(Cancel { pgid: pid })
}

/// Wait for the reader to deliver what the child wrote before `Exited` is
/// reported. A descendant can keep the pipe open after the child exits, so
/// the wait is bounded by [`DRAIN_TIMEOUT`]; later messages still arrive,
/// just after `Exited`.
fn drain(pid: u32, handle: JoinHandle<()>, drained: mpsc::Receiver<()>) {
    match drained.recv_timeout(DRAIN_TIMEOUT) {
        Err(RecvTimeoutError::Timeout) => {
            warn!("output of pid {} is still open after it exited; not waiting for it", pid);
        }
        Ok(()) | Err(RecvTimeoutError::Disconnected) => {
            if handle.join().is_err() {
                warn!("message reader for pid {} panicked", pid);
            }
        }
    }
}

fn spawn(start: &Start) -> Result<Child, ProcessError> {
    let mut command = Command::new(&start.path);
    command.args(&start.args);
    if start.messaging {
        command.stdin(Stdio::piped()).stdout(Stdio::piped());
    } else {
        command.stdin(Stdio::inherit()).stdout(Stdio::inherit());
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    command.spawn().map_err(|source| ProcessError::Spawn {
        path: start.path.display().to_string(),
        source,
    })
}

fn read_messages(stdout: ChildStdout, emit: impl Fn(ChildEvent)) {
    for line in BufReader::new(stdout).lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                emit(ChildEvent::Error { error: error.into() });
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match decode(&line) {
            Ok(event) => emit(ChildEvent::Message { event }),
            Err(error) => emit(ChildEvent::Error { error }),
        }
    }
}

fn decode(line: &str) -> Result<serde_json::Value, ProcessError> {
    let mut event: serde_json::Value = serde_json::from_str(line)?;
    if let Some(object) = event.as_object_mut() {
        object.remove(FROM_KEY_PATH);
    }
    Ok(event)
}
