// SPDX-License-Identifier: (MIT OR Apache-2.0)

use std::io::Write;
use std::process::ChildStdin;
use std::sync::{Arc, Mutex, PoisonError};

use crate::ProcessError;

/// Something that happened to a child process.
#[derive(Debug)]
pub enum ChildEvent {
    Started { pid: u32, send: Sender },
    /// `None` when the child was ended by a signal.
    Exited { exit_code: Option<i32> },
    Message { event: serde_json::Value },
    Error { error: ProcessError },
}

/// Writes messages to a child's stdin.
#[derive(Debug, Clone)]
pub struct Sender {
    stdin: Arc<Mutex<Option<ChildStdin>>>,
}

impl Sender {
    pub(crate) fn new(stdin: Option<ChildStdin>) -> Self {
        Self { stdin: Arc::new(Mutex::new(stdin)) }
    }

    /// Write `event` as one line of JSON.
    pub fn send(&self, event: &serde_json::Value) -> Result<(), ProcessError> {
        let mut stdin = self.stdin.lock().unwrap_or_else(PoisonError::into_inner);
        let stdin = stdin.as_mut().ok_or(ProcessError::Closed)?;
        serde_json::to_writer(&mut *stdin, event)?;
        stdin.write_all(b"\n")?;
        stdin.flush()?;
        Ok(())
    }

    /// Close the child's stdin. Later sends fail with [`ProcessError::Closed`].
    pub fn close(&self) {
        self.stdin.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}
