//! Engine subprocess invocation.
//!
//! Builds the engine argument vector from [`MatchParameters`] and runs the
//! binary as a child process; exactly one subprocess lifecycle per call, no
//! retries. The engine CLI grammar joins each flag with its value into a
//! single argv token (`"-d <w> <h>"`, `"-s <seed>"`), and that grammar must
//! be matched bit-for-bit.
//!
//! Timeout policy: when the wall-clock budget elapses the child is killed and
//! reaped, and the invocation fails with [`Error::EngineTimeout`]. Partial
//! output is discarded.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{instrument, trace};

use crate::error::{Error, Result};
use crate::match_runner::MatchParameters;

/// Raw result of one engine subprocess run.
#[derive(Debug)]
pub struct EngineOutput {
    /// Captured stdout, decoded lossily.
    pub stdout: String,
    /// Process exit code (`-1` if killed by a signal).
    pub exit_code: i32,
}

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Argument vector for one invocation, binary excluded:
/// `["-d <w> <h>", "-q", "-s <seed>", participant_1, ..., participant_N]`.
pub fn build_command(params: &MatchParameters) -> Vec<String> {
    let dims = format!("-d {} {}", params.width, params.height);
    let seed = format!("-s {}", params.seed);
    let mut args = vec![dims, "-q".to_string(), seed];
    args.extend(params.participants.iter().cloned());
    args
}

/// Run the engine once and capture its stdout.
///
/// stdin is closed, stderr is discarded. Blocks until the process exits or
/// `params.time_limit` elapses.
#[instrument(skip_all, fields(binary = %binary.as_ref().display()))]
pub fn invoke(binary: impl AsRef<Path>, params: &MatchParameters) -> Result<EngineOutput> {
    let args = build_command(params);
    trace!(?args);

    let mut child = Command::new(binary.as_ref())
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    // Drain stdout on a separate thread; a full pipe would otherwise block
    // the engine before the wait loop ever sees it exit.
    let mut stdout = child.stdout.take().expect("stdout was piped");
    let reader = thread::spawn(move || {
        let mut raw = Vec::new();
        let _ = stdout.read_to_end(&mut raw);
        raw
    });

    let status = match params.time_limit {
        Some(limit) => wait_with_deadline(&mut child, limit)?,
        None => child.wait()?,
    };

    let raw = reader.join().expect("stdout reader thread panicked");
    Ok(EngineOutput {
        stdout: String::from_utf8_lossy(&raw).into_owned(),
        exit_code: status.code().unwrap_or(-1),
    })
}

/// Poll `try_wait` until the child exits or `limit` elapses; on timeout the
/// child is killed and reaped before the error is returned, so no orphan
/// survives the call.
fn wait_with_deadline(child: &mut Child, limit: Duration) -> Result<ExitStatus> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() > deadline {
            child.kill()?;
            child.wait()?;
            return Err(Error::EngineTimeout { limit });
        }
        thread::sleep(WAIT_POLL_INTERVAL.min(limit / 10));
    }
}
