//! Running the diff program as a child process.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use futures::Stream;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::chunker::LineChunker;
use super::{DiffError, DiffItem};
use crate::config::DiffSettings;

/// Longest stderr excerpt carried in an exit-status failure.
const STDERR_EXCERPT_BYTES: usize = 512;

/// Stream the diff between `left` and `right`.
///
/// The stream is lazy: nothing runs until it is first polled. Exit status 0
/// (identical) and 1 (different) are success. Any other status, a spawn
/// error, the timeout or cancellation ends the stream with a
/// [`DiffItem::ToolFailure`]. The timeout bounds the time spent waiting on
/// the child, so a slow consumer is never charged for it. Dropping the stream kills the child and its
/// process group.
pub fn diff_documents(
    left: PathBuf,
    right: PathBuf,
    settings: DiffSettings,
    cancel: CancellationToken,
) -> impl Stream<Item = DiffItem> + Send + 'static {
    async_stream::stream! {
        let program = match settings.resolved_program() {
            Ok(program) => program,
            Err(e) => {
                yield DiffItem::ToolFailure(DiffError::Config(e.to_string()));
                return;
            }
        };

        let mut command = Command::new(&program);
        command
            .args(&settings.args)
            .arg(&left)
            .arg(&right)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(source) => {
                warn!(program = %program, error = %source, "failed to spawn diff program");
                yield DiffItem::ToolFailure(DiffError::Spawn { program, source });
                return;
            }
        };
        let mut group = ProcessGroupGuard::new(child.id());
        info!(program = %program, pid = ?child.id(), "diff program started");

        let (Some(stdout), stderr) = (child.stdout.take(), child.stderr.take()) else {
            yield DiffItem::ToolFailure(DiffError::Config("stdout was not captured".to_string()));
            return;
        };
        let stderr_task = stderr.map(|s| tokio::spawn(read_excerpt(s)));

        // Only time spent waiting on the child counts against the budget,
        // never time the consumer holds the stream suspended at a yield.
        let budget = settings.timeout();
        let mut spent = Duration::ZERO;

        let mut segments = BufReader::new(stdout).split(b'\n');
        let mut chunker = LineChunker::new(settings.chunk_bytes);
        let mut failure = None;

        loop {
            let started = Instant::now();
            let remaining = budget.saturating_sub(spent);
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(DiffError::Cancelled),
                segment = tokio::time::timeout(remaining, segments.next_segment()) => match segment {
                    Ok(segment) => segment.map_err(DiffError::Read),
                    Err(_) => Err(DiffError::Timeout(budget)),
                },
            };
            spent += started.elapsed();

            match event {
                Ok(Some(bytes)) => {
                    let line = String::from_utf8_lossy(&bytes);
                    if let Some(chunk) = chunker.push_line(line.trim_end_matches('\r')) {
                        yield DiffItem::Chunk(chunk);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if failure.is_none() {
            if let Some(chunk) = chunker.finish() {
                yield DiffItem::Chunk(chunk);
            }

            let remaining = budget.saturating_sub(spent);
            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(DiffError::Cancelled),
                status = tokio::time::timeout(remaining, child.wait()) => match status {
                    Ok(status) => status.map_err(DiffError::Read),
                    Err(_) => Err(DiffError::Timeout(budget)),
                },
            };

            match status {
                Ok(status) => {
                    group.disarm();
                    debug!(status = %status, "diff program exited");
                    if !is_success(status) {
                        let stderr = match stderr_task {
                            Some(task) => task.await.unwrap_or_default(),
                            None => String::new(),
                        };
                        failure = Some(DiffError::Exit {
                            status: status.to_string(),
                            stderr,
                        });
                    }
                }
                Err(e) => failure = Some(e),
            }
        }

        if let Some(error) = failure {
            if group.is_armed() {
                group.kill();
                let _ = child.start_kill();
                let _ = child.wait().await;
                group.disarm();
            }
            warn!(error = %error, "diff stream failed");
            yield DiffItem::ToolFailure(error);
        }
    }
}

/// `diff` convention: 0 means identical, 1 means different.
fn is_success(status: ExitStatus) -> bool {
    matches!(status.code(), Some(0) | Some(1))
}

async fn read_excerpt<R: AsyncRead + Unpin>(reader: R) -> String {
    let mut buf = Vec::new();
    let _ = reader.take(64 * 1024).read_to_end(&mut buf).await;
    let text = String::from_utf8_lossy(&buf);
    let text = text.trim();
    let mut end = text.len().min(STDERR_EXCERPT_BYTES);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

/// Kills the child's whole process group unless disarmed, so helpers the
/// diff program spawned do not outlive an abandoned stream.
struct ProcessGroupGuard {
    pid: Option<u32>,
}

impl ProcessGroupGuard {
    fn new(pid: Option<u32>) -> Self {
        Self { pid }
    }

    fn is_armed(&self) -> bool {
        self.pid.is_some()
    }

    /// The child has been reaped; its pid may be reused.
    fn disarm(&mut self) {
        self.pid = None;
    }

    fn kill(&self) {
        if let Some(pid) = self.pid {
            kill_group(pid);
        }
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if self.pid.is_some() {
            debug!(pid = ?self.pid, "killing abandoned diff process group");
            self.kill();
        }
    }
}

#[cfg(unix)]
fn kill_group(pid: u32) {
    let Ok(pgid) = i32::try_from(pid) else {
        return;
    };
    // SAFETY: kill(2) takes no pointers; a negative pid targets the group
    // created by `process_group(0)`, which only holds our child's tree.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}
