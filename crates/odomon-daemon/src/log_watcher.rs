//! Application log passthrough (`odo log -f`)
//!
//! stdout and stderr each get their own [`LineStream`]; lines are handed to
//! the caller tagged with the stream they came from.

use odomon_core::prelude::*;
use odomon_core::OdoContext;

use crate::bridge::LineStream;
use crate::process::OdoProcess;

/// Which pipe a log line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl LogStream {
    pub fn name(&self) -> &'static str {
        match self {
            LogStream::Stdout => "stdout",
            LogStream::Stderr => "stderr",
        }
    }

    /// Console prefix distinguishing the two streams
    pub fn prefix(&self) -> &'static str {
        match self {
            LogStream::Stdout => "[out]",
            LogStream::Stderr => "[err]",
        }
    }
}

/// Follows `odo log -f` for the component
pub struct LogWatcher {
    process: OdoProcess,
    stdout: LineStream,
    stderr: LineStream,
}

impl LogWatcher {
    pub fn start(context: &OdoContext) -> Result<Self> {
        let (process, stdout, stderr) = OdoProcess::spawn_log(context)?;
        Ok(Self {
            process,
            stdout,
            stderr,
        })
    }

    /// Forward every line until both streams end, then reap the process
    pub async fn run<F>(self, on_line: F) -> Option<i32>
    where
        F: FnMut(LogStream, &str),
    {
        let LogWatcher {
            process,
            stdout,
            stderr,
        } = self;

        let count = pump(stdout, stderr, on_line).await;
        debug!("Log streams closed after {} lines", count);

        process.wait().await
    }
}

/// Drain both streams, whichever has a line first. Returns the line count.
pub(crate) async fn pump<F>(
    mut stdout: LineStream,
    mut stderr: LineStream,
    mut on_line: F,
) -> usize
where
    F: FnMut(LogStream, &str),
{
    let mut out_open = true;
    let mut err_open = true;
    let mut count = 0;

    while out_open || err_open {
        tokio::select! {
            line = stdout.next_line(), if out_open => match line {
                Some(line) => {
                    on_line(LogStream::Stdout, &line);
                    count += 1;
                }
                None => out_open = false,
            },
            line = stderr.next_line(), if err_open => match line {
                Some(line) => {
                    on_line(LogStream::Stderr, &line);
                    count += 1;
                }
                None => err_open = false,
            },
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stream(text: &'static str) -> LineStream {
        LineStream::spawn("test", Cursor::new(text.as_bytes())).unwrap()
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(LogStream::Stdout.prefix(), "[out]");
        assert_eq!(LogStream::Stderr.prefix(), "[err]");
        assert_eq!(LogStream::Stderr.name(), "stderr");
    }

    #[tokio::test]
    async fn test_pump_forwards_both_streams_in_order() {
        let mut seen = Vec::new();

        let count = pump(stream("a\nb\nc\n"), stream("x\ny\n"), |kind, line| {
            seen.push((kind, line.to_string()))
        })
        .await;

        assert_eq!(count, 5);
        let out: Vec<&str> = seen
            .iter()
            .filter(|(k, _)| *k == LogStream::Stdout)
            .map(|(_, l)| l.as_str())
            .collect();
        let err: Vec<&str> = seen
            .iter()
            .filter(|(k, _)| *k == LogStream::Stderr)
            .map(|(_, l)| l.as_str())
            .collect();
        assert_eq!(out, vec!["a", "b", "c"]);
        assert_eq!(err, vec!["x", "y"]);
    }

    #[tokio::test]
    async fn test_pump_outlives_an_early_closed_stream() {
        let mut seen = Vec::new();

        pump(stream(""), stream("late\n"), |kind, line| {
            seen.push((kind, line.to_string()))
        })
        .await;

        assert_eq!(seen, vec![(LogStream::Stderr, "late".to_string())]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_watcher_runs_odo_log() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let odo = dir.path().join("odo");
        std::fs::write(&odo, "#!/bin/sh\necho \"$*\"\necho oops >&2\n").unwrap();
        let mut perms = std::fs::metadata(&odo).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&odo, perms).unwrap();
        let context = OdoContext::new(odo, dir.path(), None);

        let mut seen = Vec::new();
        let code = LogWatcher::start(&context)
            .unwrap()
            .run(|kind, line| seen.push(format!("{} {}", kind.prefix(), line)))
            .await;

        assert_eq!(code, Some(0));
        assert!(seen.contains(&"[out] log -f".to_string()));
        assert!(seen.contains(&"[err] oops".to_string()));
    }
}
