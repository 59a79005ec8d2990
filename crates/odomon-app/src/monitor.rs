//! Monitoring sessions
//!
//! Each session owns one odo process for its whole life: lines come out of
//! the process through a [`LineStream`], are decoded with [`parse_line`] and,
//! for `status`, folded into a [`StatusTracker`]. Everything the user sees
//! goes through a [`Reporter`].
//!
//! A fatal decode error ends the session early; the [`OdoProcess`] is dropped
//! on the way out, which kills odo.

use odomon_core::prelude::*;
use odomon_core::{ComponentStatus, OdoContext, StatusRules, StatusTracker};
use odomon_daemon::{parse_line, LineStream, LogWatcher, OdoProcess, ParsedLine};

use crate::config::Settings;
use crate::reporter::Reporter;

/// Session behaviour taken from settings and CLI flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorOptions {
    pub rules: StatusRules,
    /// Report every decoded event, not only status changes
    pub debug_events: bool,
}

impl MonitorOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            rules: settings.status_rules(),
            debug_events: settings.output.debug_events,
        }
    }
}

/// What happened during a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Lines read from odo, blank ones included
    pub lines: usize,
    pub events: usize,
    pub passthrough: usize,
    pub status_changes: usize,
    /// Last snapshot (`status` sessions only)
    pub final_status: ComponentStatus,
    /// `None` when odo was killed by a signal
    pub exit_code: Option<i32>,
}

// ─────────────────────────────────────────────────────────
// status
// ─────────────────────────────────────────────────────────

/// Follow `odo component status` until odo exits
pub async fn run_status<R>(
    context: &OdoContext,
    options: &MonitorOptions,
    reporter: &mut R,
) -> Result<SessionSummary>
where
    R: Reporter + ?Sized,
{
    let (process, mut lines) =
        OdoProcess::spawn_status(context).context("Failed to start odo component status")?;
    let mut tracker = StatusTracker::new(options.rules.clone());

    let mut summary = follow_status(&mut lines, &mut tracker, options, reporter).await?;

    summary.exit_code = finish(process, reporter).await?;
    info!(
        "Status session ended: {} lines, {} events, {} status changes",
        summary.lines, summary.events, summary.status_changes
    );
    Ok(summary)
}

/// Drive the tracker from a line stream until it ends
pub async fn follow_status<R>(
    lines: &mut LineStream,
    tracker: &mut StatusTracker,
    options: &MonitorOptions,
    reporter: &mut R,
) -> Result<SessionSummary>
where
    R: Reporter + ?Sized,
{
    let mut summary = SessionSummary::default();

    while let Some(line) = lines.next_line().await {
        summary.lines += 1;

        match parse_line(&line)? {
            ParsedLine::Event(event) => {
                summary.events += 1;
                if options.debug_events {
                    reporter.odo_event(&event)?;
                }
                if let Some(change) = tracker.apply(&event) {
                    summary.status_changes += 1;
                    reporter.status_changed(&change)?;
                }
            }
            ParsedLine::Text(text) => {
                summary.passthrough += 1;
                reporter.passthrough(&text)?;
            }
            ParsedLine::Empty => {}
        }
    }

    summary.final_status = tracker.current().clone();
    Ok(summary)
}

// ─────────────────────────────────────────────────────────
// push
// ─────────────────────────────────────────────────────────

/// Run `odo push` and show its events as they arrive
pub async fn run_push<R>(context: &OdoContext, reporter: &mut R) -> Result<SessionSummary>
where
    R: Reporter + ?Sized,
{
    let (process, mut lines) =
        OdoProcess::spawn_push(context).context("Failed to start odo push")?;

    let mut summary = SessionSummary::default();
    while let Some(line) = lines.next_line().await {
        summary.lines += 1;

        match parse_line(&line)? {
            ParsedLine::Event(event) => {
                summary.events += 1;
                if event.is_error() {
                    warn!("odo push reported: {}", event.summary());
                }
                reporter.odo_event(&event)?;
            }
            ParsedLine::Text(text) => {
                summary.passthrough += 1;
                reporter.passthrough(&text)?;
            }
            ParsedLine::Empty => {}
        }
    }

    summary.exit_code = finish(process, reporter).await?;
    info!(
        "Push session ended: {} lines, {} events, exit code {:?}",
        summary.lines, summary.events, summary.exit_code
    );
    Ok(summary)
}

// ─────────────────────────────────────────────────────────
// log
// ─────────────────────────────────────────────────────────

/// Echo `odo log -f` until odo exits
pub async fn run_logs<R>(context: &OdoContext, reporter: &mut R) -> Result<SessionSummary>
where
    R: Reporter + ?Sized,
{
    let watcher = LogWatcher::start(context).context("Failed to start odo log")?;

    let mut summary = SessionSummary::default();
    let mut failure: Option<Error> = None;

    let exit_code = watcher
        .run(|stream, line| {
            summary.lines += 1;
            if failure.is_none() {
                if let Err(e) = reporter.log_line(stream, line) {
                    error!("Stopped echoing log lines: {}", e);
                    failure = Some(e);
                }
            }
        })
        .await;

    if let Some(e) = failure {
        return Err(e);
    }

    reporter.process_exited(exit_code)?;
    summary.exit_code = exit_code;
    Ok(summary)
}

async fn finish<R>(process: OdoProcess, reporter: &mut R) -> Result<Option<i32>>
where
    R: Reporter + ?Sized,
{
    let pid = process.id();
    let code = process.wait().await;
    debug!("odo ({}) finished with {:?}", pid, code);
    reporter.process_exited(code)?;
    Ok(code)
}
