//! odo process management

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use odomon_core::prelude::*;
use odomon_core::OdoContext;

use crate::bridge::LineStream;

/// Arguments for following component status as JSON events
pub const STATUS_ARGS: &[&str] = &["component", "status", "--follow", "-o", "json"];

/// Arguments for pushing the component with JSON events
pub const PUSH_ARGS: &[&str] = &["push", "-f", "-o", "json"];

/// Arguments for following the component's application log
pub const LOG_ARGS: &[&str] = &["log", "-f"];

/// Resolve the odo binary from an explicit path, falling back to `PATH`
///
/// An explicit directory means `<dir>/odo`; an explicit file is used as is.
pub fn resolve_odo_binary(explicit: Option<&Path>) -> PathBuf {
    let binary_name = format!("odo{}", std::env::consts::EXE_SUFFIX);

    if let Some(path) = explicit {
        if path.is_dir() {
            return path.join(binary_name);
        }
        return path.to_path_buf();
    }

    match which::which("odo") {
        Ok(found) => {
            debug!("Found odo on PATH: {}", found.display());
            found
        }
        Err(e) => {
            debug!("odo not found on PATH ({}), relying on the OS lookup", e);
            PathBuf::from(binary_name)
        }
    }
}

/// A running odo child process.
///
/// Its output pipes are handed to [`LineStream`] reader threads at spawn time.
/// If the process is still alive when this handle is dropped it is killed and
/// reaped, so an early error in the consumer does not orphan it.
pub struct OdoProcess {
    child: Child,
    pid: u32,
}

impl OdoProcess {
    /// Internal spawn implementation. All public methods delegate here.
    ///
    /// `command` owns the parent's copies of `stdout` / `stderr` and is
    /// dropped on return, so only the child keeps a write end open.
    fn spawn_internal(
        context: &OdoContext,
        args: &[&str],
        stdout: Stdio,
        stderr: Stdio,
    ) -> Result<Self> {
        let binary = context.odo_binary();
        info!(
            "Spawning odo: {} {} (in {})",
            binary.display(),
            args.join(" "),
            context.context_path().display()
        );

        let mut command = Command::new(binary);
        command
            .args(args)
            .current_dir(context.context_path())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr);

        if let Some(kubeconfig) = context.kubeconfig() {
            debug!("KUBECONFIG={}", kubeconfig.display());
            command.env("KUBECONFIG", kubeconfig);
        }

        let child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::odo_not_found(binary)
            } else {
                Error::process_spawn(e.to_string())
            }
        })?;

        let pid = child.id();
        info!("odo process started with PID: {}", pid);

        Ok(Self { child, pid })
    }

    /// Spawn odo with stdout and stderr writing into one shared pipe
    ///
    /// Both descriptors point at the same pipe, like `2>&1`, so lines arrive
    /// in the order odo wrote them.
    pub fn spawn_merged(context: &OdoContext, args: &[&str]) -> Result<(Self, LineStream)> {
        let (reader, writer) = std::io::pipe()?;
        let process = Self::spawn_internal(
            context,
            args,
            Stdio::from(writer.try_clone()?),
            Stdio::from(writer),
        )?;
        let lines = LineStream::spawn("output", reader)?;
        Ok((process, lines))
    }

    /// Spawn odo with separate stdout and stderr line streams
    pub fn spawn_split(
        context: &OdoContext,
        args: &[&str],
    ) -> Result<(Self, LineStream, LineStream)> {
        let mut process = Self::spawn_internal(context, args, Stdio::piped(), Stdio::piped())?;
        let (stdout, stderr) = process.take_pipes()?;
        let out = LineStream::spawn("stdout", stdout)?;
        let err = LineStream::spawn("stderr", stderr)?;
        Ok((process, out, err))
    }

    /// `odo component status --follow -o json`
    pub fn spawn_status(context: &OdoContext) -> Result<(Self, LineStream)> {
        Self::spawn_merged(context, STATUS_ARGS)
    }

    /// `odo push -f -o json`
    pub fn spawn_push(context: &OdoContext) -> Result<(Self, LineStream)> {
        Self::spawn_merged(context, PUSH_ARGS)
    }

    /// `odo log -f`
    pub fn spawn_log(context: &OdoContext) -> Result<(Self, LineStream, LineStream)> {
        Self::spawn_split(context, LOG_ARGS)
    }

    fn take_pipes(
        &mut self,
    ) -> Result<(std::process::ChildStdout, std::process::ChildStderr)> {
        let stdout = self
            .child
            .stdout
            .take()
            .ok_or_else(|| Error::process("stdout was not captured"))?;
        let stderr = self
            .child
            .stderr
            .take()
            .ok_or_else(|| Error::process("stderr was not captured"))?;
        Ok((stdout, stderr))
    }

    /// Get the process ID
    pub fn id(&self) -> u32 {
        self.pid
    }

    /// Wait for the process to exit and return its exit code.
    ///
    /// `None` means it was killed by a signal or could not be waited on.
    pub async fn wait(mut self) -> Option<i32> {
        let pid = self.pid;
        let result = tokio::task::spawn_blocking(move || {
            let status = self.child.wait();
            (self, status)
        })
        .await;

        match result {
            Ok((_process, Ok(status))) => {
                info!("odo process {} exited with status: {}", pid, status);
                status.code()
            }
            Ok((_process, Err(e))) => {
                error!("Error waiting for odo process {}: {}", pid, e);
                None
            }
            Err(e) => {
                error!("Wait task for odo process {} failed: {}", pid, e);
                None
            }
        }
    }
}

impl Drop for OdoProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            warn!("odo process {} still running on drop, killing it", self.pid);
            if let Err(e) = self.child.kill() {
                error!("Failed to kill odo process {}: {}", self.pid, e);
            }
            let _ = self.child.wait();
        }
    }
}
