//! Paths describing which odo binary to run, where, and against which cluster

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Immutable paths shared by every odo invocation of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OdoContext {
    odo_binary: PathBuf,
    context_path: PathBuf,
    kubeconfig: Option<PathBuf>,
}

impl OdoContext {
    pub fn new(
        odo_binary: impl Into<PathBuf>,
        context_path: impl Into<PathBuf>,
        kubeconfig: Option<PathBuf>,
    ) -> Self {
        Self {
            odo_binary: odo_binary.into(),
            context_path: context_path.into(),
            kubeconfig,
        }
    }

    /// Build a context, checking that the component directory exists
    pub fn validated(
        odo_binary: impl Into<PathBuf>,
        context_path: impl Into<PathBuf>,
        kubeconfig: Option<PathBuf>,
    ) -> Result<Self> {
        let context = Self::new(odo_binary, context_path, kubeconfig);
        if !context.context_path.is_dir() {
            return Err(Error::no_context(&context.context_path));
        }
        Ok(context)
    }

    pub fn odo_binary(&self) -> &Path {
        &self.odo_binary
    }

    /// Working directory of every odo process (the component's source tree)
    pub fn context_path(&self) -> &Path {
        &self.context_path
    }

    /// Value for `KUBECONFIG`, when one was configured
    pub fn kubeconfig(&self) -> Option<&Path> {
        self.kubeconfig.as_deref()
    }
}
