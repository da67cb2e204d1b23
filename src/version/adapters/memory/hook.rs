//! Recording version hook.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::project::domain::ProjectRef;
use crate::version::{
    domain::{Version, VersionId},
    ports::{VersionCreatedHook, VersionHookError},
};

/// Hook that remembers every version it is called with.
#[derive(Debug, Clone, Default)]
pub struct RecordingVersionHook {
    seen: Arc<RwLock<Vec<VersionId>>>,
    fail: bool,
}

impl RecordingVersionHook {
    /// Creates a hook that records and succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a hook that records and then reports a failure.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            seen: Arc::default(),
            fail: true,
        }
    }

    /// Returns the identifiers of versions seen so far.
    ///
    /// # Errors
    ///
    /// Returns a hook error when lock acquisition fails.
    pub fn seen(&self) -> Result<Vec<VersionId>, VersionHookError> {
        self.seen
            .read()
            .map(|seen| seen.clone())
            .map_err(|err| VersionHookError::new(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl VersionCreatedHook for RecordingVersionHook {
    async fn version_created(
        &self,
        version: &Version,
        _project: &ProjectRef,
    ) -> Result<(), VersionHookError> {
        self.seen
            .write()
            .map_err(|err| VersionHookError::new(std::io::Error::other(err.to_string())))?
            .push(version.id().clone());
        if self.fail {
            return Err(VersionHookError::new(std::io::Error::other(
                "recording hook configured to fail",
            )));
        }
        Ok(())
    }
}
